#![allow(non_snake_case)]
//! rusted_newton [REQUEST.json] [--config TASK] [--csv FILE] [--plot FILE] [--log-file]
//!
//! Reads a request object (or an array of them) from the file or from stdin and
//! prints the response JSON to stdout. Exit code 0: every request converged,
//! 1: at least one request failed, 2: bad arguments, task file or input.
use RustedNewton::Utils::logger::{init_logger, save_steps_to_csv};
use RustedNewton::Utils::plots::plot_newton;
use RustedNewton::api::{CalcRequest, calculate_batch, into_result, respond, solve_request};
use RustedNewton::numerical::config::SolverConfig;
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str =
    "usage: rusted_newton [REQUEST.json] [--config TASK] [--csv FILE] [--plot FILE] [--log-file]";

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    csv: Option<PathBuf>,
    plot: Option<PathBuf>,
    log_file: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    while let Some(arg) = args.next() {
        let mut value_of = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--config" => options.config = Some(value_of("--config")?),
            "--csv" => options.csv = Some(value_of("--csv")?),
            "--plot" => options.plot = Some(value_of("--plot")?),
            "--log-file" => options.log_file = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ if options.input.is_some() => return Err(format!("unexpected argument {}", arg)),
            _ => options.input = Some(PathBuf::from(&arg)),
        }
    }
    Ok(options)
}

fn read_input(input: &Option<PathBuf>) -> std::io::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

/// single request: the trace may be exported even when the run failed
fn run_single(
    request: CalcRequest,
    config: &SolverConfig,
    options: &CliOptions,
) -> (u16, Value) {
    let result = solve_request(&request, config).and_then(|(outcome, payload)| {
        if let Some(path) = &options.csv {
            if let Err(e) = save_steps_to_csv(&payload.steps, path) {
                error!("failed to write {}: {}", path.display(), e);
            }
        }
        if let Some(path) = &options.plot {
            let caption = format!("f(x) = {}", request.function.trim());
            if let Err(e) = plot_newton(&payload.plot_data, &caption, path) {
                error!("failed to plot {}: {}", path.display(), e);
            }
        }
        into_result(&outcome, payload)
    });
    respond(result)
}

fn run(options: &CliOptions) -> Result<bool, Box<dyn Error>> {
    let config = match &options.config {
        Some(path) => SolverConfig::from_task_file(path)?,
        None => SolverConfig::default(),
    };
    if let Err(e) = init_logger(config.loglevel.as_deref(), options.log_file) {
        eprintln!("logging disabled: {}", e);
    }
    info!("Program started");
    let body = read_input(&options.input)?;
    let (all_ok, response) = match serde_json::from_str::<Value>(&body)? {
        Value::Array(items) => {
            if options.csv.is_some() || options.plot.is_some() {
                warn!("--csv and --plot are ignored for a batch of requests");
            }
            let requests = items
                .into_iter()
                .map(serde_json::from_value::<CalcRequest>)
                .collect::<Result<Vec<_>, _>>()?;
            let responses: Vec<(u16, Value)> = calculate_batch(&requests, &config)
                .into_iter()
                .map(respond)
                .collect();
            let all_ok = responses.iter().all(|(status, _)| *status == 200);
            (
                all_ok,
                Value::Array(responses.into_iter().map(|(_, body)| body).collect()),
            )
        }
        single => {
            let request = serde_json::from_value::<CalcRequest>(single)?;
            let (status, body) = run_single(request, &config, options);
            (status == 200, body)
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    info!("Program ended");
    Ok(all_ok)
}

fn main() -> ExitCode {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };
    match run(&options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
