use crate::numerical::NR::Step;
use chrono::Local;
use csv::Writer;
use log::info;
use simplelog::*;
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// "debug" | "info" | "warn" | "error" | "off" | "none"; anything else is info
pub fn level_filter(loglevel: Option<&str>) -> LevelFilter {
    match loglevel {
        Some("debug") => LevelFilter::Debug,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        Some("off") | Some("none") => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Terminal logger on stderr, plus a `log_<date>.txt` file logger when `log_to_file`.
/// Returns the name of the log file.
pub fn init_logger(
    loglevel: Option<&str>,
    log_to_file: bool,
) -> Result<Option<String>, Box<dyn Error>> {
    let log_option = level_filter(loglevel);
    if log_option == LevelFilter::Off {
        return Ok(None);
    }
    // stdout is reserved for the response JSON
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    let mut file_name = None;
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(
            log_option,
            Config::default(),
            File::create(&name)?,
        ));
        file_name = Some(name);
    }
    CombinedLogger::init(loggers)?;
    Ok(file_name)
}

pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_millis();
    if time < 1000 {
        info!("Elapsed {} ms", time);
        (" ms ".to_string(), time as f64)
    } else if time < 60_000 {
        info!("Elapsed {} s", elapsed.as_secs());
        (" s".to_string(), elapsed.as_secs() as f64)
    } else {
        info!("Elapsed {} min", elapsed.as_secs() / 60);
        (" min".to_string(), elapsed.as_secs() as f64 / 60.0)
    }
}

/// Writes the step trace with header `iteration,x_n,f_x,df_x,next_x,error`.
pub fn save_steps_to_csv(steps: &[Step], filename: &Path) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(filename)?;
    if steps.is_empty() {
        // serialize() writes the header with the first record only
        writer.write_record(["iteration", "x_n", "f_x", "df_x", "next_x", "error"])?;
    }
    for step in steps {
        writer.serialize(step)?;
    }
    writer.flush()?;
    info!("step trace saved to {}", filename.display());
    Ok(())
}
