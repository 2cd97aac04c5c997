///  Example#1
/// ```
///  use RustedNewton::numerical::NR::NR;
///  use RustedNewton::numerical::config::SolverConfig;
///  use RustedNewton::numerical::plot_sampler::PlotSample;
///  use RustedNewton::symbolic::symbolic_engine::Expr;
///  let f = Expr::parse_expression("x^2 - 2").unwrap();
///  let config = SolverConfig::default();
///  let outcome = NR::new(&f, 1.0).with_config(&config).solve();
///  println!("result = {:?} \n", outcome.solution());
///  // curve around every visited estimate
///  let plot = PlotSample::new(&f, &outcome.estimates(1.0), &config);
///  assert_eq!(plot.x_vals.len(), config.plot_samples);
///  ```
pub mod NR;
/// solver and plot settings with defaults and task-file overrides
pub mod config;
/// sampling of the curve with gaps where the function is undefined
pub mod plot_sampler;
