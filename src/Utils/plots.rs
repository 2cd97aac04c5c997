use crate::numerical::plot_sampler::PlotSample;
use log::info;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// `lo..hi` padded by 5% so that the curve does not touch the frame
pub(crate) fn padded(range: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = range;
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// Renders the sampled curve and the Newton estimates to a PNG file.
///
/// The curve is drawn as separate line segments split at the gaps of the sample.
pub fn plot_newton(
    sample: &PlotSample,
    caption: &str,
    filename: &Path,
) -> Result<(), Box<dyn Error>> {
    let (x_min, x_max) = sample.x_range().ok_or("nothing to plot: empty sample")?;
    let (y_min, y_max) = padded(sample.y_range().unwrap_or((-1.0, 1.0)));

    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(caption, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().x_desc("x").y_desc("f(x)").draw()?;

    // f(x) = 0
    chart.draw_series(LineSeries::new(vec![(x_min, 0.0), (x_max, 0.0)], &BLACK.mix(0.4)))?;

    for (i, segment) in sample.segments().into_iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(segment, &BLUE))?;
        if i == 0 {
            series
                .label("f(x)")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        }
    }

    let markers: Vec<(f64, f64)> = sample
        .iteration_points
        .iter()
        .copied()
        .zip(sample.iteration_y.iter().copied())
        .collect();
    chart
        .draw_series(markers.iter().map(|&(x, y)| Circle::new((x, y), 4, RED.filled())))?
        .label("x_n")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root_area.present()?;
    info!("plot saved to {}", filename.display());
    Ok(())
}
