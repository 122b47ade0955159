use crate::config::{Config, CPU_HDR, MB};
use crate::error::{Error, Result};
use crate::utils::{min_and_max, padded_range};
use crate::{UsageRow, UsageTable};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// A saved chart and the points drawn in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub path: PathBuf,
    pub points: Vec<(f64, f64)>,
}

/// Plot memory and cpu of every container to svg, two files per container.
pub fn plot_data(table: &UsageTable, results_path: &Path, config: &Config) -> Result<Vec<Chart>> {
    let poll_seconds = config.poll_seconds();
    let mut saved: Vec<Chart> = Vec::new();
    for name in table.container_names() {
        let rows: Vec<&UsageRow> = table.container_rows(name).collect();

        let memory = sample_series(&rows, poll_seconds, |r| r.mem_usage_mb);
        let save_path = results_path.join(format!("{}_memory.svg", name));
        plot_series(&memory, &save_path, &format!("Memory consumption for {}", name), MB)?;
        info!("Saved memory consumption for {} to {}", name, save_path.display());
        saved.push(Chart {
            path: save_path,
            points: memory,
        });

        let cpu = sample_series(&rows, poll_seconds, |r| r.cpu_percent);
        let save_path = results_path.join(format!("{}_cpu.svg", name));
        plot_series(&cpu, &save_path, &format!("CPU Utilization for {}", name), CPU_HDR)?;
        info!("Saved CPU utilization for {} to {}", name, save_path.display());
        saved.push(Chart {
            path: save_path,
            points: cpu,
        });
    }
    Ok(saved)
}

/// The points of one container series; x is the sample position times the poll interval.
pub fn sample_series<F>(rows: &[&UsageRow], poll_seconds: f64, value: F) -> Vec<(f64, f64)>
where
    F: Fn(&UsageRow) -> f64,
{
    rows.iter()
        .enumerate()
        .map(|(i, r)| (i as f64 * poll_seconds, value(r)))
        .collect()
}

/// Plot one series to svg.
pub fn plot_series(points: &[(f64, f64)], fout: &Path, title: &str, y_desc: &str) -> Result<()> {
    draw_series(points, fout, title, y_desc).map_err(|e| Error::Plot {
        path: fout.to_path_buf(),
        msg: e.to_string(),
    })
}

fn draw_series(
    points: &[(f64, f64)],
    fout: &Path,
    title: &str,
    y_desc: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).filter(|y| !y.is_nan()).collect();
    let (xmin, xmax) = min_and_max(xs.iter()).unwrap_or((0., 0.));
    let (ymin, ymax) = min_and_max(ys.iter()).unwrap_or((0., 0.));
    let xrange = if xmax > xmin { xmin..xmax } else { padded_range(xmin, xmax) };
    let yrange = padded_range(ymin, ymax);

    let root = SVGBackend::new(fout, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(50)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(xrange, yrange)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(100, 100, 100).mix(0.5).stroke_width(2))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 20))
        .x_desc("Seconds")
        .y_desc(y_desc)
        .x_labels(16)
        .y_labels(20)
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;
    chart.draw_series(LineSeries::new(points.iter().copied(), RED.stroke_width(2)))?;
    root.present()?;
    Ok(())
}
