//! PNG rendering through plotters' bitmap backend.

use crate::chart::{charts, ChartKind, ChartSpec};
use crate::palette::bar_palette;
use anyhow::{anyhow, Context, Result};
use llmperf_report::AggregatedMetrics;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PLOTS_DIR: &str = "plots";

const SIZE: (u32, u32) = (1024, 768);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

fn draw_err(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("drawing failed: {}", err)
}

/// Category index back to its batch size label.
fn category_label(points: &[(u64, f64)], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    points
        .get(index as usize)
        .map(|(batch_size, _)| batch_size.to_string())
        .unwrap_or_default()
}

pub fn render(spec: &ChartSpec, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let categories = spec.points.len().max(1);
    let formatter = |x: &f64| category_label(&spec.points, *x);

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.heading, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..categories as f64 - 0.5, 0f64..spec.y_max())
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories)
        .x_label_formatter(&formatter)
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .draw()
        .map_err(draw_err)?;

    match spec.kind {
        ChartKind::Bar => {
            let colors = bar_palette(spec.points.len());
            chart
                .draw_series(spec.points.iter().zip(colors).enumerate().map(
                    |(i, (&(_, value), (r, g, b)))| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], RGBColor(r, g, b).filled())
                    },
                ))
                .map_err(draw_err)?;
        }
        ChartKind::Line => {
            let coords: Vec<(f64, f64)> = spec
                .points
                .iter()
                .enumerate()
                .map(|(i, &(_, value))| (i as f64, value))
                .collect();
            chart
                .draw_series(LineSeries::new(coords.clone(), LINE_COLOR.stroke_width(2)))
                .map_err(draw_err)?;
            chart
                .draw_series(coords.into_iter().map(|c| Circle::new(c, 5, LINE_COLOR.filled())))
                .map_err(draw_err)?;
        }
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Render every chart into `out_dir`, continuing past individual failures.
/// Returns the paths that were written.
pub fn render_all(metrics: &AggregatedMetrics, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create plots directory {}", out_dir.display()))?;

    let mut written = Vec::new();
    for spec in charts(metrics) {
        let path = out_dir.join(spec.file_name());
        match render(&spec, &path) {
            Ok(()) => {
                info!(chart = spec.title, path = %path.display(), points = spec.points.len(), "chart written");
                written.push(path);
            }
            Err(err) => warn!(chart = spec.title, error = %err, "failed to render chart"),
        }
    }
    Ok(written)
}
