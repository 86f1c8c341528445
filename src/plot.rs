use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

use crate::types::AnnotationResult;

/// Constant y value shared by every point of the position scatter
pub const SCATTER_Y: f64 = 1.0;

pub fn scatter_points(results: &[AnnotationResult]) -> Vec<(u64, f64)> {
    results.iter().map(|r| (r.position, SCATTER_Y)).collect()
}

/// X axis range covering every position, widened so a single position
/// still spans a visible interval
pub fn position_range(results: &[AnnotationResult]) -> Range<u64> {
    let min = results.iter().map(|r| r.position).min().unwrap_or(0);
    let max = results.iter().map(|r| r.position).max().unwrap_or(0);
    let pad = ((max - min) / 20).max(1);
    min.saturating_sub(pad)..max.saturating_add(pad)
}

/// Render positions against a constant placeholder value as SVG
pub fn write_scatter(results: &[AnnotationResult], path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1024, 320)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("Failed to draw plot background: {}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Variant positions", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(30)
        .build_cartesian_2d(position_range(results), 0f64..2f64)
        .map_err(|e| anyhow!("Failed to build plot axes: {}", e))?;

    chart
        .configure_mesh()
        .x_desc("Position")
        .y_labels(3)
        .disable_y_mesh()
        .draw()
        .map_err(|e| anyhow!("Failed to draw plot mesh: {}", e))?;

    chart
        .draw_series(
            scatter_points(results)
                .into_iter()
                .map(|point| Circle::new(point, 4, BLUE.mix(0.7).filled())),
        )
        .map_err(|e| anyhow!("Failed to draw variant points: {}", e))?;

    root.present()
        .map_err(|e| anyhow!("Failed to write plot {}: {}", path.display(), e))?;
    Ok(())
}
