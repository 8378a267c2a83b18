use plotters::prelude::*;
use std::path::Path;

use super::{render_err, CategoryCount, CHART_SIZE};
use crate::error::Result;

/// Vertical bar per category, in the given order.
pub(super) fn draw(path: &Path, counts: &[CategoryCount]) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;

    let n = counts.len().max(1);
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as u32;
    let y_top = max + max / 10 + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribución por LÍNEA", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0usize..n).into_segmented(), 0u32..y_top)
        .map_err(|e| render_err(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => counts.get(*i).map(|c| c.label.clone()).unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("LÍNEA")
        .y_desc("Frecuencia")
        .draw()
        .map_err(|e| render_err(path, e))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(8)
                .data(counts.iter().enumerate().map(|(i, c)| (i, c.count as u32))),
        )
        .map_err(|e| render_err(path, e))?;

    root.present().map_err(|e| render_err(path, e))?;
    Ok(())
}
