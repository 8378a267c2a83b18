use plotters::element::Pie;
use plotters::prelude::*;
use std::path::Path;

use super::{render_err, CategoryShare, CHART_SIZE};
use crate::error::Result;

/// Pie with one slice per category, labelled `"<category> (<pct>%)"`.
pub(super) fn draw(path: &Path, shares: &[CategoryShare]) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let area = root
        .titled("Distribución por GRUPO", ("sans-serif", 28))
        .map_err(|e| render_err(path, e))?;

    if !shares.is_empty() {
        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;
        let sizes: Vec<f64> = shares.iter().map(|s| s.percent).collect();
        let labels: Vec<String> = shares.iter().map(slice_label).collect();
        let colors: Vec<RGBColor> = (0..shares.len())
            .map(|i| {
                let c = Palette99::pick(i).to_rgba();
                RGBColor(c.0, c.1, c.2)
            })
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
        area.draw(&pie).map_err(|e| render_err(path, e))?;
    }

    root.present().map_err(|e| render_err(path, e))?;
    Ok(())
}

fn slice_label(share: &CategoryShare) -> String {
    format!("{} ({:.1}%)", share.label, share.percent)
}
