// src/chart/mod.rs
mod bar;
mod pie;

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::{EtlError, Result};

pub const BAR_FIELD: &str = "LINEA";
pub const PIE_FIELD: &str = "GRUPO";
pub const BAR_CHART_FILE: &str = "Distribucion_por_LINEA.png";
pub const PIE_CHART_FILE: &str = "Distribucion_por_GRUPO.png";

/// Category used for empty cells, so counts always add up to the row count.
pub const BLANK_CATEGORY: &str = "(blank)";

/// Image size in pixels.
const CHART_SIZE: (u32, u32) = (800, 600);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPaths {
    pub bar: PathBuf,
    pub pie: PathBuf,
}

/// Rows per distinct value of `field`, most frequent first; ties keep first-seen order.
pub fn value_counts(dataset: &Dataset, field: &'static str) -> Result<Vec<CategoryCount>> {
    let cells = dataset
        .column(field)
        .ok_or(EtlError::MissingChartField(field))?;

    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for cell in cells {
        let label = cell
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| BLANK_CATEGORY.to_string());
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push(CategoryCount { label, count: 1 });
            }
        }
    }
    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(counts)
}

/// Share of the total per category, in percent.
pub fn proportions(counts: &[CategoryCount]) -> Vec<CategoryShare> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|c| CategoryShare {
            label: c.label.clone(),
            percent: c.count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// Draw the LINEA bar chart and the GRUPO pie chart into `output_dir`,
/// replacing earlier images. Both fields are checked before anything is drawn.
#[instrument(level = "info", skip_all, fields(dir = %output_dir.display()))]
pub fn render_charts(dataset: &Dataset, output_dir: &Path) -> Result<ChartPaths> {
    let bar_counts = value_counts(dataset, BAR_FIELD)?;
    let pie_shares = proportions(&value_counts(dataset, PIE_FIELD)?);

    let paths = ChartPaths {
        bar: output_dir.join(BAR_CHART_FILE),
        pie: output_dir.join(PIE_CHART_FILE),
    };
    bar::draw(&paths.bar, &bar_counts)?;
    pie::draw(&paths.pie, &pie_shares)?;

    info!(
        bar = %paths.bar.display(),
        pie = %paths.pie.display(),
        "charts written"
    );
    Ok(paths)
}

fn render_err(path: &Path, e: impl std::fmt::Display) -> EtlError {
    EtlError::ChartRender {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
