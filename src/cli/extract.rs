use crate::storage::{csv, json};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Converts one series document to CSV. Without an explicit output the CSV
/// lands next to the input, with a `.csv` extension.
pub fn run(input: &Path, output: Option<&Path>, currency: &str) -> Result<PathBuf> {
    let series = json::read_series(input, currency)?;
    let output = output.map_or_else(|| input.with_extension("csv"), Path::to_path_buf);

    csv::write_series_file(&output, &series)?;
    info!(
        "Extracted {} points of {} to {}",
        series.len(),
        series.name(),
        output.display()
    );
    Ok(output)
}
