//! Reading and writing series as `{"series": [{"date", "value": {"raw"}}]}`
//! documents.
use crate::core::series::{DailyPoint, Series, check_day_count};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct SeriesDocument {
    series: Vec<PointEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointEntry {
    date: NaiveDate,
    value: PointValue,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointValue {
    raw: f64,
}

/// The series name for a file: its file name up to the first `.`.
pub fn series_name(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid series file name: {}", path.display()))?;
    let name = file_name.split('.').next().unwrap_or(file_name);
    if name.is_empty() {
        bail!("Cannot derive a series name from {}", path.display());
    }
    Ok(name.to_string())
}

/// Parses a document into a validated, contiguous series.
pub fn parse_series(name: &str, currency: &str, contents: &str) -> Result<Series> {
    let document: SeriesDocument = serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse series document for {name}"))?;
    let points = document
        .series
        .into_iter()
        .map(|p| DailyPoint::new(p.date, p.value.raw))
        .collect::<Vec<_>>();
    check_day_count(name, &points)?;
    Ok(Series::new(name, currency, points)?)
}

pub fn read_series(path: &Path, currency: &str) -> Result<Series> {
    let name = series_name(path)?;
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read series file: {}", path.display()))?;
    let series = parse_series(&name, currency, &contents)?;
    debug!("Series \"{}\" loaded: {}", name, series.date_range());
    Ok(series)
}

/// Reads every `*.json` file in `dir`, in file name order.
pub fn read_series_dir(dir: &Path, currency: &str) -> Result<Vec<Series>> {
    if !dir.is_dir() {
        bail!("{} is not a directory!", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().map(|p| read_series(p, currency)).collect()
}

pub fn to_json(series: &Series) -> Result<String> {
    let document = SeriesDocument {
        series: series
            .points()
            .iter()
            .map(|p| PointEntry {
                date: p.date,
                value: PointValue { raw: p.value },
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn write_series(path: &Path, series: &Series) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, to_json(series)?)
        .with_context(|| format!("Failed to write series file: {}", path.display()))?;
    debug!("Wrote {} points to {}", series.len(), path.display());
    Ok(())
}
