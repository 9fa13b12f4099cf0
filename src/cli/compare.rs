use super::ui;
use crate::config::AppConfig;
use crate::core::ValueConvention;
use crate::core::analytics::{CorrelationBasis, CorrelationMatrix, LinearTrend, PerformanceTable};
use crate::core::pipeline::{Comparison, compare};
use crate::core::series::DateWindow;
use crate::storage::{csv, json};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub input_dir: Option<PathBuf>,
    pub months: Option<u32>,
    pub span: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

/// Everything `compare` prints or writes, computed once.
pub struct ComparisonReport {
    pub window: DateWindow,
    pub dropped: Vec<String>,
    pub performance: PerformanceTable,
    pub filtered_performance: PerformanceTable,
    pub filtered_pct_change: PerformanceTable,
    pub correlation_filtered: CorrelationMatrix,
    pub correlation_raw: CorrelationMatrix,
    pub trends: Vec<(String, LinearTrend)>,
}

impl ComparisonReport {
    pub fn new(comparison: Comparison, span: usize) -> Self {
        let Comparison {
            window,
            dropped,
            table,
        } = comparison;
        let filtered_performance = table.smoothed(span);
        let filtered_pct_change = filtered_performance.absolute().pct_change();

        ComparisonReport {
            window,
            dropped,
            filtered_pct_change,
            correlation_filtered: table.correlate(CorrelationBasis::PctChange, Some(span)),
            correlation_raw: table.correlate(CorrelationBasis::PctChange, None),
            trends: table.trends(),
            filtered_performance,
            performance: table,
        }
    }

    /// Final raw and smoothed performance per series, in table order.
    fn finals(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.performance
            .names()
            .iter()
            .zip(self.performance.columns())
            .zip(self.filtered_performance.columns())
            .map(|((name, raw), smooth)| {
                (
                    name.as_str(),
                    raw.last().copied().unwrap_or(f64::NAN),
                    smooth.last().copied().unwrap_or(f64::NAN),
                )
            })
    }

    pub fn write_csv(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        csv::write_table(csv::create(&dir.join("performance.csv"))?, &self.performance)?;
        csv::write_table(
            csv::create(&dir.join("filtered_performance.csv"))?,
            &self.filtered_performance,
        )?;
        csv::write_table(
            csv::create(&dir.join("filtered_pct_change.csv"))?,
            &self.filtered_pct_change,
        )?;
        csv::write_correlation(
            csv::create(&dir.join("correlation_filtered.csv"))?,
            &self.correlation_filtered,
        )?;
        csv::write_correlation(
            csv::create(&dir.join("correlation_raw.csv"))?,
            &self.correlation_raw,
        )?;
        csv::write_trends(csv::create(&dir.join("trends.csv"))?, &self.trends)?;

        info!("Wrote comparison CSV files to {}", dir.display());
        Ok(())
    }
}

pub fn run(config: &AppConfig, options: &CompareOptions) -> Result<()> {
    let input_dir = match &options.input_dir {
        Some(dir) => dir.clone(),
        None => config.default_data_path()?,
    };
    let months = options.months.or(config.analysis.months);
    let span = options.span.unwrap_or(config.analysis.span);
    debug!(
        "Comparing series in {} (months: {months:?}, span: {span})",
        input_dir.display()
    );

    let series = json::read_series_dir(&input_dir, &config.currency)?;
    let comparison = compare(series, months, ValueConvention::Percent)?;
    let report = ComparisonReport::new(comparison, span);

    display_report(&report, &config.currency, span);

    if let Some(output_dir) = &options.output_dir {
        report.write_csv(output_dir)?;
    }
    Ok(())
}

fn display_report(report: &ComparisonReport, currency: &str, span: usize) {
    println!(
        "\n{} {} ({} days, {currency})",
        ui::style_text("Window:", ui::StyleType::Title),
        report.window,
        report.window.days()
    );
    if !report.dropped.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("Dropped (too short): {}", report.dropped.join(", ")),
                ui::StyleType::Warning
            )
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Series"),
        ui::header_cell("Performance"),
        ui::header_cell(&format!("Smoothed ({span}d)")),
        ui::header_cell("Trend %/day"),
        ui::header_cell("Intercept"),
    ]);
    for ((name, raw, smooth), (_, trend)) in report.finals().zip(&report.trends) {
        table.add_row(vec![
            ui::name_cell(name),
            ui::change_cell(raw),
            ui::change_cell(smooth),
            ui::number_cell(trend.slope, 4),
            ui::number_cell(trend.intercept, 2),
        ]);
    }
    println!("{table}");

    println!(
        "\n{}",
        ui::style_text(
            &format!("Correlation of daily change, smoothed ({span}d)"),
            ui::StyleType::Title
        )
    );
    println!("{}", correlation_table(&report.correlation_filtered));

    println!(
        "\n{}",
        ui::style_text("Correlation of daily change, raw", ui::StyleType::Title)
    );
    println!("{}", correlation_table(&report.correlation_raw));
    println!(
        "{}",
        ui::style_text("Only the lower triangle is shown.", ui::StyleType::Subtle)
    );
}

/// The strict lower triangle of a correlation matrix; the diagonal is
/// always 1 and the upper half mirrors the lower.
fn correlation_table(matrix: &CorrelationMatrix) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    let mut header = vec![Cell::new("")];
    header.extend(
        matrix.names[..matrix.names.len().saturating_sub(1)]
            .iter()
            .map(|n| ui::header_cell(n)),
    );
    table.set_header(header);

    for (i, name) in matrix.names.iter().enumerate().skip(1) {
        let mut row = vec![ui::name_cell(name)];
        for j in 0..matrix.names.len() - 1 {
            if j < i {
                row.push(ui::correlation_cell(matrix.values[i][j]));
            } else {
                row.push(ui::empty_cell());
            }
        }
        table.add_row(row);
    }
    table
}
