//! Cross-series statistics over a set of rebased series.
//!
//! All series in a [`PerformanceTable`] share one [`DateWindow`], so the table
//! is rectangular: one row per day, one column per series.
use crate::core::error::SeriesError;
use crate::core::series::DateWindow;
use crate::core::window::RebasedSeries;
use chrono::NaiveDate;
use tracing::debug;

/// Default smoothing span, in days.
pub const DEFAULT_SPAN: usize = 14;

/// What a correlation is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationBasis {
    /// The performance values themselves.
    Values,
    /// Day-over-day relative change of the absolute values (`100 + value`).
    PctChange,
}

/// Least-squares line `value = slope * day + intercept` over a 0-based day index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn value_at(&self, day: usize) -> f64 {
        self.slope * day as f64 + self.intercept
    }
}

/// Symmetric matrix of Pearson coefficients, indexed in table column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceTable {
    window: DateWindow,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PerformanceTable {
    /// Collects equally long series over one shared window.
    pub fn new(series: Vec<RebasedSeries>) -> Result<Self, SeriesError> {
        if series.len() < 2 {
            return Err(SeriesError::InsufficientSeries {
                found: series.len(),
            });
        }

        let window = series[0].window;
        if let Some(odd) = series
            .iter()
            .find(|s| s.window != window || s.len() != window.days())
        {
            return Err(SeriesError::DateRangeMismatch {
                series: odd.name.clone(),
                expected_first: window.start(),
                expected_last: window.stop(),
                first: odd.window.start(),
                last: odd.window.stop(),
            });
        }

        let (names, columns) = series.into_iter().map(|s| (s.name, s.values)).unzip();
        Ok(Self {
            window,
            names,
            columns,
        })
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[i])
    }

    pub fn rows(&self) -> usize {
        self.window.days()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.window.dates()
    }

    fn map_columns(&self, f: impl Fn(&[f64]) -> Vec<f64>) -> Self {
        Self {
            window: self.window,
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| f(c)).collect(),
        }
    }

    /// Exponential moving average of each column with `alpha = 2 / (span + 1)`.
    pub fn smoothed(&self, span: usize) -> Self {
        self.map_columns(|c| ema(c, span))
    }

    /// Maps percentage performance onto absolute values, 0% being 100.
    pub fn absolute(&self) -> Self {
        self.map_columns(|c| c.iter().map(|v| v + 100.0).collect())
    }

    /// Day-over-day relative change; the first row has no predecessor and is NaN.
    pub fn pct_change(&self) -> Self {
        self.map_columns(pct_change)
    }

    /// Pairwise Pearson correlation between all columns.
    pub fn correlation(&self) -> CorrelationMatrix {
        let n = self.columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&self.columns[i], &self.columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        CorrelationMatrix {
            names: self.names.clone(),
            values,
        }
    }

    /// Correlation over the chosen basis, optionally smoothing the
    /// performance values first.
    pub fn correlate(&self, basis: CorrelationBasis, span: Option<usize>) -> CorrelationMatrix {
        let source = match span {
            Some(span) => self.smoothed(span),
            None => self.clone(),
        };
        debug!("Correlating {} series over {basis:?}, span {span:?}", self.names.len());
        match basis {
            CorrelationBasis::Values => source.correlation(),
            CorrelationBasis::PctChange => source.absolute().pct_change().correlation(),
        }
    }

    pub fn trends(&self) -> Vec<(String, LinearTrend)> {
        self.names
            .iter()
            .cloned()
            .zip(self.columns.iter().map(|c| linear_trend(c)))
            .collect()
    }

    /// Each column minus its own fitted linear trend.
    pub fn detrended(&self) -> Self {
        self.map_columns(|c| {
            let trend = linear_trend(c);
            c.iter()
                .enumerate()
                .map(|(i, v)| v - trend.value_at(i))
                .collect()
        })
    }
}

/// Recursive exponential moving average, seeded with the first value.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        result.push(next);
        prev = Some(next);
    }
    result
}

pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    if !values.is_empty() {
        result.push(f64::NAN);
    }
    result.extend(values.windows(2).map(|w| w[1] / w[0] - 1.0));
    result
}

/// Pearson coefficient over the rows where both inputs are finite.
///
/// Returns NaN when fewer than two such rows exist or either side has no
/// variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Ordinary least-squares fit against the day index `0..values.len()`.
pub fn linear_trend(values: &[f64]) -> LinearTrend {
    let n = values.len();
    if n == 0 {
        return LinearTrend {
            slope: f64::NAN,
            intercept: f64::NAN,
        };
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    LinearTrend {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}
