//! Daily series value objects and the one-point-per-day validator.
use crate::core::error::SeriesError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A single observation at calendar-day resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DailyPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An inclusive range of calendar days, `start <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: NaiveDate,
    stop: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, stop: NaiveDate) -> Result<Self, SeriesError> {
        if start > stop {
            return Err(SeriesError::EmptyWindow { start, stop });
        }
        Ok(Self { start, stop })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn stop(&self) -> NaiveDate {
        self.stop
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> usize {
        (self.stop - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.stop
    }

    /// True when `other` lies entirely inside this window.
    pub fn covers(&self, other: &DateWindow) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }

    /// The overlap of two windows, failing when they are disjoint.
    pub fn intersect(&self, other: &DateWindow) -> Result<DateWindow, SeriesError> {
        DateWindow::new(self.start.max(other.start), self.stop.min(other.stop))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.days())
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.stop)
    }
}

/// A named, currency-denominated daily series ordered by ascending date.
///
/// Construction guarantees the series is non-empty and strictly increasing in
/// date. Contiguity (exactly one point per calendar day) is a separate check,
/// see [`Series::validate`], since raw provider data is sparse until it has
/// been through the calendar normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    currency: String,
    points: Vec<DailyPoint>,
}

impl Series {
    pub fn new(
        name: impl Into<String>,
        currency: impl Into<String>,
        points: Vec<DailyPoint>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        if points.is_empty() {
            return Err(SeriesError::malformed(&name, "series has no data points"));
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(SeriesError::malformed(
                &name,
                format!(
                    "dates not strictly increasing: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            ));
        }
        Ok(Self {
            name,
            currency: currency.into(),
            points,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> DailyPoint {
        self.points[0]
    }

    pub fn last(&self) -> DailyPoint {
        self.points[self.points.len() - 1]
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first().date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last().date
    }

    /// The `[first_date, last_date]` window spanned by this series.
    pub fn date_range(&self) -> DateWindow {
        DateWindow {
            start: self.first_date(),
            stop: self.last_date(),
        }
    }

    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Checks the one-point-per-calendar-day invariant.
    pub fn validate(&self) -> Result<(), SeriesError> {
        check_day_count(&self.name, &self.points)
    }

    /// Returns the points falling inside `window`, which must lie within the
    /// series' own date range.
    pub fn clip(&self, window: &DateWindow) -> Result<Series, SeriesError> {
        self.ensure_covers(window)?;
        let points: Vec<DailyPoint> = self
            .points
            .iter()
            .filter(|p| window.contains(p.date))
            .copied()
            .collect();
        Series::new(self.name.clone(), self.currency.clone(), points)
    }

    pub(crate) fn ensure_covers(&self, window: &DateWindow) -> Result<(), SeriesError> {
        if !self.date_range().covers(window) {
            return Err(SeriesError::WindowOutOfBounds {
                series: self.name.clone(),
                start: window.start(),
                stop: window.stop(),
                first: self.first_date(),
                last: self.last_date(),
            });
        }
        Ok(())
    }

    /// Builds a sibling series with the same dates and transformed values.
    pub(crate) fn map_values(&self, currency: &str, f: impl Fn(&DailyPoint) -> f64) -> Series {
        let points = self
            .points
            .iter()
            .map(|p| DailyPoint::new(p.date, f(p)))
            .collect();
        self.with_points(currency, points)
    }

    /// Sibling series over new points; callers keep them non-empty and ordered.
    pub(crate) fn with_points(&self, currency: &str, points: Vec<DailyPoint>) -> Series {
        debug_assert!(!points.is_empty());
        Series {
            name: self.name.clone(),
            currency: currency.to_string(),
            points,
        }
    }
}

/// Exchange-rate series converting `base_currency` into `quote_currency`.
///
/// Rates are quoted as units of the quote currency per unit of the base
/// currency, so a base-denominated price is converted by multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ForexPair {
    pub base_currency: String,
    pub quote_currency: String,
    pub rates: Series,
}

impl ForexPair {
    pub fn new(
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
        rates: Series,
    ) -> Self {
        Self {
            base_currency: base_currency.into(),
            quote_currency: quote_currency.into(),
            rates,
        }
    }

    pub fn converts(&self, from: &str, to: &str) -> bool {
        self.base_currency == from && self.quote_currency == to
    }
}

/// Compares the number of points with the calendar days spanned by the first
/// and last point. Runs on raw points too, so a repeated day is reported as a
/// count mismatch rather than an ordering error. Points whose last date is
/// before the first are left to [`Series::new`].
pub fn check_day_count(name: &str, points: &[DailyPoint]) -> Result<(), SeriesError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(());
    };
    if last.date < first.date {
        return Ok(());
    }
    let expected = DateWindow {
        start: first.date,
        stop: last.date,
    }
    .days();
    let actual = points.len();
    if expected != actual {
        return Err(SeriesError::DayCountMismatch {
            series: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}
