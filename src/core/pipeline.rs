//! The end-to-end data flow, from provider history to a comparison table.
//!
//! Everything here is synchronous and pure; fetching and file handling live in
//! the providers, storage and cli modules.
use crate::core::adapter::to_daily_series;
use crate::core::analytics::PerformanceTable;
use crate::core::calendar::normalize;
use crate::core::currency::convert;
use crate::core::error::SeriesError;
use crate::core::price::PriceHistory;
use crate::core::series::{DateWindow, ForexPair, Series};
use crate::core::window::{
    ValueConvention, common_window, select_and_rebase, to_percentage, trailing_months,
};
use tracing::{debug, info, warn};

/// Adapter, normalizer and validator for one fetched history.
pub fn prepare_series(name: &str, history: &PriceHistory) -> Result<Series, SeriesError> {
    let daily = to_daily_series(name, &history.currency, &history.observations)?;
    let normalized = normalize(&daily);
    normalized.validate()?;
    debug!(
        "{name}: {} observations -> {} days ({})",
        history.observations.len(),
        normalized.len(),
        normalized.date_range()
    );
    Ok(normalized)
}

/// Builds a forex pair from the fetched history of its rate symbol.
pub fn prepare_forex_pair(
    base_currency: &str,
    quote_currency: &str,
    history: &PriceHistory,
) -> Result<ForexPair, SeriesError> {
    let rates = prepare_series(&history.symbol, history)?;
    Ok(ForexPair::new(base_currency, quote_currency, rates))
}

/// Converts a prepared instrument into `target_currency` and expresses it as
/// percentage performance since its first day.
///
/// When a conversion is needed the instrument is first cut down to the days
/// for which rates exist.
pub fn performance_in(
    series: &Series,
    target_currency: &str,
    pairs: &[ForexPair],
) -> Result<Series, SeriesError> {
    let overlapping = match pairs
        .iter()
        .find(|p| p.converts(series.currency(), target_currency))
    {
        Some(pair) => {
            let overlap = series
                .date_range()
                .intersect(&pair.rates.date_range())
                .map_err(|_| SeriesError::DateRangeMismatch {
                    series: series.name().to_string(),
                    expected_first: series.first_date(),
                    expected_last: series.last_date(),
                    first: pair.rates.first_date(),
                    last: pair.rates.last_date(),
                })?;
            if overlap != series.date_range() {
                debug!(
                    "{}: limited to {overlap} where {} rates exist",
                    series.name(),
                    pair.rates.name()
                );
            }
            series.clip(&overlap)?
        }
        None => series.clone(),
    };
    let converted = convert(&overlapping, target_currency, pairs)?;
    to_percentage(&converted)
}

/// The result of lining up a set of series on a common window.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub window: DateWindow,
    pub dropped: Vec<String>,
    pub table: PerformanceTable,
}

/// Intersects the date ranges of `series`, optionally narrows the window to
/// the trailing `months`, and rebases every series onto it.
///
/// With a trailing window, series that start after the window start are
/// dropped rather than failing the whole comparison.
pub fn compare(
    series: Vec<Series>,
    months: Option<u32>,
    convention: ValueConvention,
) -> Result<Comparison, SeriesError> {
    if series.len() < 2 {
        return Err(SeriesError::InsufficientSeries {
            found: series.len(),
        });
    }
    for s in &series {
        s.validate()?;
    }

    let mut window = common_window(&series)?;
    let mut dropped = Vec::new();
    let mut kept = series;

    if let Some(months) = months {
        window = trailing_months(window.stop(), months)?;
        let (inside, outside): (Vec<Series>, Vec<Series>) = kept
            .into_iter()
            .partition(|s| s.first_date() <= window.start());
        for s in &outside {
            warn!(
                "Dropping series {} - starts at {}, but minimum date is {}",
                s.name(),
                s.first_date(),
                window.start()
            );
        }
        dropped = outside.into_iter().map(|s| s.name().to_string()).collect();
        kept = inside;
        if kept.len() < 2 {
            return Err(SeriesError::InsufficientSeries { found: kept.len() });
        }
    }

    info!(
        "Comparing {} series from {} to {} ({} days)",
        kept.len(),
        window.start(),
        window.stop(),
        window.days()
    );

    let rebased = kept
        .iter()
        .map(|s| select_and_rebase(s, &window, convention))
        .collect::<Result<Vec<_>, _>>()?;
    let table = PerformanceTable::new(rebased)?;

    Ok(Comparison {
        window,
        dropped,
        table,
    })
}
