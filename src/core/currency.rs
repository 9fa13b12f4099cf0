//! Currency conversion of whole daily series through a single forex hop.
use crate::core::error::SeriesError;
use crate::core::series::{DailyPoint, ForexPair, Series};
use tracing::debug;

/// Converts `series` into `target_currency` using the one pair among
/// `available_pairs` whose base is the series currency and whose quote is the
/// target.
///
/// Each value is multiplied by the rate of the same day. The rates must exist
/// for every day of the series; the result keeps the series' dates.
pub fn convert(
    series: &Series,
    target_currency: &str,
    available_pairs: &[ForexPair],
) -> Result<Series, SeriesError> {
    let from = series.currency();
    if from == target_currency {
        debug!(
            "No currency conversion needed for {} ({from} -> {target_currency})",
            series.name()
        );
        return Ok(series.clone());
    }

    let pair = find_pair(series, target_currency, available_pairs)?;
    debug!(
        "Converting {} from {from} to {target_currency} using {}",
        series.name(),
        pair.rates.name()
    );

    let rates = &pair.rates;
    let mut points = Vec::with_capacity(series.len());
    for point in series.points() {
        let rate = rates
            .value_at(point.date)
            .ok_or_else(|| SeriesError::DateRangeMismatch {
                series: series.name().to_string(),
                expected_first: series.first_date(),
                expected_last: series.last_date(),
                first: rates.first_date(),
                last: rates.last_date(),
            })?;
        points.push(DailyPoint::new(point.date, point.value * rate));
    }

    Ok(series.with_points(target_currency, points))
}

fn find_pair<'a>(
    series: &Series,
    target_currency: &str,
    available_pairs: &'a [ForexPair],
) -> Result<&'a ForexPair, SeriesError> {
    let no_path = || SeriesError::NoConversionPath {
        series: series.name().to_string(),
        from: series.currency().to_string(),
        to: target_currency.to_string(),
    };

    let mut matches = available_pairs
        .iter()
        .filter(|p| p.converts(series.currency(), target_currency));
    let pair = matches.next().ok_or_else(no_path)?;
    if matches.any(|other| other.rates != pair.rates) {
        debug!(
            "Conflicting forex pairs for {} -> {target_currency}",
            series.currency()
        );
        return Err(no_path());
    }
    Ok(pair)
}
