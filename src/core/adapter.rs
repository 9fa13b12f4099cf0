//! Turns raw timestamped provider observations into one point per UTC day.
use crate::core::error::SeriesError;
use crate::core::price::RawObservation;
use crate::core::series::{DailyPoint, Series, add_days};
use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Maps an instant onto the UTC calendar day it belongs to.
///
/// The instant is taken at second resolution in UTC. Anything strictly after
/// 12:00:00 belongs to the following day, so a local trading-day close that
/// is stamped late in the evening west of Greenwich, or early morning east of
/// it, still lands on a single day.
pub fn utc_trading_day<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    let utc = timestamp.with_timezone(&Utc).trunc_subsecs(0);
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    if utc.time() > noon {
        add_days(utc.date_naive(), 1)
    } else {
        utc.date_naive()
    }
}

/// Builds a series with at most one point per UTC calendar day.
///
/// When several observations fall on the same day, the one seen last wins.
/// The result is ordered but not necessarily contiguous; run it through the
/// calendar normalizer before validating.
pub fn to_daily_series(
    name: &str,
    currency: &str,
    observations: &[RawObservation],
) -> Result<Series, SeriesError> {
    if observations.is_empty() {
        return Err(SeriesError::malformed(name, "raw series is empty"));
    }

    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in observations {
        days.insert(utc_trading_day(&obs.timestamp), obs.close);
    }

    let collapsed = observations.len() - days.len();
    if collapsed > 0 {
        debug!("{name}: {collapsed} observations collapsed onto an already seen day");
    }

    let points = days
        .into_iter()
        .map(|(date, value)| DailyPoint::new(date, value))
        .collect();
    Series::new(name, currency, points)
}
