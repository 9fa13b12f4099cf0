//! Resamples a series onto a gap-free daily calendar.
use crate::core::series::{DailyPoint, Series};
use tracing::debug;

/// Fills every missing calendar day between the first and last point with the
/// most recent preceding value.
///
/// Weekends and exchange holidays are carried forward rather than dropped so
/// that series from different exchanges share a rectangular date grid.
pub fn normalize(series: &Series) -> Series {
    let range = series.date_range();
    let mut points = Vec::with_capacity(range.days());
    let mut source = series.points().iter().peekable();
    let mut carried = series.first().value;

    for date in range.dates() {
        if let Some(p) = source.next_if(|p| p.date == date) {
            carried = p.value;
        }
        points.push(DailyPoint::new(date, carried));
    }

    let filled = points.len() - series.len();
    if filled > 0 {
        debug!("{}: forward-filled {filled} missing days", series.name());
    }

    series.with_points(series.currency(), points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::tests::{daily, date};
    use proptest::prelude::*;

    #[test]
    fn test_forward_fill_single_gap() {
        let raw = Series::new(
            "s",
            "EUR",
            vec![
                DailyPoint::new(date("2024-01-01"), 10.0),
                DailyPoint::new(date("2024-01-03"), 20.0),
            ],
        )
        .unwrap();

        let normalized = normalize(&raw);
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.value_at(date("2024-01-02")), Some(10.0));
        assert_eq!(normalized.value_at(date("2024-01-03")), Some(20.0));
        assert!(normalized.validate().is_ok());
    }

    #[test]
    fn test_weekend_carries_friday_close() {
        // Fri 2024-01-05, Mon 2024-01-08
        let raw = Series::new(
            "SPY",
            "USD",
            vec![
                DailyPoint::new(date("2024-01-05"), 470.0),
                DailyPoint::new(date("2024-01-08"), 475.0),
            ],
        )
        .unwrap();

        let normalized = normalize(&raw);
        let values: Vec<f64> = normalized.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![470.0, 470.0, 470.0, 475.0]);
        assert_eq!(normalized.currency(), "USD");
        assert_eq!(normalized.name(), "SPY");
    }

    #[test]
    fn test_contiguous_input_is_unchanged() {
        let series = daily("s", "2024-01-01", &[1.0, 2.0, 3.0]);
        assert_eq!(normalize(&series), series);
    }

    proptest! {
        #[test]
        fn normalized_series_is_contiguous(
            gaps in prop::collection::vec((1u64..6, -50.0f64..50.0), 1..60)
        ) {
            let mut day = date("2020-01-01");
            let mut points = Vec::new();
            for (gap, value) in gaps {
                points.push(DailyPoint::new(day, value));
                day = crate::core::series::add_days(day, gap);
            }
            let raw = Series::new("p", "EUR", points).unwrap();
            let normalized = normalize(&raw);

            prop_assert!(normalized.validate().is_ok());
            let first = normalized.first_date();
            for (i, p) in normalized.points().iter().enumerate() {
                prop_assert_eq!(p.date, crate::core::series::add_days(first, i as u64));
            }
            for p in raw.points() {
                prop_assert_eq!(normalized.value_at(p.date), Some(p.value));
            }
        }

        #[test]
        fn validator_accepts_only_contiguous_series(
            len in 3usize..40,
            drop_at in 1usize..39,
        ) {
            let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
            let full = daily("v", "2021-06-01", &values);
            prop_assert!(full.validate().is_ok());

            let drop_at = 1 + drop_at % (len - 2);
            let mut points = full.points().to_vec();
            points.remove(drop_at);
            let gappy = Series::new("v", "EUR", points).unwrap();
            prop_assert_eq!(
                gappy.validate(),
                Err(crate::core::error::SeriesError::DayCountMismatch {
                    series: "v".to_string(),
                    expected: len,
                    actual: len - 1,
                })
            );
        }
    }
}
