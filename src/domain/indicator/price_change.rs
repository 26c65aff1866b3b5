//! Percentage price change over fixed look-back periods.
//!
//! For each period, walk backward from the latest point to the first entry
//! whose timestamp is at or before `latest - period`, and report
//! `(latest - then) / then * 100`. `None` when the series is not that old.

use crate::domain::series::PriceSeries;
use chrono::Duration;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceChanges {
    #[serde(rename = "1h")]
    pub hour_1: Option<f64>,
    #[serde(rename = "24h")]
    pub hour_24: Option<f64>,
    #[serde(rename = "7d")]
    pub day_7: Option<f64>,
    #[serde(rename = "30d")]
    pub day_30: Option<f64>,
}

pub fn price_change_over(series: &PriceSeries, period: Duration) -> Option<f64> {
    let latest = series.latest();
    let target = latest.timestamp - period;
    series
        .points()
        .iter()
        .rev()
        .find(|p| p.timestamp <= target)
        .map(|then| (latest.price - then.price) / then.price * 100.0)
}

pub fn calculate_price_changes(series: &PriceSeries) -> PriceChanges {
    PriceChanges {
        hour_1: price_change_over(series, Duration::hours(1)),
        hour_24: price_change_over(series, Duration::hours(24)),
        day_7: price_change_over(series, Duration::days(7)),
        day_30: price_change_over(series, Duration::days(30)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PricePoint;
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, Utc};

    fn hourly(prices: &[f64]) -> PriceSeries {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    timestamp: start + Duration::hours(i as i64),
                    price,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn one_hour_change() {
        let series = hourly(&[100.0, 110.0]);
        let changes = calculate_price_changes(&series);
        assert_abs_diff_eq!(changes.hour_1.unwrap(), 10.0, epsilon = 1e-9);
        assert_eq!(changes.hour_24, None);
        assert_eq!(changes.day_7, None);
        assert_eq!(changes.day_30, None);
    }

    #[test]
    fn uses_latest_entry_at_or_before_target() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = hourly(&prices);
        // Latest is index 29; 24h back is exactly index 5.
        let expected = (129.0 - 105.0) / 105.0 * 100.0;
        let changes = calculate_price_changes(&series);
        assert_abs_diff_eq!(changes.hour_24.unwrap(), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(changes.hour_1.unwrap(), (129.0 - 128.0) / 128.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_has_no_changes() {
        let changes = calculate_price_changes(&hourly(&[100.0]));
        assert_eq!(changes, PriceChanges::default());
    }
}
