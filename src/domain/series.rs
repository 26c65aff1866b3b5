//! Price and volume series, and the normalizer that builds them from raw
//! market-chart data.
//!
//! A [`PriceSeries`] is never empty and its timestamps never decrease, so the
//! indicator engine only has to check per-indicator minimum lengths.

use crate::domain::error::SmartTraderError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw upstream market chart: `(timestamp_ms, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketChart {
    pub prices: Vec<(i64, f64)>,
    pub total_volumes: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SmartTraderError> {
        if points.is_empty() {
            return Err(SmartTraderError::invalid_series("price series is empty"));
        }
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SmartTraderError::invalid_series(format!(
                    "price at index {} is not a positive number: {}",
                    i, point.price
                )));
            }
        }
        if let Some(i) = points
            .windows(2)
            .position(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(SmartTraderError::invalid_series(format!(
                "timestamps decrease at index {}",
                i + 1
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> PricePoint {
        // Non-empty by construction.
        self.points[self.points.len() - 1]
    }
}

/// Volumes parallel to a [`PriceSeries`]. Empty when the source had none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeSeries {
    values: Vec<f64>,
}

impl VolumeSeries {
    pub fn new(values: Vec<f64>) -> Result<Self, SmartTraderError> {
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SmartTraderError::invalid_series(format!(
                "volume at index {} is not a non-negative number: {}",
                i, v
            )));
        }
        Ok(Self { values })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn timestamp_from_millis(index: usize, ms: i64) -> Result<DateTime<Utc>, SmartTraderError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        SmartTraderError::invalid_series(format!("timestamp at index {} out of range: {}", index, ms))
    })
}

impl MarketChart {
    /// Validate and shape the chart into ordered price and volume sequences.
    pub fn normalize(&self) -> Result<(PriceSeries, VolumeSeries), SmartTraderError> {
        let points = self
            .prices
            .iter()
            .enumerate()
            .map(|(i, &(ms, price))| {
                Ok(PricePoint {
                    timestamp: timestamp_from_millis(i, ms)?,
                    price,
                })
            })
            .collect::<Result<Vec<_>, SmartTraderError>>()?;
        let prices = PriceSeries::new(points)?;

        if !self.total_volumes.is_empty() && self.total_volumes.len() != prices.len() {
            return Err(SmartTraderError::invalid_series(format!(
                "volume series has {} points, price series has {}",
                self.total_volumes.len(),
                prices.len()
            )));
        }
        let volumes = VolumeSeries::new(self.total_volumes.iter().map(|&(_, v)| v).collect())?;

        Ok((prices, volumes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn chart(prices: &[f64], volumes: &[f64]) -> MarketChart {
        MarketChart {
            prices: prices
                .iter()
                .enumerate()
                .map(|(i, &p)| (i as i64 * DAY_MS, p))
                .collect(),
            total_volumes: volumes
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as i64 * DAY_MS, v))
                .collect(),
        }
    }

    #[test]
    fn normalize_valid_chart() {
        let (prices, volumes) = chart(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0])
            .normalize()
            .unwrap();
        assert_eq!(prices.prices(), vec![1.0, 2.0, 3.0]);
        assert_eq!(volumes.values(), &[10.0, 20.0, 30.0]);
        assert_eq!(prices.latest().price, 3.0);
        assert_eq!(
            prices.latest().timestamp,
            DateTime::from_timestamp_millis(2 * DAY_MS).unwrap()
        );
    }

    #[test]
    fn normalize_without_volumes() {
        let (prices, volumes) = chart(&[1.0, 2.0], &[]).normalize().unwrap();
        assert_eq!(prices.len(), 2);
        assert!(volumes.is_empty());
    }

    #[test]
    fn empty_chart_is_invalid() {
        let err = MarketChart::default().normalize().unwrap_err();
        assert!(matches!(err, SmartTraderError::InvalidSeries { .. }));
    }

    #[test]
    fn decreasing_timestamps_are_invalid() {
        let c = MarketChart {
            prices: vec![(2 * DAY_MS, 1.0), (DAY_MS, 2.0)],
            total_volumes: vec![],
        };
        let err = c.normalize().unwrap_err();
        assert!(err.to_string().contains("timestamps decrease at index 1"));
    }

    #[test]
    fn equal_timestamps_are_allowed() {
        let c = MarketChart {
            prices: vec![(DAY_MS, 1.0), (DAY_MS, 2.0)],
            total_volumes: vec![],
        };
        assert!(c.normalize().is_ok());
    }

    #[test]
    fn non_positive_price_is_invalid() {
        assert!(chart(&[1.0, 0.0], &[]).normalize().is_err());
        assert!(chart(&[1.0, -3.0], &[]).normalize().is_err());
        assert!(chart(&[1.0, f64::NAN], &[]).normalize().is_err());
    }

    #[test]
    fn mismatched_volume_length_is_invalid() {
        let err = chart(&[1.0, 2.0, 3.0], &[1.0, 2.0]).normalize().unwrap_err();
        assert!(matches!(err, SmartTraderError::InvalidSeries { .. }));
    }

    #[test]
    fn negative_volume_is_invalid() {
        assert!(chart(&[1.0, 2.0], &[1.0, -1.0]).normalize().is_err());
    }
}
