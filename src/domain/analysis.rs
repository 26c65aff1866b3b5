//! Point-in-time analysis: snapshot, trend, price changes, strength, patterns
//! and recommendations for one price/volume series.

use crate::domain::indicator::{
    analyze_trend, calculate_fibonacci, calculate_price_changes, mean, tail, trend,
    FibonacciLevel, PriceChanges, Trend,
};
use crate::domain::pattern::{identify_patterns, Pattern};
use crate::domain::error::SmartTraderError;
use crate::domain::recommendation::{generate_recommendations, Recommendation};
use crate::domain::series::{PriceSeries, VolumeSeries};
use crate::domain::snapshot::{compute_snapshot, IndicatorSnapshot};
use crate::domain::strength::{compute_market_strength, MarketStrength};
use serde::Serialize;

pub const MIN_FIBONACCI_PRICES: usize = 30;
const VOLUME_AVERAGE_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub current_price: f64,
    pub indicators: IndicatorSnapshot,
    pub trend: Trend,
    pub price_changes: PriceChanges,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_volume_7d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_strength: Option<MarketStrength>,
    pub patterns: Vec<Pattern>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fibonacci_levels: Option<Vec<FibonacciLevel>>,
}

/// A non-empty volume series must line up bar for bar with the prices.
pub fn analyze(
    prices: &PriceSeries,
    volumes: &VolumeSeries,
) -> Result<AnalysisResult, SmartTraderError> {
    if !volumes.is_empty() && volumes.len() != prices.len() {
        return Err(SmartTraderError::invalid_series(format!(
            "volume series has {} points, price series has {}",
            volumes.len(),
            prices.len()
        )));
    }
    let closes = prices.prices();
    let indicators = compute_snapshot(&closes);

    let avg_volume_7d = if volumes.is_empty() {
        None
    } else {
        Some(mean(tail(volumes.values(), VOLUME_AVERAGE_WINDOW)))
    };

    let fibonacci_levels = if closes.len() >= MIN_FIBONACCI_PRICES {
        calculate_fibonacci(&closes).ok()
    } else {
        None
    };

    let market_strength = compute_market_strength(&closes, volumes.values());
    let patterns = identify_patterns(&closes);
    let recommendations = generate_recommendations(&closes, &patterns, market_strength.as_ref());

    Ok(AnalysisResult {
        current_price: prices.latest().price,
        indicators,
        trend: analyze_trend(&closes, trend::DEFAULT_PERIOD),
        price_changes: calculate_price_changes(prices),
        avg_volume_7d,
        market_strength,
        patterns,
        recommendations,
        fibonacci_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PricePoint;
    use chrono::{DateTime, Duration, Utc};

    fn daily(prices: &[f64]) -> PriceSeries {
        let start = DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    timestamp: start + Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn single_price_analysis() {
        let result = analyze(&daily(&[42.0]), &VolumeSeries::empty()).unwrap();
        assert_eq!(result.current_price, 42.0);
        assert_eq!(result.trend, Trend::Undefined);
        assert!(result.indicators.rsi.is_none());
        assert!(result.market_strength.is_none());
        assert!(result.patterns.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.fibonacci_levels.is_none());
        assert!(result.avg_volume_7d.is_none());
        assert_eq!(result.price_changes, PriceChanges::default());
    }

    #[test]
    fn full_analysis_with_volumes() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
        let volumes = VolumeSeries::new((0..60).map(|i| 1_000.0 + i as f64).collect()).unwrap();
        let result = analyze(&daily(&closes), &volumes).unwrap();

        assert!(result.indicators.macd.is_some());
        assert!(result.fibonacci_levels.is_some());
        assert!(result.market_strength.is_some());
        assert_ne!(result.trend, Trend::Undefined);
        assert!(result.price_changes.hour_24.is_some());
        assert!(result.price_changes.day_30.is_some());
        let avg = result.avg_volume_7d.unwrap();
        assert!((avg - 1_056.0).abs() < 1e-9);
    }

    #[test]
    fn missing_volumes_omit_strength_only() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
        let result = analyze(&daily(&closes), &VolumeSeries::empty()).unwrap();
        assert!(result.market_strength.is_none());
        assert!(result.avg_volume_7d.is_none());
        assert!(result.indicators.rsi.is_some());
    }

    #[test]
    fn mismatched_volume_length_rejected() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let volumes = VolumeSeries::new(vec![1_000.0; 35]).unwrap();
        let err = analyze(&daily(&closes), &volumes).unwrap_err();
        assert!(matches!(err, SmartTraderError::InvalidSeries { .. }));
    }

    #[test]
    fn serializes_expected_keys() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        let result = analyze(&daily(&closes), &VolumeSeries::empty()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("fibonacci_levels").is_some());
        assert!(json.get("market_strength").is_none());
        assert_eq!(json["trend"], "StrongUp");
        assert!(json["price_changes"].get("24h").is_some());
    }
}
