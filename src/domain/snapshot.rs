//! Point-in-time indicator snapshot.
//!
//! Holds the latest value of every indicator whose minimum-length
//! requirement is met by the series. Indicators that cannot be computed are
//! left out rather than zero-filled.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_rsi, calculate_stochastic, calculate_volatility,
    ema, identify_support_resistance, macd, rsi, sma, stochastic, support_resistance,
    volatility, BollingerBands, MacdValue, SupportResistance,
};
use serde::Serialize;
use tracing::debug;

pub const SMA_PERIOD: usize = 20;
pub const EMA_PERIOD: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_bands: Option<BollingerBands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_resistance: Option<SupportResistance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

fn present<T>(name: &str, result: Result<T, SmartTraderError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(indicator = name, error = %e, "indicator omitted from snapshot");
            None
        }
    }
}

fn last_of(result: Result<Vec<f64>, SmartTraderError>) -> Result<f64, SmartTraderError> {
    result.map(|v| v[v.len() - 1])
}

pub fn compute_snapshot(prices: &[f64]) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: present("rsi", calculate_rsi(prices, rsi::DEFAULT_PERIOD)),
        macd: present("macd", macd::default_macd(prices)),
        sma_20: present("sma_20", sma::latest_sma(prices, SMA_PERIOD)),
        ema_50: present("ema_50", last_of(ema::calculate_ema(prices, EMA_PERIOD))),
        bollinger_bands: present(
            "bollinger_bands",
            calculate_bollinger(prices, bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULTIPLIER),
        ),
        stochastic: present(
            "stochastic",
            calculate_stochastic(prices, stochastic::DEFAULT_PERIOD),
        ),
        support_resistance: present(
            "support_resistance",
            identify_support_resistance(prices, support_resistance::DEFAULT_WINDOW),
        ),
        volatility: present(
            "volatility",
            calculate_volatility(prices, volatility::DEFAULT_WINDOW),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.5).sin() * 10.0).collect()
    }

    #[test]
    fn full_snapshot_for_long_series() {
        let snap = compute_snapshot(&wave(120));
        assert!(snap.rsi.is_some());
        assert!(snap.macd.is_some());
        assert!(snap.sma_20.is_some());
        assert!(snap.ema_50.is_some());
        assert!(snap.bollinger_bands.is_some());
        assert!(snap.stochastic.is_some());
        assert!(snap.support_resistance.is_some());
        assert!(snap.volatility.is_some());
    }

    #[test]
    fn partial_snapshot_for_short_series() {
        let snap = compute_snapshot(&wave(16));
        assert!(snap.rsi.is_some());
        assert!(snap.stochastic.is_some());
        assert!(snap.volatility.is_some());
        assert!(snap.support_resistance.is_some());
        assert!(snap.macd.is_none());
        assert!(snap.sma_20.is_none());
        assert!(snap.ema_50.is_none());
        assert!(snap.bollinger_bands.is_none());
    }

    #[test]
    fn flat_series_omits_degenerate_stochastic() {
        let snap = compute_snapshot(&[100.0; 60]);
        assert!(snap.stochastic.is_none());
        assert_eq!(snap.rsi, Some(100.0));
        let bands = snap.bollinger_bands.unwrap();
        assert_eq!(bands.upper, bands.lower);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let snap = compute_snapshot(&[100.0]);
        let json = serde_json::to_value(&snap).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("support_resistance"));
        assert!(!obj.contains_key("rsi"));
        assert!(!obj.contains_key("stochastic"));
    }
}
