#![allow(dead_code)]

use smarttrader::domain::error::SmartTraderError;
use smarttrader::domain::series::{MarketChart, PricePoint, PriceSeries, VolumeSeries};
use smarttrader::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const HOUR_MS: i64 = 3_600_000;
pub const START_MS: i64 = 1_700_000_000_000;

pub struct MockMarketData {
    pub charts: HashMap<String, MarketChart>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            charts: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_chart(mut self, asset: &str, chart: MarketChart) -> Self {
        self.charts.insert(asset.to_string(), chart);
        self
    }

    /// Every fetch for `asset` fails with a transient error.
    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_market_chart(&self, asset: &str, _days: u32) -> Result<MarketChart, SmartTraderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(asset) {
            return Err(SmartTraderError::MarketData {
                asset: asset.to_string(),
                reason: reason.clone(),
            });
        }
        self.charts
            .get(asset)
            .cloned()
            .ok_or_else(|| SmartTraderError::MarketDataUnavailable {
                asset: asset.to_string(),
            })
    }

    fn list_assets(&self) -> Result<Vec<String>, SmartTraderError> {
        let mut assets: Vec<String> = self.charts.keys().cloned().collect();
        assets.sort();
        Ok(assets)
    }
}

/// Hourly chart starting at [`START_MS`].
pub fn make_chart(prices: &[f64], volumes: &[f64]) -> MarketChart {
    let ts = |i: usize| START_MS + i as i64 * HOUR_MS;
    MarketChart {
        prices: prices.iter().enumerate().map(|(i, &p)| (ts(i), p)).collect(),
        total_volumes: volumes.iter().enumerate().map(|(i, &v)| (ts(i), v)).collect(),
    }
}

pub fn make_series(prices: &[f64]) -> PriceSeries {
    let start = chrono::DateTime::from_timestamp_millis(START_MS).unwrap();
    PriceSeries::new(
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + chrono::Duration::hours(i as i64),
                price,
            })
            .collect(),
    )
    .unwrap()
}

pub fn make_volumes(count: usize, base: f64) -> VolumeSeries {
    VolumeSeries::new((0..count).map(|i| base + i as f64).collect()).unwrap()
}

/// Smooth oscillation around `center`.
pub fn wave(count: usize, center: f64, amplitude: f64) -> Vec<f64> {
    (0..count)
        .map(|i| center + (i as f64 * 0.3).sin() * amplitude)
        .collect()
}

pub fn ramp(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Flat for 55 bars, a jump to 200, then 14 one-point drops: the last bar
/// opens a long in the default RSI strategy.
pub fn long_entry_setup() -> Vec<f64> {
    let mut prices = vec![100.0; 55];
    prices.extend((0..15).map(|i| 200.0 - i as f64));
    prices
}

pub fn write_chart_csv(dir: &Path, asset: &str, prices: &[f64], volumes: Option<&[f64]>) {
    let mut content = String::from("timestamp,price,volume\n");
    for (i, price) in prices.iter().enumerate() {
        let volume = volumes.map(|v| v[i].to_string()).unwrap_or_default();
        content.push_str(&format!("{},{},{}\n", START_MS + i as i64 * HOUR_MS, price, volume));
    }
    std::fs::write(dir.join(format!("{asset}.csv")), content).unwrap();
}
