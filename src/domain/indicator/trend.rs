//! Trend label from the latest price relative to SMA(14).

use crate::domain::indicator::sma::latest_sma;
use serde::Serialize;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Undefined,
    StrongUp,
    Up,
    StrongDown,
    Down,
    Sideways,
}

pub fn analyze_trend(prices: &[f64], period: usize) -> Trend {
    let sma = match latest_sma(prices, period) {
        Ok(v) => v,
        Err(_) => return Trend::Undefined,
    };
    let price = prices[prices.len() - 1];

    if price > sma * 1.05 {
        Trend::StrongUp
    } else if price > sma {
        Trend::Up
    } else if price < sma * 0.95 {
        Trend::StrongDown
    } else if price < sma {
        Trend::Down
    } else {
        Trend::Sideways
    }
}
