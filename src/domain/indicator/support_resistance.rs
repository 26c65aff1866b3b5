//! Support and resistance levels from local extrema.
//!
//! A price at index i (with a full window on both sides) is a local support
//! when it is <= every price in `[i - window, i + window)`, and a local
//! resistance when it is >= every price in that range. The reported level is
//! the mean of the last three local points, or the last one when fewer than
//! three exist. Without any local point the global min (support) or max
//! (resistance) is used.
//!
//! Cost is O(n * window); a monotonic-deque sliding extremum would give the
//! same values in O(n) if this ever sits on a hot path.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{mean, tail, IndicatorType};
use serde::Serialize;

pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

fn summarize(points: &[f64]) -> Option<f64> {
    match points.len() {
        0 => None,
        n if n >= 3 => Some(mean(tail(points, 3))),
        n => Some(points[n - 1]),
    }
}

pub fn identify_support_resistance(
    prices: &[f64],
    window: usize,
) -> Result<SupportResistance, SmartTraderError> {
    if prices.is_empty() {
        return Err(SmartTraderError::insufficient(
            IndicatorType::SupportResistance(window),
            0,
            1,
        ));
    }

    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    if window > 0 && prices.len() > 2 * window {
        for i in window..prices.len() - window {
            let price = prices[i];
            let neighborhood = &prices[i - window..i + window];
            if neighborhood.iter().all(|&p| price <= p) {
                supports.push(price);
            }
            if neighborhood.iter().all(|&p| price >= p) {
                resistances.push(price);
            }
        }
    }

    let support = summarize(&supports)
        .unwrap_or_else(|| prices.iter().copied().fold(f64::INFINITY, f64::min));
    let resistance = summarize(&resistances)
        .unwrap_or_else(|| prices.iter().copied().fold(f64::NEG_INFINITY, f64::max));

    Ok(SupportResistance {
        support,
        resistance,
    })
}
