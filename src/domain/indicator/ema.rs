//! Exponential Moving Average indicator (fixed-window kernel).
//!
//! Weights are `exp(linspace(-1, 0, n))` normalized to sum 1, convolved with
//! the closing prices in "valid" mode. This is a finite exponential kernel,
//! not the recursive `k = 2/(n+1)` EMA, and MACD and the crossover pattern
//! depend on its exact values.
//!
//! Convolution reverses the kernel: within each window the oldest price gets
//! the largest weight `exp(0)` and the newest gets `exp(-1)`.
//! Output length is `len - (n - 1)`.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::IndicatorType;

/// Normalized `exp(linspace(-1, 0, period))`.
pub fn ema_weights(period: usize) -> Vec<f64> {
    let raw: Vec<f64> = if period == 1 {
        vec![(-1.0f64).exp()]
    } else {
        let step = 1.0 / (period - 1) as f64;
        (0..period)
            .map(|j| (-1.0 + j as f64 * step).exp())
            .collect()
    };
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

pub fn calculate_ema(prices: &[f64], period: usize) -> Result<Vec<f64>, SmartTraderError> {
    if period == 0 || prices.len() < period {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Ema(period),
            prices.len(),
            period,
        ));
    }

    let weights = ema_weights(period);
    let values = prices
        .windows(period)
        .map(|window| {
            weights
                .iter()
                .enumerate()
                .map(|(j, w)| w * window[period - 1 - j])
                .sum()
        })
        .collect();
    Ok(values)
}
