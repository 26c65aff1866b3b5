//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Needs n + 1 prices (n price changes) to seed the averages.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::IndicatorType;

pub const DEFAULT_PERIOD: usize = 14;

/// RSI as of the last price in `prices`.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<f64, SmartTraderError> {
    let need = period + 1;
    if period == 0 || prices.len() < need {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Rsi(period),
            prices.len(),
            need,
        ));
    }

    let mut gains: Vec<f64> = Vec::with_capacity(prices.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(prices.len() - 1);
    for w in prices.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Ok(100.0);
    }
    Ok(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
