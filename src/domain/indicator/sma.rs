//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i..i+n]) over every full window ("valid" alignment), so
//! the output has `len - (n - 1)` values and the last one is the latest SMA.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{mean, IndicatorType};

pub fn calculate_sma(prices: &[f64], period: usize) -> Result<Vec<f64>, SmartTraderError> {
    if period == 0 || prices.len() < period {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Sma(period),
            prices.len(),
            period,
        ));
    }
    Ok(prices.windows(period).map(mean).collect())
}

/// SMA of the trailing `period` prices.
pub fn latest_sma(prices: &[f64], period: usize) -> Result<f64, SmartTraderError> {
    if period == 0 || prices.len() < period {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Sma(period),
            prices.len(),
            period,
        ));
    }
    Ok(mean(&prices[prices.len() - period..]))
}
