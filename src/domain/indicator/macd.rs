//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) trimmed to EMA(slow)'s length - EMA(slow)
//! Signal Line = EMA(signal) of the MACD line
//!
//! Both EMAs are the fixed-kernel EMA from [`super::ema`], so the line has
//! `len - (slow - 1)` values and the signal needs `slow + signal - 1` prices.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{calculate_ema, IndicatorType};
use serde::Serialize;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Latest MACD line and signal values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
}

impl MacdValue {
    pub fn is_bullish(&self) -> bool {
        self.line > self.signal
    }
}

fn macd_type(fast: usize, slow: usize, signal: usize) -> IndicatorType {
    IndicatorType::Macd { fast, slow, signal }
}

/// Full MACD line, aligned on the tail of EMA(slow).
pub fn macd_line(prices: &[f64], fast: usize, slow: usize) -> Result<Vec<f64>, SmartTraderError> {
    let ema_fast = calculate_ema(prices, fast)?;
    let ema_slow = calculate_ema(prices, slow)?;
    if ema_fast.len() < ema_slow.len() {
        return Err(SmartTraderError::insufficient(
            macd_type(fast, slow, DEFAULT_SIGNAL),
            prices.len(),
            fast.max(slow),
        ));
    }
    let offset = ema_fast.len() - ema_slow.len();
    Ok(ema_fast[offset..]
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect())
}

pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdValue, SmartTraderError> {
    let need = slow.max(fast) + signal_period.saturating_sub(1);
    if fast == 0 || slow == 0 || signal_period == 0 || prices.len() < need {
        return Err(SmartTraderError::insufficient(
            macd_type(fast, slow, signal_period),
            prices.len(),
            need,
        ));
    }

    let line = macd_line(prices, fast, slow)?;
    let signal = calculate_ema(&line, signal_period)?;

    match (line.last(), signal.last()) {
        (Some(&line), Some(&signal)) => Ok(MacdValue { line, signal }),
        _ => Err(SmartTraderError::insufficient(
            macd_type(fast, slow, signal_period),
            prices.len(),
            need,
        )),
    }
}

/// MACD(12, 26, 9).
pub fn default_macd(prices: &[f64]) -> Result<MacdValue, SmartTraderError> {
    calculate_macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
