//! Technical indicator implementations.
//!
//! Every indicator is a pure function of a price slice (oldest first). An
//! indicator that cannot be computed from the slice returns
//! `SmartTraderError::InsufficientData` naming itself via [`IndicatorType`].
//!
//! - `rsi`: Wilder-smoothed RSI
//! - `sma` / `ema`: moving averages (EMA is a fixed exponential kernel)
//! - `macd`: EMA(12) - EMA(26) with an EMA(9) signal line
//! - `bollinger`, `stochastic`, `fibonacci`, `support_resistance`, `volatility`
//! - `price_change`, `trend`: analysis helpers over the latest bar

pub mod bollinger;
pub mod ema;
pub mod fibonacci;
pub mod macd;
pub mod price_change;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod support_resistance;
pub mod trend;
pub mod volatility;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use fibonacci::{calculate_fibonacci, FibonacciLevel};
pub use macd::{calculate_macd, MacdValue};
pub use price_change::{calculate_price_changes, PriceChanges};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::calculate_stochastic;
pub use support_resistance::{identify_support_resistance, SupportResistance};
pub use trend::{analyze_trend, Trend};
pub use volatility::calculate_volatility;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger(usize),
    Stochastic(usize),
    Volatility(usize),
    SupportResistance(usize),
    Fibonacci,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger(period) => write!(f, "BOLLINGER({})", period),
            IndicatorType::Stochastic(period) => write!(f, "STOCHASTIC({})", period),
            IndicatorType::Volatility(window) => write!(f, "VOLATILITY({})", window),
            IndicatorType::SupportResistance(window) => {
                write!(f, "SUPPORT_RESISTANCE({})", window)
            }
            IndicatorType::Fibonacci => write!(f, "FIBONACCI"),
        }
    }
}

/// Arithmetic mean. Caller guarantees a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// The trailing `n` values (all of them when fewer exist).
pub(crate) fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}
