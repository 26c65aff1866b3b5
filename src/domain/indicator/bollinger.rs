//! Bollinger Bands indicator.
//!
//! Bollinger Bands over the trailing `period` prices:
//! - Middle: SMA of the window
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::stddev::population_stddev;
use crate::domain::indicator::{mean, IndicatorType};
use serde::Serialize;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    prices: &[f64],
    period: usize,
    multiplier: f64,
) -> Result<BollingerBands, SmartTraderError> {
    if period == 0 || prices.len() < period {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Bollinger(period),
            prices.len(),
            period,
        ));
    }

    let window = &prices[prices.len() - period..];
    let middle = mean(window);
    let stddev = population_stddev(window);

    Ok(BollingerBands {
        upper: middle + multiplier * stddev,
        middle,
        lower: middle - multiplier * stddev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bollinger_constant_prices_collapse() {
        let bands = calculate_bollinger(&[100.0; 25], 20, 2.0).unwrap();
        assert_abs_diff_eq!(bands.upper, 100.0);
        assert_abs_diff_eq!(bands.middle, 100.0);
        assert_abs_diff_eq!(bands.lower, 100.0);
    }

    #[test]
    fn bollinger_uses_trailing_window_only() {
        // Leading outlier must not affect the bands.
        let mut prices = vec![1_000.0];
        prices.extend([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let bands = calculate_bollinger(&prices, 8, 2.0).unwrap();
        assert_abs_diff_eq!(bands.middle, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bands.upper, 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bands.lower, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bollinger_symmetry() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();
        assert_abs_diff_eq!(
            bands.upper - bands.middle,
            bands.middle - bands.lower,
            epsilon = 1e-10
        );
    }

    #[test]
    fn bollinger_insufficient_prices() {
        assert!(calculate_bollinger(&[1.0; 19], 20, 2.0).is_err());
    }
}
