//! Stochastic %K oscillator.
//!
//! %K = 100 * (close - lowest) / (highest - lowest) over the trailing n prices.
//! A flat window (highest == lowest) has no defined %K and is reported as
//! `ComputationDegenerate`; callers decide how to degrade.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::IndicatorType;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_stochastic(prices: &[f64], period: usize) -> Result<f64, SmartTraderError> {
    if period == 0 || prices.len() < period {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Stochastic(period),
            prices.len(),
            period,
        ));
    }

    let window = &prices[prices.len() - period..];
    let lowest = window.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let close = window[window.len() - 1];

    let range = highest - lowest;
    if range == 0.0 {
        return Err(SmartTraderError::degenerate(
            IndicatorType::Stochastic(period),
            "highest and lowest price are equal over the window",
        ));
    }
    Ok(100.0 * (close - lowest) / range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stochastic_close_at_high() {
        let prices: Vec<f64> = (0..14).map(|i| 10.0 + i as f64).collect();
        assert_abs_diff_eq!(calculate_stochastic(&prices, 14).unwrap(), 100.0);
    }

    #[test]
    fn stochastic_close_at_low() {
        let prices: Vec<f64> = (0..14).map(|i| 30.0 - i as f64).collect();
        assert_abs_diff_eq!(calculate_stochastic(&prices, 14).unwrap(), 0.0);
    }

    #[test]
    fn stochastic_midrange() {
        let prices = [10.0, 20.0, 15.0];
        assert_abs_diff_eq!(calculate_stochastic(&prices, 3).unwrap(), 50.0);
    }

    #[test]
    fn stochastic_ignores_prices_outside_window() {
        let prices = [1.0, 1000.0, 10.0, 20.0, 15.0];
        assert_abs_diff_eq!(calculate_stochastic(&prices, 3).unwrap(), 50.0);
    }

    #[test]
    fn stochastic_flat_window_is_degenerate() {
        let err = calculate_stochastic(&[100.0; 20], 14).unwrap_err();
        assert!(matches!(err, SmartTraderError::ComputationDegenerate { .. }));
    }

    #[test]
    fn stochastic_insufficient_prices() {
        let err = calculate_stochastic(&[1.0, 2.0], 14).unwrap_err();
        assert!(matches!(err, SmartTraderError::InsufficientData { .. }));
    }
}
