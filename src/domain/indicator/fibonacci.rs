//! Fibonacci retracement levels between the series' global high and low.
//!
//! level(r) = high - (high - low) * r for r in 23.6%, 38.2%, 50%, 61.8%, 78.6%.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::IndicatorType;
use serde::Serialize;

pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciLevel {
    pub label: String,
    pub ratio: f64,
    pub price: f64,
}

pub fn calculate_fibonacci(prices: &[f64]) -> Result<Vec<FibonacciLevel>, SmartTraderError> {
    if prices.is_empty() {
        return Err(SmartTraderError::insufficient(IndicatorType::Fibonacci, 0, 1));
    }

    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let diff = high - low;

    Ok(RETRACEMENT_RATIOS
        .iter()
        .map(|&ratio| FibonacciLevel {
            label: format!("Retracement {:.1}%", ratio * 100.0),
            ratio,
            price: high - diff * ratio,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fibonacci_levels_between_high_and_low() {
        let levels = calculate_fibonacci(&[150.0, 200.0, 100.0, 120.0]).unwrap();
        assert_eq!(levels.len(), 5);
        assert_abs_diff_eq!(levels[0].price, 200.0 - 100.0 * 0.236, epsilon = 1e-9);
        assert_abs_diff_eq!(levels[2].price, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(levels[4].price, 200.0 - 78.6, epsilon = 1e-9);
        assert_eq!(levels[0].label, "Retracement 23.6%");
        assert_eq!(levels[2].label, "Retracement 50.0%");
    }

    #[test]
    fn fibonacci_levels_descend() {
        let levels = calculate_fibonacci(&[10.0, 30.0]).unwrap();
        assert!(levels.windows(2).all(|w| w[0].price > w[1].price));
    }

    #[test]
    fn fibonacci_flat_series() {
        let levels = calculate_fibonacci(&[5.0; 3]).unwrap();
        assert!(levels.iter().all(|l| (l.price - 5.0).abs() < f64::EPSILON));
    }

    #[test]
    fn fibonacci_empty() {
        assert!(calculate_fibonacci(&[]).is_err());
    }
}
