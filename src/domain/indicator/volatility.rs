//! Annualized volatility: population std-dev of the trailing log-returns
//! times sqrt(252), as a percentage.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::stddev::population_stddev;
use crate::domain::indicator::{tail, IndicatorType};

pub const DEFAULT_WINDOW: usize = 14;
const PERIODS_PER_YEAR: f64 = 252.0;

pub fn calculate_volatility(prices: &[f64], window: usize) -> Result<f64, SmartTraderError> {
    let need = window + 1;
    if window == 0 || prices.len() < need {
        return Err(SmartTraderError::insufficient(
            IndicatorType::Volatility(window),
            prices.len(),
            need,
        ));
    }

    let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    Ok(population_stddev(tail(&returns, window)) * PERIODS_PER_YEAR.sqrt() * 100.0)
}
