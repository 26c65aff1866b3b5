//! Composite market-strength score.
//!
//! Five sub-scores, each in [0, 20], sum to a total in [0, 100]:
//! - RSI: `20 * (1 - |50 - RSI| / 50)`, best at 50
//! - MACD: 20 when the line is above the signal
//! - Volume: `min(20, 20 * mean(last 7) / mean(last 30))`
//! - Trend: percentage change from `prices[len - 20]` to the latest, clipped to [0, 20]
//! - Stochastic: 20 when 20 < %K < 80
//!
//! Any failure yields no score at all.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{
    calculate_rsi, calculate_stochastic, macd, mean, rsi, stochastic, tail,
};
use serde::Serialize;
use tracing::warn;

const SUB_SCORE_MAX: f64 = 20.0;
pub const MIN_VOLUME_POINTS: usize = 30;
const TREND_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrengthComponents {
    pub rsi_score: f64,
    pub macd_score: f64,
    pub volume_score: f64,
    pub trend_score: f64,
    pub stochastic_score: f64,
}

impl StrengthComponents {
    pub fn total(&self) -> f64 {
        self.rsi_score + self.macd_score + self.volume_score + self.trend_score + self.stochastic_score
    }

    fn all(&self) -> [f64; 5] {
        [
            self.rsi_score,
            self.macd_score,
            self.volume_score,
            self.trend_score,
            self.stochastic_score,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketStrength {
    pub score: f64,
    pub components: StrengthComponents,
}

/// Score the series, or `None` when any component cannot be computed.
pub fn compute_market_strength(prices: &[f64], volumes: &[f64]) -> Option<MarketStrength> {
    match try_market_strength(prices, volumes) {
        Ok(strength) => Some(strength),
        Err(e) => {
            warn!(error = %e, "market strength unavailable");
            None
        }
    }
}

pub fn try_market_strength(
    prices: &[f64],
    volumes: &[f64],
) -> Result<MarketStrength, SmartTraderError> {
    if volumes.len() < MIN_VOLUME_POINTS {
        return Err(SmartTraderError::insufficient(
            "volume",
            volumes.len(),
            MIN_VOLUME_POINTS,
        ));
    }
    if prices.len() < TREND_LOOKBACK {
        return Err(SmartTraderError::insufficient(
            "price trend",
            prices.len(),
            TREND_LOOKBACK,
        ));
    }

    let rsi = calculate_rsi(prices, rsi::DEFAULT_PERIOD)?;
    let macd = macd::default_macd(prices)?;
    let stoch = calculate_stochastic(prices, stochastic::DEFAULT_PERIOD)?;

    let long_volume = mean(tail(volumes, MIN_VOLUME_POINTS));
    if long_volume == 0.0 {
        return Err(SmartTraderError::degenerate(
            "volume",
            "mean volume over the last 30 points is zero",
        ));
    }
    let volume_ratio = mean(tail(volumes, 7)) / long_volume;

    let base = prices[prices.len() - TREND_LOOKBACK];
    let latest = prices[prices.len() - 1];
    let price_trend = (latest - base) / base * 100.0;

    let components = StrengthComponents {
        rsi_score: SUB_SCORE_MAX * (1.0 - (50.0 - rsi).abs() / 50.0),
        macd_score: if macd.is_bullish() { SUB_SCORE_MAX } else { 0.0 },
        volume_score: (SUB_SCORE_MAX * volume_ratio).min(SUB_SCORE_MAX),
        trend_score: price_trend.clamp(0.0, SUB_SCORE_MAX),
        stochastic_score: if stoch > 20.0 && stoch < 80.0 {
            SUB_SCORE_MAX
        } else {
            0.0
        },
    };

    if components.all().iter().any(|c| !c.is_finite()) {
        return Err(SmartTraderError::degenerate(
            "market strength",
            "non-finite component score",
        ));
    }

    Ok(MarketStrength {
        score: components.total(),
        components,
    })
}
