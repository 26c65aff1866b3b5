//! Technical pattern recognition.
//!
//! Evaluated over the trailing 20 prices plus the full-series RSI:
//! - support / resistance test: latest price within 2% of the level
//!   (High confidence within 1%, else Medium)
//! - RSI reversal: RSI > 70 with a falling bar (bearish) or RSI < 30 with a
//!   rising bar (bullish), Medium confidence
//! - moving-average crossover: SMA(20) crossing EMA(50) between the previous
//!   and the latest bar, High confidence
//!
//! Any failure yields an empty list, never a partial one.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{
    calculate_ema, calculate_rsi, identify_support_resistance, rsi, sma, support_resistance,
    tail,
};
use crate::domain::snapshot::{EMA_PERIOD, SMA_PERIOD};
use serde::Serialize;
use tracing::warn;

const RECENT_WINDOW: usize = 20;
const TEST_DISTANCE: f64 = 0.02;
const STRONG_TEST_DISTANCE: f64 = 0.01;
/// EMA(50) needs 50 prices for both the latest and the previous bar, so a
/// 50-price series is skipped: its previous bar has no EMA(50).
pub const MIN_CROSSOVER_PRICES: usize = EMA_PERIOD + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    SupportTest,
    ResistanceTest,
    BearishReversal,
    BullishReversal,
    BullishCrossover,
    BearishCrossover,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::SupportTest => "Support Test",
            PatternKind::ResistanceTest => "Resistance Test",
            PatternKind::BearishReversal => "Possible Bearish Reversal",
            PatternKind::BullishReversal => "Possible Bullish Reversal",
            PatternKind::BullishCrossover => "Moving Average Crossover (Golden Cross)",
            PatternKind::BearishCrossover => "Moving Average Crossover (Death Cross)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PatternKind::SupportTest => "Price testing an important support level",
            PatternKind::ResistanceTest => "Price testing an important resistance level",
            PatternKind::BearishReversal => "RSI overbought with a reversal signal",
            PatternKind::BullishReversal => "RSI oversold with a reversal signal",
            PatternKind::BullishCrossover => "SMA20 crossed above EMA50",
            PatternKind::BearishCrossover => "SMA20 crossed below EMA50",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub name: String,
    pub description: String,
    pub confidence: Confidence,
}

impl Pattern {
    pub fn new(kind: PatternKind, confidence: Confidence) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            confidence,
        }
    }
}

pub fn identify_patterns(prices: &[f64]) -> Vec<Pattern> {
    match try_identify_patterns(prices) {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!(error = %e, "pattern recognition failed");
            Vec::new()
        }
    }
}

fn level_test(price: f64, level: f64, kind: PatternKind) -> Option<Pattern> {
    let distance = (price - level).abs() / level;
    if distance >= TEST_DISTANCE {
        return None;
    }
    let confidence = if distance < STRONG_TEST_DISTANCE {
        Confidence::High
    } else {
        Confidence::Medium
    };
    Some(Pattern::new(kind, confidence))
}

/// SMA(20) and EMA(50) as of the last price.
fn averages(prices: &[f64]) -> Result<(f64, f64), SmartTraderError> {
    let sma = sma::latest_sma(prices, SMA_PERIOD)?;
    let ema = calculate_ema(prices, EMA_PERIOD)?;
    Ok((sma, ema[ema.len() - 1]))
}

pub fn try_identify_patterns(prices: &[f64]) -> Result<Vec<Pattern>, SmartTraderError> {
    if prices.len() < 2 {
        return Err(SmartTraderError::insufficient("patterns", prices.len(), 2));
    }
    let mut patterns = Vec::new();
    let current = prices[prices.len() - 1];
    let previous = prices[prices.len() - 2];

    let levels =
        identify_support_resistance(tail(prices, RECENT_WINDOW), support_resistance::DEFAULT_WINDOW)?;
    patterns.extend(level_test(current, levels.support, PatternKind::SupportTest));
    patterns.extend(level_test(current, levels.resistance, PatternKind::ResistanceTest));

    let rsi = calculate_rsi(prices, rsi::DEFAULT_PERIOD)?;
    if rsi > 70.0 && current < previous {
        patterns.push(Pattern::new(PatternKind::BearishReversal, Confidence::Medium));
    } else if rsi < 30.0 && current > previous {
        patterns.push(Pattern::new(PatternKind::BullishReversal, Confidence::Medium));
    }

    if prices.len() >= MIN_CROSSOVER_PRICES {
        let (sma_now, ema_now) = averages(prices)?;
        let (sma_prev, ema_prev) = averages(&prices[..prices.len() - 1])?;

        if sma_prev < ema_prev && sma_now > ema_now {
            patterns.push(Pattern::new(PatternKind::BullishCrossover, Confidence::High));
        } else if sma_prev > ema_prev && sma_now < ema_now {
            patterns.push(Pattern::new(PatternKind::BearishCrossover, Confidence::High));
        }
    }

    Ok(patterns)
}
