//! Trade recommendations from score, patterns and raw oscillator levels.
//!
//! Every applicable rule fires; the output is their union:
//! 1. strength > 70 → Buy (High); strength < 30 → Sell (High)
//! 2. each High-confidence support test → Buy (Medium); resistance test → Sell (Medium)
//! 3. RSI < 30 and %K < 20 → Buy, High when strength > 50 else Medium;
//!    RSI > 70 and %K > 80 → Sell, High when strength < 50 else Medium

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{calculate_rsi, calculate_stochastic, rsi, stochastic};
use crate::domain::pattern::{Confidence, Pattern, PatternKind};
use crate::domain::strength::MarketStrength;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationType {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub reason: String,
    pub confidence: Confidence,
}

impl Recommendation {
    fn new(kind: RecommendationType, reason: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            kind,
            reason: reason.into(),
            confidence,
        }
    }
}

pub fn generate_recommendations(
    prices: &[f64],
    patterns: &[Pattern],
    strength: Option<&MarketStrength>,
) -> Vec<Recommendation> {
    match try_generate_recommendations(prices, patterns, strength) {
        Ok(recs) => recs,
        Err(e) => {
            warn!(error = %e, "recommendations unavailable");
            Vec::new()
        }
    }
}

pub fn try_generate_recommendations(
    prices: &[f64],
    patterns: &[Pattern],
    strength: Option<&MarketStrength>,
) -> Result<Vec<Recommendation>, SmartTraderError> {
    let rsi = calculate_rsi(prices, rsi::DEFAULT_PERIOD)?;
    let stoch = calculate_stochastic(prices, stochastic::DEFAULT_PERIOD)?;
    let score = strength.map(|s| s.score);

    let mut recs = Vec::new();

    match score {
        Some(s) if s > 70.0 => recs.push(Recommendation::new(
            RecommendationType::Buy,
            "Very positive market strength",
            Confidence::High,
        )),
        Some(s) if s < 30.0 => recs.push(Recommendation::new(
            RecommendationType::Sell,
            "Very negative market strength",
            Confidence::High,
        )),
        _ => {}
    }

    for pattern in patterns.iter().filter(|p| p.confidence == Confidence::High) {
        match pattern.kind {
            PatternKind::SupportTest => recs.push(Recommendation::new(
                RecommendationType::Buy,
                format!("Price testing strong support - {}", pattern.description),
                Confidence::Medium,
            )),
            PatternKind::ResistanceTest => recs.push(Recommendation::new(
                RecommendationType::Sell,
                format!("Price testing strong resistance - {}", pattern.description),
                Confidence::Medium,
            )),
            _ => {}
        }
    }

    if rsi < 30.0 && stoch < 20.0 {
        let confidence = if score.is_some_and(|s| s > 50.0) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        recs.push(Recommendation::new(
            RecommendationType::Buy,
            "RSI and stochastic indicate oversold",
            confidence,
        ));
    } else if rsi > 70.0 && stoch > 80.0 {
        let confidence = if score.is_some_and(|s| s < 50.0) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        recs.push(Recommendation::new(
            RecommendationType::Sell,
            "RSI and stochastic indicate overbought",
            confidence,
        ));
    }

    Ok(recs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strength::StrengthComponents;

    fn strength(score: f64) -> MarketStrength {
        MarketStrength {
            score,
            components: StrengthComponents {
                rsi_score: score / 5.0,
                macd_score: score / 5.0,
                volume_score: score / 5.0,
                trend_score: score / 5.0,
                stochastic_score: score / 5.0,
            },
        }
    }

    fn neutral_prices() -> Vec<f64> {
        (0..30).map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 }).collect()
    }

    fn selloff() -> Vec<f64> {
        (0..30).map(|i| 200.0 - i as f64 * 2.0).collect()
    }

    fn rally() -> Vec<f64> {
        (0..30).map(|i| 100.0 + i as f64 * 2.0).collect()
    }

    #[test]
    fn strong_score_buys() {
        let recs = generate_recommendations(&neutral_prices(), &[], Some(&strength(75.0)));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationType::Buy);
        assert_eq!(recs[0].confidence, Confidence::High);
    }

    #[test]
    fn weak_score_sells() {
        let recs = generate_recommendations(&neutral_prices(), &[], Some(&strength(20.0)));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationType::Sell);
    }

    #[test]
    fn neutral_score_no_recommendation() {
        let recs = generate_recommendations(&neutral_prices(), &[], Some(&strength(50.0)));
        assert!(recs.is_empty());
    }

    #[test]
    fn high_confidence_level_tests_map_to_medium_recommendations() {
        let patterns = vec![
            Pattern::new(PatternKind::SupportTest, Confidence::High),
            Pattern::new(PatternKind::ResistanceTest, Confidence::High),
            Pattern::new(PatternKind::SupportTest, Confidence::Medium),
            Pattern::new(PatternKind::BullishCrossover, Confidence::High),
        ];
        let recs = generate_recommendations(&neutral_prices(), &patterns, None);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].kind, RecommendationType::Buy);
        assert_eq!(recs[0].confidence, Confidence::Medium);
        assert!(recs[0].reason.starts_with("Price testing strong support"));
        assert_eq!(recs[1].kind, RecommendationType::Sell);
    }

    #[test]
    fn oversold_buy_confidence_depends_on_strength() {
        let recs = generate_recommendations(&selloff(), &[], Some(&strength(55.0)));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationType::Buy);
        assert_eq!(recs[0].confidence, Confidence::High);

        let recs = generate_recommendations(&selloff(), &[], None);
        assert_eq!(recs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn overbought_sell_confidence_depends_on_strength() {
        let recs = generate_recommendations(&rally(), &[], Some(&strength(40.0)));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationType::Sell);
        assert_eq!(recs[0].confidence, Confidence::High);

        let recs = generate_recommendations(&rally(), &[], None);
        assert_eq!(recs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn rules_accumulate() {
        let patterns = vec![Pattern::new(PatternKind::ResistanceTest, Confidence::High)];
        let recs = generate_recommendations(&rally(), &patterns, Some(&strength(25.0)));
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.kind == RecommendationType::Sell));
    }

    #[test]
    fn degenerate_oscillator_yields_empty_list() {
        let recs = generate_recommendations(&[100.0; 30], &[], Some(&strength(90.0)));
        assert!(recs.is_empty());
    }
}
