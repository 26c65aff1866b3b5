//! Alert rules and their evaluation against a fresh indicator snapshot.
//!
//! `rsi` and `volatility` compare the raw value with the threshold.
//! `bollinger` compares the percentage deviation of the price from the upper
//! band (condition `above`) or the lower band (otherwise). `support` and
//! `resistance` fire when the price is within 1% of the level whatever the
//! declared condition. `price` compares the current price directly and only
//! understands `above` and `below`.

use crate::domain::error::SmartTraderError;
use crate::domain::snapshot::IndicatorSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance, in percent, under which a `near` condition is met.
pub const NEAR_THRESHOLD_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
    Near,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertIndicator {
    Rsi,
    Volatility,
    Bollinger,
    Support,
    Resistance,
    Price,
}

impl FromStr for AlertIndicator {
    type Err = SmartTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi" => Ok(AlertIndicator::Rsi),
            "volatility" => Ok(AlertIndicator::Volatility),
            "bollinger" => Ok(AlertIndicator::Bollinger),
            "support" => Ok(AlertIndicator::Support),
            "resistance" => Ok(AlertIndicator::Resistance),
            "price" => Ok(AlertIndicator::Price),
            _ => Err(SmartTraderError::UnknownIndicator(s.to_string())),
        }
    }
}

impl fmt::Display for AlertIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertIndicator::Rsi => "rsi",
            AlertIndicator::Volatility => "volatility",
            AlertIndicator::Bollinger => "bollinger",
            AlertIndicator::Support => "support",
            AlertIndicator::Resistance => "resistance",
            AlertIndicator::Price => "price",
        };
        f.write_str(name)
    }
}

/// A user-defined alert, as stored by the alert store.
///
/// `indicator` stays a plain string so that files naming an unsupported
/// indicator still load; evaluation rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: i64,
    pub crypto_id: String,
    pub indicator: String,
    pub threshold: f64,
    pub condition: AlertCondition,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default)]
    pub notification_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_value: Option<f64>,
}

impl AlertRule {
    pub fn new(
        id: i64,
        crypto_id: impl Into<String>,
        indicator: impl Into<String>,
        threshold: f64,
        condition: AlertCondition,
    ) -> Self {
        Self {
            id,
            crypto_id: crypto_id.into(),
            indicator: indicator.into(),
            threshold,
            condition,
            description: None,
            status: AlertStatus::Active,
            notification_sent: false,
            triggered_value: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    pub fn parsed_indicator(&self) -> Result<AlertIndicator, SmartTraderError> {
        self.indicator.parse()
    }

    /// Value recorded when the rule fires: the price for price rules, the
    /// threshold for everything else.
    pub fn trigger_value(&self, current_price: f64) -> Result<f64, SmartTraderError> {
        Ok(match self.parsed_indicator()? {
            AlertIndicator::Price => current_price,
            _ => self.threshold,
        })
    }
}

/// Rules seeded when no alerts file is configured.
pub fn default_alert_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(1, "bitcoin", "rsi", 70.0, AlertCondition::Above)
            .with_description("RSI overbought (BTC)"),
        AlertRule::new(2, "bitcoin", "rsi", 30.0, AlertCondition::Below)
            .with_description("RSI oversold (BTC)"),
        AlertRule::new(3, "ethereum", "bollinger", 2.0, AlertCondition::Above)
            .with_description("Price above upper band (ETH)"),
        AlertRule::new(4, "ethereum", "bollinger", -2.0, AlertCondition::Below)
            .with_description("Price below lower band (ETH)"),
        AlertRule::new(5, "bitcoin", "volatility", 50.0, AlertCondition::Above)
            .with_description("High volatility (BTC)"),
        AlertRule::new(6, "ethereum", "support", 0.0, AlertCondition::Near)
            .with_description("Near support (ETH)"),
        AlertRule::new(7, "ethereum", "resistance", 0.0, AlertCondition::Near)
            .with_description("Near resistance (ETH)"),
    ]
}

fn unavailable(indicator: AlertIndicator) -> SmartTraderError {
    SmartTraderError::IndicatorUnavailable {
        indicator: indicator.to_string(),
    }
}

fn pct_deviation(
    indicator: AlertIndicator,
    price: f64,
    level: f64,
) -> Result<f64, SmartTraderError> {
    if level == 0.0 || !level.is_finite() {
        return Err(SmartTraderError::degenerate(
            indicator,
            format!("reference level {level} cannot anchor a percentage"),
        ));
    }
    Ok((price - level) / level * 100.0)
}

fn compare(value: f64, threshold: f64, condition: AlertCondition) -> bool {
    match condition {
        AlertCondition::Above => value > threshold,
        AlertCondition::Below => value < threshold,
        AlertCondition::Near => value <= NEAR_THRESHOLD_PCT,
    }
}

/// Whether `rule` currently holds. Never mutates the rule.
pub fn evaluate_alert(
    rule: &AlertRule,
    snapshot: &IndicatorSnapshot,
    current_price: f64,
) -> Result<bool, SmartTraderError> {
    let indicator = rule.parsed_indicator()?;

    let value = match indicator {
        AlertIndicator::Price => {
            return Ok(match rule.condition {
                AlertCondition::Above => current_price > rule.threshold,
                AlertCondition::Below => current_price < rule.threshold,
                AlertCondition::Near => false,
            });
        }
        AlertIndicator::Rsi => snapshot.rsi.ok_or_else(|| unavailable(indicator))?,
        AlertIndicator::Volatility => snapshot.volatility.ok_or_else(|| unavailable(indicator))?,
        AlertIndicator::Bollinger => {
            let bands = snapshot
                .bollinger_bands
                .ok_or_else(|| unavailable(indicator))?;
            let band = match rule.condition {
                AlertCondition::Above => bands.upper,
                _ => bands.lower,
            };
            pct_deviation(indicator, current_price, band)?
        }
        AlertIndicator::Support | AlertIndicator::Resistance => {
            let levels = snapshot
                .support_resistance
                .ok_or_else(|| unavailable(indicator))?;
            let level = if indicator == AlertIndicator::Support {
                levels.support
            } else {
                levels.resistance
            };
            let distance = pct_deviation(indicator, current_price, level)?.abs();
            return Ok(distance <= NEAR_THRESHOLD_PCT);
        }
    };

    Ok(compare(value, rule.threshold, rule.condition))
}
