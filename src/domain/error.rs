//! Domain error types.

use std::fmt;

/// Top-level error type for smarttrader.
#[derive(Debug, thiserror::Error)]
pub enum SmartTraderError {
    #[error("insufficient data for {indicator}: have {have} prices, need {need}")]
    InsufficientData {
        indicator: String,
        have: usize,
        need: usize,
    },

    #[error("invalid series: {reason}")]
    InvalidSeries { reason: String },

    #[error("degenerate {indicator} computation: {reason}")]
    ComputationDegenerate { indicator: String, reason: String },

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("indicator {indicator} not present in snapshot")]
    IndicatorUnavailable { indicator: String },

    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("market data fetch failed for {asset}: {reason}")]
    MarketData { asset: String, reason: String },

    #[error("market data unavailable for {asset}")]
    MarketDataUnavailable { asset: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SmartTraderError {
    pub(crate) fn insufficient(indicator: impl fmt::Display, have: usize, need: usize) -> Self {
        SmartTraderError::InsufficientData {
            indicator: indicator.to_string(),
            have,
            need,
        }
    }

    pub(crate) fn degenerate(indicator: impl fmt::Display, reason: impl Into<String>) -> Self {
        SmartTraderError::ComputationDegenerate {
            indicator: indicator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_series(reason: impl Into<String>) -> Self {
        SmartTraderError::InvalidSeries {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same upstream request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SmartTraderError::MarketData { .. })
    }
}

impl From<&SmartTraderError> for std::process::ExitCode {
    fn from(err: &SmartTraderError) -> Self {
        let code: u8 = match err {
            SmartTraderError::Io(_) => 1,
            SmartTraderError::ConfigParse { .. }
            | SmartTraderError::ConfigMissing { .. }
            | SmartTraderError::ConfigInvalid { .. } => 2,
            SmartTraderError::UnsupportedAsset(_)
            | SmartTraderError::MarketData { .. }
            | SmartTraderError::MarketDataUnavailable { .. }
            | SmartTraderError::Data { .. } => 3,
            SmartTraderError::UnknownIndicator(_)
            | SmartTraderError::IndicatorUnavailable { .. } => 4,
            SmartTraderError::InsufficientData { .. }
            | SmartTraderError::InvalidSeries { .. }
            | SmartTraderError::ComputationDegenerate { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
