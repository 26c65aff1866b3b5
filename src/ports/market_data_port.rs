//! Market data access port trait.

use crate::domain::error::SmartTraderError;
use crate::domain::series::MarketChart;
use crate::domain::universe::SUPPORTED_ASSETS;

/// Source of raw market charts.
///
/// Implementations are shared between the alert monitor thread and command
/// handlers, hence `Send + Sync`. A failure worth retrying is reported as
/// `SmartTraderError::MarketData`; see `SmartTraderError::is_transient`.
pub trait MarketDataPort: Send + Sync {
    /// Chart covering the last `days` days for `asset`, oldest point first.
    fn fetch_market_chart(&self, asset: &str, days: u32) -> Result<MarketChart, SmartTraderError>;

    fn list_assets(&self) -> Result<Vec<String>, SmartTraderError> {
        Ok(SUPPORTED_ASSETS.iter().map(|(id, _)| id.to_string()).collect())
    }
}
