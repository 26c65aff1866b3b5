//! Concrete adapter implementations for ports.

pub mod cached_market_data;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod memory_alert_store;
