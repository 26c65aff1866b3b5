//! Port traits: the I/O seams between the domain and its adapters.

pub mod alert_store;
pub mod config_port;
pub mod market_data_port;
