//! smarttrader: technical analysis, alerting and strategy backtesting for crypto assets.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The alert polling task lives in
//! [`monitor`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod monitor;
pub mod cli;
