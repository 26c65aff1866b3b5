//! Core domain types and logic.

pub mod alert;
pub mod analysis;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod pattern;
pub mod position;
pub mod recommendation;
pub mod series;
pub mod snapshot;
pub mod strength;
pub mod universe;
