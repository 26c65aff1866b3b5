//! Alert rule storage port trait.

use crate::domain::alert::AlertRule;
use crate::domain::error::SmartTraderError;

pub trait AlertStore: Send + Sync {
    /// Rules with status `active`, including already-notified ones.
    fn active_alerts(&self) -> Result<Vec<AlertRule>, SmartTraderError>;

    /// Records that `id` fired with `value` and marks it notified.
    fn mark_triggered(&self, id: i64, value: f64) -> Result<(), SmartTraderError>;
}
