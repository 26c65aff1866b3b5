//! In-memory alert store, optionally seeded from a CSV file.
//!
//! Columns: `id,crypto_id,indicator,threshold,condition,description,status,notification_sent`.
//! Writes stay in memory; the source file is never rewritten.

use crate::domain::alert::{default_alert_rules, AlertRule};
use crate::domain::error::SmartTraderError;
use crate::ports::alert_store::AlertStore;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

pub struct MemoryAlertStore {
    rules: Mutex<Vec<AlertRule>>,
}

impl MemoryAlertStore {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_alert_rules())
    }

    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, SmartTraderError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let rules = parse_alerts_csv(&content).map_err(|e| SmartTraderError::Data {
            reason: format!("{}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), rules = rules.len(), "loaded alert rules");
        Ok(Self::new(rules))
    }

    /// Every stored rule, deleted ones included.
    pub fn all(&self) -> Vec<AlertRule> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AlertRule>> {
        self.rules.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn parse_alerts_csv(content: &str) -> Result<Vec<AlertRule>, SmartTraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rules = Vec::new();
    let mut ids = HashSet::new();
    for (line, record) in rdr.deserialize::<AlertRule>().enumerate() {
        let rule = record.map_err(|e| SmartTraderError::Data {
            reason: format!("alert row {}: {}", line + 1, e),
        })?;
        if !ids.insert(rule.id) {
            return Err(SmartTraderError::Data {
                reason: format!("duplicate alert id {}", rule.id),
            });
        }
        rules.push(rule);
    }
    Ok(rules)
}

impl AlertStore for MemoryAlertStore {
    fn active_alerts(&self) -> Result<Vec<AlertRule>, SmartTraderError> {
        Ok(self.lock().iter().filter(|r| r.is_active()).cloned().collect())
    }

    fn mark_triggered(&self, id: i64, value: f64) -> Result<(), SmartTraderError> {
        let mut rules = self.lock();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SmartTraderError::Data {
                reason: format!("no alert with id {}", id),
            })?;
        rule.triggered_value = Some(value);
        rule.notification_sent = true;
        debug!(id, value, "alert marked as triggered");
        Ok(())
    }
}
