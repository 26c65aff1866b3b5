//! Background alert monitor.
//!
//! Every poll interval one cycle walks all active rules, re-analyzes each
//! rule's asset over the configured window and records the rules that fire
//! for the first time. A failing rule is logged and counted; it never stops
//! the cycle. [`MonitorHandle::shutdown`] stops the loop between cycles.

use crate::domain::alert::{evaluate_alert, AlertRule};
use crate::domain::config_validation::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WINDOW_DAYS};
use crate::domain::error::SmartTraderError;
use crate::domain::snapshot::compute_snapshot;
use crate::ports::alert_store::AlertStore;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub window_days: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS as u64),
            window_days: DEFAULT_WINDOW_DAYS as u32,
        }
    }
}

impl MonitorSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let poll = config.get_int("monitor", "poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS);
        let window = config.get_int("monitor", "window_days", DEFAULT_WINDOW_DAYS);
        Self {
            poll_interval: Duration::from_secs(poll.max(1) as u64),
            window_days: window.clamp(1, i64::from(u32::MAX)) as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredAlert {
    pub id: i64,
    pub crypto_id: String,
    pub indicator: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub checked: usize,
    pub triggered: Vec<TriggeredAlert>,
    /// Rules whose condition holds but were notified in an earlier cycle.
    pub already_notified: usize,
    pub failed: usize,
}

enum RuleOutcome {
    Quiet,
    Triggered(TriggeredAlert),
    AlreadyNotified,
}

pub struct AlertMonitor {
    market_data: Arc<dyn MarketDataPort>,
    store: Arc<dyn AlertStore>,
    settings: MonitorSettings,
}

impl AlertMonitor {
    pub fn new(
        market_data: Arc<dyn MarketDataPort>,
        store: Arc<dyn AlertStore>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            market_data,
            store,
            settings,
        }
    }

    fn check_rule(&self, rule: &AlertRule) -> Result<RuleOutcome, SmartTraderError> {
        let chart = self
            .market_data
            .fetch_market_chart(&rule.crypto_id, self.settings.window_days)?;
        let (prices, _) = chart.normalize()?;
        let current_price = prices.latest().price;
        let snapshot = compute_snapshot(&prices.prices());

        if !evaluate_alert(rule, &snapshot, current_price)? {
            return Ok(RuleOutcome::Quiet);
        }
        if rule.notification_sent {
            return Ok(RuleOutcome::AlreadyNotified);
        }

        let value = rule.trigger_value(current_price)?;
        self.store.mark_triggered(rule.id, value)?;
        Ok(RuleOutcome::Triggered(TriggeredAlert {
            id: rule.id,
            crypto_id: rule.crypto_id.clone(),
            indicator: rule.indicator.clone(),
            value,
            description: rule.description.clone(),
        }))
    }

    /// One pass over every active rule.
    pub fn run_cycle(&self) -> Result<CycleReport, SmartTraderError> {
        let rules = self.store.active_alerts()?;
        let mut report = CycleReport::default();

        for rule in &rules {
            report.checked += 1;
            match self.check_rule(rule) {
                Ok(RuleOutcome::Quiet) => {}
                Ok(RuleOutcome::AlreadyNotified) => report.already_notified += 1,
                Ok(RuleOutcome::Triggered(alert)) => {
                    info!(
                        id = alert.id,
                        asset = %alert.crypto_id,
                        indicator = %alert.indicator,
                        value = alert.value,
                        description = alert.description.as_deref().unwrap_or(""),
                        "alert triggered"
                    );
                    report.triggered.push(alert);
                }
                Err(e) => {
                    warn!(id = rule.id, asset = %rule.crypto_id, error = %e, "alert check failed");
                    report.failed += 1;
                }
            }
        }

        debug!(
            checked = report.checked,
            triggered = report.triggered.len(),
            failed = report.failed,
            "alert cycle finished"
        );
        Ok(report)
    }

    /// Runs cycles on a dedicated thread until the handle is shut down.
    pub fn spawn(self) -> MonitorHandle {
        let (shutdown, signal) = mpsc::channel::<()>();
        let thread = thread::spawn(move || {
            info!(
                poll_interval_secs = self.settings.poll_interval.as_secs(),
                window_days = self.settings.window_days,
                "alert monitor started"
            );
            loop {
                if let Err(e) = self.run_cycle() {
                    error!(error = %e, "alert cycle aborted");
                }
                match signal.recv_timeout(self.settings.poll_interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("alert monitor stopped");
        });
        MonitorHandle { shutdown, thread }
    }
}

pub struct MonitorHandle {
    shutdown: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signals the loop and waits for the current cycle to finish.
    pub fn shutdown(self) -> thread::Result<()> {
        // A send error means the thread already exited.
        let _ = self.shutdown.send(());
        self.thread.join()
    }

    /// Blocks until the monitor thread exits on its own.
    pub fn join(self) -> thread::Result<()> {
        let MonitorHandle { shutdown, thread } = self;
        let result = thread.join();
        drop(shutdown);
        result
    }
}
