//! Configuration validation.
//!
//! Every key is optional; absent keys take their defaults. Present keys must
//! hold values the rest of the crate can run with.

use crate::domain::backtest::StrategyParams;
use crate::domain::error::SmartTraderError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CACHE_TTL_SECS: i64 = 60;
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: i64 = 1500;
pub const DEFAULT_MAX_RETRIES: i64 = 5;
pub const DEFAULT_RETRY_BASE_DELAY_MS: i64 = 2000;
pub const DEFAULT_POLL_INTERVAL_SECS: i64 = 60;
pub const DEFAULT_WINDOW_DAYS: i64 = 1;
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SmartTraderError {
    SmartTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SmartTraderError> {
    strategy_params(config)?;
    validate_market_data_config(config)?;
    validate_monitor_config(config)?;
    Ok(())
}

/// `[strategy]` over the defaults, not yet validated.
pub fn read_strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let defaults = StrategyParams::default();
    StrategyParams {
        rsi_oversold: config.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
        rsi_overbought: config.get_double("strategy", "rsi_overbought", defaults.rsi_overbought),
        stop_loss: config.get_double("strategy", "stop_loss", defaults.stop_loss),
    }
}

pub fn strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, SmartTraderError> {
    let params = read_strategy_params(config);
    params.validate()?;
    Ok(params)
}

pub fn validate_market_data_config(config: &dyn ConfigPort) -> Result<(), SmartTraderError> {
    if let Some(dir) = config.get_string("market_data", "data_dir") {
        if dir.trim().is_empty() {
            return Err(invalid("market_data", "data_dir", "data_dir must not be empty"));
        }
    }
    let ttl = config.get_int("market_data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);
    if ttl < 0 {
        return Err(invalid(
            "market_data",
            "cache_ttl_secs",
            "cache_ttl_secs must be non-negative",
        ));
    }
    let interval = config.get_int(
        "market_data",
        "min_request_interval_ms",
        DEFAULT_MIN_REQUEST_INTERVAL_MS,
    );
    if interval < 0 {
        return Err(invalid(
            "market_data",
            "min_request_interval_ms",
            "min_request_interval_ms must be non-negative",
        ));
    }
    let retries = config.get_int("market_data", "max_retries", DEFAULT_MAX_RETRIES);
    if retries < 1 {
        return Err(invalid(
            "market_data",
            "max_retries",
            "max_retries must be at least 1",
        ));
    }
    let delay = config.get_int(
        "market_data",
        "retry_base_delay_ms",
        DEFAULT_RETRY_BASE_DELAY_MS,
    );
    if delay < 0 {
        return Err(invalid(
            "market_data",
            "retry_base_delay_ms",
            "retry_base_delay_ms must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_monitor_config(config: &dyn ConfigPort) -> Result<(), SmartTraderError> {
    let poll = config.get_int("monitor", "poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS);
    if poll < 1 {
        return Err(invalid(
            "monitor",
            "poll_interval_secs",
            "poll_interval_secs must be at least 1",
        ));
    }
    let window = config.get_int("monitor", "window_days", DEFAULT_WINDOW_DAYS);
    if window < 1 {
        return Err(invalid("monitor", "window_days", "window_days must be at least 1"));
    }
    if let Some(path) = config.get_string("monitor", "alerts_file") {
        if path.trim().is_empty() {
            return Err(invalid("monitor", "alerts_file", "alerts_file must not be empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: SmartTraderError) -> String {
        match err {
            SmartTraderError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {:?}", other),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("");
        assert!(validate_config(&config).is_ok());
        assert_eq!(strategy_params(&config).unwrap(), StrategyParams::default());
    }

    #[test]
    fn full_valid_config_passes() {
        let config = make_config(
            r#"
[strategy]
rsi_oversold = 25
rsi_overbought = 75
stop_loss = 0.03

[market_data]
data_dir = /var/lib/smarttrader
cache_ttl_secs = 120
min_request_interval_ms = 500
max_retries = 3
retry_base_delay_ms = 100

[monitor]
poll_interval_secs = 30
window_days = 7
alerts_file = alerts.csv

[logging]
level = debug
"#,
        );
        assert!(validate_config(&config).is_ok());
        let params = strategy_params(&config).unwrap();
        assert_eq!(params.rsi_oversold, 25.0);
        assert_eq!(params.rsi_overbought, 75.0);
        assert_eq!(params.stop_loss, 0.03);
    }

    #[test]
    fn oversold_above_overbought_fails() {
        let config = make_config("[strategy]\nrsi_oversold = 80\nrsi_overbought = 70\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "rsi_oversold");
    }

    #[test]
    fn overbought_out_of_range_fails() {
        let config = make_config("[strategy]\nrsi_overbought = 120\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "rsi_overbought");
    }

    #[test]
    fn stop_loss_zero_fails() {
        let config = make_config("[strategy]\nstop_loss = 0\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "stop_loss");
    }

    #[test]
    fn stop_loss_one_fails() {
        let config = make_config("[strategy]\nstop_loss = 1.0\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "stop_loss");
    }

    #[test]
    fn max_retries_zero_fails() {
        let config = make_config("[market_data]\nmax_retries = 0\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "max_retries");
    }

    #[test]
    fn negative_ttl_fails() {
        let config = make_config("[market_data]\ncache_ttl_secs = -1\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "cache_ttl_secs");
    }

    #[test]
    fn poll_interval_zero_fails() {
        let config = make_config("[monitor]\npoll_interval_secs = 0\n");
        assert_eq!(
            invalid_key(validate_config(&config).unwrap_err()),
            "poll_interval_secs"
        );
    }

    #[test]
    fn window_days_zero_fails() {
        let config = make_config("[monitor]\nwindow_days = 0\n");
        assert_eq!(invalid_key(validate_config(&config).unwrap_err()), "window_days");
    }
}
