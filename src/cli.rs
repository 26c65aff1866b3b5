//! CLI definition and dispatch.
//!
//! Results go to stdout as pretty JSON; diagnostics and logs go to stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::adapters::cached_market_data::{CachedMarketData, MarketDataSettings};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_alert_store::MemoryAlertStore;
use crate::domain::analysis::{analyze, AnalysisResult};
use crate::domain::backtest::{run_backtest, BacktestResult, StrategyParams};
use crate::domain::config_validation::{
    read_strategy_params, validate_config, validate_market_data_config,
    validate_monitor_config, DEFAULT_DATA_DIR, DEFAULT_LOG_LEVEL,
};
use crate::domain::error::SmartTraderError;
use crate::domain::universe::{parse_assets, symbol_for, validate_asset, SUPPORTED_ASSETS};
use crate::monitor::{AlertMonitor, MonitorSettings};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(
    name = "smarttrader",
    about = "Technical analysis, alerts and backtests for crypto assets"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of `<asset>.csv` market charts (overrides [market_data] data_dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one asset, or several separated by commas
    Analyze {
        #[arg(short, long)]
        asset: String,
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },
    /// Backtest the RSI strategy on one asset, or several separated by commas
    Backtest {
        #[arg(short, long)]
        asset: String,
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
        #[arg(long)]
        rsi_oversold: Option<f64>,
        #[arg(long)]
        rsi_overbought: Option<f64>,
        #[arg(long)]
        stop_loss: Option<f64>,
    },
    /// Evaluate every active alert once
    CheckAlerts {
        /// Alerts CSV file (overrides [monitor] alerts_file)
        #[arg(long)]
        alerts: Option<PathBuf>,
    },
    /// Poll alerts in the background
    Monitor {
        #[arg(long)]
        alerts: Option<PathBuf>,
        /// Stop after this many seconds instead of running until killed
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// List supported assets and whether chart data is present
    ListAssets,
    /// Validate a configuration file
    Validate,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub crypto_id: String,
    pub symbol: &'static str,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

#[derive(Debug, Serialize)]
pub struct BacktestReport {
    pub crypto_id: String,
    pub days: u32,
    pub params: StrategyParams,
    #[serde(flatten)]
    pub result: BacktestResult,
}

#[derive(Debug, Serialize)]
pub struct AssetListing {
    pub id: &'static str,
    pub symbol: &'static str,
    pub available: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Analyze { asset, days } => {
            run_analyze(&config, cli.data_dir.as_deref(), &asset, days)
        }
        Command::Backtest {
            asset,
            days,
            rsi_oversold,
            rsi_overbought,
            stop_loss,
        } => {
            let overrides = StrategyOverrides {
                rsi_oversold,
                rsi_overbought,
                stop_loss,
            };
            run_backtest_command(&config, cli.data_dir.as_deref(), &asset, days, &overrides)
        }
        Command::CheckAlerts { alerts } => {
            run_check_alerts(&config, cli.data_dir.as_deref(), alerts.as_deref())
        }
        Command::Monitor {
            alerts,
            duration_secs,
        } => run_monitor(
            &config,
            cli.data_dir.as_deref(),
            alerts.as_deref(),
            duration_secs.map(Duration::from_secs),
        ),
        Command::ListAssets => run_list_assets(&config, cli.data_dir.as_deref()),
        Command::Validate => run_validate(&config, cli.config.as_deref()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Loads the config file, or an empty config when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SmartTraderError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// `[logging] level` from the config file, falling back to the default when
/// there is no readable config.
pub fn log_level(config_path: Option<&Path>) -> String {
    config_path
        .and_then(|p| FileConfigAdapter::from_file(p).ok())
        .and_then(|c| c.get_string("logging", "level"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StrategyOverrides {
    pub rsi_oversold: Option<f64>,
    pub rsi_overbought: Option<f64>,
    pub stop_loss: Option<f64>,
}

/// `[strategy]` values with CLI overrides applied, validated together.
pub fn build_strategy_params(
    config: &dyn ConfigPort,
    overrides: &StrategyOverrides,
) -> Result<StrategyParams, SmartTraderError> {
    let mut params = read_strategy_params(config);
    if let Some(v) = overrides.rsi_oversold {
        params.rsi_oversold = v;
    }
    if let Some(v) = overrides.rsi_overbought {
        params.rsi_overbought = v;
    }
    if let Some(v) = overrides.stop_loss {
        params.stop_loss = v;
    }
    params.validate()?;
    Ok(params)
}

pub fn build_market_data(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<CachedMarketData<CsvAdapter>, SmartTraderError> {
    validate_market_data_config(config)?;
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(
            config
                .get_string("market_data", "data_dir")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        ),
    };
    info!(data_dir = %dir.display(), "using CSV market data");
    Ok(CachedMarketData::new(
        CsvAdapter::new(dir),
        MarketDataSettings::from_config(config),
    ))
}

/// Alerts from `alerts` or `[monitor] alerts_file`, else the built-in rules.
pub fn build_alert_store(
    config: &dyn ConfigPort,
    alerts: Option<&Path>,
) -> Result<MemoryAlertStore, SmartTraderError> {
    let path = alerts
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("monitor", "alerts_file").map(PathBuf::from));
    match path {
        Some(path) => MemoryAlertStore::from_csv_file(path),
        None => {
            info!("no alerts file configured, using built-in rules");
            Ok(MemoryAlertStore::with_default_rules())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SmartTraderError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| SmartTraderError::Data {
        reason: format!("failed to serialize output: {e}"),
    })?;
    println!("{json}");
    Ok(())
}

/// A single report prints as an object, several as an array.
fn print_reports<T: Serialize>(reports: &[T]) -> Result<(), SmartTraderError> {
    match reports {
        [single] => print_json(single),
        _ => print_json(&reports),
    }
}

pub fn analyze_asset(
    market_data: &dyn MarketDataPort,
    asset: &str,
    days: u32,
) -> Result<AnalysisReport, SmartTraderError> {
    let crypto_id = validate_asset(asset)?;
    let chart = market_data.fetch_market_chart(&crypto_id, days)?;
    let (prices, volumes) = chart.normalize()?;
    let symbol = symbol_for(&crypto_id).unwrap_or_default();
    Ok(AnalysisReport {
        crypto_id,
        symbol,
        analysis: analyze(&prices, &volumes)?,
    })
}

/// One report per asset in a comma-separated list, in list order.
pub fn analyze_assets(
    market_data: &dyn MarketDataPort,
    assets: &str,
    days: u32,
) -> Result<Vec<AnalysisReport>, SmartTraderError> {
    parse_assets(assets)?
        .iter()
        .map(|asset| analyze_asset(market_data, asset, days))
        .collect()
}

pub fn backtest_asset(
    market_data: &dyn MarketDataPort,
    asset: &str,
    days: u32,
    params: StrategyParams,
) -> Result<BacktestReport, SmartTraderError> {
    let crypto_id = validate_asset(asset)?;
    let chart = market_data.fetch_market_chart(&crypto_id, days)?;
    let (prices, _) = chart.normalize()?;
    let result = run_backtest(&prices, &params)?;
    Ok(BacktestReport {
        crypto_id,
        days,
        params,
        result,
    })
}

/// One report per asset in a comma-separated list, in list order.
pub fn backtest_assets(
    market_data: &dyn MarketDataPort,
    assets: &str,
    days: u32,
    params: StrategyParams,
) -> Result<Vec<BacktestReport>, SmartTraderError> {
    parse_assets(assets)?
        .iter()
        .map(|asset| backtest_asset(market_data, asset, days, params))
        .collect()
}

fn run_analyze(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
    assets: &str,
    days: u32,
) -> Result<(), SmartTraderError> {
    let market_data = build_market_data(config, data_dir)?;
    print_reports(&analyze_assets(&market_data, assets, days)?)
}

fn run_backtest_command(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
    assets: &str,
    days: u32,
    overrides: &StrategyOverrides,
) -> Result<(), SmartTraderError> {
    let params = build_strategy_params(config, overrides)?;
    let market_data = build_market_data(config, data_dir)?;
    let reports = backtest_assets(&market_data, assets, days, params)?;
    for report in &reports {
        info!(
            asset = %report.crypto_id,
            total_trades = report.result.total_trades,
            "backtest complete"
        );
    }
    print_reports(&reports)
}

fn build_monitor(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
    alerts: Option<&Path>,
) -> Result<AlertMonitor, SmartTraderError> {
    validate_monitor_config(config)?;
    let market_data = Arc::new(build_market_data(config, data_dir)?);
    let store = Arc::new(build_alert_store(config, alerts)?);
    Ok(AlertMonitor::new(
        market_data,
        store,
        MonitorSettings::from_config(config),
    ))
}

fn run_check_alerts(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
    alerts: Option<&Path>,
) -> Result<(), SmartTraderError> {
    let monitor = build_monitor(config, data_dir, alerts)?;
    print_json(&monitor.run_cycle()?)
}

fn run_monitor(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
    alerts: Option<&Path>,
    duration: Option<Duration>,
) -> Result<(), SmartTraderError> {
    let handle = build_monitor(config, data_dir, alerts)?.spawn();
    let outcome = match duration {
        Some(duration) => {
            thread::sleep(duration);
            handle.shutdown()
        }
        None => handle.join(),
    };
    outcome.map_err(|_| SmartTraderError::Data {
        reason: "alert monitor thread panicked".to_string(),
    })
}

fn run_list_assets(
    config: &FileConfigAdapter,
    data_dir: Option<&Path>,
) -> Result<(), SmartTraderError> {
    let market_data = build_market_data(config, data_dir)?;
    let present = market_data.list_assets().unwrap_or_default();
    let listing: Vec<AssetListing> = SUPPORTED_ASSETS
        .iter()
        .map(|&(id, symbol)| AssetListing {
            id,
            symbol,
            available: present.iter().any(|p| p == id),
        })
        .collect();
    print_json(&listing)
}

fn run_validate(
    config: &FileConfigAdapter,
    config_path: Option<&Path>,
) -> Result<(), SmartTraderError> {
    let path = config_path.ok_or_else(|| SmartTraderError::ConfigMissing {
        section: "cli".to_string(),
        key: "config".to_string(),
    })?;
    validate_config(config)?;
    eprintln!("Configuration valid: {}", path.display());
    Ok(())
}
