//! Backtest engine: bar-by-bar replay of an RSI mean-reversion strategy.
//!
//! From bar 50 through the second-to-last bar, RSI(14) is recomputed from a
//! fresh 15-price window and SMA(20) from the trailing 20 prices. At most one
//! position is open at a time:
//! - flat → long when RSI < oversold and price > SMA20 × 1.01
//! - flat → short when RSI > overbought and price < SMA20 × 0.99
//! - long closes on stop-loss, take-profit (1.5× stop distance) or RSI > overbought
//! - short closes on stop-loss, take-profit or RSI < oversold
//!
//! An open position is force-closed at the final price. The returned trade log
//! keeps only the last [`MAX_RETAINED_TRADES`] events; the aggregates cover
//! the whole run.

use crate::domain::error::SmartTraderError;
use crate::domain::indicator::{calculate_rsi, rsi, sma};
use crate::domain::metrics::TradeStats;
use crate::domain::position::{Position, Side};
use crate::domain::series::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const WARMUP_BARS: usize = 50;
pub const MAX_RETAINED_TRADES: usize = 10;
const TREND_SMA_PERIOD: usize = 20;
const TREND_CONFIRMATION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyParams {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Stop-loss distance as a fraction of the entry price.
    pub stop_loss: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            stop_loss: 0.02,
        }
    }
}

fn invalid_param(key: &str, reason: &str) -> SmartTraderError {
    SmartTraderError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), SmartTraderError> {
        if !(0.0..=100.0).contains(&self.rsi_oversold) {
            return Err(invalid_param("rsi_oversold", "rsi_oversold must be between 0 and 100"));
        }
        if !(0.0..=100.0).contains(&self.rsi_overbought) {
            return Err(invalid_param(
                "rsi_overbought",
                "rsi_overbought must be between 0 and 100",
            ));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(invalid_param(
                "rsi_oversold",
                "rsi_oversold must be below rsi_overbought",
            ));
        }
        if !(self.stop_loss > 0.0 && self.stop_loss < 1.0) {
            return Err(invalid_param("stop_loss", "stop_loss must be between 0 and 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TradeEvent {
    Entry {
        position: Side,
        price: f64,
        rsi: f64,
        timestamp: DateTime<Utc>,
    },
    Exit {
        position: Side,
        entry_price: f64,
        exit_price: f64,
        profit_loss: f64,
        rsi: f64,
        timestamp: DateTime<Utc>,
    },
}

impl TradeEvent {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeEvent::Entry { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestResult {
    pub trades: Vec<TradeEvent>,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub profit_loss: f64,
}

/// Full event log plus running stats; truncated only when finished.
#[derive(Debug, Default)]
struct TradeLedger {
    events: Vec<TradeEvent>,
    stats: TradeStats,
}

impl TradeLedger {
    fn open(&mut self, position: &Position, rsi: f64, timestamp: DateTime<Utc>) {
        self.events.push(TradeEvent::Entry {
            position: position.side,
            price: position.entry_price,
            rsi,
            timestamp,
        });
    }

    fn close(&mut self, position: &Position, price: f64, rsi: f64, timestamp: DateTime<Utc>) {
        let pnl = position.pnl_pct(price);
        self.stats.record(pnl);
        self.events.push(TradeEvent::Exit {
            position: position.side,
            entry_price: position.entry_price,
            exit_price: price,
            profit_loss: pnl,
            rsi,
            timestamp,
        });
    }

    fn finish(mut self) -> BacktestResult {
        let keep_from = self.events.len().saturating_sub(MAX_RETAINED_TRADES);
        let trades = self.events.split_off(keep_from);
        BacktestResult {
            trades,
            total_trades: self.stats.total_trades,
            winning_trades: self.stats.winning_trades,
            win_rate: self.stats.win_rate(),
            profit_loss: self.stats.profit_loss,
        }
    }
}

fn exit_triggered(position: &Position, price: f64, rsi: f64, params: &StrategyParams) -> bool {
    let reversal = match position.side {
        Side::Long => rsi > params.rsi_overbought,
        Side::Short => rsi < params.rsi_oversold,
    };
    position.should_stop_loss(price) || position.should_take_profit(price) || reversal
}

fn entry_side(price: f64, rsi: f64, sma_20: f64, params: &StrategyParams) -> Option<Side> {
    if rsi < params.rsi_oversold && price > sma_20 * (1.0 + TREND_CONFIRMATION) {
        Some(Side::Long)
    } else if rsi > params.rsi_overbought && price < sma_20 * (1.0 - TREND_CONFIRMATION) {
        Some(Side::Short)
    } else {
        None
    }
}

pub fn run_backtest(
    series: &PriceSeries,
    params: &StrategyParams,
) -> Result<BacktestResult, SmartTraderError> {
    params.validate()?;

    if series.len() < WARMUP_BARS {
        debug!(bars = series.len(), "too few bars to backtest");
        return Ok(BacktestResult::default());
    }

    let prices = series.prices();
    let timestamps = series.timestamps();
    let mut ledger = TradeLedger::default();
    let mut position: Option<Position> = None;
    let mut last_rsi = f64::NAN;

    for i in WARMUP_BARS..prices.len() - 1 {
        let price = prices[i];
        let rsi = calculate_rsi(
            &prices[i.saturating_sub(rsi::DEFAULT_PERIOD)..=i],
            rsi::DEFAULT_PERIOD,
        )?;
        let sma_20 = sma::latest_sma(&prices[..=i], TREND_SMA_PERIOD)?;
        last_rsi = rsi;

        match position {
            None => {
                if let Some(side) = entry_side(price, rsi, sma_20, params) {
                    let opened = Position {
                        side,
                        entry_price: price,
                        stop_loss: params.stop_loss,
                    };
                    ledger.open(&opened, rsi, timestamps[i]);
                    position = Some(opened);
                }
            }
            Some(open) => {
                if exit_triggered(&open, price, rsi, params) {
                    ledger.close(&open, price, rsi, timestamps[i]);
                    position = None;
                }
            }
        }
    }

    if let Some(open) = position {
        let last = prices.len() - 1;
        ledger.close(&open, prices[last], last_rsi, timestamps[last]);
    }

    let result = ledger.finish();
    debug!(
        total_trades = result.total_trades,
        win_rate = result.win_rate,
        profit_loss = result.profit_loss,
        "backtest finished"
    );
    Ok(result)
}
