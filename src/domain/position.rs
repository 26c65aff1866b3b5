//! Backtest position tracking.

use serde::Serialize;

/// Take-profit distance as a multiple of the stop-loss distance.
pub const TAKE_PROFIT_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    /// Stop-loss distance as a fraction of the entry price.
    pub stop_loss: f64,
}

impl Position {
    pub fn stop_loss_price(&self) -> f64 {
        match self.side {
            Side::Long => self.entry_price * (1.0 - self.stop_loss),
            Side::Short => self.entry_price * (1.0 + self.stop_loss),
        }
    }

    pub fn take_profit_price(&self) -> f64 {
        let distance = self.stop_loss * TAKE_PROFIT_MULTIPLIER;
        match self.side {
            Side::Long => self.entry_price * (1.0 + distance),
            Side::Short => self.entry_price * (1.0 - distance),
        }
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss_price(),
            Side::Short => price >= self.stop_loss_price(),
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit_price(),
            Side::Short => price <= self.take_profit_price(),
        }
    }

    /// Percentage profit or loss if closed at `price`.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => (price - self.entry_price) / self.entry_price * 100.0,
            Side::Short => (self.entry_price - price) / self.entry_price * 100.0,
        }
    }
}
