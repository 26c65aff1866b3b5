//! Aggregate trade statistics for a backtest run.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Sum of per-trade percentage P&L.
    pub profit_loss: f64,
}

impl TradeStats {
    pub fn record(&mut self, pnl_pct: f64) {
        self.total_trades += 1;
        self.profit_loss += pnl_pct;
        if pnl_pct > 0.0 {
            self.winning_trades += 1;
        }
    }

    /// Winning trades as a percentage of all trades; 0 without trades.
    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            0.0
        } else {
            self.winning_trades as f64 / self.total_trades as f64 * 100.0
        }
    }
}
