//! CSV file market data adapter.
//!
//! One file per asset, `<asset>.csv`, with a `timestamp,price,volume` header.
//! Timestamps are epoch milliseconds. The volume column may be left empty on
//! every row, in which case the chart carries no volumes.

use crate::domain::error::SmartTraderError;
use crate::domain::series::MarketChart;
use crate::ports::market_data_port::MarketDataPort;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Deserialize)]
struct ChartRow {
    timestamp: i64,
    price: f64,
    volume: Option<f64>,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", asset))
    }

    fn read_rows(&self, asset: &str) -> Result<Vec<ChartRow>, SmartTraderError> {
        let path = self.csv_path(asset);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SmartTraderError::MarketDataUnavailable {
                asset: asset.to_string(),
            },
            _ => SmartTraderError::MarketData {
                asset: asset.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        rdr.deserialize()
            .collect::<Result<Vec<ChartRow>, _>>()
            .map_err(|e| SmartTraderError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_market_chart(&self, asset: &str, days: u32) -> Result<MarketChart, SmartTraderError> {
        let mut rows = self.read_rows(asset)?;
        rows.sort_by_key(|r| r.timestamp);

        if let Some(last) = rows.last() {
            let cutoff = last.timestamp.saturating_sub(i64::from(days) * DAY_MS);
            rows.retain(|r| r.timestamp >= cutoff);
        }

        let with_volume = rows.iter().filter(|r| r.volume.is_some()).count();
        if with_volume != 0 && with_volume != rows.len() {
            return Err(SmartTraderError::Data {
                reason: format!(
                    "{}: {} of {} rows have a volume",
                    asset,
                    with_volume,
                    rows.len()
                ),
            });
        }

        debug!(asset, days, points = rows.len(), "loaded market chart from CSV");
        Ok(MarketChart {
            prices: rows.iter().map(|r| (r.timestamp, r.price)).collect(),
            total_volumes: rows
                .iter()
                .filter_map(|r| r.volume.map(|v| (r.timestamp, v)))
                .collect(),
        })
    }

    fn list_assets(&self) -> Result<Vec<String>, SmartTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SmartTraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut assets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SmartTraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(asset) = name.to_string_lossy().strip_suffix(".csv") {
                assets.push(asset.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }
}
