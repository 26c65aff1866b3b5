//! Caching, throttling and retrying wrapper around any [`MarketDataPort`].
//!
//! One instance is built per process and shared by reference, so the cache
//! and the request throttle are owned state rather than globals. Lookups:
//!
//! 1. reject assets outside the supported universe
//! 2. serve a cached chart younger than the TTL
//! 3. otherwise fetch, waiting out the minimum request interval first and
//!    retrying transient failures with a doubling delay
//! 4. when every attempt failed, serve the last cached chart however old,
//!    or report `MarketDataUnavailable`

use crate::domain::config_validation::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES, DEFAULT_MIN_REQUEST_INTERVAL_MS,
    DEFAULT_RETRY_BASE_DELAY_MS,
};
use crate::domain::error::SmartTraderError;
use crate::domain::series::MarketChart;
use crate::domain::universe::validate_asset;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketDataSettings {
    pub cache_ttl: Duration,
    pub min_request_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS as u64),
            min_request_interval: Duration::from_millis(DEFAULT_MIN_REQUEST_INTERVAL_MS as u64),
            retry: RetryPolicy {
                max_attempts: DEFAULT_MAX_RETRIES as u32,
                base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS as u64),
            },
        }
    }
}

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

impl MarketDataSettings {
    /// Reads `[market_data]`; run `validate_market_data_config` first to
    /// reject out-of-range values instead of clamping them.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let ttl = config.get_int("market_data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);
        let interval = config.get_int(
            "market_data",
            "min_request_interval_ms",
            DEFAULT_MIN_REQUEST_INTERVAL_MS,
        );
        let retries = config.get_int("market_data", "max_retries", DEFAULT_MAX_RETRIES);
        let delay = config.get_int(
            "market_data",
            "retry_base_delay_ms",
            DEFAULT_RETRY_BASE_DELAY_MS,
        );
        Self {
            cache_ttl: Duration::from_secs(non_negative(ttl)),
            min_request_interval: Duration::from_millis(non_negative(interval)),
            retry: RetryPolicy {
                max_attempts: retries.clamp(1, i64::from(u32::MAX)) as u32,
                base_delay: Duration::from_millis(non_negative(delay)),
            },
        }
    }
}

struct CacheEntry {
    chart: MarketChart,
    fetched_at: Instant,
}

/// Charts keyed by (asset, days).
pub struct MarketDataCache {
    ttl: Duration,
    entries: HashMap<(String, u32), CacheEntry>,
}

impl MarketDataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get_fresh(&self, asset: &str, days: u32) -> Option<MarketChart> {
        self.entries
            .get(&(asset.to_string(), days))
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.chart.clone())
    }

    pub fn get_stale(&self, asset: &str, days: u32) -> Option<MarketChart> {
        self.entries
            .get(&(asset.to_string(), days))
            .map(|e| e.chart.clone())
    }

    pub fn insert(&mut self, asset: &str, days: u32, chart: MarketChart) {
        self.entries.insert(
            (asset.to_string(), days),
            CacheEntry {
                chart,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Enforces a minimum delay between consecutive upstream requests.
pub struct Throttle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Blocks until a request may be sent, then records it.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct CachedMarketData<P> {
    inner: P,
    cache: Mutex<MarketDataCache>,
    throttle: Mutex<Throttle>,
    retry: RetryPolicy,
}

impl<P: MarketDataPort> CachedMarketData<P> {
    pub fn new(inner: P, settings: MarketDataSettings) -> Self {
        Self {
            inner,
            cache: Mutex::new(MarketDataCache::new(settings.cache_ttl)),
            throttle: Mutex::new(Throttle::new(settings.min_request_interval)),
            retry: settings.retry,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        lock(&self.cache).len()
    }

    fn fetch_with_retry(&self, asset: &str, days: u32) -> Result<MarketChart, SmartTraderError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            // The throttle lock is held across the request so that concurrent
            // callers queue behind it.
            let result = {
                let mut throttle = lock(&self.throttle);
                throttle.wait();
                self.inner.fetch_market_chart(asset, days)
            };

            match result {
                Ok(chart) => return Ok(chart),
                Err(e) if e.is_transient() => {
                    warn!(asset, attempt = attempt + 1, attempts, error = %e, "market data fetch failed");
                    if attempt + 1 < attempts {
                        thread::sleep(self.retry.delay_for(attempt));
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| SmartTraderError::MarketDataUnavailable {
            asset: asset.to_string(),
        }))
    }
}

impl<P: MarketDataPort> MarketDataPort for CachedMarketData<P> {
    fn fetch_market_chart(&self, asset: &str, days: u32) -> Result<MarketChart, SmartTraderError> {
        let asset = validate_asset(asset)?;

        if let Some(chart) = lock(&self.cache).get_fresh(&asset, days) {
            debug!(asset = %asset, days, "market data cache hit");
            return Ok(chart);
        }

        match self.fetch_with_retry(&asset, days) {
            Ok(chart) => {
                lock(&self.cache).insert(&asset, days, chart.clone());
                Ok(chart)
            }
            Err(e) if e.is_transient() => match lock(&self.cache).get_stale(&asset, days) {
                Some(chart) => {
                    warn!(asset = %asset, days, "serving stale market data after failed fetch");
                    Ok(chart)
                }
                None => Err(SmartTraderError::MarketDataUnavailable { asset }),
            },
            Err(e) => Err(e),
        }
    }

    fn list_assets(&self) -> Result<Vec<String>, SmartTraderError> {
        self.inner.list_assets()
    }
}
