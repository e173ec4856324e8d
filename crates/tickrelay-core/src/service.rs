//! Cache-fronted market data service.
//!
//! The request pipeline: consult the cache, on miss invoke
//! the upstream source, store the result, hand the caller a read-only
//! snapshot. Upstream errors propagate unmodified and are never cached.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::clock::Clock;
use crate::data_source::{BarsQuery, EventsQuery, MarketDataSource, SourceError};
use crate::{CorporateEvent, DateRange, PriceBar, Ticker};

/// Freshness and capacity knobs for the per-endpoint caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub bars_freshness: Duration,
    pub events_freshness: Duration,
    pub capacity: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            bars_freshness: Duration::from_secs(300),
            events_freshness: Duration::from_secs(3600),
            capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    ticker: Ticker,
    range: DateRange,
}

/// Upstream client plus request cache, shared across request tasks.
pub struct MarketDataService {
    source: Arc<dyn MarketDataSource>,
    bars_cache: QueryCache<QueryKey, Vec<PriceBar>>,
    events_cache: QueryCache<QueryKey, Vec<CorporateEvent>>,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn MarketDataSource>, policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            bars_cache: QueryCache::new(policy.capacity, policy.bars_freshness, Arc::clone(&clock)),
            events_cache: QueryCache::new(policy.capacity, policy.events_freshness, clock),
        }
    }

    /// Daily price bars for the window, served from cache when fresh.
    pub async fn price_bars(
        &self,
        ticker: Ticker,
        range: DateRange,
    ) -> Result<Arc<Vec<PriceBar>>, SourceError> {
        let key = QueryKey {
            ticker: ticker.clone(),
            range,
        };

        if let Some(bars) = self.bars_cache.get(&key) {
            tracing::debug!(ticker = %ticker, provider = %self.source.id(), "bars cache hit");
            return Ok(bars);
        }

        tracing::info!(
            ticker = %ticker,
            start = %range.start(),
            end = %range.end(),
            provider = %self.source.id(),
            "fetching price bars upstream"
        );

        // The cache lock is not held here; a concurrent duplicate fetch on
        // a miss race is acceptable.
        let bars = self
            .source
            .price_bars(BarsQuery::new(ticker.clone(), range))
            .await
            .inspect_err(|error| {
                tracing::error!(ticker = %ticker, error = %error, "price bar fetch failed");
            })?;

        tracing::info!(ticker = %ticker, rows = bars.len(), "received price bars");

        let bars = Arc::new(bars);
        self.bars_cache.put(key, Arc::clone(&bars));
        Ok(bars)
    }

    /// Dividend and split history for the window, served from cache when fresh.
    pub async fn corporate_events(
        &self,
        ticker: Ticker,
        range: DateRange,
    ) -> Result<Arc<Vec<CorporateEvent>>, SourceError> {
        let key = QueryKey {
            ticker: ticker.clone(),
            range,
        };

        if let Some(events) = self.events_cache.get(&key) {
            tracing::debug!(ticker = %ticker, provider = %self.source.id(), "events cache hit");
            return Ok(events);
        }

        tracing::info!(
            ticker = %ticker,
            start = %range.start(),
            end = %range.end(),
            provider = %self.source.id(),
            "fetching corporate events upstream"
        );

        let events = self
            .source
            .corporate_events(EventsQuery::new(ticker.clone(), range))
            .await
            .inspect_err(|error| {
                tracing::error!(ticker = %ticker, error = %error, "corporate event fetch failed");
            })?;

        let events = Arc::new(events);
        self.events_cache.put(key, Arc::clone(&events));
        Ok(events)
    }
}
