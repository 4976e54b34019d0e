use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::{Row, RowSource, SheetError};

/// Short-lived memo of decoded rows, keyed by export URL.
///
/// Only successful fetches are stored. Concurrent misses each hit the
/// inner source.
pub struct CachedRowSource<S> {
    inner: S,
    ttl: Duration,
    entries: DashMap<String, (Instant, Vec<Row>)>,
}

impl<S: RowSource> CachedRowSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    fn fresh(&self, key: &str) -> Option<Vec<Row>> {
        let entry = self.entries.get(key)?;
        let (stored_at, rows) = entry.value();
        (stored_at.elapsed() < self.ttl).then(|| rows.clone())
    }
}

#[async_trait]
impl<S: RowSource> RowSource for CachedRowSource<S> {
    fn csv_url(&self) -> Result<String, SheetError> {
        self.inner.csv_url()
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>, SheetError> {
        let key = self.inner.csv_url()?;

        if let Some(rows) = self.fresh(&key) {
            tracing::debug!(rows = rows.len(), "Serving sheet rows from cache");
            return Ok(rows);
        }

        let rows = self.inner.fetch_rows().await?;
        self.entries.insert(key, (Instant::now(), rows.clone()));
        Ok(rows)
    }
}
