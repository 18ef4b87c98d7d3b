use moka::future::Cache;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_CAPACITY: u64 = 1000;

/// Time-based revalidation for read-only CMS responses, keyed by request URL.
/// Bounded: once `max_capacity` URLs are held, older or colder ones are evicted.
#[derive(Clone)]
pub struct ResponseCache {
    // None when the TTL is zero
    inner: Option<Cache<String, Value>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    pub async fn get(&self, url: &str) -> Option<Value> {
        self.inner.as_ref()?.get(url).await
    }

    pub async fn put(&self, url: String, value: Value) {
        if let Some(cache) = &self.inner {
            cache.insert(url, value).await;
        }
    }

    #[cfg(test)]
    async fn entry_count(&self) -> u64 {
        match &self.inner {
            Some(cache) => {
                cache.run_pending_tasks().await;
                cache.entry_count()
            }
            None => 0,
        }
    }
}
