//! Process-lifetime TTL cache.
//!
//! Values are stored as JSON so a single cache instance can hold snapshot
//! lists and insight results side by side. Every operation takes the lock
//! once; there is no invariant spanning two calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::clock::{Clock, SystemClock};

/// Default entry lifetime (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached payload with its creation time and lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// `now > created_at + ttl`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => self.created_at.checked_add_signed(ttl).is_some_and(|expires| now > expires),
            Err(_) => false,
        }
    }
}

/// Size and key listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Shared TTL cache handle.
///
/// Cloning is cheap and every clone addresses the same entries.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry<serde_json::Value>>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    max_entries: Option<usize>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, None)
    }
}

impl ResultCache {
    /// Create a cache on the system clock.
    pub fn new(default_ttl: Duration, max_entries: Option<usize>) -> Self {
        Self::with_clock(default_ttl, max_entries, Arc::new(SystemClock))
    }

    /// Create a cache on a caller-supplied clock.
    pub fn with_clock(default_ttl: Duration, max_entries: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), clock, default_ttl, max_entries }
    }

    /// Look up a live entry.
    ///
    /// An expired entry is evicted on access and reported as a miss. An entry
    /// whose JSON does not decode as `T` is also a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = self.clock.now();

        let expired = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => {
                    return match serde_json::from_value(entry.value.clone()) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            tracing::warn!(key, error = %e, "cache entry has unexpected shape");
                            None
                        }
                    };
                }
                Some(_) => true,
            }
        };

        if expired {
            let mut entries = self.entries.write().await;
            if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
                entries.remove(key);
                tracing::debug!(key, "evicted expired cache entry");
            }
        }

        None
    }

    /// Store a value under the default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    /// Store a value with an explicit TTL.
    ///
    /// When the cache is at capacity, expired entries are swept first and
    /// then the oldest entries are evicted.
    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache value");
                return;
            }
        };

        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        if let Some(max) = self.max_entries
            && !entries.contains_key(key)
            && entries.len() >= max
        {
            entries.retain(|_, entry| !entry.is_expired(now));

            while entries.len() >= max {
                let Some(oldest) = entries.iter().min_by_key(|(_, entry)| entry.created_at).map(|(k, _)| k.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest cache entry at capacity");
            }
        }

        entries.insert(key.to_string(), CacheEntry { value, created_at: now, ttl });
    }

    /// Remove one entry. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every entry. Returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    /// Sweep all expired entries. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Current size and keys, expired-but-unswept entries included.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats { size: keys.len(), keys }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Run [`ResultCache::cleanup`] every `interval` until the handle is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.cleanup().await;
                if removed > 0 {
                    tracing::debug!(removed, "cache sweep removed expired entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    fn cache_with_clock(max: Option<usize>) -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (ResultCache::with_clock(DEFAULT_TTL, max, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, _) = cache_with_clock(None);
        cache.set("k", &vec!["a".to_string(), "b".to_string()]).await;

        let value: Option<Vec<String>> = cache.get("k").await;
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (cache, _) = cache_with_clock(None);
        assert_eq!(cache.get::<String>("nope").await, None);
    }

    #[tokio::test]
    async fn test_expires_after_ttl() {
        let (cache, clock) = cache_with_clock(None);
        cache.set_with_ttl("k", &42u32, Duration::from_secs(60)).await;

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get::<u32>("k").await, Some(42), "exactly at ttl is still live");

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get::<u32>("k").await, None);
        assert!(cache.is_empty().await, "expired entry is evicted on access");
    }

    #[tokio::test]
    async fn test_default_ttl_is_one_day() {
        let (cache, clock) = cache_with_clock(None);
        cache.set("k", &"v").await;

        clock.advance(Duration::from_secs(23 * 60 * 60));
        assert_eq!(cache.get::<String>("k").await.as_deref(), Some("v"));

        clock.advance(Duration::from_secs(2 * 60 * 60));
        assert_eq!(cache.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_inert_until_accessed() {
        let (cache, clock) = cache_with_clock(None);
        cache.set_with_ttl("k", &1u8, Duration::from_secs(1)).await;
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get::<u8>("k").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_type_is_a_miss() {
        let (cache, _) = cache_with_clock(None);
        cache.set("k", &"text").await;
        assert_eq!(cache.get::<u64>("k").await, None);
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_only_expired() {
        let (cache, clock) = cache_with_clock(None);
        cache.set_with_ttl("short", &1u8, Duration::from_secs(10)).await;
        cache.set_with_ttl("long", &2u8, Duration::from_secs(1000)).await;

        clock.advance(Duration::from_secs(11));
        assert_eq!(cache.cleanup().await, 1);

        let stats = cache.stats().await;
        assert_eq!(stats.size, 1);
        assert_eq!(stats.keys, vec!["long".to_string()]);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let (cache, clock) = cache_with_clock(Some(2));
        cache.set("first", &1u8).await;
        clock.advance(Duration::from_secs(1));
        cache.set("second", &2u8).await;
        clock.advance(Duration::from_secs(1));
        cache.set("third", &3u8).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get::<u8>("first").await, None);
        assert_eq!(cache.get::<u8>("second").await, Some(2));
        assert_eq!(cache.get::<u8>("third").await, Some(3));
    }

    #[tokio::test]
    async fn test_capacity_prefers_expired() {
        let (cache, clock) = cache_with_clock(Some(2));
        cache.set_with_ttl("durable", &1u8, Duration::from_secs(1000)).await;
        clock.advance(Duration::from_secs(1));
        cache.set_with_ttl("fleeting", &2u8, Duration::from_secs(1)).await;
        clock.advance(Duration::from_secs(5));
        cache.set("new", &3u8).await;

        assert_eq!(cache.get::<u8>("durable").await, Some(1));
        assert_eq!(cache.get::<u8>("new").await, Some(3));
    }

    #[tokio::test]
    async fn test_overwrite_at_capacity_keeps_others() {
        let (cache, _) = cache_with_clock(Some(2));
        cache.set("a", &1u8).await;
        cache.set("b", &2u8).await;
        cache.set("a", &10u8).await;

        assert_eq!(cache.get::<u8>("a").await, Some(10));
        assert_eq!(cache.get::<u8>("b").await, Some(2));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (cache, _) = cache_with_clock(None);
        cache.set("a", &1u8).await;
        cache.set("b", &2u8).await;

        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert_eq!(cache.clear().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let (cache, _) = cache_with_clock(None);
        let other = cache.clone();
        cache.set("k", &"shared").await;
        assert_eq!(other.get::<String>("k").await.as_deref(), Some("shared"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache = ResultCache::default();
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key-{}", i % 8);
                cache.set(&key, &i).await;
                cache.get::<u32>(&key).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(cache.len().await, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_periodically() {
        let clock = Arc::new(ManualClock::default());
        let cache = ResultCache::with_clock(Duration::from_secs(5), None, clock.clone());
        cache.set("k", &1u8).await;
        clock.advance(Duration::from_secs(10));

        let handle = cache.spawn_sweeper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(cache.is_empty().await);
        handle.abort();
    }
}
