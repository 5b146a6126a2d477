use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::CacheConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaObjectCache);

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// 按条目记录的 TTL 过期
struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _now: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// 进程内缓存
pub struct MokaObjectCache {
    inner: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MokaObjectCache {
    pub fn new(config: &CacheConfig) -> Result<Self, String> {
        if config.memory.max_capacity == 0 {
            return Err("cache.memory.max_capacity 必须大于 0".to_string());
        }

        let inner = Cache::builder()
            .max_capacity(config.memory.max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "Moka 缓存初始化完成，容量 {}，默认 TTL {}s",
            config.memory.max_capacity, config.default_ttl
        );

        Ok(Self {
            inner,
            default_ttl: Duration::from_secs(config.default_ttl),
        })
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(entry) => CacheResult::Found(entry.value),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let ttl = if ttl == 0 {
            self.default_ttl
        } else {
            Duration::from_secs(ttl)
        };
        self.inner.insert(key, Entry { value, ttl }).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfig, RedisConfig};

    fn config() -> CacheConfig {
        CacheConfig {
            cache_type: "moka".to_string(),
            default_ttl: 60,
            redis: RedisConfig {
                url: "redis://127.0.0.1:6379".to_string(),
                key_prefix: "gradesys:".to_string(),
                pool_size: 1,
            },
            memory: MemoryConfig { max_capacity: 100 },
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaObjectCache::new(&config()).unwrap();
        cache.insert_raw("user:1".to_string(), "{}".to_string(), 0).await;
        assert_eq!(cache.get_raw("user:1").await, CacheResult::Found("{}".to_string()));

        cache.remove("user:1").await;
        assert_eq!(cache.get_raw("user:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaObjectCache::new(&config()).unwrap());
        cache.insert_json("k".to_string(), &vec![1, 2, 3], 30).await;
        let value: CacheResult<Vec<i32>> = cache.get_json("k").await;
        assert_eq!(value.into_option(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = config();
        config.memory.max_capacity = 0;
        assert!(MokaObjectCache::new(&config).is_err());
    }
}
