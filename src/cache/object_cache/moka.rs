use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::CacheConfig;

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, ttl: {}s",
            config.max_capacity, config.default_ttl
        );
        Self { inner }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => {
                debug!("Cache hit: {}", key);
                CacheResult::Found(value)
            }
            None => {
                debug!("Cache miss: {}", key);
                CacheResult::NotFound
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String) {
        self.inner.insert(key, value).await;
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
    use crate::cache::{get_json, insert_json, user_cache_key};

    fn cache() -> MokaCacheWrapper {
        MokaCacheWrapper::new(&CacheConfig {
            default_ttl: 60,
            max_capacity: 100,
        })
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = cache();
        cache.insert_raw("k".into(), "v".into()).await;
        assert_eq!(cache.get_raw("k").await, CacheResult::Found("v".to_string()));

        cache.remove("k").await;
        assert_eq!(cache.get_raw("k").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers_drop_garbage() {
        let cache = cache();
        let key = user_cache_key("abc");
        insert_json(&cache, key.clone(), &vec![1, 2, 3]).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, &key).await, Some(vec![1, 2, 3]));

        cache.insert_raw(key.clone(), "{not json".into()).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, &key).await, None);
        assert_eq!(cache.get_raw(&key).await, CacheResult::NotFound);
    }
}
