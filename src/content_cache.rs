use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Time-bounded cache for backend responses, keyed by request path.
pub struct ContentCache<T> {
    cache: Option<RwLock<CacheMap<T>>>,
}

type CacheMap<T> = HashMap<String, CacheValue<T>>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expire {
    After(Duration),
}

impl Expire {
    /// Zero seconds disables caching for that resource.
    pub fn from_secs(secs: u64) -> Option<Expire> {
        match secs {
            0 => None,
            secs => Some(Expire::After(Duration::seconds(secs as i64))),
        }
    }
}

struct CacheValue<T> {
    expire_date: DateTime<Utc>,
    value: Arc<T>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache {
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn non_caching() -> Self {
        ContentCache {
            cache: None,
        }
    }

    pub fn add(&self, key: &str, content: T, expire_after: Expire) -> Arc<T> {
        let value = Arc::new(content);
        if let Some(ref cache) = self.cache {
            let Expire::After(duration) = expire_after;
            let expire_date = Utc::now() + duration;

            if let Ok(mut cache) = cache.write() {
                cache.insert(key.to_string(), CacheValue {
                    expire_date,
                    value: value.clone(),
                });
            }
        }
        value
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let cache = self.cache.as_ref()?.read().ok()?;
        let cache_value = cache.get(key)?;
        if Utc::now() > cache_value.expire_date {
            return None;
        }
        Some(cache_value.value.clone())
    }

    /// Drops expired entries. Called opportunistically on insert paths.
    pub fn purge_expired(&self) {
        if let Some(ref cache) = self.cache {
            if let Ok(mut cache) = cache.write() {
                let now = Utc::now();
                cache.retain(|_, v| v.expire_date >= now);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref()
            .and_then(|c| c.read().ok().map(|c| c.len()))
            .unwrap_or(0)
    }
}
