use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::post::{BlogPost, PostId};

/// A post version. Any edit bumps `updated_at`, so stale entries are never hit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub id: PostId,
    pub updated_at: DateTime<Utc>,
}

impl RenderKey {
    pub fn of(post: &BlogPost) -> Self {
        RenderKey {
            id: post.id.clone(),
            updated_at: post.updated_at,
        }
    }
}

pub enum Expire {
    Never,
    After(Duration),
}

struct CacheValue<T> {
    expire_date: DateTime<Utc>,
    value: Arc<T>,
}

type CacheMap<T> = HashMap<RenderKey, CacheValue<T>>;

pub struct ContentCache<T> {
    cache: Option<CacheMap<T>>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache {
            cache: Some(HashMap::new()),
        }
    }

    pub fn non_caching() -> Self {
        ContentCache {
            cache: None,
        }
    }

    pub fn get(&self, key: &RenderKey) -> Option<Arc<T>> {
        let cache_value = self.cache.as_ref()?.get(key)?;
        if Utc::now() > cache_value.expire_date {
            return None;
        }
        Some(cache_value.value.clone())
    }

    /// Stores `content` under `key`, dropping older versions of the same post.
    pub fn add(&mut self, key: RenderKey, content: T, expire_after: Expire) -> Arc<T> {
        let value = Arc::new(content);
        if let Some(ref mut cache) = self.cache {
            let expire_date = match expire_after {
                Expire::Never => DateTime::<Utc>::MAX_UTC,
                Expire::After(duration) => Utc::now() + duration,
            };

            cache.retain(|k, _| k.id != key.id);
            cache.insert(key, CacheValue {
                expire_date,
                value: value.clone(),
            });
        }
        value
    }

    pub fn get_or<F>(&mut self, key: RenderKey, expire_after: Expire, make: F) -> Result<Arc<T>>
        where F: FnOnce() -> Result<T>
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let content = make()?;
        Ok(self.add(key, content, expire_after))
    }

    pub fn invalidate(&mut self, id: &PostId) {
        if let Some(ref mut cache) = self.cache {
            cache.retain(|k, _| &k.id != id);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::error::BlogError;

    use super::*;

    fn key(id: &str, day: u32) -> RenderKey {
        RenderKey {
            id: PostId::from(id),
            updated_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_content_cache_non_caching() {
        let mut cache: ContentCache<String> = ContentCache::non_caching();
        let cached = cache.add(key("a", 1), "content".to_string(), Expire::Never);
        assert_eq!(Arc::strong_count(&cached), 1);
        assert!(cache.get(&key("a", 1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_add_and_get_never_expires() {
        let mut cache = ContentCache::new();
        let cached = cache.add(key("a", 1), "Hello, world!".to_string(), Expire::Never);
        assert_eq!(Arc::strong_count(&cached), 2);
        assert_eq!(cache.get(&key("a", 1)).unwrap().as_str(), "Hello, world!");
    }

    #[test]
    fn test_expires_after() {
        let mut cache = ContentCache::new();
        cache.add(key("a", 1), "soon gone".to_string(), Expire::After(Duration::milliseconds(100)));
        assert!(cache.get(&key("a", 1)).is_some());

        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(cache.get(&key("a", 1)).is_none());
    }

    #[test]
    fn test_new_version_replaces_old() {
        let mut cache = ContentCache::new();
        cache.add(key("a", 1), "v1".to_string(), Expire::Never);
        cache.add(key("b", 1), "other".to_string(), Expire::Never);
        cache.add(key("a", 2), "v2".to_string(), Expire::Never);

        assert!(cache.get(&key("a", 1)).is_none());
        assert_eq!(cache.get(&key("a", 2)).unwrap().as_str(), "v2");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_or_builds_once() {
        let mut cache = ContentCache::new();
        let first = cache.get_or(key("a", 1), Expire::Never, || Ok("built".to_string())).unwrap();
        let second = cache.get_or(key("a", 1), Expire::Never, || panic!("should be cached")).unwrap();
        assert_eq!(first, second);

        let failed = cache.get_or(key("b", 1), Expire::Never, || Err(BlogError::Render("boom".to_string())));
        assert!(failed.is_err());
        assert!(cache.get(&key("b", 1)).is_none());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ContentCache::new();
        cache.add(key("a", 1), "v1".to_string(), Expire::Never);
        cache.invalidate(&PostId::from("a"));
        assert!(cache.is_empty());
    }
}
