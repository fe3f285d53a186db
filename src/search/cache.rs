//! TTL cache for search results and fetched pages.
//!
//! Disabled by default; discovery semantics assume identical queries
//! re-execute fully unless an operator opts in.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::discovery::config::CacheConfig;
use crate::search::web::WebSearchItem;

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe cache for web search results and page text.
pub struct SearchCache {
    config: CacheConfig,
    search_cache: DashMap<String, CacheEntry<Vec<WebSearchItem>>>,
    page_cache: DashMap<String, CacheEntry<String>>,
}

impl SearchCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            search_cache: DashMap::new(),
            page_cache: DashMap::new(),
        }
    }

    /// Get cached search results for a query.
    #[must_use]
    pub fn get_search(&self, query: &str) -> Option<Vec<WebSearchItem>> {
        if !self.config.enabled {
            return None;
        }
        self.search_cache.get(query).and_then(|entry| {
            if entry.is_expired() {
                drop(entry);
                self.search_cache.remove(query);
                None
            } else {
                Some(entry.data.clone())
            }
        })
    }

    /// Cache search results for a query.
    pub fn set_search(&self, query: &str, items: &[WebSearchItem]) {
        if !self.config.enabled {
            return;
        }
        self.enforce_max_entries();
        let ttl = Duration::from_secs(self.config.search_ttl_seconds);
        self.search_cache
            .insert(query.to_string(), CacheEntry::new(items.to_vec(), ttl));
    }

    /// Get cached page text for a URL.
    #[must_use]
    pub fn get_page(&self, url: &str) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        self.page_cache.get(url).and_then(|entry| {
            if entry.is_expired() {
                drop(entry);
                self.page_cache.remove(url);
                None
            } else {
                Some(entry.data.clone())
            }
        })
    }

    /// Cache page text for a URL.
    pub fn set_page(&self, url: &str, text: &str) {
        if !self.config.enabled {
            return;
        }
        self.enforce_max_entries();
        let ttl = Duration::from_secs(self.config.page_ttl_seconds);
        self.page_cache
            .insert(url.to_string(), CacheEntry::new(text.to_string(), ttl));
    }

    /// Clear everything.
    pub fn clear(&self) {
        self.search_cache.clear();
        self.page_cache.clear();
    }

    /// Drop expired entries when at capacity.
    fn enforce_max_entries(&self) {
        if self.search_cache.len() >= self.config.max_entries {
            self.search_cache.retain(|_, entry| !entry.is_expired());
        }
        if self.page_cache.len() >= self.config.max_entries {
            self.page_cache.retain(|_, entry| !entry.is_expired());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> CacheConfig {
        CacheConfig {
            enabled: true,
            search_ttl_seconds: 60,
            page_ttl_seconds: 60,
            max_entries: 10,
        }
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = SearchCache::new(CacheConfig::default());
        cache.set_page("https://mdec.my", "some text");
        assert!(cache.get_page("https://mdec.my").is_none());
    }

    #[test]
    fn test_page_roundtrip_when_enabled() {
        let cache = SearchCache::new(enabled_config());
        cache.set_page("https://mdec.my", "grant text");
        assert_eq!(cache.get_page("https://mdec.my").as_deref(), Some("grant text"));

        cache.clear();
        assert!(cache.get_page("https://mdec.my").is_none());
    }

    #[test]
    fn test_search_roundtrip_when_enabled() {
        let cache = SearchCache::new(enabled_config());
        cache.set_search("fintech grants", &[]);
        assert_eq!(cache.get_search("fintech grants").map(|v| v.len()), Some(0));
        assert!(cache.get_search("other query").is_none());
    }
}
