//! Configuration for the discovery pipeline.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Confidence floor below which scraped items are dropped.
pub const MIN_CONFIDENCE: f32 = 0.7;

/// Per-category cap on returned items.
pub const MAX_RESULTS_PER_TYPE: usize = 20;

/// Configuration for the discovery service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Confidence floor for scraped items.
    pub min_confidence: f32,
    /// Per-category cap on returned items.
    pub max_results_per_type: usize,
    /// Maximum number of role-specific queries per discovery run.
    pub max_queries: usize,
    /// Timeout for the primary chat-completion endpoint.
    #[serde(with = "duration_serde")]
    pub primary_timeout: Duration,
    /// Timeout for the fallback chat-completion endpoint.
    #[serde(with = "duration_serde")]
    pub fallback_timeout: Duration,
    /// Per-page timeout when fetching search result pages.
    #[serde(with = "duration_serde")]
    pub page_timeout: Duration,
    /// How many result pages to fetch and extract per web search.
    pub max_pages: usize,
    /// Maximum candidate URLs to take from a results page.
    pub max_search_results: usize,
    /// Description length above which an embedding is generated on import.
    pub embed_description_threshold: usize,
    /// User agents to rotate on outbound scrape requests.
    pub user_agents: Vec<String>,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// API keys for the hosted LLM endpoints.
    pub api_keys: ApiKeys,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            max_results_per_type: MAX_RESULTS_PER_TYPE,
            max_queries: 3,
            primary_timeout: Duration::from_secs(10),
            fallback_timeout: Duration::from_secs(8),
            page_timeout: Duration::from_secs(10),
            max_pages: 4,
            max_search_results: 12,
            embed_description_threshold: 100,
            user_agents: default_user_agents(),
            cache: CacheConfig::default(),
            api_keys: ApiKeys::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults plus API keys from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_keys: ApiKeys::from_env(),
            ..Self::default()
        }
    }

    /// Set the confidence floor.
    #[must_use]
    pub const fn with_min_confidence(mut self, floor: f32) -> Self {
        self.min_confidence = floor;
        self
    }

    /// Set the per-category cap.
    #[must_use]
    pub const fn with_max_results_per_type(mut self, cap: usize) -> Self {
        self.max_results_per_type = cap;
        self
    }

    /// Set the primary endpoint timeout.
    #[must_use]
    pub const fn with_primary_timeout(mut self, timeout: Duration) -> Self {
        self.primary_timeout = timeout;
        self
    }

    /// Set the Perplexity API key.
    #[must_use]
    pub fn with_perplexity_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_keys.perplexity = Some(key.into());
        self
    }

    /// Set the OpenAI API key.
    #[must_use]
    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_keys.openai = Some(key.into());
        self
    }

    /// Get a random user agent from the rotation list.
    #[must_use]
    pub fn random_user_agent(&self) -> String {
        if self.user_agents.is_empty() {
            return default_user_agents()[0].clone();
        }
        let mut rng = rand::thread_rng();
        let idx = rng.gen_range(0..self.user_agents.len());
        self.user_agents[idx].clone()
    }
}

/// Cache configuration.
///
/// Disabled by default: identical discovery queries are expected to
/// re-execute fully unless an operator opts in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// TTL for search results (seconds).
    pub search_ttl_seconds: u64,
    /// TTL for fetched pages (seconds).
    pub page_ttl_seconds: u64,
    /// Maximum cache size (number of entries).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            search_ttl_seconds: 1800,
            page_ttl_seconds: 86400,
            max_entries: 500,
        }
    }
}

/// API keys for the hosted chat-completion endpoints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Perplexity API key (primary endpoint).
    pub perplexity: Option<String>,
    /// OpenAI API key (fallback endpoint).
    pub openai: Option<String>,
}

impl ApiKeys {
    /// Read keys from `PERPLEXITY_API_KEY` and `OPENAI_API_KEY`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            perplexity: std::env::var("PERPLEXITY_API_KEY").ok(),
            openai: std::env::var("OPENAI_API_KEY").ok(),
        }
    }
}

/// Default user agents for rotation.
fn default_user_agents() -> Vec<String> {
    vec![
        // Chrome on Windows
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        // Chrome on macOS
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        // Firefox on Windows
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
        // Safari on macOS
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15".to_string(),
        // Chrome on Linux
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
    ]
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert!((config.min_confidence - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_results_per_type, 20);
        assert_eq!(config.primary_timeout, Duration::from_secs(10));
        assert_eq!(config.fallback_timeout, Duration::from_secs(8));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_config_builder() {
        let config = DiscoveryConfig::new()
            .with_min_confidence(0.5)
            .with_max_results_per_type(5)
            .with_perplexity_api_key("pplx-test");

        assert!((config.min_confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.max_results_per_type, 5);
        assert_eq!(config.api_keys.perplexity.as_deref(), Some("pplx-test"));
    }

    #[test]
    fn test_random_user_agent() {
        let config = DiscoveryConfig::default();
        let ua = config.random_user_agent();
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = DiscoveryConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DiscoveryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.primary_timeout, config.primary_timeout);
        assert_eq!(back.max_pages, config.max_pages);
    }
}
