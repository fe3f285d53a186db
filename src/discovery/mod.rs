//! Profile-driven opportunity discovery.
//!
//! [`DiscoveryService`] is the orchestrator: it builds role-specific
//! queries, runs them concurrently against the AI search client, optionally
//! supplements with web scraping, categorizes and scores the results, and
//! substitutes curated fallback data whenever a live path comes up empty.
//! The public surface never returns an error; a degraded run is detectable
//! only through [`types::Provenance`].

pub mod confidence;
pub mod config;
pub mod error;
pub mod fallback;
pub mod query;
pub mod types;

use chrono::Utc;
use futures::future::join_all;

use crate::discovery::config::DiscoveryConfig;
use crate::discovery::error::DiscoveryError;
use crate::discovery::types::{
    MarketInsights, OpportunityKind, ScrapedEvent, ScrapedOpportunity, ScrapedStartup,
    ScrapingResult,
};
use crate::profile::UserProfile;
use crate::search::ai::{AiResultKind, AiSearchClient, AiSearchItem};
use crate::search::extract;
use crate::search::web::{WebSearchClient, WebSearchItem};

/// Base confidence for items scraped off result pages, before boosts.
const WEB_BASE_CONFIDENCE: f32 = 0.6;

/// Orchestrates one discovery run per user profile.
pub struct DiscoveryService {
    config: DiscoveryConfig,
    ai: AiSearchClient,
    web: Option<WebSearchClient>,
}

impl DiscoveryService {
    /// Build a service from configuration.
    ///
    /// A web client that cannot be constructed is logged and left out; the
    /// AI path and fallback data still serve the run.
    ///
    /// # Errors
    /// Returns an error only when the AI HTTP client cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let ai = AiSearchClient::from_config(&config)?;
        let web = match WebSearchClient::new(config.clone()) {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!("web search unavailable: {err}");
                None
            }
        };
        Ok(Self { config, ai, web })
    }

    /// Build a service from explicit clients.
    #[must_use]
    pub fn with_clients(
        config: DiscoveryConfig,
        ai: AiSearchClient,
        web: Option<WebSearchClient>,
    ) -> Self {
        Self { config, ai, web }
    }

    /// Run discovery for a profile.
    ///
    /// Never fails: any error escaping the pipeline discards partial
    /// progress and returns a fully fallback-sourced result.
    pub async fn scrape_for_user(&self, profile: &UserProfile) -> ScrapingResult {
        match self.scrape_inner(profile).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(
                    user_id = %profile.user_id,
                    "discovery pipeline failed, serving fallback data: {err}"
                );
                self.full_fallback(profile)
            }
        }
    }

    async fn scrape_inner(&self, profile: &UserProfile) -> Result<ScrapingResult, DiscoveryError> {
        let queries = query::build_discovery_queries(profile, &self.config);
        tracing::debug!(user_id = %profile.user_id, ?queries, "running discovery queries");

        // Queries run concurrently; each client call is individually
        // infallible, so one failed query only contributes nothing.
        let batches = join_all(
            queries
                .iter()
                .map(|q| self.ai.search_by_profile(q, profile)),
        )
        .await;

        let mut startups: Vec<ScrapedStartup> = Vec::new();
        let mut opportunities: Vec<ScrapedOpportunity> = Vec::new();
        let mut events: Vec<ScrapedEvent> = Vec::new();

        for item in batches.into_iter().flatten() {
            match item.kind {
                AiResultKind::Startup => startups.push(ai_item_to_startup(item)),
                AiResultKind::Opportunity => opportunities.push(ai_item_to_opportunity(item)),
                AiResultKind::Event => events.push(ai_item_to_event(item)),
            }
        }

        if let (Some(web), Some(primary_query)) = (&self.web, queries.first()) {
            for item in web.search(primary_query).await {
                opportunities.push(web_item_to_opportunity(item, profile));
            }
        }

        // Empty live harvest: substitute the curated dataset so the user
        // always sees something.
        if opportunities.is_empty() && startups.is_empty() {
            tracing::info!(user_id = %profile.user_id, "no live results, using fallback data");
            opportunities =
                fallback::fallback_opportunities(profile.sector.as_deref(), profile.location.as_deref());
            if events.is_empty() {
                events = fallback::upcoming_events();
            }
        }

        let insights = self.insights_for(profile).await;

        let floor = self.config.min_confidence;
        let cap = self.config.max_results_per_type;
        Ok(ScrapingResult {
            startups: confidence::retain_confident(startups, floor, cap),
            opportunities: confidence::retain_confident(opportunities, floor, cap),
            events: confidence::retain_confident(events, floor, cap),
            insights,
            generated_at: Utc::now(),
        })
    }

    /// Sector-scoped market insights, curated text on failure.
    async fn insights_for(&self, profile: &UserProfile) -> MarketInsights {
        let Some(sector) = profile.sector.as_deref() else {
            return MarketInsights::default();
        };
        match self
            .ai
            .market_insights(&query::market_trends_query(sector))
            .await
        {
            Some(insights) => insights,
            None => fallback::startup_insights(),
        }
    }

    /// Fully fallback-sourced result for total degradation.
    fn full_fallback(&self, profile: &UserProfile) -> ScrapingResult {
        ScrapingResult {
            startups: Vec::new(),
            opportunities: fallback::fallback_opportunities(
                profile.sector.as_deref(),
                profile.location.as_deref(),
            ),
            events: fallback::upcoming_events(),
            insights: fallback::startup_insights(),
            generated_at: Utc::now(),
        }
    }
}

fn ai_item_to_opportunity(item: AiSearchItem) -> ScrapedOpportunity {
    let text = format!("{} {}", item.title, item.description);
    ScrapedOpportunity {
        kind: classify_opportunity(&text),
        sector: extract::extract_sector(&text),
        location: None,
        deadline: item.deadline,
        amount: item.amount,
        url: item.url,
        source: item.source,
        confidence: item.confidence,
        provenance: item.provenance,
        title: item.title,
        description: item.description,
    }
}

fn ai_item_to_startup(item: AiSearchItem) -> ScrapedStartup {
    let text = format!("{} {}", item.title, item.description);
    ScrapedStartup {
        sector: extract::extract_sector(&text),
        location: None,
        stage: None,
        website: item.url,
        source: item.source,
        confidence: item.confidence,
        provenance: item.provenance,
        name: item.title,
        description: item.description,
    }
}

fn ai_item_to_event(item: AiSearchItem) -> ScrapedEvent {
    ScrapedEvent {
        date: item.deadline,
        location: None,
        url: item.url,
        source: item.source,
        confidence: item.confidence,
        provenance: item.provenance,
        title: item.title,
        description: item.description,
    }
}

/// Map a scraped page into an opportunity, scoring it against the profile.
fn web_item_to_opportunity(item: WebSearchItem, profile: &UserProfile) -> ScrapedOpportunity {
    let haystack = format!("{} {}", item.title, item.snippet).to_lowercase();
    let sector_match = profile.sector_lower().map_or(false, |s| {
        haystack.contains(&s)
            || item
                .sector
                .as_deref()
                .map_or(false, |page| page.to_lowercase() == s)
    });
    let location_match = profile
        .location_lower()
        .map_or(false, |l| haystack.contains(&l));
    let trusted = fallback::is_fallback_domain(&item.domain);

    ScrapedOpportunity {
        kind: classify_opportunity(&haystack),
        sector: item.sector,
        location: profile.location.clone().filter(|_| location_match),
        deadline: item.deadline,
        amount: item.amount,
        url: Some(item.url),
        source: item.domain,
        confidence: confidence::score_item(WEB_BASE_CONFIDENCE, sector_match, location_match, trusted),
        provenance: types::Provenance::Live,
        title: item.title,
        description: item.snippet,
    }
}

fn classify_opportunity(text: &str) -> OpportunityKind {
    let lower = text.to_lowercase();
    if lower.contains("grant") {
        OpportunityKind::Grant
    } else if lower.contains("accelerator") || lower.contains("incubator") {
        OpportunityKind::Accelerator
    } else if lower.contains("competition") || lower.contains("challenge") || lower.contains("pitch")
    {
        OpportunityKind::Competition
    } else if lower.contains("invest") || lower.contains("venture") || lower.contains("fund") {
        OpportunityKind::Investment
    } else {
        OpportunityKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::error::DiscoveryError;
    use crate::discovery::types::Provenance;
    use crate::profile::ProfileRole;
    use crate::search::ai::ChatBackend;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, DiscoveryError> {
            Err(DiscoveryError::UpstreamStatus {
                service: "test",
                status: 503,
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct CannedBackend(&'static str);

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, DiscoveryError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn founder() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), ProfileRole::Founder)
            .with_sector("FinTech")
            .with_location("Malaysia")
    }

    fn service_with(backend: Option<Box<dyn ChatBackend>>) -> DiscoveryService {
        DiscoveryService::with_clients(
            DiscoveryConfig::default(),
            AiSearchClient::with_backends(backend, None),
            None,
        )
    }

    #[tokio::test]
    async fn test_total_degradation_serves_fallback() {
        let service = service_with(Some(Box::new(FailingBackend)));
        let result = service.scrape_for_user(&founder()).await;

        assert!(!result.opportunities.is_empty());
        assert!(!result.events.is_empty());
        assert!(result.is_fully_fallback());
        assert_eq!(result.insights.provenance, Provenance::Fallback);
        assert!(!result.insights.is_empty());
        // Fallback entries clear the confidence floor.
        assert!(result.opportunities.iter().all(|o| o.confidence >= 0.7));
    }

    #[tokio::test]
    async fn test_no_backends_still_returns_results() {
        let service = service_with(None);
        let result = service.scrape_for_user(&founder()).await;
        assert!(!result.opportunities.is_empty());
        assert!(result.is_fully_fallback());
    }

    #[tokio::test]
    async fn test_live_results_are_categorized() {
        let canned = r#"[
          {"title": "MDEC FinTech Grant", "description": "Matching grant for FinTech firms in Malaysia", "type": "grant", "url": "https://mdec.my/grant"},
          {"title": "PayHalal", "description": "FinTech startup that raised a seed round in Malaysia", "type": "startup"},
          {"title": "KL FinTech Summit", "description": "Annual summit in Malaysia", "type": "event"}
        ]"#;
        let service = service_with(Some(Box::new(CannedBackend(canned))));
        let result = service.scrape_for_user(&founder()).await;

        assert_eq!(result.opportunities.len(), 3);
        assert_eq!(result.startups.len(), 3);
        assert_eq!(result.events.len(), 3);
        assert!(result
            .opportunities
            .iter()
            .all(|o| o.provenance == Provenance::Live));
        assert_eq!(result.opportunities[0].kind, OpportunityKind::Grant);
        assert_eq!(result.opportunities[0].source, "mdec.my");
        assert!(!result.is_fully_fallback());
    }

    #[tokio::test]
    async fn test_empty_live_harvest_substitutes_fallback() {
        // A trivial completion parses into nothing.
        let service = service_with(Some(Box::new(CannedBackend("ok"))));
        let result = service.scrape_for_user(&founder()).await;

        assert!(!result.opportunities.is_empty());
        assert!(result
            .opportunities
            .iter()
            .all(|o| o.provenance == Provenance::Fallback));
        assert!(result
            .opportunities
            .iter()
            .all(|o| fallback::is_fallback_domain(&o.source)));
        assert!(!result.events.is_empty());
    }

    #[tokio::test]
    async fn test_no_sector_means_no_insights_query() {
        let profile = UserProfile::new(Uuid::new_v4(), ProfileRole::Founder);
        let service = service_with(Some(Box::new(FailingBackend)));
        let result = service.scrape_inner(&profile).await.unwrap();
        assert!(result.insights.is_empty());
    }

    #[test]
    fn test_web_item_scoring() {
        let item = WebSearchItem {
            title: "FinTech Grant".to_string(),
            url: "https://www.cradlefund.com.my/cip".to_string(),
            domain: "cradlefund.com.my".to_string(),
            snippet: "Grant for startups in Malaysia".to_string(),
            deadline: Some("31 December 2025".to_string()),
            amount: None,
            sector: Some("FinTech".to_string()),
        };
        let opportunity = web_item_to_opportunity(item, &founder());
        // 0.6 base + 0.2 sector + 0.1 location + 0.15 trusted, clamped.
        assert!((opportunity.confidence - 1.0).abs() < f32::EPSILON);
        assert_eq!(opportunity.kind, OpportunityKind::Grant);
        assert_eq!(opportunity.provenance, Provenance::Live);
    }

    #[test]
    fn test_classify_opportunity() {
        assert_eq!(classify_opportunity("a seed grant"), OpportunityKind::Grant);
        assert_eq!(
            classify_opportunity("join the accelerator"),
            OpportunityKind::Accelerator
        );
        assert_eq!(
            classify_opportunity("pitch competition finals"),
            OpportunityKind::Competition
        );
        assert_eq!(
            classify_opportunity("venture capital ticket"),
            OpportunityKind::Investment
        );
        assert_eq!(classify_opportunity("mentorship"), OpportunityKind::Other);
    }
}
