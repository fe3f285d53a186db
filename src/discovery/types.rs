//! Core types for discovery results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discovery::confidence::Scored;

/// Where a scraped item came from.
///
/// The pipeline never fails visibly, so callers distinguish a degraded run
/// from a live one through this field rather than through errors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by a live search or LLM call.
    #[default]
    Live,
    /// Substituted from the curated fallback dataset.
    Fallback,
}

/// Kind of funding opportunity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityKind {
    /// Non-dilutive grant.
    Grant,
    /// Accelerator or incubator programme.
    Accelerator,
    /// Equity investment (VC, angel).
    Investment,
    /// Pitch competition or challenge.
    Competition,
    /// Anything else.
    #[default]
    Other,
}

/// A startup surfaced for funders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapedStartup {
    /// Startup name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Sector, when known.
    pub sector: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Funding stage, when known.
    pub stage: Option<String>,
    /// Website, when known.
    pub website: Option<String>,
    /// Source domain or service that produced this item.
    pub source: String,
    /// Heuristic relevance score in [0, 1].
    pub confidence: f32,
    /// Live or fallback origin.
    pub provenance: Provenance,
}

/// A funding opportunity surfaced for founders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapedOpportunity {
    /// Opportunity title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// What kind of opportunity this is.
    pub kind: OpportunityKind,
    /// Sector, when known.
    pub sector: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Application deadline as extracted text, when found.
    pub deadline: Option<String>,
    /// Funding amount as extracted text, when found.
    pub amount: Option<String>,
    /// Link to the programme page, when known.
    pub url: Option<String>,
    /// Source domain or service that produced this item.
    pub source: String,
    /// Heuristic relevance score in [0, 1].
    pub confidence: f32,
    /// Live or fallback origin.
    pub provenance: Provenance,
}

/// An ecosystem event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapedEvent {
    /// Event title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Event date as extracted text, when found.
    pub date: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Link to the event page, when known.
    pub url: Option<String>,
    /// Source domain or service that produced this item.
    pub source: String,
    /// Heuristic relevance score in [0, 1].
    pub confidence: f32,
    /// Live or fallback origin.
    pub provenance: Provenance,
}

/// Market insights block of a discovery run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketInsights {
    /// Observed market trends.
    pub trends: Vec<String>,
    /// Key findings worth acting on.
    pub key_findings: Vec<String>,
    /// Recommendations for the user.
    pub recommendations: Vec<String>,
    /// Live or fallback origin.
    pub provenance: Provenance,
}

impl MarketInsights {
    /// True when no insight text is present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trends.is_empty() && self.key_findings.is_empty() && self.recommendations.is_empty()
    }
}

/// Ephemeral, request-scoped aggregate of one discovery run.
///
/// Never persisted as a unit; individual items become durable entities only
/// through an explicit import.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapingResult {
    /// Startups surfaced for funders.
    pub startups: Vec<ScrapedStartup>,
    /// Funding opportunities surfaced for founders.
    pub opportunities: Vec<ScrapedOpportunity>,
    /// Ecosystem events.
    pub events: Vec<ScrapedEvent>,
    /// Market insights.
    pub insights: MarketInsights,
    /// When the run completed.
    pub generated_at: DateTime<Utc>,
}

impl ScrapingResult {
    /// Create an empty result stamped now.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            startups: Vec::new(),
            opportunities: Vec::new(),
            events: Vec::new(),
            insights: MarketInsights::default(),
            generated_at: Utc::now(),
        }
    }

    /// Total number of scraped items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.startups.len() + self.opportunities.len() + self.events.len()
    }

    /// True when every item in every category is fallback-sourced.
    #[must_use]
    pub fn is_fully_fallback(&self) -> bool {
        self.startups
            .iter()
            .map(|s| s.provenance)
            .chain(self.opportunities.iter().map(|o| o.provenance))
            .chain(self.events.iter().map(|e| e.provenance))
            .all(|p| p == Provenance::Fallback)
    }
}

impl Scored for ScrapedStartup {
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl Scored for ScrapedOpportunity {
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl Scored for ScrapedEvent {
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunity(confidence: f32, provenance: Provenance) -> ScrapedOpportunity {
        ScrapedOpportunity {
            title: "Test Grant".to_string(),
            description: "A grant".to_string(),
            kind: OpportunityKind::Grant,
            sector: None,
            location: None,
            deadline: None,
            amount: None,
            url: None,
            source: "example.com".to_string(),
            confidence,
            provenance,
        }
    }

    #[test]
    fn test_empty_result() {
        let result = ScrapingResult::empty();
        assert_eq!(result.item_count(), 0);
        assert!(result.insights.is_empty());
        // Vacuously all-fallback.
        assert!(result.is_fully_fallback());
    }

    #[test]
    fn test_fully_fallback_detection() {
        let mut result = ScrapingResult::empty();
        result
            .opportunities
            .push(opportunity(0.85, Provenance::Fallback));
        assert!(result.is_fully_fallback());

        result.opportunities.push(opportunity(0.9, Provenance::Live));
        assert!(!result.is_fully_fallback());
        assert_eq!(result.item_count(), 2);
    }

    #[test]
    fn test_provenance_wire_format() {
        assert_eq!(
            serde_json::to_string(&Provenance::Fallback).unwrap(),
            "\"fallback\""
        );
        let kind: OpportunityKind = serde_json::from_str("\"accelerator\"").unwrap();
        assert_eq!(kind, OpportunityKind::Accelerator);
    }
}
