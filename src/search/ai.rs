//! AI search client over hosted chat-completion endpoints.
//!
//! A primary endpoint (Perplexity) is tried first, then a fallback
//! (OpenAI). The model is asked for schema-conforming JSON; only when that
//! cannot be parsed does the line-shape prose parser run. Both endpoints
//! failing yields an empty list, never an error.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::discovery::confidence;
use crate::discovery::config::DiscoveryConfig;
use crate::discovery::error::DiscoveryError;
use crate::discovery::types::{MarketInsights, Provenance};
use crate::profile::UserProfile;

/// Perplexity chat-completions endpoint.
const PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";
/// Default Perplexity model.
const PERPLEXITY_MODEL: &str = "sonar";

/// OpenAI chat-completions endpoint.
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default OpenAI model.
const OPENAI_MODEL: &str = "gpt-4o-mini";

/// System prompt steering the model towards parseable output.
const SEARCH_SYSTEM_PROMPT: &str = "You are a research assistant for the Southeast Asian \
startup ecosystem. Answer with a JSON array only. Each element must have the fields \
\"title\", \"description\", \"type\" (one of \"opportunity\", \"startup\", \"event\"), and \
optionally \"url\", \"deadline\" and \"amount\". Do not add commentary.";

/// System prompt for the market-insights query.
const INSIGHTS_SYSTEM_PROMPT: &str = "You are a market analyst for the Southeast Asian \
startup ecosystem. Answer with a JSON object only, with string-array fields \"trends\", \
\"key_findings\" and \"recommendations\".";

/// Title keywords that make a prose line look like a result title.
const TITLE_KEYWORDS: &[&str] = &["Program", "Programme", "Fund", "Grant", "Accelerator", "Startup"];

/// Minimum response length considered non-trivial when no title lines match.
const SYNTHESIZE_MIN_LEN: usize = 80;

/// A hosted chat-completion endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one system+user exchange and return the completion text.
    ///
    /// # Errors
    /// Returns an error on timeout, non-success status or malformed JSON.
    async fn complete(&self, system: &str, user: &str) -> Result<String, DiscoveryError>;

    /// Backend name, used for logging and as a source label.
    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Shared request path for OpenAI-compatible chat endpoints.
async fn post_chat(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    model: &str,
    timeout: Duration,
    service: &'static str,
    system: &str,
    user: &str,
) -> Result<String, DiscoveryError> {
    let request = ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
    };

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .timeout(timeout)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::UpstreamStatus {
            service,
            status: status.as_u16(),
        });
    }

    let body: ChatResponse = response.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(DiscoveryError::EmptyCompletion(service))
}

/// Primary backend: Perplexity.
pub struct PerplexityBackend {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

impl PerplexityBackend {
    /// Create a backend with the given key and timeout.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ChatBackend for PerplexityBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DiscoveryError> {
        post_chat(
            &self.client,
            PERPLEXITY_URL,
            &self.api_key,
            PERPLEXITY_MODEL,
            self.timeout,
            self.name(),
            system,
            user,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "perplexity.ai"
    }
}

/// Fallback backend: OpenAI.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

impl OpenAiBackend {
    /// Create a backend with the given key and timeout.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DiscoveryError> {
        post_chat(
            &self.client,
            OPENAI_URL,
            &self.api_key,
            OPENAI_MODEL,
            self.timeout,
            self.name(),
            system,
            user,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "openai.com"
    }
}

/// Category declared or inferred for an AI search item.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiResultKind {
    /// A funding opportunity, grant or programme.
    #[default]
    Opportunity,
    /// A startup or company.
    Startup,
    /// An ecosystem event.
    Event,
}

impl AiResultKind {
    /// Map a declared type string onto a kind.
    fn from_declared(declared: &str) -> Option<Self> {
        match declared.to_lowercase().as_str() {
            "opportunity" | "grant" | "fund" | "funding" | "accelerator" | "program"
            | "programme" => Some(Self::Opportunity),
            "startup" | "company" => Some(Self::Startup),
            "event" | "summit" | "conference" => Some(Self::Event),
            _ => None,
        }
    }

    /// Infer a kind from free text.
    fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if ["summit", "conference", "demo day", "meetup", "pitch day"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            return Self::Event;
        }
        if ["raised", "founded", "co-founder", "series a", "series b", "valuation"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            return Self::Startup;
        }
        Self::Opportunity
    }
}

/// Raw item shape requested from the model.
#[derive(Clone, Debug, Deserialize)]
struct RawAiItem {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    declared_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    amount: Option<String>,
}

/// A structured result parsed from a chat completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiSearchItem {
    /// Result title.
    pub title: String,
    /// Result description.
    pub description: String,
    /// Declared or inferred category.
    pub kind: AiResultKind,
    /// Link, when the model provided one.
    pub url: Option<String>,
    /// Deadline text, when provided.
    pub deadline: Option<String>,
    /// Amount text, when provided.
    pub amount: Option<String>,
    /// Heuristic relevance score in [0, 1].
    pub confidence: f32,
    /// Source domain (from the URL) or the answering backend.
    pub source: String,
    /// Always [`Provenance::Live`] for AI results.
    pub provenance: Provenance,
}

/// Client composing the primary and fallback chat backends.
pub struct AiSearchClient {
    primary: Option<Box<dyn ChatBackend>>,
    fallback: Option<Box<dyn ChatBackend>>,
}

impl AiSearchClient {
    /// Build backends from configured API keys. Missing keys simply leave
    /// that backend absent; with no keys at all every search returns empty.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DiscoveryError::HttpClient(e.to_string()))?;

        let primary = config.api_keys.perplexity.as_ref().map(|key| {
            Box::new(PerplexityBackend::new(
                client.clone(),
                key.clone(),
                config.primary_timeout,
            )) as Box<dyn ChatBackend>
        });
        let fallback = config.api_keys.openai.as_ref().map(|key| {
            Box::new(OpenAiBackend::new(
                client.clone(),
                key.clone(),
                config.fallback_timeout,
            )) as Box<dyn ChatBackend>
        });

        if primary.is_none() && fallback.is_none() {
            tracing::warn!("no AI search API keys configured; AI search will return nothing");
        }

        Ok(Self { primary, fallback })
    }

    /// Build a client from explicit backends.
    #[must_use]
    pub fn with_backends(
        primary: Option<Box<dyn ChatBackend>>,
        fallback: Option<Box<dyn ChatBackend>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Run one role-tailored query and parse the completion into results.
    ///
    /// Never fails: endpoint errors degrade to an empty list.
    pub async fn search_by_profile(&self, query: &str, profile: &UserProfile) -> Vec<AiSearchItem> {
        let (content, backend) = match self.complete_with_fallback(SEARCH_SYSTEM_PROMPT, query).await
        {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!("AI search failed for {query:?}: {err}");
                return Vec::new();
            }
        };

        let raw = parse_json_items(&content).unwrap_or_else(|| parse_prose(&content));
        raw.into_iter()
            .map(|item| enrich(item, profile, backend))
            .collect()
    }

    /// Run the market-trends query for a sector.
    ///
    /// Returns `None` when both endpoints fail or nothing parseable comes
    /// back; the caller substitutes curated insight text.
    pub async fn market_insights(&self, query: &str) -> Option<MarketInsights> {
        let (content, _) = match self.complete_with_fallback(INSIGHTS_SYSTEM_PROMPT, query).await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!("insights query failed: {err}");
                return None;
            }
        };

        let insights = parse_insights(&content)?;
        if insights.is_empty() {
            return None;
        }
        Some(insights)
    }

    async fn complete_with_fallback(
        &self,
        system: &str,
        user: &str,
    ) -> Result<(String, &'static str), DiscoveryError> {
        if let Some(primary) = &self.primary {
            match primary.complete(system, user).await {
                Ok(content) => return Ok((content, primary.name())),
                Err(err) => {
                    tracing::warn!("{} failed, trying fallback: {err}", primary.name());
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.complete(system, user).await {
                Ok(content) => return Ok((content, fallback.name())),
                Err(err) => {
                    tracing::warn!("{} fallback failed: {err}", fallback.name());
                    return Err(err);
                }
            }
        }

        Err(DiscoveryError::ApiKeyRequired("ai search"))
    }
}

/// Attach confidence, source and kind to a raw item.
fn enrich(item: RawAiItem, profile: &UserProfile, backend: &'static str) -> AiSearchItem {
    let kind = item
        .declared_type
        .as_deref()
        .and_then(AiResultKind::from_declared)
        .unwrap_or_else(|| AiResultKind::classify(&format!("{} {}", item.title, item.description)));

    let confidence = confidence::ai_confidence(
        &item.title,
        &item.description,
        profile.sector.as_deref(),
        profile.location.as_deref(),
    );

    let source = item
        .url
        .as_deref()
        .and_then(domain_of)
        .unwrap_or_else(|| backend.to_string());

    AiSearchItem {
        title: item.title,
        description: item.description,
        kind,
        url: item.url,
        deadline: item.deadline,
        amount: item.amount,
        confidence,
        source,
        provenance: Provenance::Live,
    }
}

fn domain_of(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
    })
}

/// Try to parse the completion as the requested JSON array.
fn parse_json_items(content: &str) -> Option<Vec<RawAiItem>> {
    let stripped = strip_code_fences(content);
    let start = stripped.find('[')?;
    let end = stripped.rfind(']')?;
    if end <= start {
        return None;
    }
    let items: Vec<RawAiItem> = serde_json::from_str(&stripped[start..=end]).ok()?;
    let items: Vec<RawAiItem> = items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Try to parse the insights completion as the requested JSON object.
fn parse_insights(content: &str) -> Option<MarketInsights> {
    #[derive(Deserialize)]
    struct RawInsights {
        #[serde(default)]
        trends: Vec<String>,
        #[serde(default)]
        key_findings: Vec<String>,
        #[serde(default)]
        recommendations: Vec<String>,
    }

    let stripped = strip_code_fences(content);
    if let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) {
        if end > start {
            if let Ok(raw) = serde_json::from_str::<RawInsights>(&stripped[start..=end]) {
                return Some(MarketInsights {
                    trends: raw.trends,
                    key_findings: raw.key_findings,
                    recommendations: raw.recommendations,
                    provenance: Provenance::Live,
                });
            }
        }
    }

    // Degraded path: treat bullet lines as trends.
    let trends: Vec<String> = stripped
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('*') || line.starts_with('•'))
        .map(|line| line.trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if trends.is_empty() {
        return None;
    }
    Some(MarketInsights {
        trends,
        key_findings: Vec::new(),
        recommendations: Vec::new(),
        provenance: Provenance::Live,
    })
}

fn strip_code_fences(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered_title_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\s*\d+[.)]\s+(.+)$").unwrap_or_else(|_| unreachable!()))
}

fn bold_title_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\s*\*\*(.+?)\*\*").unwrap_or_else(|_| unreachable!()))
}

/// Extract a title from a line when it looks like a result title.
fn title_of_line(line: &str) -> Option<String> {
    if let Some(captures) = numbered_title_regex().captures(line) {
        if let Some(matched) = captures.get(1) {
            return Some(matched.as_str().trim_matches('*').trim().to_string());
        }
    }
    if let Some(captures) = bold_title_regex().captures(line) {
        if let Some(matched) = captures.get(1) {
            return Some(matched.as_str().trim().to_string());
        }
    }
    let trimmed = line.trim();
    if !trimmed.is_empty()
        && trimmed.len() < 120
        && TITLE_KEYWORDS.iter().any(|kw| trimmed.contains(kw))
    {
        return Some(trimmed.trim_matches('*').trim().to_string());
    }
    None
}

/// Degraded parser: split free text into results on title-like lines.
fn parse_prose(content: &str) -> Vec<RawAiItem> {
    let mut items: Vec<RawAiItem> = Vec::new();
    let mut current: Option<RawAiItem> = None;

    for line in content.lines() {
        if let Some(title) = title_of_line(line) {
            if let Some(done) = current.take() {
                items.push(done);
            }
            current = Some(RawAiItem {
                title,
                description: String::new(),
                declared_type: None,
                url: None,
                deadline: None,
                amount: None,
            });
        } else if let Some(item) = current.as_mut() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                if !item.description.is_empty() {
                    item.description.push(' ');
                }
                item.description.push_str(trimmed);
            }
        }
    }
    if let Some(done) = current.take() {
        items.push(done);
    }

    // No title-like line but a non-trivial response: one generic result
    // from the first 300 characters.
    if items.is_empty() && content.trim().len() > SYNTHESIZE_MIN_LEN {
        let description: String = content.trim().chars().take(300).collect();
        items.push(RawAiItem {
            title: "Ecosystem search summary".to_string(),
            description,
            declared_type: None,
            url: None,
            deadline: None,
            amount: None,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileRole;
    use uuid::Uuid;

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

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, DiscoveryError> {
            Err(DiscoveryError::EmptyCompletion("failing"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn profile() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), ProfileRole::Founder)
            .with_sector("FinTech")
            .with_location("Malaysia")
    }

    #[test]
    fn test_parse_json_items_with_fences() {
        let content = r#"Here you go:
```json
[
  {"title": "Cradle CIP Spark", "description": "Pre-seed grant", "type": "grant",
   "url": "https://www.cradlefund.com.my/cip-spark/", "amount": "RM150,000"},
  {"title": "KL FinTech Summit", "description": "Annual summit", "type": "event"}
]
```"#;
        let items = parse_json_items(content).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Cradle CIP Spark");
        assert_eq!(items[0].declared_type.as_deref(), Some("grant"));
        assert_eq!(items[0].amount.as_deref(), Some("RM150,000"));
    }

    #[test]
    fn test_parse_json_items_rejects_garbage() {
        assert!(parse_json_items("no brackets here").is_none());
        assert!(parse_json_items("[not json]").is_none());
    }

    #[test]
    fn test_parse_prose_numbered_list() {
        let content = "Here are some options:\n\
                       1. Cradle CIP Spark\n\
                       A pre-seed grant of up to RM150,000.\n\
                       For Malaysian startups.\n\
                       2. MRANTI Accelerator\n\
                       Equity-free accelerator in KL.";
        let items = parse_prose(content);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Cradle CIP Spark");
        assert_eq!(
            items[0].description,
            "A pre-seed grant of up to RM150,000. For Malaysian startups."
        );
        assert_eq!(items[1].title, "MRANTI Accelerator");
    }

    #[test]
    fn test_parse_prose_bold_and_keyword_titles() {
        let content = "**Khazanah Impact Fund**\nBacks social enterprises.\n\
                       MDEC Digital Content Grant\nMatching grant for creatives.";
        let items = parse_prose(content);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Khazanah Impact Fund");
        assert_eq!(items[1].title, "MDEC Digital Content Grant");
    }

    #[test]
    fn test_parse_prose_synthesizes_generic_result() {
        let content = "The Malaysian ecosystem continues to mature, with strong support from \
                       government agencies and a growing pool of regional venture capital.";
        let items = parse_prose(content);
        assert_eq!(items.len(), 1);
        assert!(items[0].description.len() <= 300);

        // Trivial responses produce nothing.
        assert!(parse_prose("ok").is_empty());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(AiResultKind::from_declared("grant"), Some(AiResultKind::Opportunity));
        assert_eq!(AiResultKind::from_declared("startup"), Some(AiResultKind::Startup));
        assert_eq!(AiResultKind::from_declared("conference"), Some(AiResultKind::Event));
        assert_eq!(AiResultKind::from_declared("mystery"), None);

        assert_eq!(
            AiResultKind::classify("Penang tech summit next month"),
            AiResultKind::Event
        );
        assert_eq!(
            AiResultKind::classify("The company raised a Series A round"),
            AiResultKind::Startup
        );
        assert_eq!(
            AiResultKind::classify("Grant applications are open"),
            AiResultKind::Opportunity
        );
    }

    #[test]
    fn test_parse_insights_json_and_bullets() {
        let json = r#"{"trends": ["More seed deals"], "key_findings": [], "recommendations": ["Apply early"]}"#;
        let insights = parse_insights(json).unwrap();
        assert_eq!(insights.trends, vec!["More seed deals".to_string()]);
        assert_eq!(insights.provenance, Provenance::Live);

        let bullets = "- Seed rounds are growing\n- Grants remain popular";
        let insights = parse_insights(bullets).unwrap();
        assert_eq!(insights.trends.len(), 2);

        assert!(parse_insights("nothing useful").is_none());
    }

    #[tokio::test]
    async fn test_search_uses_fallback_backend() {
        let canned = r#"[{"title": "FinTech Grant Malaysia", "description": "A grant", "type": "grant"}]"#;
        let client = AiSearchClient::with_backends(
            Some(Box::new(FailingBackend)),
            Some(Box::new(CannedBackend(canned))),
        );

        let items = client.search_by_profile("funding", &profile()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, AiResultKind::Opportunity);
        assert_eq!(items[0].provenance, Provenance::Live);
        // Sector and location both matched: 0.8 + 0.1 + 0.1.
        assert!((items[0].confidence - 1.0).abs() < f32::EPSILON);
        assert_eq!(items[0].source, "canned");
    }

    #[tokio::test]
    async fn test_search_with_all_backends_failing_is_empty() {
        let client = AiSearchClient::with_backends(
            Some(Box::new(FailingBackend)),
            Some(Box::new(FailingBackend)),
        );
        let items = client.search_by_profile("funding", &profile()).await;
        assert!(items.is_empty());

        let none = AiSearchClient::with_backends(None, None);
        assert!(none.search_by_profile("funding", &profile()).await.is_empty());
    }

    #[tokio::test]
    async fn test_source_prefers_url_domain() {
        let canned = r#"[{"title": "Grant", "description": "x", "type": "grant", "url": "https://www.mdec.my/grants"}]"#;
        let client =
            AiSearchClient::with_backends(Some(Box::new(CannedBackend(canned))), None);
        let items = client.search_by_profile("funding", &profile()).await;
        assert_eq!(items[0].source, "mdec.my");
    }
}
