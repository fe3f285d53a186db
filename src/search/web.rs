//! Web search client: DuckDuckGo HTML search plus result-page scraping.
//!
//! One-shot, stateless calls. A failed individual page is silently dropped;
//! a failed results page yields an empty set. Callers cannot distinguish
//! "no results" from "search failed" here by design.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::discovery::config::DiscoveryConfig;
use crate::discovery::error::DiscoveryError;
use crate::search::cache::SearchCache;
use crate::search::extract;

/// Base URL for DuckDuckGo HTML search.
const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Domains excluded from result pages: social networks and aggregators.
const BLOCKED_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "reddit.com",
    "pinterest.com",
    "medium.com",
    "quora.com",
];

/// Domains fetched first: government and incubator sites.
const PRIORITY_DOMAINS: &[&str] = &[
    "mdec.my",
    "cradlefund.com.my",
    "mranti.my",
    "mavcap.com",
    "bnm.gov.my",
    "mystartup.gov.my",
    "smecorp.gov.my",
    "mosti.gov.my",
    "gov.my",
    "1337.ventures",
];

/// A search result enriched with fields extracted from the target page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebSearchItem {
    /// Result title from the results page.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Target domain.
    pub domain: String,
    /// Snippet from the results page.
    pub snippet: String,
    /// Application deadline extracted from the page, when found.
    pub deadline: Option<String>,
    /// Funding amount extracted from the page, when found.
    pub amount: Option<String>,
    /// Sector keyword extracted from the page, when found.
    pub sector: Option<String>,
}

/// A candidate link parsed off the results page, before the page fetch.
#[derive(Clone, Debug)]
struct SearchLead {
    title: String,
    url: String,
    domain: String,
    snippet: String,
}

/// Client for scripted searches against the DuckDuckGo HTML endpoint.
pub struct WebSearchClient {
    client: reqwest::Client,
    config: DiscoveryConfig,
    cache: SearchCache,
}

impl WebSearchClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = build_scrape_client(&config)?;
        let cache = SearchCache::new(config.cache.clone());
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Search and extract fields from the top result pages.
    ///
    /// Never fails: any error along the way is logged and funnelled into an
    /// empty result set.
    pub async fn search(&self, query: &str) -> Vec<WebSearchItem> {
        if let Some(cached) = self.cache.get_search(query) {
            tracing::debug!("cache hit for web search: {query}");
            return cached;
        }

        match self.search_inner(query).await {
            Ok(items) => {
                self.cache.set_search(query, &items);
                items
            }
            Err(err) => {
                tracing::warn!("web search failed for {query:?}: {err}");
                Vec::new()
            }
        }
    }

    async fn search_inner(&self, query: &str) -> Result<Vec<WebSearchItem>, DiscoveryError> {
        let leads = self.fetch_leads(query).await?;
        let leads = prioritize(leads);

        let mut items = Vec::new();
        for lead in leads.into_iter().take(self.config.max_pages) {
            let page_text = match self.fetch_page_text(&lead.url).await {
                Ok(text) => text,
                Err(err) => {
                    // Single-page failures are dropped, not retried.
                    tracing::debug!("dropping page {}: {err}", lead.url);
                    continue;
                }
            };

            items.push(WebSearchItem {
                deadline: extract::extract_deadline(&page_text),
                amount: extract::extract_amount(&page_text),
                sector: extract::extract_sector(&page_text),
                title: lead.title,
                url: lead.url,
                domain: lead.domain,
                snippet: lead.snippet,
            });
        }

        if items.is_empty() {
            tracing::debug!("web search produced no usable pages for {query:?}");
        }
        Ok(items)
    }

    /// Fetch and parse the DuckDuckGo results page.
    async fn fetch_leads(&self, query: &str) -> Result<Vec<SearchLead>, DiscoveryError> {
        let params = [("q", query.to_string()), ("b", String::new())];
        let response = self.client.post(DDG_HTML_URL).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::UpstreamStatus {
                service: "duckduckgo",
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        parse_leads(&html, self.config.max_search_results)
    }

    /// Fetch a result page and extract its readable text.
    async fn fetch_page_text(&self, url: &str) -> Result<String, DiscoveryError> {
        if let Some(cached) = self.cache.get_page(url) {
            tracing::debug!("cache hit for page: {url}");
            return Ok(cached);
        }

        let response = self
            .client
            .get(url)
            .timeout(self.config.page_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::UpstreamStatus {
                service: "page",
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        if !content_type.contains("text/html") && !content_type.contains("text/plain") {
            return Err(DiscoveryError::UnsupportedContentType(content_type));
        }

        let html = response.text().await?;
        let text = readable_text(&html);
        if text.is_empty() {
            return Err(DiscoveryError::ExtractionFailed(format!(
                "no readable text at {url}"
            )));
        }

        self.cache.set_page(url, &text);
        Ok(text)
    }
}

/// Build an HTTP client with browser-like headers and a rotated user agent.
fn build_scrape_client(config: &DiscoveryConfig) -> Result<reqwest::Client, DiscoveryError> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

    let mut headers = HeaderMap::new();

    let ua = config.random_user_agent();
    if let Ok(ua_value) = HeaderValue::from_str(&ua) {
        headers.insert(USER_AGENT, ua_value);
    }
    if let Ok(accept) = HeaderValue::from_str(
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ) {
        headers.insert(ACCEPT, accept);
    }
    if let Ok(lang) = HeaderValue::from_str("en-US,en;q=0.8,ms;q=0.5") {
        headers.insert(ACCEPT_LANGUAGE, lang);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.page_timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| DiscoveryError::HttpClient(e.to_string()))
}

/// Parse DuckDuckGo HTML results into leads, skipping blocked domains.
fn parse_leads(html: &str, max_results: usize) -> Result<Vec<SearchLead>, DiscoveryError> {
    let document = Html::parse_document(html);

    let result_selector = Selector::parse(".result")
        .map_err(|e| DiscoveryError::HtmlParse(format!("Invalid selector: {e:?}")))?;
    let title_selector = Selector::parse(".result__a")
        .map_err(|e| DiscoveryError::HtmlParse(format!("Invalid selector: {e:?}")))?;
    let snippet_selector = Selector::parse(".result__snippet")
        .map_err(|e| DiscoveryError::HtmlParse(format!("Invalid selector: {e:?}")))?;

    let mut leads = Vec::new();

    for element in document.select(&result_selector) {
        if leads.len() >= max_results {
            break;
        }

        let title = element
            .select(&title_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let url = element
            .select(&title_selector)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(extract_url_from_redirect)
            .unwrap_or_default();
        if url.is_empty() {
            continue;
        }

        let Some(domain) = extract_domain(&url) else {
            continue;
        };
        if is_blocked(&domain) {
            continue;
        }

        let snippet = element
            .select(&snippet_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        leads.push(SearchLead {
            title,
            url,
            domain,
            snippet,
        });
    }

    if leads.is_empty() {
        tracing::warn!("no usable results in DuckDuckGo HTML response");
    }

    Ok(leads)
}

/// Stable partition: priority-domain leads first in encountered order, the
/// rest after in encountered order.
fn prioritize(leads: Vec<SearchLead>) -> Vec<SearchLead> {
    let mut priority = Vec::new();
    let mut rest = Vec::new();
    for lead in leads {
        if is_priority(&lead.domain) {
            priority.push(lead);
        } else {
            rest.push(lead);
        }
    }
    priority.extend(rest);
    priority
}

fn is_blocked(domain: &str) -> bool {
    BLOCKED_DOMAINS
        .iter()
        .any(|blocked| domain == *blocked || domain.ends_with(&format!(".{blocked}")))
}

fn is_priority(domain: &str) -> bool {
    PRIORITY_DOMAINS
        .iter()
        .any(|known| domain == *known || domain.ends_with(&format!(".{known}")))
}

/// Extract the actual URL from DuckDuckGo's redirect URL.
fn extract_url_from_redirect(href: &str) -> String {
    // Redirect URLs look like:
    // //duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...
    if let Some(uddg_start) = href.find("uddg=") {
        let start = uddg_start + 5;
        let end = href[start..].find('&').map_or(href.len(), |i| start + i);
        let encoded = &href[start..end];
        urlencoding::decode(encoded)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| encoded.to_string())
    } else if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    }
}

/// Extract domain from URL, without any leading "www.".
fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
    })
}

/// Selectors tried in order when extracting a page's main text.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".entry-content",
    ".content",
    "#content",
];

/// Extract readable text from an HTML page.
fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = clean_text(&element.text().collect::<String>());
                if text.split_whitespace().count() > 50 {
                    return text;
                }
            }
        }
    }

    // Fallback: whole body.
    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return clean_text(&body.text().collect::<String>());
        }
    }

    String::new()
}

/// Normalize whitespace in extracted text.
fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_space = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }
    result.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(domain: &str) -> SearchLead {
        SearchLead {
            title: format!("Result on {domain}"),
            url: format!("https://{domain}/page"),
            domain: domain.to_string(),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_extract_url_from_redirect() {
        let redirect = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fmdec.my%2Fgrants&rut=123";
        assert_eq!(extract_url_from_redirect(redirect), "https://mdec.my/grants");
        assert_eq!(
            extract_url_from_redirect("https://example.com/x"),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_extract_domain_strips_www() {
        assert_eq!(
            extract_domain("https://www.cradlefund.com.my/cip"),
            Some("cradlefund.com.my".to_string())
        );
        assert_eq!(extract_domain("not a url"), None);
    }

    #[test]
    fn test_blocklist_and_allowlist() {
        assert!(is_blocked("facebook.com"));
        assert!(is_blocked("m.facebook.com"));
        assert!(!is_blocked("mdec.my"));

        assert!(is_priority("mdec.my"));
        assert!(is_priority("sme.gov.my"));
        assert!(!is_priority("techcrunch.com"));
    }

    #[test]
    fn test_prioritize_is_stable() {
        let leads = vec![
            lead("techcrunch.com"),
            lead("mdec.my"),
            lead("e27.co"),
            lead("cradlefund.com.my"),
        ];
        let sorted = prioritize(leads);
        let domains: Vec<&str> = sorted.iter().map(|l| l.domain.as_str()).collect();
        assert_eq!(
            domains,
            vec!["mdec.my", "cradlefund.com.my", "techcrunch.com", "e27.co"]
        );
    }

    #[test]
    fn test_parse_leads_skips_blocked() {
        let html = r#"
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fmdec.my%2Fgrants">MDEC Grants</a>
              <div class="result__snippet">Digital economy grants</div>
            </div>
            <div class="result">
              <a class="result__a" href="https://facebook.com/somepage">A social page</a>
              <div class="result__snippet">ignored</div>
            </div>
        "#;
        let leads = parse_leads(html, 10).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].domain, "mdec.my");
        assert_eq!(leads[0].title, "MDEC Grants");
        assert_eq!(leads[0].snippet, "Digital economy grants");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Hello   world \n\t test  "), "Hello world test");
    }
}
