//! Error types for the discovery pipeline.

use thiserror::Error;

/// Errors that can occur while talking to search engines, pages and LLM
/// endpoints. Per the pipeline's degradation policy these never escape the
/// top-level orchestrator; they exist so the clients can use `?` internally
/// and so logs can name what actually failed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTML parsing error.
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Upstream endpoint returned a non-success status.
    #[error("{service} returned status {status}")]
    UpstreamStatus {
        /// Which upstream service answered.
        service: &'static str,
        /// The HTTP status code.
        status: u16,
    },

    /// The completion response carried no usable content.
    #[error("Empty completion from {0}")]
    EmptyCompletion(&'static str),

    /// API key required but not configured.
    #[error("API key required for {0}")]
    ApiKeyRequired(&'static str),

    /// Content extraction failed.
    #[error("Content extraction failed: {0}")]
    ExtractionFailed(String),

    /// Content type not supported.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
