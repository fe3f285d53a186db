//! Search clients: AI chat-completion search and DuckDuckGo web scraping.

pub mod ai;
pub mod cache;
pub mod extract;
pub mod web;

pub use ai::{AiResultKind, AiSearchClient, AiSearchItem, ChatBackend};
pub use cache::SearchCache;
pub use web::{WebSearchClient, WebSearchItem};
