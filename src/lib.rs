//! Profile-driven opportunity discovery for the Southeast Asian startup
//! ecosystem.
//!
//! The pipeline builds role-specific search queries from a user profile,
//! runs them against hosted LLM search endpoints and scraped web search,
//! scores and categorizes the results, and substitutes curated Malaysian
//! ecosystem data whenever a live path comes up empty. Selected results can
//! then be imported into the storage layer, with embeddings for longer
//! descriptions.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::print_stdout)]

/// Discovery orchestration, scoring, queries and fallback data.
pub mod discovery;
/// User profiles driving discovery.
pub mod profile;
/// AI and web search clients.
pub mod search;
/// HTTP server and API routes.
pub mod server;
/// Entry helpers to start the server.
pub mod startup;
/// Storage layer, batch import and embeddings.
pub mod storage;
