//! Storage layer: durable records created from discovery results.

pub mod embedding;
pub mod import;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::discovery::types::{
    OpportunityKind, Provenance, ScrapedEvent, ScrapedOpportunity, ScrapedStartup,
};
use crate::storage::embedding::Embedding;

/// Storage layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The item failed validation and was not persisted.
    #[error("invalid item: {0}")]
    Invalid(String),

    /// The referenced entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind name.
        kind: &'static str,
        /// Entity id.
        id: Uuid,
    },

    /// The backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Kind of persisted entity an embedding belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A startup record.
    Startup,
    /// An opportunity record.
    Opportunity,
    /// An event record.
    Event,
}

/// A persisted startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StartupRecord {
    /// Record id.
    pub id: Uuid,
    /// User who imported this record.
    pub owner_id: Uuid,
    /// Startup name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Sector, when known.
    pub sector: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Funding stage, when known.
    pub stage: Option<String>,
    /// Website, when known.
    pub website: Option<String>,
    /// Source domain or service.
    pub source: String,
    /// Live or fallback origin at scrape time.
    pub provenance: Provenance,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// A persisted opportunity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Record id.
    pub id: Uuid,
    /// User who imported this record.
    pub owner_id: Uuid,
    /// Opportunity title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Opportunity kind.
    pub kind: OpportunityKind,
    /// Sector, when known.
    pub sector: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Deadline text, when known.
    pub deadline: Option<String>,
    /// Amount text, when known.
    pub amount: Option<String>,
    /// Link, when known.
    pub url: Option<String>,
    /// Source domain or service.
    pub source: String,
    /// Live or fallback origin at scrape time.
    pub provenance: Provenance,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// A persisted event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Record id.
    pub id: Uuid,
    /// User who imported this record.
    pub owner_id: Uuid,
    /// Event title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Date text, when known.
    pub date: Option<String>,
    /// Location, when known.
    pub location: Option<String>,
    /// Link, when known.
    pub url: Option<String>,
    /// Source domain or service.
    pub source: String,
    /// Live or fallback origin at scrape time.
    pub provenance: Provenance,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// A persisted embedding tied to an entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Record id.
    pub id: Uuid,
    /// Entity this embedding describes.
    pub entity_id: Uuid,
    /// Kind of that entity.
    pub entity_kind: EntityKind,
    /// The vector itself.
    pub embedding: Embedding,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Persistence operations the import path and read endpoints need.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a scraped startup for a user.
    ///
    /// # Errors
    /// Returns [`StorageError::Invalid`] when the item fails validation.
    async fn create_startup(
        &self,
        owner_id: Uuid,
        item: &ScrapedStartup,
    ) -> Result<StartupRecord, StorageError>;

    /// Persist a scraped opportunity for a user.
    ///
    /// # Errors
    /// Returns [`StorageError::Invalid`] when the item fails validation.
    async fn create_opportunity(
        &self,
        owner_id: Uuid,
        item: &ScrapedOpportunity,
    ) -> Result<OpportunityRecord, StorageError>;

    /// Persist a scraped event for a user.
    ///
    /// # Errors
    /// Returns [`StorageError::Invalid`] when the item fails validation.
    async fn create_event(
        &self,
        owner_id: Uuid,
        item: &ScrapedEvent,
    ) -> Result<EventRecord, StorageError>;

    /// Persist an embedding for an already-persisted entity.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] when the entity does not exist.
    async fn create_embedding(
        &self,
        entity_id: Uuid,
        entity_kind: EntityKind,
        embedding: Embedding,
    ) -> Result<EmbeddingRecord, StorageError>;

    /// List all persisted opportunities.
    ///
    /// # Errors
    /// Returns an error when the backend fails.
    async fn list_opportunities(&self) -> Result<Vec<OpportunityRecord>, StorageError>;

    /// List all persisted startups.
    ///
    /// # Errors
    /// Returns an error when the backend fails.
    async fn list_startups(&self) -> Result<Vec<StartupRecord>, StorageError>;

    /// List all persisted events.
    ///
    /// # Errors
    /// Returns an error when the backend fails.
    async fn list_events(&self) -> Result<Vec<EventRecord>, StorageError>;
}
