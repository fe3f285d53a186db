//! In-memory storage backend.
//!
//! Backs the server by default and every test that needs persistence.
//! Writes validate first; there is deliberately no deduplication, so
//! repeated imports of the same content create distinct records.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::discovery::types::{ScrapedEvent, ScrapedOpportunity, ScrapedStartup};
use crate::storage::embedding::Embedding;
use crate::storage::{
    EmbeddingRecord, EntityKind, EventRecord, OpportunityRecord, StartupRecord, Storage,
    StorageError,
};

/// Thread-safe in-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
    startups: DashMap<Uuid, StartupRecord>,
    opportunities: DashMap<Uuid, OpportunityRecord>,
    events: DashMap<Uuid, EventRecord>,
    embeddings: DashMap<Uuid, EmbeddingRecord>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored embeddings.
    #[must_use]
    pub fn embedding_count(&self) -> usize {
        self.embeddings.len()
    }

    fn contains_entity(&self, id: Uuid, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Startup => self.startups.contains_key(&id),
            EntityKind::Opportunity => self.opportunities.contains_key(&id),
            EntityKind::Event => self.events.contains_key(&id),
        }
    }
}

fn require_non_empty(value: &str, field: &str, context: &str) -> Result<(), StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::Invalid(format!(
            "{context}: {field} must not be empty"
        )));
    }
    Ok(())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_startup(
        &self,
        owner_id: Uuid,
        item: &ScrapedStartup,
    ) -> Result<StartupRecord, StorageError> {
        require_non_empty(&item.name, "name", "startup")?;
        let record = StartupRecord {
            id: Uuid::new_v4(),
            owner_id,
            name: item.name.clone(),
            description: item.description.clone(),
            sector: item.sector.clone(),
            location: item.location.clone(),
            stage: item.stage.clone(),
            website: item.website.clone(),
            source: item.source.clone(),
            provenance: item.provenance,
            created_at: Utc::now(),
        };
        self.startups.insert(record.id, record.clone());
        Ok(record)
    }

    async fn create_opportunity(
        &self,
        owner_id: Uuid,
        item: &ScrapedOpportunity,
    ) -> Result<OpportunityRecord, StorageError> {
        require_non_empty(&item.title, "title", "opportunity")?;
        let record = OpportunityRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: item.title.clone(),
            description: item.description.clone(),
            kind: item.kind,
            sector: item.sector.clone(),
            location: item.location.clone(),
            deadline: item.deadline.clone(),
            amount: item.amount.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
            provenance: item.provenance,
            created_at: Utc::now(),
        };
        self.opportunities.insert(record.id, record.clone());
        Ok(record)
    }

    async fn create_event(
        &self,
        owner_id: Uuid,
        item: &ScrapedEvent,
    ) -> Result<EventRecord, StorageError> {
        require_non_empty(&item.title, "title", "event")?;
        let record = EventRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: item.title.clone(),
            description: item.description.clone(),
            date: item.date.clone(),
            location: item.location.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
            provenance: item.provenance,
            created_at: Utc::now(),
        };
        self.events.insert(record.id, record.clone());
        Ok(record)
    }

    async fn create_embedding(
        &self,
        entity_id: Uuid,
        entity_kind: EntityKind,
        embedding: Embedding,
    ) -> Result<EmbeddingRecord, StorageError> {
        if !self.contains_entity(entity_id, entity_kind) {
            return Err(StorageError::NotFound {
                kind: match entity_kind {
                    EntityKind::Startup => "startup",
                    EntityKind::Opportunity => "opportunity",
                    EntityKind::Event => "event",
                },
                id: entity_id,
            });
        }
        let record = EmbeddingRecord {
            id: Uuid::new_v4(),
            entity_id,
            entity_kind,
            embedding,
            created_at: Utc::now(),
        };
        self.embeddings.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_opportunities(&self) -> Result<Vec<OpportunityRecord>, StorageError> {
        let mut records: Vec<OpportunityRecord> =
            self.opportunities.iter().map(|e| e.value().clone()).collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn list_startups(&self) -> Result<Vec<StartupRecord>, StorageError> {
        let mut records: Vec<StartupRecord> =
            self.startups.iter().map(|e| e.value().clone()).collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, StorageError> {
        let mut records: Vec<EventRecord> =
            self.events.iter().map(|e| e.value().clone()).collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::types::{OpportunityKind, Provenance};
    use crate::storage::embedding::HashEmbedder;

    fn opportunity(title: &str) -> ScrapedOpportunity {
        ScrapedOpportunity {
            title: title.to_string(),
            description: "A grant".to_string(),
            kind: OpportunityKind::Grant,
            sector: None,
            location: None,
            deadline: None,
            amount: None,
            url: None,
            source: "mdec.my".to_string(),
            confidence: 0.9,
            provenance: Provenance::Live,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_opportunities() {
        let storage = MemoryStorage::new();
        let owner = Uuid::new_v4();
        storage
            .create_opportunity(owner, &opportunity("Grant A"))
            .await
            .unwrap();
        storage
            .create_opportunity(owner, &opportunity("Grant B"))
            .await
            .unwrap();

        let listed = storage.list_opportunities().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.owner_id == owner));
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let storage = MemoryStorage::new();
        let err = storage
            .create_opportunity(Uuid::new_v4(), &opportunity("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
        assert!(storage.list_opportunities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_deduplication() {
        let storage = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let item = opportunity("Same Grant");
        storage.create_opportunity(owner, &item).await.unwrap();
        storage.create_opportunity(owner, &item).await.unwrap();
        assert_eq!(storage.list_opportunities().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_requires_existing_entity() {
        let storage = MemoryStorage::new();
        let embedder = HashEmbedder::new();
        let vector = embedder.embed("some description");

        let err = storage
            .create_embedding(Uuid::new_v4(), EntityKind::Opportunity, vector.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));

        let record = storage
            .create_opportunity(Uuid::new_v4(), &opportunity("Grant"))
            .await
            .unwrap();
        storage
            .create_embedding(record.id, EntityKind::Opportunity, vector)
            .await
            .unwrap();
        assert_eq!(storage.embedding_count(), 1);
    }
}
