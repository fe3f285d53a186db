//! Batch import of discovery results into storage.
//!
//! Every item is attempted independently: a failure is recorded in the
//! report together with the item's identifying field and processing moves
//! on. The batch itself never fails.

use uuid::Uuid;

use crate::discovery::types::ScrapingResult;
use crate::storage::embedding::HashEmbedder;
use crate::storage::{EntityKind, Storage, StorageError};

/// Outcome of one import batch.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ImportReport {
    /// Startups persisted.
    pub startups: usize,
    /// Opportunities persisted.
    pub opportunities: usize,
    /// Events persisted.
    pub events: usize,
    /// Embeddings persisted.
    pub embeddings: usize,
    /// Per-item failures, each naming the item and the error.
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Total entities persisted, embeddings excluded.
    #[must_use]
    pub fn imported_total(&self) -> usize {
        self.startups + self.opportunities + self.events
    }
}

/// Import every item of a discovery result for a user.
///
/// Items with a description longer than `embed_threshold` additionally get
/// an embedding persisted alongside the entity.
pub async fn import_scraped_data(
    storage: &dyn Storage,
    embedder: &HashEmbedder,
    embed_threshold: usize,
    result: &ScrapingResult,
    user_id: Uuid,
) -> ImportReport {
    let mut report = ImportReport::default();

    for startup in &result.startups {
        match storage.create_startup(user_id, startup).await {
            Ok(record) => {
                report.startups += 1;
                embed_if_long(
                    storage,
                    embedder,
                    embed_threshold,
                    record.id,
                    EntityKind::Startup,
                    &startup.description,
                    &startup.name,
                    &mut report,
                )
                .await;
            }
            Err(err) => report.errors.push(import_error("startup", &startup.name, &err)),
        }
    }

    for opportunity in &result.opportunities {
        match storage.create_opportunity(user_id, opportunity).await {
            Ok(record) => {
                report.opportunities += 1;
                embed_if_long(
                    storage,
                    embedder,
                    embed_threshold,
                    record.id,
                    EntityKind::Opportunity,
                    &opportunity.description,
                    &opportunity.title,
                    &mut report,
                )
                .await;
            }
            Err(err) => report
                .errors
                .push(import_error("opportunity", &opportunity.title, &err)),
        }
    }

    for event in &result.events {
        match storage.create_event(user_id, event).await {
            Ok(record) => {
                report.events += 1;
                embed_if_long(
                    storage,
                    embedder,
                    embed_threshold,
                    record.id,
                    EntityKind::Event,
                    &event.description,
                    &event.title,
                    &mut report,
                )
                .await;
            }
            Err(err) => report.errors.push(import_error("event", &event.title, &err)),
        }
    }

    if !report.errors.is_empty() {
        tracing::warn!(
            user_id = %user_id,
            failed = report.errors.len(),
            imported = report.imported_total(),
            "import finished with per-item failures"
        );
    }
    report
}

#[allow(clippy::too_many_arguments)]
async fn embed_if_long(
    storage: &dyn Storage,
    embedder: &HashEmbedder,
    threshold: usize,
    entity_id: Uuid,
    kind: EntityKind,
    description: &str,
    label: &str,
    report: &mut ImportReport,
) {
    if description.len() <= threshold {
        return;
    }
    let vector = embedder.embed(description);
    match storage.create_embedding(entity_id, kind, vector).await {
        Ok(_) => report.embeddings += 1,
        Err(err) => report
            .errors
            .push(format!("embedding for {label:?}: {err}")),
    }
}

fn import_error(category: &str, label: &str, err: &StorageError) -> String {
    format!("{category} {label:?}: {err}")
}
