use crate::error::Result;
use crate::store::CollectionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specsync::v1::{
    Actor, Audit, Collection, CollectionItem, CopyPolicy, ItemSource, MergeStats, StoredCollection,
    detach, merge_with_stats, query,
};
use specsync_openapi::{BuildContext, SpecDocument};

// ============================================================================
// Configuration
// ============================================================================

/// Per-call import options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Reconcile against an existing actively synced collection with the
    /// same title and workspace, instead of always creating a new one.
    pub active_sync: bool,
    pub workspace_id: Option<String>,
    /// Where the spec was fetched from; stored on the collection.
    pub active_sync_url: String,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn on active sync, recording the source URL.
    pub fn with_active_sync(mut self, url: impl Into<String>) -> Self {
        self.active_sync = true;
        self.active_sync_url = url.into();
        self
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }
}

/// Settings fixed for the lifetime of an [`Importer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// How schema fragments are materialized before persisting.
    #[serde(default)]
    pub copy_policy: CopyPolicy,
}

impl ImportConfig {
    pub fn with_copy_policy(mut self, copy_policy: CopyPolicy) -> Self {
        self.copy_policy = copy_policy;
        self
    }
}

/// Result of a successful import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The collection as read back from the store.
    pub collection: StoredCollection,
    /// Whether an existing collection was updated rather than created.
    pub existing_collection: bool,
    /// Reconciliation counts; all zero when nothing was merged.
    pub stats: MergeStats,
}

// ============================================================================
// Importer
// ============================================================================

/// Builds collections from spec text and persists them through a store.
pub struct Importer<S> {
    store: S,
    config: ImportConfig,
}

impl<S: CollectionStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ImportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Import `raw` spec text as `actor`.
    ///
    /// Parsing and tree building finish before the store is touched, so a
    /// spec error never leaves anything persisted. Store errors are returned
    /// as they are; there are no retries.
    pub async fn import(
        &self,
        raw: &str,
        options: &ImportOptions,
        actor: &Actor,
    ) -> Result<ImportOutcome> {
        let doc = SpecDocument::parse(raw)?;
        let now = Utc::now();
        let ctx = BuildContext::new(actor.clone()).with_now(now);
        let incoming: Vec<CollectionItem> = doc.build(&ctx).into_values().collect();
        tracing::debug!(
            "Built {} folders with {} requests from {} document '{}'",
            incoming.len(),
            query::count_requests(&incoming),
            doc.dialect(),
            doc.title()
        );

        let existing = if options.active_sync {
            self.store
                .find_active_synced(doc.title(), options.workspace_id.as_deref())
                .await?
        } else {
            None
        };

        let mut stats = MergeStats::default();
        let (existing_id, audit, items) = match existing {
            Some(stored) => {
                let items = merge_with_stats(stored.collection.items, incoming, &mut stats);
                tracing::debug!(
                    "Merged into {}: {} updated, {} added, {} preserved, {} retired",
                    stored.id,
                    stats.updated,
                    stats.added,
                    stats.preserved,
                    stats.retired
                );
                let audit = Audit {
                    updated_by: actor.name.clone(),
                    updated_at: now,
                    ..stored.collection.audit
                };
                (Some(stored.id), audit, items)
            }
            None => (None, Audit::new(actor, now), incoming),
        };

        let items = self.finalize(items, actor, now);
        for item in query::retired(&items) {
            tracing::warn!("'{}' is no longer in the spec; marked deleted", item.key());
        }

        let collection = Collection {
            name: doc.title().to_string(),
            uuid: doc.title().to_string(),
            workspace_id: options.workspace_id.clone(),
            total_requests: query::count_requests(&items),
            items,
            active_sync: options.active_sync,
            active_sync_url: options.active_sync_url.clone(),
            audit,
        };

        let (id, existing_collection) = match existing_id {
            Some(id) => {
                self.store.update_by_id(&id, &collection).await?;
                tracing::info!("Updated collection '{}' ({})", collection.name, id);
                (id, true)
            }
            None => {
                let id = self.store.insert(&collection).await?;
                tracing::info!("Created collection '{}' ({})", collection.name, id);
                (id, false)
            }
        };

        Ok(ImportOutcome {
            collection: self.store.get_by_id(&id).await?,
            existing_collection,
            stats,
        })
    }

    /// Re-stamp top-level items and detach everything below them.
    ///
    /// Each request gets its own copy pass, so pruning never crosses from one
    /// request into another.
    fn finalize(
        &self,
        items: Vec<CollectionItem>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Vec<CollectionItem> {
        let policy = self.config.copy_policy;
        items
            .into_iter()
            .map(|mut item| {
                item.source = ItemSource::Spec;
                item.audit = Audit::new(actor, now);
                if !item.is_folder() {
                    return detach(&item, policy);
                }
                for child in item.children_mut().into_iter().flatten() {
                    *child = detach(child, policy);
                }
                item
            })
            .collect()
    }
}
