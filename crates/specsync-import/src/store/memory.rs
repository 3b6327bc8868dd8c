use super::{CollectionStore, StoreResult, is_active_match};
use crate::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use specsync::v1::{Collection, CollectionId, StoredCollection};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Collections held in memory, in insertion order.
///
/// Entries are kept serialized so that reads and writes go through the same
/// serde path as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<IndexMap<CollectionId, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.collections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.collections.read().await.is_empty()
    }

    fn decode(id: &CollectionId, value: &Value) -> StoreResult<StoredCollection> {
        Ok(StoredCollection {
            id: id.clone(),
            collection: serde_json::from_value(value.clone())?,
        })
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find_active_synced(
        &self,
        title: &str,
        workspace_id: Option<&str>,
    ) -> StoreResult<Option<StoredCollection>> {
        let collections = self.collections.read().await;
        collections
            .iter()
            .find(|(_, value)| is_active_match(value, title, workspace_id))
            .map(|(id, value)| Self::decode(id, value))
            .transpose()
    }

    async fn insert(&self, collection: &Collection) -> StoreResult<CollectionId> {
        let value = serde_json::to_value(collection)?;
        let id = CollectionId::new(Uuid::new_v4().to_string());
        self.collections.write().await.insert(id.clone(), value);
        Ok(id)
    }

    async fn update_by_id(&self, id: &CollectionId, collection: &Collection) -> StoreResult<()> {
        let value = serde_json::to_value(collection)?;
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        *slot = value;
        Ok(())
    }

    async fn get_by_id(&self, id: &CollectionId) -> StoreResult<StoredCollection> {
        let collections = self.collections.read().await;
        let value = collections
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Self::decode(id, value)
    }

    async fn list(&self) -> StoreResult<Vec<StoredCollection>> {
        let collections = self.collections.read().await;
        collections
            .iter()
            .map(|(id, value)| Self::decode(id, value))
            .collect()
    }
}
