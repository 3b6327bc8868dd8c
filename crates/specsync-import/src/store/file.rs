use super::{CollectionStore, StoreResult, is_active_match};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use specsync::v1::{Collection, CollectionId, StoredCollection};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// One pretty-printed JSON document per collection, named `<id>.json`.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `id`. Ids must be a single plain file name
    /// component, so a lookup can never leave the store directory.
    fn path_for(&self, id: &CollectionId) -> StoreResult<PathBuf> {
        let raw = id.as_str();
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && !raw.contains(['/', '\\'])
            && !raw.contains("..");
        if !valid {
            return Err(StoreError::InvalidId(id.clone()));
        }
        Ok(self.root.join(format!("{}.json", raw)))
    }

    async fn write(&self, id: &CollectionId, collection: &Collection) -> StoreResult<()> {
        let path = self.path_for(id)?;
        let json = collection.to_json_pretty()?;
        fs::create_dir_all(&self.root).await?;
        // Write then rename so a reader never sees a half-written document.
        let tmp = self.root.join(format!(".{}.json.tmp", id));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_raw(&self, id: &CollectionId) -> StoreResult<String> {
        match fs::read_to_string(self.path_for(id)?).await {
            Ok(json) => Ok(json),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, id: &CollectionId) -> StoreResult<StoredCollection> {
        let json = self.read_raw(id).await?;
        Ok(StoredCollection {
            id: id.clone(),
            collection: Collection::from_json(&json)?,
        })
    }

    /// Ids of every `<id>.json` document, sorted.
    async fn ids(&self) -> StoreResult<Vec<CollectionId>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| StoreError::InvalidDocument(path.clone()))?;
            if stem.starts_with('.') {
                continue;
            }
            ids.push(CollectionId::new(stem));
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl CollectionStore for FileStore {
    async fn find_active_synced(
        &self,
        title: &str,
        workspace_id: Option<&str>,
    ) -> StoreResult<Option<StoredCollection>> {
        let mut matches = Vec::new();
        for id in self.ids().await? {
            let json = self.read_raw(&id).await?;
            // Documents that are not even JSON cannot be the one we want.
            let document: Value = match serde_json::from_str(&json) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Skipping unreadable collection document {}: {}", id, e);
                    continue;
                }
            };
            if is_active_match(&document, title, workspace_id) {
                matches.push(StoredCollection {
                    id,
                    collection: serde_json::from_value(document)?,
                });
            }
        }
        sort_oldest_first(&mut matches);
        Ok(matches.into_iter().next())
    }

    async fn insert(&self, collection: &Collection) -> StoreResult<CollectionId> {
        let id = CollectionId::new(Uuid::new_v4().to_string());
        self.write(&id, collection).await?;
        tracing::debug!("Wrote collection {} to {}", id, self.root.display());
        Ok(id)
    }

    async fn update_by_id(&self, id: &CollectionId, collection: &Collection) -> StoreResult<()> {
        if !fs::try_exists(self.path_for(id)?).await? {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.write(id, collection).await
    }

    async fn get_by_id(&self, id: &CollectionId) -> StoreResult<StoredCollection> {
        self.read(id).await
    }

    /// Oldest first, then by id.
    async fn list(&self) -> StoreResult<Vec<StoredCollection>> {
        let mut collections = Vec::new();
        for id in self.ids().await? {
            collections.push(self.read(&id).await?);
        }
        sort_oldest_first(&mut collections);
        Ok(collections)
    }
}

fn sort_oldest_first(collections: &mut [StoredCollection]) {
    collections.sort_by(|a, b| {
        a.collection
            .audit
            .created_at
            .cmp(&b.collection.audit.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
