//! Persistence for collections.
//!
//! The importer only needs five operations, so stores stay small: an
//! in-memory map for tests and embedders, and a directory of JSON files for
//! the CLI.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use specsync::v1::{Collection, CollectionId, StoredCollection};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Where collections live between imports.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// The collection named `title` in `workspace_id` with active sync on.
    /// `None` workspace matches only collections without a workspace.
    async fn find_active_synced(
        &self,
        title: &str,
        workspace_id: Option<&str>,
    ) -> StoreResult<Option<StoredCollection>>;

    /// Store a new collection and return its id.
    async fn insert(&self, collection: &Collection) -> StoreResult<CollectionId>;

    /// Replace the collection stored under `id`.
    async fn update_by_id(&self, id: &CollectionId, collection: &Collection) -> StoreResult<()>;

    async fn get_by_id(&self, id: &CollectionId) -> StoreResult<StoredCollection>;

    /// Every stored collection.
    async fn list(&self) -> StoreResult<Vec<StoredCollection>>;
}

/// Shared lookup rule for [`CollectionStore::find_active_synced`].
///
/// Works on the stored JSON so that unrelated documents never have to
/// decode as a [`Collection`]. A missing or `null` `workspaceId` is no
/// workspace.
pub(crate) fn is_active_match(document: &Value, title: &str, workspace_id: Option<&str>) -> bool {
    document.get("activeSync").and_then(Value::as_bool) == Some(true)
        && document.get("name").and_then(Value::as_str) == Some(title)
        && document.get("workspaceId").and_then(Value::as_str) == workspace_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_active_match() {
        let doc = json!({ "name": "Pets", "workspaceId": "ws1", "activeSync": true });
        assert!(is_active_match(&doc, "Pets", Some("ws1")));
        assert!(!is_active_match(&doc, "Pets", None));
        assert!(!is_active_match(&doc, "Cats", Some("ws1")));

        let no_workspace = json!({ "name": "Pets", "workspaceId": null, "activeSync": true });
        assert!(is_active_match(&no_workspace, "Pets", None));

        let inactive = json!({ "name": "Pets", "activeSync": false });
        assert!(!is_active_match(&inactive, "Pets", None));
        assert!(!is_active_match(&json!({ "name": "Pets" }), "Pets", None));
    }
}
