use anyhow::{Context, Result};
use specsync::v1::{Collection, CollectionId, CollectionItem, query};
use specsync_import::{CollectionStore, FileStore};
use std::path::Path;

pub async fn run(store: &Path, id: &str, json: bool, pretty: bool) -> Result<()> {
    let stored = FileStore::new(store)
        .get_by_id(&CollectionId::new(id))
        .await
        .with_context(|| format!("Failed to load collection {}", id))?;

    if json {
        println!("{}", crate::to_json(&stored, pretty)?);
    } else {
        print!("{}", render_tree(&stored.collection));
    }
    Ok(())
}

/// Indented outline of a collection, one item per line.
pub fn render_tree(collection: &Collection) -> String {
    let mut out = format!("{} ({} requests)\n", collection.name, collection.total_requests);
    for (depth, item) in query::walk(&collection.items) {
        let indent = "  ".repeat(depth + 1);
        out.push_str(&format!("{}{}\n", indent, render_item(item)));
    }
    out
}

fn render_item(item: &CollectionItem) -> String {
    let mut line = match item.request_details() {
        Some(request) => format!("{} {}  {}", request.method, item.name, request.url),
        None => format!("{}/", item.name),
    };
    if item.source == specsync::v1::ItemSource::User {
        line.push_str(" (user)");
    }
    if item.is_deleted {
        line.push_str(" [deleted]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use specsync::v1::{Actor, Audit, HttpMethod, ItemSource, RequestDetails};

    fn audit() -> Audit {
        Audit::new(&Actor::new("alex"), Utc::now())
    }

    #[test]
    fn test_render_tree() {
        let users = CollectionItem::folder("f1", "Users", ItemSource::Spec, audit())
            .with_item(CollectionItem::request(
                "r1",
                "GetUser",
                ItemSource::Spec,
                audit(),
                RequestDetails::new(HttpMethod::Get, "https://api/users/{id}"),
            ))
            .with_item(CollectionItem::request(
                "r2",
                "DeleteUser",
                ItemSource::User,
                audit(),
                RequestDetails::new(HttpMethod::Delete, "https://api/users/{id}"),
            ));
        let orders = CollectionItem::folder("f2", "Orders", ItemSource::Spec, audit())
            .with_deleted(true);
        let collection = Collection {
            name: "Accounts".into(),
            uuid: "Accounts".into(),
            workspace_id: None,
            total_requests: 2,
            items: vec![users, orders],
            active_sync: true,
            active_sync_url: String::new(),
            audit: audit(),
        };

        assert_eq!(
            render_tree(&collection),
            "Accounts (2 requests)\n\
             \x20 Users/\n\
             \x20   GET GetUser  https://api/users/{id}\n\
             \x20   DELETE DeleteUser  https://api/users/{id} (user)\n\
             \x20 Orders/ [deleted]\n"
        );
    }
}
