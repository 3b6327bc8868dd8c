use anyhow::Result;
use serde::Serialize;
use specsync::v1::StoredCollection;
use specsync_import::{CollectionStore, FileStore};
use std::path::Path;

/// One line of `specsync list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSummary<'a> {
    id: &'a str,
    name: &'a str,
    workspace_id: Option<&'a str>,
    total_requests: usize,
    active_sync: bool,
}

impl<'a> From<&'a StoredCollection> for CollectionSummary<'a> {
    fn from(stored: &'a StoredCollection) -> Self {
        Self {
            id: stored.id.as_str(),
            name: &stored.collection.name,
            workspace_id: stored.collection.workspace_id.as_deref(),
            total_requests: stored.collection.total_requests,
            active_sync: stored.collection.active_sync,
        }
    }
}

pub async fn run(store: &Path, json: bool, pretty: bool) -> Result<()> {
    let collections = FileStore::new(store).list().await?;
    let summaries: Vec<CollectionSummary<'_>> = collections.iter().map(Into::into).collect();

    if json {
        println!("{}", crate::to_json(&summaries, pretty)?);
    } else if summaries.is_empty() {
        eprintln!("No collections in {}", store.display());
    } else {
        for summary in &summaries {
            println!("{}", format_line(summary));
        }
    }
    Ok(())
}

fn format_line(summary: &CollectionSummary<'_>) -> String {
    format!(
        "{}  {}  workspace={}  requests={}{}",
        summary.id,
        summary.name,
        summary.workspace_id.unwrap_or("-"),
        summary.total_requests,
        if summary.active_sync { "  [sync]" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let summary = CollectionSummary {
            id: "c1",
            name: "Pets",
            workspace_id: None,
            total_requests: 4,
            active_sync: true,
        };
        assert_eq!(format_line(&summary), "c1  Pets  workspace=-  requests=4  [sync]");

        let summary = CollectionSummary {
            workspace_id: Some("ws1"),
            active_sync: false,
            ..summary
        };
        assert_eq!(format_line(&summary), "c1  Pets  workspace=ws1  requests=4");
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = CollectionSummary {
            id: "c1",
            name: "Pets",
            workspace_id: Some("ws1"),
            total_requests: 2,
            active_sync: false,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["workspaceId"], "ws1");
        assert_eq!(json["totalRequests"], 2);
    }
}
