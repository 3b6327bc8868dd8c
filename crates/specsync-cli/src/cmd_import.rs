use anyhow::{Context, Result};
use specsync::v1::Actor;
use specsync_import::{FileStore, ImportOptions, Importer};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub input: String,
    pub active_sync: bool,
    pub workspace: Option<String>,
    pub sync_url: Option<String>,
    pub actor: Option<String>,
}

pub async fn run(store: &Path, args: ImportArgs, pretty: bool) -> Result<()> {
    let raw = crate::read_input(&args.input)?;
    let importer = Importer::new(FileStore::new(store));
    let actor = resolve_actor(args.actor);
    let options = build_options(&args.input, args.active_sync, args.workspace, args.sync_url);

    let outcome = importer
        .import(&raw, &options, &actor)
        .await
        .with_context(|| format!("Failed to import {}", args.input))?;

    tracing::info!(
        "{} collection {}",
        if outcome.existing_collection { "Updated" } else { "Created" },
        outcome.collection.id
    );
    println!("{}", crate::to_json(&outcome.collection, pretty)?);
    Ok(())
}

/// `--actor`, else `$USER`, else `anonymous`.
fn resolve_actor(flag: Option<String>) -> Actor {
    let name = flag
        .or_else(|| std::env::var("USER").ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "anonymous".to_string());
    Actor::new(name)
}

fn build_options(
    input: &str,
    active_sync: bool,
    workspace: Option<String>,
    sync_url: Option<String>,
) -> ImportOptions {
    let url = sync_url.unwrap_or_else(|| {
        if input == "-" {
            String::new()
        } else {
            input.to_string()
        }
    });
    ImportOptions {
        active_sync,
        workspace_id: workspace,
        active_sync_url: url,
    }
}
