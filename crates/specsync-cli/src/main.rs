mod cmd_import;
mod cmd_inspect;
mod cmd_list;
mod cmd_show;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "specsync")]
#[command(about = "Import OpenAPI and Swagger specs into request collections and keep them in sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding stored collections
    #[arg(long, global = true, default_value = ".specsync")]
    store: PathBuf,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a spec file into the store
    Import {
        /// Spec file, JSON or YAML (use - for stdin)
        input: String,

        /// Reconcile with the existing collection of the same title
        #[arg(long)]
        active_sync: bool,

        /// Workspace the collection belongs to
        #[arg(long)]
        workspace: Option<String>,

        /// Source URL recorded on the collection (defaults to the input path)
        #[arg(long)]
        sync_url: Option<String>,

        /// Who is importing (defaults to $USER)
        #[arg(long)]
        actor: Option<String>,
    },
    /// List stored collections
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a stored collection as a tree
    Show {
        /// Collection id
        id: String,

        /// Output the stored document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a spec and summarize the tree it would produce, without storing it
    Inspect {
        /// Spec file, JSON or YAML (use - for stdin)
        input: String,

        /// Output the built folders as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Import {
            input,
            active_sync,
            workspace,
            sync_url,
            actor,
        } => {
            let args = cmd_import::ImportArgs {
                input,
                active_sync,
                workspace,
                sync_url,
                actor,
            };
            cmd_import::run(&cli.store, args, cli.pretty).await
        }
        Commands::List { json } => cmd_list::run(&cli.store, json, cli.pretty).await,
        Commands::Show { id, json } => cmd_show::run(&cli.store, &id, json, cli.pretty).await,
        Commands::Inspect { input, json } => cmd_inspect::run(&input, json, cli.pretty),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read a file, or stdin when `input` is `-`.
pub(crate) fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
