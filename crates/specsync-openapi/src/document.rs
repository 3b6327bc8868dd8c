use crate::builder::FolderMap;
use crate::dialect::Dialect;
use crate::error::{OpenApiError, Result};
use crate::parse::parse_document;
use crate::resolve::resolve_refs;
use chrono::{DateTime, Utc};
use serde_json::Value;
use specsync::v1::{Actor, DocumentGraph, Fragment, NodeId};
use std::sync::Arc;

/// Who builds the tree, and when. Every item produced by one build carries
/// these in its audit fields.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub actor: Actor,
    pub now: DateTime<Utc>,
}

impl BuildContext {
    /// Context stamped with the current time.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            now: Utc::now(),
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// A parsed, dereferenced API document of a known dialect.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    graph: Arc<DocumentGraph>,
    dialect: Dialect,
    title: String,
}

impl SpecDocument {
    /// Parse JSON or YAML text.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_graph(parse_document(raw)?)
    }

    /// Build from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(OpenApiError::NotAMapping);
        }
        Self::from_graph(DocumentGraph::from_value(value))
    }

    fn from_graph(mut graph: DocumentGraph) -> Result<Self> {
        let dialect = Dialect::detect(&graph)?;
        resolve_refs(&mut graph)?;
        let title = graph
            .get(graph.root(), "info")
            .and_then(|info| graph.str_member(info, "title"))
            .filter(|title| !title.trim().is_empty())
            .ok_or(OpenApiError::MissingTitle)?
            .to_string();
        Ok(Self {
            graph: Arc::new(graph),
            dialect,
            title,
        })
    }

    /// `info.title`, which names the collection.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn graph(&self) -> &DocumentGraph {
        &self.graph
    }

    /// A fragment linked to `node` in this document.
    pub fn fragment(&self, node: NodeId) -> Fragment {
        Fragment::linked(Arc::clone(&self.graph), node)
    }

    /// Build the folder tree with the dialect's builder.
    pub fn build(&self, ctx: &BuildContext) -> FolderMap {
        self.dialect.builder().build(self, ctx)
    }
}
