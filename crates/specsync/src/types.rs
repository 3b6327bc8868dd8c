use crate::graph::{DocumentGraph, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Collection
// ============================================================================

/// The persisted aggregate produced by an import, one per spec title and
/// workspace.
///
/// # JSON shape
///
/// ```json
/// {
///   "name": "Petstore",
///   "uuid": "Petstore",
///   "workspaceId": "ws-1",
///   "totalRequests": 3,
///   "items": [ { "type": "FOLDER", "name": "pets", "items": [ … ], … } ],
///   "activeSync": true,
///   "activeSyncUrl": "https://example.com/openapi.json",
///   "createdBy": "alex",
///   "updatedBy": "alex",
///   "createdAt": "2026-01-29T10:00:00Z",
///   "updatedAt": "2026-01-29T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub name: String,
    /// Stable external identifier; the spec title.
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    pub total_requests: usize,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
    #[serde(default)]
    pub active_sync: bool,
    #[serde(default)]
    pub active_sync_url: String,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Store-assigned identifier of a persisted [`Collection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collection together with the id the store filed it under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCollection {
    #[serde(rename = "_id")]
    pub id: CollectionId,
    #[serde(flatten)]
    pub collection: Collection,
}

// ============================================================================
// Items
// ============================================================================

/// Provenance of an item: generated from the spec, or authored by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemSource {
    Spec,
    User,
}

/// A node in a collection tree.
///
/// The variant lives in [`ItemKind`]; `FOLDER` nodes own children,
/// `REQUEST` nodes own a [`RequestDetails`]. Both share the fields here.
///
/// # JSON shape
///
/// ```json
/// {
///   "id": "0b6f…",
///   "name": "Get user",
///   "source": "SPEC",
///   "isDeleted": false,
///   "createdBy": "alex", "updatedBy": "alex",
///   "createdAt": "…", "updatedAt": "…",
///   "type": "REQUEST",
///   "request": { "method": "GET", "url": "https://api.example.com/users/{id}" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: ItemSource,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(flatten)]
    pub kind: ItemKind,
}

/// Variant payload of a [`CollectionItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Folder {
        #[serde(default)]
        items: Vec<CollectionItem>,
    },
    Request {
        request: RequestDetails,
    },
}

/// Key used to match siblings across two versions of a tree.
///
/// Folders match on name; requests on name plus method. Keys are only
/// compared among siblings and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Folder(String),
    Request(String, HttpMethod),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Folder(name) => write!(f, "{}", name),
            ItemKey::Request(name, method) => write!(f, "{}{}", name, method),
        }
    }
}

/// Audit stamp shared by collections and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    /// Stamp created and updated with the same actor and time.
    pub fn new(actor: &Actor, at: DateTime<Utc>) -> Self {
        Self {
            created_by: actor.name.clone(),
            updated_by: actor.name.clone(),
            created_at: at,
            updated_at: at,
        }
    }
}

/// Whoever triggered the import; recorded in audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// HTTP methods an API operation can be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Parse a path-item key such as `get` or `DELETE`. Keys that are not
    /// methods (`parameters`, `summary`, `x-…`) return `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executable request derived from one spec operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_data: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<RequestBody>,
}

/// A header, query, path, or form parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Fragment>,
}

/// One accepted request body representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Fragment>,
}

// ============================================================================
// Fragments
// ============================================================================

/// A piece of schema attached to a request.
///
/// Freshly built trees hold [`Fragment::Linked`] values that point into the
/// shared, possibly cyclic [`DocumentGraph`]. Before persisting, the copier
/// turns them into [`Fragment::Detached`] JSON. Serializing a linked fragment
/// is an error; deserializing always yields a detached one.
#[derive(Debug, Clone)]
pub enum Fragment {
    Linked(GraphRef),
    Detached(serde_json::Value),
}

/// Handle to a node inside a shared document graph.
#[derive(Debug, Clone)]
pub struct GraphRef {
    pub graph: Arc<DocumentGraph>,
    pub node: NodeId,
}

impl GraphRef {
    /// Identity of the graph allocation, used to tell graphs apart while
    /// copying.
    pub fn graph_identity(&self) -> usize {
        Arc::as_ptr(&self.graph) as usize
    }
}

impl Fragment {
    pub fn linked(graph: Arc<DocumentGraph>, node: NodeId) -> Self {
        Fragment::Linked(GraphRef { graph, node })
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, Fragment::Linked(_))
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Fragment::Detached(value) => Some(value),
            Fragment::Linked(_) => None,
        }
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Fragment::Detached(a), Fragment::Detached(b)) => a == b,
            (Fragment::Linked(a), Fragment::Linked(b)) => {
                Arc::ptr_eq(&a.graph, &b.graph) && a.node == b.node
            }
            _ => false,
        }
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fragment::Detached(value) => value.serialize(serializer),
            Fragment::Linked(_) => Err(serde::ser::Error::custom(
                "linked schema fragment must be detached before serialization",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Fragment::Detached)
    }
}

// ============================================================================
// Convenience methods
// ============================================================================

impl CollectionItem {
    /// Create an empty folder.
    pub fn folder(
        id: impl Into<String>,
        name: impl Into<String>,
        source: ItemSource,
        audit: Audit,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            source,
            is_deleted: false,
            audit,
            kind: ItemKind::Folder { items: Vec::new() },
        }
    }

    /// Create a request.
    pub fn request(
        id: impl Into<String>,
        name: impl Into<String>,
        source: ItemSource,
        audit: Audit,
        request: RequestDetails,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            source,
            is_deleted: false,
            audit,
            kind: ItemKind::Request { request },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a child. Ignored for requests, which never carry children.
    pub fn with_item(mut self, item: CollectionItem) -> Self {
        if let Some(items) = self.children_mut() {
            items.push(item);
        }
        self
    }

    pub fn with_deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    pub fn key(&self) -> ItemKey {
        match &self.kind {
            ItemKind::Folder { .. } => ItemKey::Folder(self.name.clone()),
            ItemKind::Request { request } => ItemKey::Request(self.name.clone(), request.method),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder { .. })
    }

    pub fn request_details(&self) -> Option<&RequestDetails> {
        match &self.kind {
            ItemKind::Request { request } => Some(request),
            ItemKind::Folder { .. } => None,
        }
    }

    /// Children of a folder; always empty for a request.
    pub fn children(&self) -> &[CollectionItem] {
        match &self.kind {
            ItemKind::Folder { items } => items,
            ItemKind::Request { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<CollectionItem>> {
        match &mut self.kind {
            ItemKind::Folder { items } => Some(items),
            ItemKind::Request { .. } => None,
        }
    }

    /// Move the children out, leaving the folder empty.
    pub fn take_children(&mut self) -> Vec<CollectionItem> {
        self.children_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl RequestDetails {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            operation_id: None,
            headers: Vec::new(),
            query_params: Vec::new(),
            path_params: Vec::new(),
            form_data: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Every fragment carried by this request, in serialization order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.headers
            .iter()
            .chain(&self.query_params)
            .chain(&self.path_params)
            .chain(&self.form_data)
            .filter_map(|p| p.schema.as_ref())
            .chain(self.body.iter().filter_map(|b| b.schema.as_ref()))
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
            schema: None,
        }
    }
}

impl Collection {
    /// Parse a collection from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
