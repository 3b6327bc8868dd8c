//! Turn a dereferenced document into folders of requests.
//!
//! Both dialects share the walk over `paths`, grouping, naming, identifiers,
//! and parameter placement. A [`TreeBuilder`] only supplies what differs:
//! the base URL and how request bodies are declared.

mod v2;
mod v3;

pub use v2::Swagger2Builder;
pub use v3::OpenApi3Builder;

use crate::dialect::Dialect;
use crate::document::{BuildContext, SpecDocument};
use indexmap::IndexMap;
use specsync::v1::{
    Audit, CollectionItem, DocumentGraph, HttpMethod, ItemSource, NodeId, Parameter,
    RequestDetails,
};
use uuid::Uuid;

/// Folders keyed by group name, in first-seen order.
pub type FolderMap = IndexMap<String, CollectionItem>;

/// Group used when an operation has no tag and no usable path segment.
pub const DEFAULT_GROUP: &str = "default";

/// Namespace for item identifiers; combined with the document title.
const ITEM_NAMESPACE: Uuid = Uuid::from_u128(0x5f1c_2a7e_93d4_4b0e_8c61_0d2e_7a94_b3f5);

/// One operation declared under `paths`.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'d> {
    pub path: &'d str,
    pub method: HttpMethod,
    /// The path item the operation is declared in.
    pub path_item: NodeId,
    /// The operation object itself.
    pub node: NodeId,
}

/// Dialect-specific half of the tree builder.
pub trait TreeBuilder: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Prefix joined with each path to form the request URL.
    fn base_url(&self, doc: &SpecDocument) -> String;

    /// Attach the request body variants for `op` to `details`. `leftover`
    /// holds the operation's parameters whose location the shared code does
    /// not place (e.g. Swagger 2 `in: body`).
    fn attach_body(
        &self,
        doc: &SpecDocument,
        op: &Operation<'_>,
        leftover: &[NodeId],
        details: &mut RequestDetails,
    );

    /// Build every folder for `doc`.
    fn build(&self, doc: &SpecDocument, ctx: &BuildContext) -> FolderMap {
        let graph = doc.graph();
        let audit = Audit::new(&ctx.actor, ctx.now);
        let base = self.base_url(doc);
        let mut folders = FolderMap::new();

        for op in operations(graph) {
            let group = group_name(graph, &op);

            let mut details = RequestDetails::new(op.method, format!("{}{}", base, op.path));
            details.operation_id = graph.str_member(op.node, "operationId").map(str::to_string);
            let leftover = place_parameters(doc, &parameters(graph, &op), &mut details);
            self.attach_body(doc, &op, &leftover, &mut details);

            let mut request = CollectionItem::request(
                item_id(doc.title(), &["request", &group, op.method.as_str(), op.path]),
                request_name(graph, &op),
                ItemSource::Spec,
                audit.clone(),
                details,
            );
            request.description = request_description(graph, &op);

            let folder = folders.entry(group.clone()).or_insert_with(|| {
                let mut folder = CollectionItem::folder(
                    item_id(doc.title(), &["folder", &group]),
                    group.clone(),
                    ItemSource::Spec,
                    audit.clone(),
                );
                folder.description = tag_description(graph, &group);
                folder
            });
            if let Some(items) = folder.children_mut() {
                items.push(request);
            }
        }

        folders
    }
}

/// Operations in document order: paths as declared, then methods as
/// declared within each path item.
pub fn operations(graph: &DocumentGraph) -> Vec<Operation<'_>> {
    let Some(paths) = graph.get(graph.root(), "paths") else {
        return Vec::new();
    };
    graph
        .members(paths)
        .flat_map(|(path, path_item)| {
            graph.members(path_item).filter_map(move |(key, node)| {
                HttpMethod::from_key(key).map(|method| Operation {
                    path,
                    method,
                    path_item,
                    node,
                })
            })
        })
        .collect()
}

/// First tag, else the first literal path segment, else [`DEFAULT_GROUP`].
pub fn group_name(graph: &DocumentGraph, op: &Operation<'_>) -> String {
    let first_tag = graph
        .get(op.node, "tags")
        .and_then(|tags| graph.elements(tags).first().copied())
        .and_then(|tag| graph.as_str(tag))
        .filter(|tag| !tag.trim().is_empty());
    if let Some(tag) = first_tag {
        return tag.to_string();
    }
    op.path
        .split('/')
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or(DEFAULT_GROUP)
        .to_string()
}

/// `summary`, else `operationId`, else the path.
pub fn request_name(graph: &DocumentGraph, op: &Operation<'_>) -> String {
    non_empty(graph, op.node, "summary")
        .or_else(|| non_empty(graph, op.node, "operationId"))
        .unwrap_or(op.path)
        .to_string()
}

fn request_description(graph: &DocumentGraph, op: &Operation<'_>) -> Option<String> {
    non_empty(graph, op.node, "description")
        .or_else(|| non_empty(graph, op.node, "summary"))
        .map(str::to_string)
}

/// Description from the top-level `tags` list, when the group is a tag.
fn tag_description(graph: &DocumentGraph, group: &str) -> Option<String> {
    let tags = graph.get(graph.root(), "tags")?;
    graph
        .elements(tags)
        .iter()
        .find(|tag| graph.str_member(**tag, "name") == Some(group))
        .and_then(|tag| non_empty(graph, *tag, "description"))
        .map(str::to_string)
}

fn non_empty<'g>(graph: &'g DocumentGraph, node: NodeId, key: &str) -> Option<&'g str> {
    graph
        .str_member(node, key)
        .filter(|value| !value.trim().is_empty())
}

/// Path-level parameters overlaid with operation-level ones. An operation
/// parameter replaces a path parameter with the same `name` and `in`.
pub fn parameters(graph: &DocumentGraph, op: &Operation<'_>) -> Vec<NodeId> {
    let identity = |node: NodeId| (graph.str_member(node, "name"), graph.str_member(node, "in"));

    let mut merged: Vec<NodeId> = graph
        .get(op.path_item, "parameters")
        .map(|list| graph.elements(list).to_vec())
        .unwrap_or_default();
    let own = graph
        .get(op.node, "parameters")
        .map(|list| graph.elements(list))
        .unwrap_or_default();
    for &param in own {
        match merged.iter().position(|p| identity(*p) == identity(param)) {
            Some(i) => merged[i] = param,
            None => merged.push(param),
        }
    }
    merged
}

/// Sort parameters into headers, query, path, and form data. Returns the
/// parameters with any other location, in order.
fn place_parameters(
    doc: &SpecDocument,
    params: &[NodeId],
    details: &mut RequestDetails,
) -> Vec<NodeId> {
    let graph = doc.graph();
    let mut leftover = Vec::new();
    for &node in params {
        let target = match graph.str_member(node, "in") {
            Some("header") => &mut details.headers,
            Some("query") => &mut details.query_params,
            Some("path") => &mut details.path_params,
            Some("formData") => &mut details.form_data,
            _ => {
                leftover.push(node);
                continue;
            }
        };
        target.push(parameter(doc, node));
    }
    leftover
}

/// Build a [`Parameter`] from a parameter object.
///
/// The schema is the parameter's `schema` member when present. Swagger 2
/// non-body parameters describe their type inline, so for those the
/// parameter object itself is linked.
pub fn parameter(doc: &SpecDocument, node: NodeId) -> Parameter {
    let graph = doc.graph();
    let schema = match graph.get(node, "schema") {
        Some(schema) => Some(doc.fragment(schema)),
        None if graph.contains_key(node, "type") => Some(doc.fragment(node)),
        None => None,
    };
    Parameter {
        name: graph.str_member(node, "name").unwrap_or_default().to_string(),
        description: non_empty(graph, node, "description").map(str::to_string),
        required: graph
            .get(node, "required")
            .and_then(|r| graph.as_bool(r))
            .unwrap_or(false),
        schema,
    }
}

/// Name-based identifier, stable for the same title and parts.
pub fn item_id(title: &str, parts: &[&str]) -> String {
    let namespace = Uuid::new_v5(&ITEM_NAMESPACE, title.as_bytes());
    Uuid::new_v5(&namespace, parts.join("\u{1f}").as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use specsync::v1::Fragment;

    fn doc(value: serde_json::Value) -> SpecDocument {
        SpecDocument::from_value(value).unwrap()
    }

    fn petstore() -> SpecDocument {
        doc(json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets" },
            "tags": [ { "name": "pets", "description": "Everything about pets" } ],
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } },
                        { "name": "X-Trace", "in": "header", "schema": { "type": "string" } }
                    ],
                    "get": {
                        "tags": ["pets"],
                        "summary": "Get pet",
                        "parameters": [
                            { "name": "petId", "in": "path", "required": true, "description": "override", "schema": { "type": "integer" } }
                        ]
                    },
                    "x-internal": true,
                    "delete": { "operationId": "deletePet" }
                },
                "/{version}": { "get": {} },
                "/stores/list": { "post": { "tags": ["  "] } }
            }
        }))
    }

    #[test]
    fn test_operations_in_document_order() {
        let d = petstore();
        let ops = operations(d.graph());
        let seen: Vec<(&str, HttpMethod)> = ops.iter().map(|o| (o.path, o.method)).collect();
        assert_eq!(
            seen,
            vec![
                ("/pets/{petId}", HttpMethod::Get),
                ("/pets/{petId}", HttpMethod::Delete),
                ("/{version}", HttpMethod::Get),
                ("/stores/list", HttpMethod::Post),
            ]
        );
    }

    #[test]
    fn test_operations_without_paths() {
        let d = doc(json!({ "openapi": "3.0.0", "info": { "title": "Empty" } }));
        assert!(operations(d.graph()).is_empty());
    }

    #[test]
    fn test_group_names() {
        let d = petstore();
        let groups: Vec<String> = operations(d.graph())
            .iter()
            .map(|op| group_name(d.graph(), op))
            .collect();
        assert_eq!(groups, vec!["pets", "pets", DEFAULT_GROUP, "stores"]);
    }

    #[test]
    fn test_request_names() {
        let d = petstore();
        let names: Vec<String> = operations(d.graph())
            .iter()
            .map(|op| request_name(d.graph(), op))
            .collect();
        assert_eq!(names, vec!["Get pet", "deletePet", "/{version}", "/stores/list"]);
    }

    #[test]
    fn test_operation_parameter_overrides_path_parameter() {
        let d = petstore();
        let ops = operations(d.graph());
        let params = parameters(d.graph(), &ops[0]);
        assert_eq!(params.len(), 2);
        let first = parameter(&d, params[0]);
        assert_eq!(first.name, "petId");
        assert_eq!(first.description.as_deref(), Some("override"));
        assert!(first.required);
        // The delete operation only inherits the path-level parameters.
        assert_eq!(parameters(d.graph(), &ops[1]).len(), 2);
    }

    #[test]
    fn test_parameter_schema_is_linked() {
        let d = petstore();
        let ops = operations(d.graph());
        let p = parameter(&d, parameters(d.graph(), &ops[0])[1]);
        assert_eq!(p.name, "X-Trace");
        assert!(!p.required);
        assert!(matches!(p.schema, Some(Fragment::Linked(_))));
    }

    #[test]
    fn test_inline_typed_parameter_links_itself() {
        let d = doc(json!({
            "swagger": "2.0",
            "info": { "title": "T" },
            "paths": { "/a": { "get": { "parameters": [
                { "name": "limit", "in": "query", "type": "integer" },
                { "name": "bare", "in": "query" }
            ] } } }
        }));
        let ops = operations(d.graph());
        let params = parameters(d.graph(), &ops[0]);
        match parameter(&d, params[0]).schema {
            Some(Fragment::Linked(link)) => assert_eq!(link.node, params[0]),
            other => panic!("expected linked schema, got {:?}", other),
        }
        assert!(parameter(&d, params[1]).schema.is_none());
    }

    #[test]
    fn test_build_groups_and_stamps() {
        let d = petstore();
        let ctx = BuildContext::new(specsync::v1::Actor::new("alex"));
        let folders = OpenApi3Builder.build(&d, &ctx);
        let names: Vec<&str> = folders.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["pets", DEFAULT_GROUP, "stores"]);

        let pets = &folders["pets"];
        assert_eq!(pets.description.as_deref(), Some("Everything about pets"));
        assert_eq!(pets.children().len(), 2);
        for item in std::iter::once(pets).chain(pets.children()) {
            assert_eq!(item.source, ItemSource::Spec);
            assert!(!item.is_deleted);
            assert_eq!(item.audit.created_by, "alex");
            assert_eq!(item.audit.updated_by, "alex");
            assert_eq!(item.audit.created_at, ctx.now);
        }
        let get = pets.children()[0].request_details().unwrap();
        assert_eq!(get.path_params.len(), 1);
        assert_eq!(get.headers.len(), 1);
        assert_eq!(pets.children()[1].request_details().unwrap().operation_id.as_deref(), Some("deletePet"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let ctx = BuildContext::new(specsync::v1::Actor::new("alex"));
        let a = OpenApi3Builder.build(&petstore(), &ctx);
        let b = OpenApi3Builder.build(&petstore(), &ctx);
        let ids = |m: &FolderMap| {
            specsync::v1::query::walk(&m.values().cloned().collect::<Vec<_>>())
                .into_iter()
                .map(|(_, i)| i.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_item_id_is_stable_and_distinct() {
        assert_eq!(item_id("T", &["folder", "a"]), item_id("T", &["folder", "a"]));
        assert_ne!(item_id("T", &["folder", "a"]), item_id("U", &["folder", "a"]));
        assert_ne!(item_id("T", &["folder", "ab"]), item_id("T", &["folder", "a", "b"]));
    }
}
