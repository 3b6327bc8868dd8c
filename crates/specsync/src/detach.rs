//! Cycle-safe deep copy of collection items.
//!
//! Reference resolution leaves schema fragments pointing into a graph in
//! which one node can be reached from many places, including from inside
//! itself. Copying such a fragment naively never terminates. [`detach`]
//! walks each fragment depth-first, remembers the composite nodes it has
//! entered, and prunes any occurrence of a node it has already seen.

use crate::graph::{DocumentGraph, Node, NodeId};
use crate::types::{CollectionItem, Fragment, ItemKind, Parameter, RequestBody, RequestDetails};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// How aggressively repeated nodes are pruned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyPolicy {
    /// Prune a node seen anywhere earlier in the same copy, even in an
    /// unrelated branch. Shared substructure survives only at its first
    /// occurrence.
    #[default]
    Dedupe,
    /// Prune only nodes that are ancestors of the current position, i.e.
    /// true cycles. Shared acyclic substructure is copied in full.
    CycleOnly,
}

/// Produce a copy of `item` in which every linked fragment is materialized
/// as plain JSON with no shared or circular structure.
///
/// One visited set covers the whole item, so with [`CopyPolicy::Dedupe`] a
/// schema referenced by both a parameter and the body is only copied at the
/// first of those positions. Pruned object members are dropped, pruned
/// array elements become `null`, and a fragment whose root was already
/// visited becomes `None`.
pub fn detach(item: &CollectionItem, policy: CopyPolicy) -> CollectionItem {
    let mut copier = Copier::new(policy);
    copier.item(item)
}

/// Copy a single fragment with a fresh visited set.
pub fn detach_fragment(fragment: &Fragment, policy: CopyPolicy) -> Option<Fragment> {
    Copier::new(policy).fragment(fragment)
}

/// Identity of a composite node: which graph, which slot.
type Identity = (usize, NodeId);

struct Copier {
    policy: CopyPolicy,
    seen: HashSet<Identity>,
}

impl Copier {
    fn new(policy: CopyPolicy) -> Self {
        Self {
            policy,
            seen: HashSet::new(),
        }
    }

    fn item(&mut self, item: &CollectionItem) -> CollectionItem {
        let kind = match &item.kind {
            ItemKind::Folder { items } => ItemKind::Folder {
                items: items.iter().map(|child| self.item(child)).collect(),
            },
            ItemKind::Request { request } => ItemKind::Request {
                request: self.request(request),
            },
        };
        CollectionItem {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            source: item.source,
            is_deleted: item.is_deleted,
            audit: item.audit.clone(),
            kind,
        }
    }

    fn request(&mut self, request: &RequestDetails) -> RequestDetails {
        RequestDetails {
            method: request.method,
            url: request.url.clone(),
            operation_id: request.operation_id.clone(),
            headers: self.parameters(&request.headers),
            query_params: self.parameters(&request.query_params),
            path_params: self.parameters(&request.path_params),
            form_data: self.parameters(&request.form_data),
            body: request
                .body
                .iter()
                .map(|body| RequestBody {
                    content_type: body.content_type.clone(),
                    schema: body.schema.as_ref().and_then(|f| self.fragment(f)),
                })
                .collect(),
        }
    }

    fn parameters(&mut self, params: &[Parameter]) -> Vec<Parameter> {
        params
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                description: p.description.clone(),
                required: p.required,
                schema: p.schema.as_ref().and_then(|f| self.fragment(f)),
            })
            .collect()
    }

    fn fragment(&mut self, fragment: &Fragment) -> Option<Fragment> {
        match fragment {
            Fragment::Detached(value) => Some(Fragment::Detached(value.clone())),
            Fragment::Linked(link) => self
                .node(&link.graph, link.graph_identity(), link.node)
                .map(Fragment::Detached),
        }
    }

    /// `None` means the node was pruned.
    fn node(&mut self, graph: &DocumentGraph, tag: usize, id: NodeId) -> Option<Value> {
        let node = graph.node(id);
        let value = match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(elements) => {
                if !self.seen.insert((tag, id)) {
                    return None;
                }
                let copied = elements
                    .iter()
                    .map(|child| self.node(graph, tag, *child).unwrap_or(Value::Null))
                    .collect();
                self.leave((tag, id));
                Value::Array(copied)
            }
            Node::Object(members) => {
                if !self.seen.insert((tag, id)) {
                    return None;
                }
                let copied = members
                    .iter()
                    .filter_map(|(key, child)| {
                        self.node(graph, tag, *child).map(|v| (key.clone(), v))
                    })
                    .collect::<Map<_, _>>();
                self.leave((tag, id));
                Value::Object(copied)
            }
        };
        Some(value)
    }

    fn leave(&mut self, identity: Identity) {
        if self.policy == CopyPolicy::CycleOnly {
            self.seen.remove(&identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, Audit, HttpMethod, ItemSource};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// `{"node": {"name": "n", "next": <node>}}` with `next` looping back.
    fn cyclic_graph() -> (Arc<DocumentGraph>, NodeId) {
        let mut g = DocumentGraph::from_value(json!({
            "node": { "name": "n", "next": { "$ref": "#/node" } }
        }));
        let node = g.get(g.root(), "node").unwrap();
        let placeholder = g.get(node, "next").unwrap();
        g.retarget(&HashMap::from([(placeholder, node)]));
        (Arc::new(g), node)
    }

    /// `{"shared": {...}, "pair": {"left": <shared>, "right": <shared>}}`
    fn shared_graph() -> (Arc<DocumentGraph>, NodeId) {
        let mut g = DocumentGraph::from_value(json!({
            "shared": { "type": "string" },
            "pair": {
                "left": { "$ref": "#/shared" },
                "right": { "$ref": "#/shared" },
                "list": [ { "$ref": "#/shared" }, 1 ]
            }
        }));
        let shared = g.get(g.root(), "shared").unwrap();
        let pair = g.get(g.root(), "pair").unwrap();
        let list = g.get(pair, "list").unwrap();
        let redirects = HashMap::from([
            (g.get(pair, "left").unwrap(), shared),
            (g.get(pair, "right").unwrap(), shared),
            (g.elements(list)[0], shared),
        ]);
        g.retarget(&redirects);
        (Arc::new(g), pair)
    }

    fn request_with(body: Fragment, header: Option<Fragment>) -> CollectionItem {
        let mut details = RequestDetails::new(HttpMethod::Post, "/nodes");
        if let Some(schema) = header {
            let mut p = Parameter::new("X-Node");
            p.schema = Some(schema);
            details.headers.push(p);
        }
        details.body.push(RequestBody {
            content_type: "application/json".into(),
            schema: Some(body),
        });
        CollectionItem::request(
            "r1",
            "CreateNode",
            ItemSource::Spec,
            Audit::new(&Actor::new("alex"), Utc::now()),
            details,
        )
    }

    fn body_value(item: &CollectionItem) -> Option<&Value> {
        item.request_details().unwrap().body[0]
            .schema
            .as_ref()
            .and_then(|f| f.as_value())
    }

    #[test]
    fn test_cycle_is_broken() {
        let (g, node) = cyclic_graph();
        let item = request_with(Fragment::linked(g, node), None);
        let copy = detach(&item, CopyPolicy::Dedupe);
        assert_eq!(body_value(&copy), Some(&json!({ "name": "n" })));
        // The copy is serializable, which the linked original is not.
        assert!(serde_json::to_string(&copy).is_ok());
        assert!(serde_json::to_string(&item).is_err());
    }

    #[test]
    fn test_cycle_only_policy_also_terminates() {
        let (g, node) = cyclic_graph();
        let item = request_with(Fragment::linked(g, node), None);
        let copy = detach(&item, CopyPolicy::CycleOnly);
        assert_eq!(body_value(&copy), Some(&json!({ "name": "n" })));
    }

    #[test]
    fn test_dedupe_prunes_shared_siblings() {
        let (g, pair) = shared_graph();
        let item = request_with(Fragment::linked(g, pair), None);
        let copy = detach(&item, CopyPolicy::Dedupe);
        assert_eq!(
            body_value(&copy),
            Some(&json!({ "left": { "type": "string" }, "list": [null, 1] }))
        );
    }

    #[test]
    fn test_cycle_only_keeps_shared_siblings() {
        let (g, pair) = shared_graph();
        let item = request_with(Fragment::linked(g, pair), None);
        let copy = detach(&item, CopyPolicy::CycleOnly);
        assert_eq!(
            body_value(&copy),
            Some(&json!({
                "left": { "type": "string" },
                "right": { "type": "string" },
                "list": [{ "type": "string" }, 1]
            }))
        );
    }

    #[test]
    fn test_visited_set_spans_fragments_of_one_item() {
        let (g, node) = cyclic_graph();
        let item = request_with(
            Fragment::linked(Arc::clone(&g), node),
            Some(Fragment::linked(Arc::clone(&g), node)),
        );
        let copy = detach(&item, CopyPolicy::Dedupe);
        let details = copy.request_details().unwrap();
        // Headers are walked before the body, so the header keeps the copy.
        assert!(details.headers[0].schema.is_some());
        assert!(details.body[0].schema.is_none());
    }

    #[test]
    fn test_separate_items_do_not_share_visited_set() {
        let (g, node) = cyclic_graph();
        let a = request_with(Fragment::linked(Arc::clone(&g), node), None);
        let b = request_with(Fragment::linked(Arc::clone(&g), node), None);
        assert!(body_value(&detach(&a, CopyPolicy::Dedupe)).is_some());
        assert!(body_value(&detach(&b, CopyPolicy::Dedupe)).is_some());
    }

    #[test]
    fn test_primitive_root_is_copied() {
        let g = Arc::new(DocumentGraph::from_value(json!("plain")));
        let root = g.root();
        let copy = detach_fragment(&Fragment::linked(g, root), CopyPolicy::Dedupe);
        assert_eq!(copy, Some(Fragment::Detached(json!("plain"))));
    }

    #[test]
    fn test_detached_fragment_passes_through() {
        let item = request_with(Fragment::Detached(json!({ "a": [1, 2] })), None);
        let copy = detach(&item, CopyPolicy::Dedupe);
        assert_eq!(copy, item);
    }

    #[test]
    fn test_folder_children_are_copied() {
        let (g, node) = cyclic_graph();
        let folder = CollectionItem::folder(
            "f1",
            "Nodes",
            ItemSource::Spec,
            Audit::new(&Actor::new("alex"), Utc::now()),
        )
        .with_item(request_with(Fragment::linked(g, node), None));
        let copy = detach(&folder, CopyPolicy::Dedupe);
        assert!(!copy.children()[0]
            .request_details()
            .unwrap()
            .fragments()
            .any(Fragment::is_linked));
    }
}
