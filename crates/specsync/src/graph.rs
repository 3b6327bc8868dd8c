use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Index of a node inside a [`DocumentGraph`].
///
/// Two occurrences with the same `NodeId` are the *same* node, which is how
/// the graph expresses shared substructure and cycles introduced by `$ref`
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single JSON-like node. Composite nodes refer to their children by
/// [`NodeId`] rather than owning them.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
}

impl Node {
    /// Arrays and objects. Only composite nodes carry identity that matters
    /// to copying; primitives are always copied by value.
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }
}

/// Arena holding a parsed API document.
///
/// The graph starts out as a tree (one node per JSON value). Reference
/// resolution then rewrites edges with [`DocumentGraph::retarget`], after
/// which a node can be reachable from several parents or from itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DocumentGraph {
    /// Build a graph from a JSON value. Object member order is preserved.
    pub fn from_value(value: Value) -> Self {
        let mut nodes = Vec::new();
        let root = push_value(&mut nodes, value);
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` did not come from this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All node ids in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Object member lookup. `None` for missing keys and non-objects.
    pub fn get(&self, id: NodeId, key: &str) -> Option<NodeId> {
        match self.node(id) {
            Node::Object(members) => members.get(key).copied(),
            _ => None,
        }
    }

    /// Follow a chain of object keys from `id`.
    pub fn get_path(&self, id: NodeId, keys: &[&str]) -> Option<NodeId> {
        keys.iter().try_fold(id, |current, key| self.get(current, key))
    }

    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self, id: NodeId) -> Option<bool> {
        match self.node(id) {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String member of an object, e.g. `str_member(op, "summary")`.
    pub fn str_member(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id, key).and_then(|child| self.as_str(child))
    }

    /// Object members in declaration order. Empty for non-objects.
    pub fn members(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        let members = match self.node(id) {
            Node::Object(members) => Some(members),
            _ => None,
        };
        members
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Array elements. Empty for non-arrays.
    pub fn elements(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Node::Array(elements) => elements,
            _ => &[],
        }
    }

    pub fn contains_key(&self, id: NodeId, key: &str) -> bool {
        self.get(id, key).is_some()
    }

    /// The target string if `id` is a reference object (`{"$ref": "..."}`).
    pub fn ref_target(&self, id: NodeId) -> Option<&str> {
        self.str_member(id, "$ref")
    }

    /// Look up a JSON pointer (RFC 6901, without the leading `#`) starting at
    /// `from`. Does not follow references.
    pub fn pointer_from(&self, from: NodeId, pointer: &str) -> Option<NodeId> {
        if pointer.is_empty() {
            return Some(from);
        }
        let rest = pointer.strip_prefix('/')?;
        rest.split('/').try_fold(from, |current, token| {
            let token = unescape_token(token);
            match self.node(current) {
                Node::Object(members) => members.get(token.as_str()).copied(),
                Node::Array(elements) => token
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| elements.get(i).copied()),
                _ => None,
            }
        })
    }

    /// Rewrite every edge (and the root) that points at a key of `redirects`
    /// so it points at the mapped node instead.
    pub fn retarget(&mut self, redirects: &HashMap<NodeId, NodeId>) {
        if redirects.is_empty() {
            return;
        }
        let redirect = |id: &mut NodeId| {
            if let Some(target) = redirects.get(id) {
                *id = *target;
            }
        };
        for node in &mut self.nodes {
            match node {
                Node::Array(elements) => elements.iter_mut().for_each(redirect),
                Node::Object(members) => members.values_mut().for_each(redirect),
                _ => {}
            }
        }
        redirect(&mut self.root);
    }

    /// Convert a subtree back into a JSON value.
    ///
    /// Only valid for acyclic subtrees: use the cycle-safe copier for anything
    /// reachable from resolved references.
    pub fn to_value_acyclic(&self, id: NodeId) -> Value {
        match self.node(id) {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|child| self.to_value_acyclic(*child))
                    .collect(),
            ),
            Node::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(k, child)| (k.clone(), self.to_value_acyclic(*child)))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

fn push_value(nodes: &mut Vec<Node>, value: Value) -> NodeId {
    let id = NodeId(nodes.len());
    // Reserve the slot before the children so the parent keeps a lower id.
    nodes.push(Node::Null);
    let node = match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => Node::Number(n),
        Value::String(s) => Node::String(s),
        Value::Array(items) => Node::Array(
            items
                .into_iter()
                .map(|item| push_value(nodes, item))
                .collect(),
        ),
        Value::Object(members) => Node::Object(
            members
                .into_iter()
                .map(|(k, v)| (k, push_value(nodes, v)))
                .collect(),
        ),
    };
    nodes[id.0] = node;
    id
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
