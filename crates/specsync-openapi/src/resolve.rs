//! Local `$ref` resolution.
//!
//! Every reference object (`{"$ref": "#/..."}`) is replaced by an edge to the
//! node it points at. Nothing is copied, so a schema used in ten places is
//! one node with ten parents, and a recursive schema becomes a cycle.

use crate::error::{OpenApiError, Result};
use specsync::v1::{DocumentGraph, NodeId};
use std::collections::HashMap;

/// Resolve all local references in place.
///
/// Fails on references outside the document (`other.yaml#/...`), pointers
/// that lead nowhere, and references that only lead to other references.
pub fn resolve_refs(graph: &mut DocumentGraph) -> Result<()> {
    let mut redirects: HashMap<NodeId, NodeId> = HashMap::new();
    for id in graph.node_ids() {
        if let Some(reference) = graph.ref_target(id) {
            let mut budget = graph.len();
            let target = follow(graph, reference, &mut budget)?;
            redirects.insert(id, target);
        }
    }
    graph.retarget(&redirects);
    Ok(())
}

/// Resolve `reference` to a node that is not itself a reference.
fn follow(graph: &DocumentGraph, reference: &str, budget: &mut usize) -> Result<NodeId> {
    let mut node = lookup(graph, reference, budget)?;
    while let Some(next) = graph.ref_target(node) {
        spend(budget, reference)?;
        node = lookup(graph, next, budget)?;
    }
    Ok(node)
}

/// Walk a local pointer, dereferencing any reference met along the way.
fn lookup(graph: &DocumentGraph, reference: &str, budget: &mut usize) -> Result<NodeId> {
    let pointer = reference
        .strip_prefix('#')
        .ok_or_else(|| OpenApiError::ExternalRef(reference.to_string()))?;
    if pointer.is_empty() {
        return Ok(graph.root());
    }
    let tokens = pointer
        .strip_prefix('/')
        .ok_or_else(|| OpenApiError::DanglingRef(reference.to_string()))?;

    let mut node = graph.root();
    for token in tokens.split('/') {
        if let Some(inner) = graph.ref_target(node) {
            spend(budget, reference)?;
            node = follow(graph, inner, budget)?;
        }
        node = graph
            .pointer_from(node, &format!("/{}", token))
            .ok_or_else(|| OpenApiError::DanglingRef(reference.to_string()))?;
    }
    Ok(node)
}

fn spend(budget: &mut usize, reference: &str) -> Result<()> {
    if *budget == 0 {
        return Err(OpenApiError::RefLoop(reference.to_string()));
    }
    *budget -= 1;
    Ok(())
}
