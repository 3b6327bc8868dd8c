use super::{Operation, TreeBuilder};
use crate::dialect::Dialect;
use crate::document::SpecDocument;
use specsync::v1::{NodeId, RequestBody, RequestDetails};

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Builder for Swagger / OpenAPI 2.0 documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2Builder;

impl TreeBuilder for Swagger2Builder {
    fn dialect(&self) -> Dialect {
        Dialect::Swagger2
    }

    /// `{scheme}://{host}{basePath}`. The scheme defaults to `https`; a
    /// document without `host` yields just the base path.
    fn base_url(&self, doc: &SpecDocument) -> String {
        let graph = doc.graph();
        let root = graph.root();
        let base_path = graph.str_member(root, "basePath").unwrap_or_default();
        let base_path = base_path.trim_end_matches('/');
        match graph.str_member(root, "host") {
            Some(host) if !host.is_empty() => {
                let scheme = graph
                    .get(root, "schemes")
                    .and_then(|s| graph.elements(s).first().copied())
                    .and_then(|s| graph.as_str(s))
                    .unwrap_or("https");
                format!("{}://{}{}", scheme, host, base_path)
            }
            _ => base_path.to_string(),
        }
    }

    /// The first `in: body` parameter becomes the only body variant.
    fn attach_body(
        &self,
        doc: &SpecDocument,
        op: &Operation<'_>,
        leftover: &[NodeId],
        details: &mut RequestDetails,
    ) {
        let graph = doc.graph();
        let Some(&body) = leftover
            .iter()
            .find(|p| graph.str_member(**p, "in") == Some("body"))
        else {
            return;
        };
        details.body.push(RequestBody {
            content_type: content_type(doc, op),
            schema: graph.get(body, "schema").map(|s| doc.fragment(s)),
        });
    }
}

/// First entry of `consumes`, operation before document.
fn content_type(doc: &SpecDocument, op: &Operation<'_>) -> String {
    let graph = doc.graph();
    [op.node, graph.root()]
        .into_iter()
        .filter_map(|node| graph.get(node, "consumes"))
        .find_map(|list| {
            graph
                .elements(list)
                .first()
                .and_then(|first| graph.as_str(*first))
        })
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}
