use crate::error::{OpenApiError, Result};
use serde_json::Value;
use specsync::v1::DocumentGraph;

/// Parse raw spec text into a document graph.
///
/// Input that starts with `{` is read as JSON, anything else as YAML. The
/// root must be a mapping. References are left in place; see
/// [`crate::resolve_refs`].
pub fn parse_document(raw: &str) -> Result<DocumentGraph> {
    let value: Value = if raw.trim_start().starts_with('{') {
        serde_json::from_str(raw)?
    } else {
        serde_yaml::from_str(raw)?
    };
    if !value.is_object() {
        return Err(OpenApiError::NotAMapping);
    }
    Ok(DocumentGraph::from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let g = parse_document(r#"{"openapi":"3.0.0","info":{"title":"T"}}"#).unwrap();
        let info = g.get(g.root(), "info").unwrap();
        assert_eq!(g.str_member(info, "title"), Some("T"));
    }

    #[test]
    fn test_parse_yaml_keeps_order() {
        let yaml = "swagger: '2.0'\ninfo:\n  title: T\npaths:\n  /b: {}\n  /a: {}\n";
        let g = parse_document(yaml).unwrap();
        let paths = g.get(g.root(), "paths").unwrap();
        let keys: Vec<&str> = g.members(paths).map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/b", "/a"]);
    }

    #[test]
    fn test_parse_yaml_numeric_keys_become_strings() {
        let yaml = "openapi: 3.0.0\nresponses:\n  200:\n    description: ok\n";
        let g = parse_document(yaml).unwrap();
        assert!(g.get_path(g.root(), &["responses", "200"]).is_some());
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(
            parse_document("{ not json"),
            Err(OpenApiError::Json(_))
        ));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        assert!(matches!(
            parse_document("a: [unclosed"),
            Err(OpenApiError::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_scalar_root_rejected() {
        assert!(matches!(
            parse_document("just a string"),
            Err(OpenApiError::NotAMapping)
        ));
    }
}
