use super::{Operation, TreeBuilder, parameter};
use crate::dialect::Dialect;
use crate::document::SpecDocument;
use specsync::v1::{NodeId, Parameter, RequestBody, RequestDetails};

/// Content types whose schema properties are also listed as form fields.
const FORM_CONTENT_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

/// Builder for OpenAPI 3.x documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi3Builder;

impl TreeBuilder for OpenApi3Builder {
    fn dialect(&self) -> Dialect {
        Dialect::OpenApi3
    }

    /// URL of the first server entry, without a trailing slash.
    fn base_url(&self, doc: &SpecDocument) -> String {
        let graph = doc.graph();
        graph
            .get(graph.root(), "servers")
            .and_then(|servers| graph.elements(servers).first().copied())
            .and_then(|server| graph.str_member(server, "url"))
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    }

    /// One body variant per `requestBody.content` entry, in declaration
    /// order.
    fn attach_body(
        &self,
        doc: &SpecDocument,
        op: &Operation<'_>,
        _leftover: &[NodeId],
        details: &mut RequestDetails,
    ) {
        let graph = doc.graph();
        let Some(content) = graph.get_path(op.node, &["requestBody", "content"]) else {
            return;
        };
        let required_body = graph
            .get_path(op.node, &["requestBody", "required"])
            .and_then(|r| graph.as_bool(r))
            .unwrap_or(false);

        for (content_type, media) in graph.members(content) {
            let schema = graph.get(media, "schema");
            if is_form(content_type) {
                if let Some(schema) = schema {
                    for field in form_fields(doc, schema, required_body) {
                        if !details.form_data.iter().any(|f| f.name == field.name) {
                            details.form_data.push(field);
                        }
                    }
                }
            }
            details.body.push(RequestBody {
                content_type: content_type.to_string(),
                schema: schema.map(|s| doc.fragment(s)),
            });
        }
    }
}

fn is_form(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    FORM_CONTENT_TYPES
        .iter()
        .any(|form| essence.eq_ignore_ascii_case(form))
}

/// One parameter per schema property. A property is required when the body
/// is required and the schema lists it under `required`.
fn form_fields(doc: &SpecDocument, schema: NodeId, required_body: bool) -> Vec<Parameter> {
    let graph = doc.graph();
    let required: Vec<&str> = graph
        .get(schema, "required")
        .map(|list| {
            graph
                .elements(list)
                .iter()
                .filter_map(|r| graph.as_str(*r))
                .collect()
        })
        .unwrap_or_default();
    let Some(properties) = graph.get(schema, "properties") else {
        return Vec::new();
    };
    graph
        .members(properties)
        .map(|(name, property)| {
            let mut field = parameter(doc, property);
            field.name = name.to_string();
            field.required = required_body && required.contains(&name);
            field.schema = Some(doc.fragment(property));
            field
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BuildContext;
    use serde_json::json;
    use specsync::v1::{Actor, CopyPolicy, Fragment, HttpMethod, detach};

    fn doc(value: serde_json::Value) -> SpecDocument {
        SpecDocument::from_value(value).unwrap()
    }

    fn users() -> SpecDocument {
        doc(json!({
            "openapi": "3.0.3",
            "info": { "title": "Users" },
            "servers": [ { "url": "https://api.example.com/v2/" }, { "url": "http://localhost" } ],
            "paths": {
                "/users": {
                    "post": {
                        "tags": ["Users"],
                        "summary": "Create user",
                        "description": "Registers a new user",
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/User" } },
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "type": "object",
                                        "required": ["name"],
                                        "properties": {
                                            "name": { "type": "string", "description": "Display name" },
                                            "age": { "type": "integer" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/users/{id}": {
                    "get": {
                        "tags": ["Users"],
                        "operationId": "getUser",
                        "parameters": [ { "$ref": "#/components/parameters/UserId" } ]
                    }
                }
            },
            "components": {
                "parameters": {
                    "UserId": { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                },
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "manager": { "$ref": "#/components/schemas/User" }
                        }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_base_url_uses_first_server() {
        assert_eq!(OpenApi3Builder.base_url(&users()), "https://api.example.com/v2");
        let bare = doc(json!({ "openapi": "3.1.0", "info": { "title": "T" } }));
        assert_eq!(OpenApi3Builder.base_url(&bare), "");
    }

    #[test]
    fn test_body_variants_in_declaration_order() {
        let folders = OpenApi3Builder.build(&users(), &BuildContext::new(Actor::new("kim")));
        let create = &folders["Users"].children()[0];
        assert_eq!(create.name, "Create user");
        assert_eq!(create.description.as_deref(), Some("Registers a new user"));

        let details = create.request_details().unwrap();
        assert_eq!(details.url, "https://api.example.com/v2/users");
        let types: Vec<&str> = details.body.iter().map(|b| b.content_type.as_str()).collect();
        assert_eq!(types, vec!["application/json", "application/x-www-form-urlencoded"]);
        assert!(matches!(details.body[0].schema, Some(Fragment::Linked(_))));
    }

    #[test]
    fn test_form_body_exposes_fields() {
        let folders = OpenApi3Builder.build(&users(), &BuildContext::new(Actor::new("kim")));
        let details = folders["Users"].children()[0].request_details().unwrap();
        let fields: Vec<(&str, bool)> = details
            .form_data
            .iter()
            .map(|f| (f.name.as_str(), f.required))
            .collect();
        assert_eq!(fields, vec![("name", true), ("age", false)]);
        assert_eq!(details.form_data[0].description.as_deref(), Some("Display name"));
    }

    #[test]
    fn test_referenced_parameter() {
        let folders = OpenApi3Builder.build(&users(), &BuildContext::new(Actor::new("kim")));
        let get = &folders["Users"].children()[1];
        assert_eq!(get.name, "getUser");
        let details = get.request_details().unwrap();
        assert_eq!(details.method, HttpMethod::Get);
        assert_eq!(details.path_params[0].name, "id");
        assert!(details.path_params[0].required);
    }

    #[test]
    fn test_cyclic_schema_detaches() {
        let folders = OpenApi3Builder.build(&users(), &BuildContext::new(Actor::new("kim")));
        let create = detach(&folders["Users"].children()[0], CopyPolicy::Dedupe);
        let body = create.request_details().unwrap().body[0]
            .schema
            .as_ref()
            .and_then(Fragment::as_value)
            .cloned();
        assert_eq!(
            body,
            Some(json!({ "type": "object", "properties": { "name": { "type": "string" } } }))
        );
    }

    #[test]
    fn test_is_form() {
        assert!(is_form("multipart/form-data; boundary=x"));
        assert!(is_form("Application/X-WWW-Form-Urlencoded"));
        assert!(!is_form("application/json"));
    }
}
