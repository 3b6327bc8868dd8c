use crate::builder::{OpenApi3Builder, Swagger2Builder, TreeBuilder};
use crate::error::{OpenApiError, Result};
use specsync::v1::DocumentGraph;
use std::fmt;

/// The two supported schema dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger / OpenAPI 2.0.
    Swagger2,
    /// OpenAPI 3.x.
    OpenApi3,
}

static SWAGGER2: Swagger2Builder = Swagger2Builder;
static OPENAPI3: OpenApi3Builder = OpenApi3Builder;

impl Dialect {
    /// Decide the dialect from top-level markers.
    ///
    /// The version fields (`openapi`, `swagger`) are checked first, then the
    /// schema containers (`components`, `definitions`).
    pub fn detect(graph: &DocumentGraph) -> Result<Self> {
        let root = graph.root();
        let has = |key: &str| graph.contains_key(root, key);
        if has("openapi") {
            Ok(Dialect::OpenApi3)
        } else if has("swagger") {
            Ok(Dialect::Swagger2)
        } else if has("components") {
            Ok(Dialect::OpenApi3)
        } else if has("definitions") {
            Ok(Dialect::Swagger2)
        } else {
            Err(OpenApiError::UnrecognizedDialect)
        }
    }

    /// The tree builder for this dialect.
    pub fn builder(self) -> &'static dyn TreeBuilder {
        match self {
            Dialect::Swagger2 => &SWAGGER2,
            Dialect::OpenApi3 => &OPENAPI3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Swagger2 => "swagger-2.0",
            Dialect::OpenApi3 => "openapi-3",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
