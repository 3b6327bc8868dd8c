use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenApiError>;

#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Document root must be a mapping")]
    NotAMapping,

    #[error("Document has no info.title")]
    MissingTitle,

    #[error(
        "Unrecognized spec dialect: none of `openapi`, `swagger`, `components`, `definitions` at top level"
    )]
    UnrecognizedDialect,

    #[error("External reference not supported: {0}")]
    ExternalRef(String),

    #[error("Reference does not resolve: {0}")]
    DanglingRef(String),

    #[error("Reference loop while resolving: {0}")]
    RefLoop(String),
}
