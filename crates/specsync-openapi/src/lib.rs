#![doc = include_str!("../README.md")]

pub mod builder;
pub mod dialect;
pub mod document;
pub mod error;
pub mod parse;
pub mod resolve;

pub use builder::{FolderMap, OpenApi3Builder, Swagger2Builder, TreeBuilder};
pub use dialect::Dialect;
pub use document::{BuildContext, SpecDocument};
pub use error::{OpenApiError, Result};
pub use parse::parse_document;
pub use resolve::resolve_refs;
