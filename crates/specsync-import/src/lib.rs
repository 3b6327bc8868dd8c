#![doc = include_str!("../README.md")]

pub mod error;
pub mod importer;
pub mod store;

pub use error::{ImportError, Result, StoreError};
pub use importer::{ImportConfig, ImportOptions, ImportOutcome, Importer};
pub use store::{CollectionStore, FileStore, MemoryStore, StoreResult};
