//! Descriptors consumed by the cache
//!
//! Models, providers, source definitions and queries. The cache reads these
//! but never mutates them.

pub mod model;
pub mod query;
pub mod source;

// Re-export commonly used types
pub use model::{stringify_identifier, Model};
pub use query::Query;
pub use source::{Cardinality, Fields, Provider, QueryType, Returns, SourceDefinition};
