//! Query Cache - normalizing cache for a client-side data layer
//!
//! Normalizes (possibly polymorphic) API responses into per-model records
//! with expiry, remembers which identifiers satisfied each query, and rebuilds
//! query results with a verdict on whether they are complete and fresh.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{Cache, CacheState, CacheStats, IdentifierSet, QueryData, Record};
pub use config::{Config, DeleteMode};
pub use error::CacheError;
pub use models::{Cardinality, Fields, Model, Provider, Query, QueryType, Returns, SourceDefinition};
pub use tasks::spawn_sweep_task;
