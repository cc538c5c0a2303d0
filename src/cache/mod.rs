//! Cache Module
//!
//! Normalizes API responses into per-model records with expiry, indexes which
//! identifiers satisfy each query, and rebuilds query results with a
//! completeness verdict.
//!
//! Writes flow `response -> normalize -> store`; reads flow
//! `state -> resolve -> caller`. Every operation takes `now` from the caller.

mod entry;
pub mod expiry;
mod ids;
mod lock;
pub mod normalize;
pub mod resolve;
mod shared;
mod stats;
pub mod store;


// Re-export public types
pub use entry::{Record, RecordCache};
pub use expiry::{compute_expiry, effective_cache_for};
pub use ids::{IdentifierSet, RecordMap};
pub use normalize::{normalize_provider, normalize_response, NormalizedResponse};
pub use resolve::{get_query_data, QueryData};
pub use shared::Cache;
pub use stats::CacheStats;
pub use store::{store_query, CacheState};
