//! CacheGraph core: static analysis of introspected GraphQL schemas and the
//! cache-rule model derived from it.
//!
//! The analysis pipeline is synchronous and side-effect free. Network access
//! (introspection, LLM calls) lives in the sibling crates.

pub mod analyzer;
pub mod cache_config;
pub mod config_manager;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod heuristic;
pub mod introspection;
pub mod operation;
pub mod patterns;
pub mod relationship;
pub mod resolver;
pub mod summary;

pub use analyzer::*;
pub use cache_config::*;
pub use config_manager::*;
pub use credentials::{CredentialStore, StoreOutcome};
pub use entity::*;
pub use error::*;
pub use heuristic::*;
pub use introspection::*;
pub use operation::*;
pub use relationship::*;
pub use resolver::*;
pub use summary::render_summary;
