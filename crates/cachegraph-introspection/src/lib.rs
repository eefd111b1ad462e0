//! Fetches a GraphQL schema over HTTP using the standard introspection query.

pub mod client;
pub mod errors;
pub mod query;

pub use client::{parse_introspection_response, EndpointStatus, IntrospectionClient};
pub use errors::{IntrospectionError, Result};
pub use query::INTROSPECTION_QUERY;
