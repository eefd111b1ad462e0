use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Introspection request to {endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Introspection request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },

    #[error("Introspection cancelled")]
    Cancelled,

    #[error("GraphQL errors: {0}")]
    GraphQL(String),

    #[error("Response has no data.__schema; introspection may be disabled")]
    MissingSchema,

    #[error("Malformed introspection result: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}
