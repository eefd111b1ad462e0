use cachegraph_core::AnalysisError;
use cachegraph_introspection::IntrospectionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    /// The LLM request itself failed (network, timeout, non-2xx status).
    #[error("LLM call failed: {0}")]
    ProviderCall(String),

    #[error("AI response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("AI response is missing the required 'rules' array")]
    MissingRules,

    #[error("Schema analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Introspection failed: {0}")]
    Introspection(#[from] IntrospectionError),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
