use thiserror::Error;

use crate::introspection::TypeKind;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Root {role} type '{name}' is not present in the schema type list")]
    MissingRootType { role: &'static str, name: String },

    #[error("Root {role} type '{name}' has kind {kind:?}, expected OBJECT")]
    InvalidRootType {
        role: &'static str,
        name: String,
        kind: TypeKind,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
