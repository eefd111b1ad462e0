use serde::{Deserialize, Serialize};

use crate::entity::is_object_type;
use crate::introspection::{IntrospectedField, IntrospectedType, TypeMap};
use crate::patterns::MUTATION_VERB_PREFIXES;
use crate::resolver::resolve_type_ref;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A field on the Query or Mutation root type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub return_type: String,
    pub returns_list: bool,
    pub arguments: Vec<ArgumentInfo>,
    /// Entities a mutation is inferred to modify. Always empty for queries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentInfo {
    pub name: String,
    pub type_name: String,
    pub is_list: bool,
    /// Derived from NON_NULL wrapping only; default values are not consulted.
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One [`Operation`] per field of `root`, or nothing when the root is absent.
pub fn extract_operations(
    root: Option<&IntrospectedType>,
    type_map: &TypeMap,
    kind: OperationKind,
) -> Vec<Operation> {
    let Some(fields) = root.and_then(|r| r.fields.as_deref()) else {
        return Vec::new();
    };

    fields
        .iter()
        .map(|field| build_operation(field, type_map, kind))
        .collect()
}

fn build_operation(field: &IntrospectedField, type_map: &TypeMap, kind: OperationKind) -> Operation {
    let return_type = resolve_type_ref(&field.type_ref);

    let arguments = field
        .args
        .iter()
        .map(|arg| {
            let resolved = resolve_type_ref(&arg.type_ref);
            ArgumentInfo {
                name: arg.name.clone(),
                type_name: resolved.name,
                is_list: resolved.is_list,
                is_required: resolved.is_non_null,
                description: arg.description.clone(),
            }
        })
        .collect();

    let affected_types = match kind {
        OperationKind::Mutation => infer_affected_types(&field.name, &return_type.name, type_map),
        OperationKind::Query => Vec::new(),
    };

    Operation {
        name: field.name.clone(),
        description: field.description.clone(),
        return_type: return_type.name,
        returns_list: return_type.is_list,
        arguments,
        affected_types,
    }
}

/// Guess which types a mutation touches from its return type and its name.
///
/// The return type counts when it is a user-defined object. The name counts
/// when it starts with a known verb and the remainder, capitalized, names a
/// type in `type_map`. Mutations that follow neither convention get nothing.
pub fn infer_affected_types(
    mutation_name: &str,
    return_type: &str,
    type_map: &TypeMap,
) -> Vec<String> {
    let mut affected: Vec<String> = Vec::new();

    if is_object_type(return_type, type_map) {
        affected.push(return_type.to_string());
    }

    let lowered = mutation_name.to_lowercase();
    for prefix in MUTATION_VERB_PREFIXES {
        if !lowered.starts_with(prefix) {
            continue;
        }
        let Some(remainder) = mutation_name.get(prefix.len()..) else {
            continue;
        };
        let candidate = capitalize_first(remainder);
        if type_map.contains_key(&candidate) && !affected.contains(&candidate) {
            affected.push(candidate);
        }
    }

    affected
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
