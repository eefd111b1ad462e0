use serde::{Deserialize, Serialize};

use crate::introspection::{TypeKind, TypeRef};

/// Name reported when a type reference chain ends without a named type.
pub const UNKNOWN_TYPE_NAME: &str = "Unknown";

/// A type reference with its wrappers flattened away.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFieldType {
    pub name: String,
    pub is_non_null: bool,
    pub is_list: bool,
}

/// Unwrap every LIST / NON_NULL layer around a named type.
///
/// The flags are sticky: `[String!]` and `[String]!` both resolve to
/// `is_list && is_non_null`, wrapper order and depth are not preserved.
pub fn resolve_type_ref(type_ref: &TypeRef) -> ResolvedFieldType {
    let mut is_non_null = false;
    let mut is_list = false;
    let mut name: Option<&str> = None;

    let mut current = Some(type_ref);
    while let Some(layer) = current {
        match layer.kind {
            TypeKind::NonNull => is_non_null = true,
            TypeKind::List => is_list = true,
            _ => {}
        }
        if let Some(layer_name) = layer.name.as_deref() {
            name = Some(layer_name);
        }
        current = layer.of_type.as_deref();
    }

    ResolvedFieldType {
        name: name.unwrap_or(UNKNOWN_TYPE_NAME).to_string(),
        is_non_null,
        is_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_named_type() {
        let resolved = resolve_type_ref(&TypeRef::scalar("String"));
        assert_eq!(resolved.name, "String");
        assert!(!resolved.is_non_null);
        assert!(!resolved.is_list);
    }

    #[test]
    fn test_non_null_list_of_non_null() {
        let type_ref = TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::object(
            "Post",
        ))));
        let resolved = resolve_type_ref(&type_ref);
        assert_eq!(resolved.name, "Post");
        assert!(resolved.is_non_null);
        assert!(resolved.is_list);
    }

    #[test]
    fn test_list_of_non_null_sets_both_flags() {
        let resolved = resolve_type_ref(&TypeRef::list(TypeRef::non_null(TypeRef::scalar("ID"))));
        assert!(resolved.is_non_null);
        assert!(resolved.is_list);
    }

    #[test]
    fn test_unnamed_terminal_falls_back_to_unknown() {
        let type_ref = TypeRef::non_null(TypeRef {
            kind: TypeKind::Object,
            name: None,
            of_type: None,
        });
        let resolved = resolve_type_ref(&type_ref);
        assert_eq!(resolved.name, UNKNOWN_TYPE_NAME);
        assert!(resolved.is_non_null);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let type_ref = TypeRef::list(TypeRef::non_null(TypeRef::object("User")));
        assert_eq!(resolve_type_ref(&type_ref), resolve_type_ref(&type_ref));
    }
}
