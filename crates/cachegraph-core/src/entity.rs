use serde::{Deserialize, Serialize};

use crate::introspection::{IntrospectedType, TypeMap};
use crate::patterns::{
    matches_any, COLLECTION_TYPE_SUFFIXES, ROOT_TYPE_NAMES, SENSITIVE_FIELD_PATTERNS,
    USER_SPECIFIC_FIELD_PATTERNS, VOLATILE_FIELD_PATTERNS,
};
use crate::resolver::{resolve_type_ref, ResolvedFieldType};

pub const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Field names that mark a type as individually addressable.
pub const IDENTITY_FIELD_NAMES: &[&str] = &["id", "_id", "ID"];

/// Built-in scalars and `__`-prefixed introspection types.
pub fn is_builtin_type(name: &str) -> bool {
    name.starts_with("__") || BUILTIN_SCALARS.contains(&name)
}

/// True when `name` is a user-defined OBJECT type in `types`.
pub fn is_object_type(name: &str, types: &TypeMap) -> bool {
    !is_builtin_type(name) && types.get(name).is_some_and(IntrospectedType::is_object)
}

/// A user-defined object type treated as a cacheable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub has_identity_field: bool,
    pub fields: Vec<FieldInfo>,
    /// Non-root object types this entity points at, in first-appearance order.
    pub references: Vec<String>,
    /// Entities pointing at this one. Empty until relationships are applied.
    pub referenced_by: Vec<String>,
    pub characteristics: EntityCharacteristics,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_root(&self) -> bool {
        self.characteristics.root_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    pub field_type: ResolvedFieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Caching-relevant traits derived from type and field names. Each trait is
/// decided independently of the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCharacteristics {
    pub volatile: bool,
    pub user_specific: bool,
    pub sensitive: bool,
    pub collection: bool,
    pub root_type: bool,
}

impl EntityCharacteristics {
    pub fn classify<'a>(type_name: &str, field_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut characteristics = Self {
            collection: COLLECTION_TYPE_SUFFIXES
                .iter()
                .any(|suffix| type_name.ends_with(suffix)),
            root_type: ROOT_TYPE_NAMES.contains(&type_name),
            ..Self::default()
        };

        for field_name in field_names {
            characteristics.volatile |= matches_any(field_name, VOLATILE_FIELD_PATTERNS);
            characteristics.user_specific |= matches_any(field_name, USER_SPECIFIC_FIELD_PATTERNS);
            characteristics.sensitive |= matches_any(field_name, SENSITIVE_FIELD_PATTERNS);
        }

        characteristics
    }

    /// Labels of the traits that are set, in declaration order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.volatile, "volatile"),
            (self.user_specific, "user-specific"),
            (self.sensitive, "sensitive"),
            (self.collection, "collection"),
            (self.root_type, "root"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}

/// True for OBJECT types with a field list that are neither built-in nor
/// reflection types.
pub fn qualifies_as_entity(ty: &IntrospectedType) -> bool {
    ty.is_object() && ty.fields.is_some() && !is_builtin_type(&ty.name)
}

/// Build one [`Entity`] per qualifying type, preserving input order.
pub fn extract_entities(types: &[IntrospectedType], type_map: &TypeMap) -> Vec<Entity> {
    types
        .iter()
        .filter(|ty| qualifies_as_entity(ty))
        .map(|ty| build_entity(ty, type_map))
        .collect()
}

fn build_entity(ty: &IntrospectedType, type_map: &TypeMap) -> Entity {
    let raw_fields = ty.fields.as_deref().unwrap_or_default();

    let fields: Vec<FieldInfo> = raw_fields
        .iter()
        .map(|field| FieldInfo {
            name: field.name.clone(),
            field_type: resolve_type_ref(&field.type_ref),
            description: field.description.clone(),
        })
        .collect();

    let has_identity_field = fields
        .iter()
        .any(|f| IDENTITY_FIELD_NAMES.contains(&f.name.as_str()));

    let characteristics =
        EntityCharacteristics::classify(&ty.name, fields.iter().map(|f| f.name.as_str()));

    // Root types sit outside the relationship graph in both directions.
    let mut references: Vec<String> = Vec::new();
    if !characteristics.root_type {
        for field in &fields {
            let target = &field.field_type.name;
            if target != &ty.name
                && !ROOT_TYPE_NAMES.contains(&target.as_str())
                && is_object_type(target, type_map)
                && !references.contains(target)
            {
                references.push(target.clone());
            }
        }
    }

    Entity {
        name: ty.name.clone(),
        description: ty.description.clone(),
        has_identity_field,
        fields,
        references,
        referenced_by: Vec::new(),
        characteristics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::{IntrospectedField, IntrospectionSchema, TypeRef};

    fn schema(types: Vec<IntrospectedType>) -> IntrospectionSchema {
        IntrospectionSchema {
            query_type: None,
            mutation_type: None,
            subscription_type: None,
            types,
        }
    }

    fn scalar_field(name: &str) -> IntrospectedField {
        IntrospectedField::new(name, TypeRef::scalar("String"))
    }

    #[test]
    fn test_user_profile_classification() {
        let schema = schema(vec![IntrospectedType::object(
            "UserProfile",
            vec![
                IntrospectedField::new("id", TypeRef::non_null(TypeRef::scalar("ID"))),
                scalar_field("email"),
                scalar_field("updatedAt"),
            ],
        )]);

        let entities = extract_entities(&schema.types, &schema.type_map());
        assert_eq!(entities.len(), 1);

        let profile = &entities[0];
        assert!(profile.has_identity_field);
        assert_eq!(
            profile.characteristics,
            EntityCharacteristics {
                volatile: true,
                user_specific: false,
                sensitive: true,
                collection: false,
                root_type: false,
            }
        );
    }

    #[test]
    fn test_builtin_and_reflection_types_are_skipped() {
        let schema = schema(vec![
            IntrospectedType::scalar("String"),
            IntrospectedType::object("__Type", vec![scalar_field("name")]),
            IntrospectedType::object("__Schema", vec![scalar_field("types")]),
            IntrospectedType::object("Widget", vec![scalar_field("label")]),
        ]);

        let names: Vec<_> = extract_entities(&schema.types, &schema.type_map())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Widget"]);
    }

    #[test]
    fn test_object_without_field_list_is_skipped() {
        let mut ty = IntrospectedType::object("Ghost", vec![]);
        ty.fields = None;
        let schema = schema(vec![ty]);
        assert!(extract_entities(&schema.types, &schema.type_map()).is_empty());
    }

    #[test]
    fn test_identity_field_is_case_sensitive() {
        let schema = schema(vec![
            IntrospectedType::object("A", vec![scalar_field("_id")]),
            IntrospectedType::object("B", vec![scalar_field("Id")]),
            IntrospectedType::object("C", vec![scalar_field("userId")]),
        ]);

        let entities = extract_entities(&schema.types, &schema.type_map());
        assert!(entities[0].has_identity_field);
        assert!(!entities[1].has_identity_field);
        assert!(!entities[2].has_identity_field);
    }

    #[test]
    fn test_references_are_deduplicated_and_skip_self() {
        let schema = schema(vec![
            IntrospectedType::object(
                "Comment",
                vec![
                    IntrospectedField::new("author", TypeRef::object("Member")),
                    IntrospectedField::new("editor", TypeRef::object("Member")),
                    IntrospectedField::new("parent", TypeRef::object("Comment")),
                    scalar_field("body"),
                ],
            ),
            IntrospectedType::object("Member", vec![scalar_field("handle")]),
        ]);

        let entities = extract_entities(&schema.types, &schema.type_map());
        assert_eq!(entities[0].references, vec!["Member"]);
        assert!(entities[0].referenced_by.is_empty());
    }

    #[test]
    fn test_root_types_never_appear_in_references() {
        let schema = schema(vec![
            IntrospectedType::object(
                "Query",
                vec![IntrospectedField::new("viewer", TypeRef::object("Member"))],
            ),
            IntrospectedType::object(
                "Member",
                vec![
                    scalar_field("handle"),
                    IntrospectedField::new("root", TypeRef::object("Query")),
                ],
            ),
        ]);

        let entities = extract_entities(&schema.types, &schema.type_map());
        assert!(entities[0].is_root());
        assert!(entities[0].references.is_empty());
        assert!(entities[1].references.is_empty());
    }

    #[test]
    fn test_collection_and_root_traits_come_from_type_name() {
        let schema = schema(vec![
            IntrospectedType::object("PostConnection", vec![scalar_field("cursor")]),
            IntrospectedType::object("Query", vec![scalar_field("ping")]),
            IntrospectedType::object("QueryLog", vec![scalar_field("ping")]),
        ]);

        let entities = extract_entities(&schema.types, &schema.type_map());
        assert!(entities[0].characteristics.collection);
        assert!(entities[1].characteristics.root_type);
        assert!(!entities[2].characteristics.root_type);
    }

    #[test]
    fn test_labels_follow_declaration_order() {
        let characteristics = EntityCharacteristics {
            volatile: true,
            sensitive: true,
            root_type: true,
            ..Default::default()
        };
        assert_eq!(characteristics.labels(), vec!["volatile", "sensitive", "root"]);
    }
}
