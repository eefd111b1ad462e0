//! Data model mirroring the GraphQL introspection result.
//!
//! These types deserialize directly from the `__schema` object returned by
//! the standard introspection query.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name-keyed lookup table of every type in a schema.
pub type TypeMap = IndexMap<String, IntrospectedType>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

/// The `__schema` object of an introspection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    #[serde(default)]
    pub query_type: Option<RootTypeRef>,
    #[serde(default)]
    pub mutation_type: Option<RootTypeRef>,
    #[serde(default)]
    pub subscription_type: Option<RootTypeRef>,
    pub types: Vec<IntrospectedType>,
}

impl IntrospectionSchema {
    /// Parse a bare `__schema` JSON object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the name-keyed lookup table. Later duplicates overwrite earlier ones.
    pub fn type_map(&self) -> TypeMap {
        let mut map = TypeMap::with_capacity(self.types.len());
        for ty in &self.types {
            map.insert(ty.name.clone(), ty.clone());
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` for every kind except OBJECT and INTERFACE.
    #[serde(default)]
    pub fields: Option<Vec<IntrospectedField>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<TypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub possible_types: Option<Vec<TypeRef>>,
}

impl IntrospectedType {
    /// An OBJECT type with the given fields.
    pub fn object(name: impl Into<String>, fields: Vec<IntrospectedField>) -> Self {
        Self {
            kind: TypeKind::Object,
            name: name.into(),
            description: None,
            fields: Some(fields),
            input_fields: None,
            interfaces: Some(Vec::new()),
            enum_values: None,
            possible_types: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Scalar,
            name: name.into(),
            description: None,
            fields: None,
            input_fields: None,
            interfaces: None,
            enum_values: None,
            possible_types: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_object(&self) -> bool {
        self.kind == TypeKind::Object
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

impl IntrospectedField {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            args: Vec::new(),
            type_ref,
            is_deprecated: false,
            deprecation_reason: None,
        }
    }

    pub fn with_args(mut self, args: Vec<InputValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl InputValue {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_ref,
            default_value: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
}

/// A possibly wrapped reference to a named type. LIST and NON_NULL wrappers
/// carry no name and point at their inner reference through `of_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::named(TypeKind::Scalar, name)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::named(TypeKind::Object, name)
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self {
            kind: TypeKind::NonNull,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    pub fn list(inner: TypeRef) -> Self {
        Self {
            kind: TypeKind::List,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }
}
