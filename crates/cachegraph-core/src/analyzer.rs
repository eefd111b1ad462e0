use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{extract_entities, Entity};
use crate::error::{AnalysisError, Result};
use crate::introspection::{IntrospectedType, IntrospectionSchema, RootTypeRef, TypeMap};
use crate::operation::{extract_operations, Operation, OperationKind};
use crate::relationship::{build_relationships, with_referenced_by, TypeRelationship};

/// Everything derived from one introspected schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedSchema {
    pub entities: Vec<Entity>,
    pub queries: Vec<Operation>,
    pub mutations: Vec<Operation>,
    pub relationships: Vec<TypeRelationship>,
    /// Raw types by name, for consumers that need to re-resolve a reference.
    pub types: TypeMap,
}

impl AnalyzedSchema {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Entities other than the Query/Mutation/Subscription roots.
    pub fn domain_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.is_root())
    }

    pub fn mutation(&self, name: &str) -> Option<&Operation> {
        self.mutations.iter().find(|m| m.name == name)
    }
}

/// Analyze an introspected schema in a single forward pass.
///
/// Fails when a root type named by the schema is missing from the type list
/// or is not an OBJECT; there is no partial result.
pub fn analyze_schema(schema: &IntrospectionSchema) -> Result<AnalyzedSchema> {
    let types = schema.type_map();

    // Validate every declared root up front, subscription included.
    let query_root = root_type(schema.query_type.as_ref(), &types, "query")?;
    let mutation_root = root_type(schema.mutation_type.as_ref(), &types, "mutation")?;
    root_type(schema.subscription_type.as_ref(), &types, "subscription")?;

    let entities = extract_entities(&schema.types, &types);
    let queries = extract_operations(query_root, &types, OperationKind::Query);
    let mutations = extract_operations(mutation_root, &types, OperationKind::Mutation);
    let relationships = build_relationships(&entities);
    let entities = with_referenced_by(entities, &relationships);

    debug!(
        entities = entities.len(),
        queries = queries.len(),
        mutations = mutations.len(),
        relationships = relationships.len(),
        "Analyzed GraphQL schema"
    );

    Ok(AnalyzedSchema {
        entities,
        queries,
        mutations,
        relationships,
        types,
    })
}

fn root_type<'a>(
    root: Option<&RootTypeRef>,
    types: &'a TypeMap,
    role: &'static str,
) -> Result<Option<&'a IntrospectedType>> {
    let Some(root) = root else {
        return Ok(None);
    };

    let ty = types
        .get(&root.name)
        .ok_or_else(|| AnalysisError::MissingRootType {
            role,
            name: root.name.clone(),
        })?;

    if !ty.is_object() {
        return Err(AnalysisError::InvalidRootType {
            role,
            name: root.name.clone(),
            kind: ty.kind,
        });
    }

    Ok(Some(ty))
}
