use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipDirection {
    /// From the declaring entity towards the referenced one.
    Outgoing,
}

/// A field on one entity whose type is another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRelationship {
    pub from: String,
    pub to: String,
    pub field_name: String,
    /// One-to-many when set.
    pub is_list: bool,
    pub direction: RelationshipDirection,
}

/// Collect every entity-to-entity edge.
///
/// Root operation types neither emit nor receive edges, and self references
/// are dropped. Two fields pointing at the same target yield two edges.
pub fn build_relationships(entities: &[Entity]) -> Vec<TypeRelationship> {
    let known: HashSet<&str> = entities
        .iter()
        .filter(|e| !e.is_root())
        .map(|e| e.name.as_str())
        .collect();

    let mut relationships = Vec::new();
    for entity in entities.iter().filter(|e| !e.is_root()) {
        for field in &entity.fields {
            let target = field.field_type.name.as_str();
            if target == entity.name || !known.contains(target) {
                continue;
            }
            relationships.push(TypeRelationship {
                from: entity.name.clone(),
                to: target.to_string(),
                field_name: field.name.clone(),
                is_list: field.field_type.is_list,
                direction: RelationshipDirection::Outgoing,
            });
        }
    }
    relationships
}

/// Return `entities` with `referenced_by` filled from `relationships`, in edge
/// discovery order and without duplicates.
pub fn with_referenced_by(
    mut entities: Vec<Entity>,
    relationships: &[TypeRelationship],
) -> Vec<Entity> {
    for edge in relationships {
        if let Some(target) = entities.iter_mut().find(|e| e.name == edge.to) {
            if !target.referenced_by.contains(&edge.from) {
                target.referenced_by.push(edge.from.clone());
            }
        }
    }
    entities
}
