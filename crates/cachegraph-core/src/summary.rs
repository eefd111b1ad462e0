//! Plain-text rendering of an [`AnalyzedSchema`].
//!
//! The output is shown to users and sent verbatim as LLM prompt context, so
//! it must depend on nothing but the input.

use crate::analyzer::AnalyzedSchema;
use crate::entity::Entity;
use crate::operation::Operation;

pub fn render_summary(schema: &AnalyzedSchema) -> String {
    let mut lines: Vec<String> = vec!["# GraphQL Schema Analysis".to_string(), String::new()];

    lines.push("## Entities".to_string());
    lines.push(String::new());
    for entity in schema.domain_entities() {
        render_entity(entity, &mut lines);
    }

    lines.push("## Queries".to_string());
    lines.push(String::new());
    for query in &schema.queries {
        lines.push(format!("- {}", operation_signature(query)));
    }
    lines.push(String::new());

    if !schema.mutations.is_empty() {
        lines.push("## Mutations".to_string());
        lines.push(String::new());
        for mutation in &schema.mutations {
            lines.push(format!("- {}", operation_signature(mutation)));
            if !mutation.affected_types.is_empty() {
                lines.push(format!("  Affects: {}", mutation.affected_types.join(", ")));
            }
        }
        lines.push(String::new());
    }

    if !schema.relationships.is_empty() {
        lines.push("## Relationships".to_string());
        lines.push(String::new());
        for rel in &schema.relationships {
            let arrow = if rel.is_list { "->>" } else { "->" };
            lines.push(format!(
                "- {} {} {} (via {})",
                rel.from, arrow, rel.to, rel.field_name
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_entity(entity: &Entity, lines: &mut Vec<String>) {
    lines.push(format!("### {}", entity.name));
    if let Some(description) = &entity.description {
        lines.push(format!("Description: {}", description));
    }
    lines.push(format!(
        "Has ID: {}",
        if entity.has_identity_field { "yes" } else { "no" }
    ));

    let field_names: Vec<&str> = entity.fields.iter().map(|f| f.name.as_str()).collect();
    lines.push(format!("Fields: {}", field_names.join(", ")));

    if !entity.references.is_empty() {
        lines.push(format!("References: {}", entity.references.join(", ")));
    }
    if !entity.referenced_by.is_empty() {
        lines.push(format!("Referenced by: {}", entity.referenced_by.join(", ")));
    }

    let labels = entity.characteristics.labels();
    if !labels.is_empty() {
        lines.push(format!("Characteristics: {}", labels.join(", ")));
    }
    lines.push(String::new());
}

fn operation_signature(op: &Operation) -> String {
    let args: Vec<String> = op
        .arguments
        .iter()
        .map(|arg| {
            let mut ty = arg.type_name.clone();
            if arg.is_list {
                ty = format!("[{}]", ty);
            }
            if arg.is_required {
                ty.push('!');
            }
            format!("{}: {}", arg.name, ty)
        })
        .collect();

    let return_type = if op.returns_list {
        format!("[{}]", op.return_type)
    } else {
        op.return_type.clone()
    };

    format!("{}({}): {}", op.name, args.join(", "), return_type)
}
