//! Parsing of the model's JSON reply.
//!
//! The overall shape is enforced (an object with a `rules` array); individual
//! rule fields are repaired with defaults instead of rejected.

use cachegraph_core::{CacheScope, InvalidationMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GenerationError, Result};

pub const DEFAULT_RULE_MAX_AGE: u64 = 300;
pub const MISSING_REASONING: &str = "No reasoning provided";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCacheRule {
    pub types: Vec<String>,
    pub max_age: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_while_revalidate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_if_error: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<CacheScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<bool>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCacheResponse {
    pub rules: Vec<AiCacheRule>,
    pub invalidations: InvalidationMap,
    pub explanation: String,
    /// Between 0 and 1.
    pub confidence: f64,
    pub warnings: Vec<String>,
}

/// Return the contents of the first fenced code block, or the trimmed text
/// when there is none.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_fence = &trimmed[start + 3..];
    let first_line_end = after_fence.find('\n').unwrap_or(after_fence.len());
    let info_string = after_fence[..first_line_end].trim();
    let body = if info_string.chars().all(|c| c.is_ascii_alphanumeric()) {
        after_fence.get(first_line_end + 1..).unwrap_or("")
    } else {
        after_fence
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

pub fn parse_ai_response(text: &str) -> Result<AiCacheResponse> {
    let json = strip_code_fences(text);
    let value: Value =
        serde_json::from_str(json).map_err(|e| GenerationError::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(GenerationError::MissingRules)?;
    let rules = object
        .get("rules")
        .and_then(Value::as_array)
        .ok_or(GenerationError::MissingRules)?;

    Ok(AiCacheResponse {
        rules: rules
            .iter()
            .filter_map(Value::as_object)
            .map(parse_rule)
            .collect(),
        invalidations: object
            .get("invalidations")
            .and_then(Value::as_object)
            .map(parse_invalidations)
            .unwrap_or_default(),
        explanation: object
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        confidence: object
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
        warnings: object
            .get("warnings")
            .map(string_list)
            .unwrap_or_default(),
    })
}

fn parse_rule(rule: &Map<String, Value>) -> AiCacheRule {
    AiCacheRule {
        types: rule.get("types").map(string_list).unwrap_or_default(),
        max_age: rule
            .get("maxAge")
            .and_then(seconds)
            .unwrap_or(DEFAULT_RULE_MAX_AGE),
        stale_while_revalidate: rule.get("staleWhileRevalidate").and_then(seconds),
        stale_if_error: rule.get("staleIfError").and_then(seconds),
        scope: rule
            .get("scope")
            .and_then(Value::as_str)
            .and_then(|s| CacheScope::parse(&s.to_lowercase())),
        passthrough: rule.get("passthrough").and_then(Value::as_bool),
        reasoning: rule
            .get("reasoning")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(MISSING_REASONING)
            .to_string(),
    }
}

fn parse_invalidations(map: &Map<String, Value>) -> InvalidationMap {
    map.iter()
        .filter(|(_, patterns)| patterns.is_array())
        .map(|(mutation, patterns)| (mutation.clone(), string_list(patterns)))
        .collect()
}

/// Strings from an array, or a lone string as a one-element list.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Non-negative whole seconds; fractional values are rounded.
fn seconds(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}
