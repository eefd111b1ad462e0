//! The cache-rule document consumed by the edge-caching runtime.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CACHE_CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    Public,
    Private,
}

impl CacheScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// A shared policy for one or more entity types. Durations are seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRule {
    pub types: Vec<String>,
    pub max_age: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_while_revalidate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_if_error: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<CacheScope>,
    /// Never cache matching responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<bool>,
}

impl CacheRule {
    pub fn new(types: Vec<String>, max_age: u64) -> Self {
        Self {
            types,
            max_age,
            stale_while_revalidate: None,
            stale_if_error: None,
            scope: None,
            passthrough: None,
        }
    }

    pub fn stale_while_revalidate(mut self, seconds: u64) -> Self {
        self.stale_while_revalidate = Some(seconds);
        self
    }

    pub fn stale_if_error(mut self, seconds: u64) -> Self {
        self.stale_if_error = Some(seconds);
        self
    }

    pub fn scope(mut self, scope: CacheScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDefaults {
    pub max_age: u64,
    pub stale_while_revalidate: u64,
    pub stale_if_error: u64,
}

impl Default for CacheDefaults {
    fn default() -> Self {
        Self {
            max_age: 300,
            stale_while_revalidate: 60,
            stale_if_error: 86_400,
        }
    }
}

/// Mutation name to the cache-key patterns it invalidates.
pub type InvalidationMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    pub version: String,
    pub name: String,
    pub defaults: CacheDefaults,
    pub rules: Vec<CacheRule>,
    pub invalidations: InvalidationMap,
}

impl CacheConfig {
    pub fn new(name: impl Into<String>, defaults: CacheDefaults) -> Self {
        Self {
            version: CACHE_CONFIG_VERSION.to_string(),
            name: name.into(),
            defaults,
            rules: Vec::new(),
            invalidations: InvalidationMap::new(),
        }
    }

    /// The rule covering `type_name`, if any.
    pub fn rule_for(&self, type_name: &str) -> Option<&CacheRule> {
        self.rules
            .iter()
            .find(|rule| rule.types.iter().any(|t| t == type_name))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wildcard pattern invalidating every cached entry of a type.
pub fn invalidation_pattern(type_name: &str) -> String {
    format!("{}:*", type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_shape() {
        let mut config = CacheConfig::new("shop", CacheDefaults::default());
        config.rules.push(
            CacheRule::new(vec!["Cart".to_string()], 60).scope(CacheScope::Private),
        );
        config
            .invalidations
            .insert("addToCart".to_string(), vec![invalidation_pattern("Cart")]);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "name": "shop",
                "defaults": { "maxAge": 300, "staleWhileRevalidate": 60, "staleIfError": 86400 },
                "rules": [{ "types": ["Cart"], "maxAge": 60, "scope": "private" }],
                "invalidations": { "addToCart": ["Cart:*"] }
            })
        );
    }

    #[test]
    fn test_invalidations_keep_insertion_order() {
        let mut config = CacheConfig::new("order", CacheDefaults::default());
        for name in ["zeta", "alpha", "mid"] {
            config.invalidations.insert(name.to_string(), vec![]);
        }
        let json = config.to_json_pretty().unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        let mid = json.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_rule_for() {
        let mut config = CacheConfig::new("x", CacheDefaults::default());
        config.rules.push(CacheRule::new(
            vec!["A".to_string(), "B".to_string()],
            10,
        ));
        assert_eq!(config.rule_for("B").map(|r| r.max_age), Some(10));
        assert!(config.rule_for("C").is_none());
    }
}
