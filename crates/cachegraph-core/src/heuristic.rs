//! Rule generation from entity characteristics alone, without an LLM.

use crate::analyzer::AnalyzedSchema;
use crate::cache_config::{
    invalidation_pattern, CacheConfig, CacheDefaults, CacheRule, CacheScope, InvalidationMap,
};
use crate::entity::EntityCharacteristics;
use crate::operation::Operation;

/// Policy buckets in priority order. An entity lands in the first bucket it
/// qualifies for and in no other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheBucket {
    Sensitive,
    UserSpecific,
    Volatile,
    Stable,
}

impl CacheBucket {
    pub const PRIORITY: [CacheBucket; 4] = [
        CacheBucket::Sensitive,
        CacheBucket::UserSpecific,
        CacheBucket::Volatile,
        CacheBucket::Stable,
    ];

    pub fn classify(characteristics: &EntityCharacteristics) -> Self {
        if characteristics.sensitive {
            CacheBucket::Sensitive
        } else if characteristics.user_specific {
            CacheBucket::UserSpecific
        } else if characteristics.volatile {
            CacheBucket::Volatile
        } else {
            CacheBucket::Stable
        }
    }

    pub fn rule(self, types: Vec<String>) -> CacheRule {
        match self {
            CacheBucket::Sensitive => CacheRule::new(types, 60).scope(CacheScope::Private),
            CacheBucket::UserSpecific => CacheRule::new(types, 300)
                .stale_while_revalidate(60)
                .scope(CacheScope::Private),
            CacheBucket::Volatile => CacheRule::new(types, 60).stale_while_revalidate(30),
            CacheBucket::Stable => CacheRule::new(types, 900)
                .stale_while_revalidate(300)
                .stale_if_error(3600),
        }
    }
}

/// Bucket every non-root entity and emit one rule per non-empty bucket, plus
/// wildcard invalidations for each mutation with inferred effects.
pub fn generate_heuristic_config(
    schema: &AnalyzedSchema,
    name: &str,
    defaults: CacheDefaults,
) -> CacheConfig {
    let mut config = CacheConfig::new(name, defaults);

    let mut buckets: [Vec<String>; 4] = Default::default();
    for entity in schema.domain_entities() {
        let bucket = CacheBucket::classify(&entity.characteristics);
        buckets[bucket as usize].push(entity.name.clone());
    }

    for bucket in CacheBucket::PRIORITY {
        let types = std::mem::take(&mut buckets[bucket as usize]);
        if !types.is_empty() {
            config.rules.push(bucket.rule(types));
        }
    }

    config.invalidations = build_invalidations(&schema.mutations);
    config
}

pub fn build_invalidations(mutations: &[Operation]) -> InvalidationMap {
    mutations
        .iter()
        .filter(|m| !m.affected_types.is_empty())
        .map(|m| {
            let patterns = m
                .affected_types
                .iter()
                .map(|t| invalidation_pattern(t))
                .collect();
            (m.name.clone(), patterns)
        })
        .collect()
}
