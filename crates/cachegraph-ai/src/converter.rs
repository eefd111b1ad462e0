use cachegraph_core::{CacheConfig, CacheDefaults, CacheRule};

use crate::response::AiCacheResponse;

/// Turn a parsed AI reply into the output document. Rules without any type
/// are dropped; the reasoning text is not carried over.
pub fn convert_to_config(
    response: &AiCacheResponse,
    name: &str,
    defaults: CacheDefaults,
) -> CacheConfig {
    let mut config = CacheConfig::new(name, defaults);

    config.rules = response
        .rules
        .iter()
        .filter(|rule| !rule.types.is_empty())
        .map(|rule| CacheRule {
            types: rule.types.clone(),
            max_age: rule.max_age,
            stale_while_revalidate: rule.stale_while_revalidate,
            stale_if_error: rule.stale_if_error,
            scope: rule.scope,
            passthrough: rule.passthrough,
        })
        .collect();

    config.invalidations = response.invalidations.clone();
    config
}
