use crate::cloud_provider::{CloudProvider, CloudProviderConfig};
use crate::llm_provider::*;
use crate::providers::ProviderKind;
use anyhow::{anyhow, Result};
use cachegraph_core::LLMConfig;
use std::sync::Arc;

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create a provider, taking the API key from the config or the
    /// provider's environment variable.
    pub fn create_from_config(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let kind = Self::kind_for(&config.provider)?;
        let api_key = config
            .api_key_for(kind.name())
            .map(str::to_string)
            .or_else(|| std::env::var(kind.spec().env_key).ok())
            .ok_or_else(|| {
                anyhow!(
                    "{} API key not found. Set '{}_api_key' in config or {} environment variable",
                    kind.name(),
                    kind.name(),
                    kind.spec().env_key
                )
            })?;

        Self::create(config, &api_key)
    }

    /// Create a provider with an already resolved API key (e.g. from the
    /// credential store).
    pub fn create(config: &LLMConfig, api_key: &str) -> Result<Arc<dyn LLMProvider>> {
        let kind = Self::kind_for(&config.provider)?;
        let provider = CloudProvider::new(CloudProviderConfig {
            kind,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            endpoint_override: None,
        })?;
        Ok(Arc::new(provider))
    }

    /// Generation parameters taken from the config
    pub fn generation_config(config: &LLMConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Get a list of supported providers
    pub fn supported_providers() -> Vec<&'static str> {
        ProviderKind::ALL.iter().map(|k| k.name()).collect()
    }

    fn kind_for(name: &str) -> Result<ProviderKind> {
        ProviderKind::from_name(name).ok_or_else(|| {
            anyhow!(
                "Unsupported LLM provider: {}. Available providers: {}",
                name,
                Self::supported_providers().join(", ")
            )
        })
    }
}
