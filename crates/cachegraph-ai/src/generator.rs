use cachegraph_core::{
    analyze_schema, generate_heuristic_config, AnalyzedSchema, CacheConfig, GenerationSettings,
};
use cachegraph_introspection::IntrospectionClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::converter::convert_to_config;
use crate::error::{GenerationError, Result};
use crate::llm_provider::{GenerationConfig, LLMProvider};
use crate::prompt::build_messages;
use crate::response::{parse_ai_response, AiCacheResponse};

/// Outcome of one generation attempt. Failures are carried in `error`, never
/// raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CacheConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<AiCacheResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    fn succeeded(config: CacheConfig, ai_response: Option<AiCacheResponse>) -> Self {
        Self {
            success: true,
            config: Some(config),
            ai_response,
            error: None,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            config: None,
            ai_response: None,
            error: Some(error.to_string()),
        }
    }
}

pub struct CacheConfigGenerator {
    settings: GenerationSettings,
    generation: GenerationConfig,
}

impl CacheConfigGenerator {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            settings,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn generate_heuristic(&self, schema: &AnalyzedSchema) -> GenerationResult {
        let config =
            generate_heuristic_config(schema, &self.settings.name, self.settings.defaults);
        info!(rules = config.rules.len(), "Generated heuristic cache config");
        GenerationResult::succeeded(config, None)
    }

    /// Ask `provider` for rules. Exactly one request is made; a failed call
    /// or an unusable reply fails the attempt.
    pub async fn generate_with_ai(
        &self,
        schema: &AnalyzedSchema,
        provider: &dyn LLMProvider,
    ) -> GenerationResult {
        match self.try_generate_with_ai(schema, provider).await {
            Ok((config, ai_response)) => {
                info!(
                    provider = provider.provider_name(),
                    rules = config.rules.len(),
                    confidence = ai_response.confidence,
                    "Generated AI cache config"
                );
                GenerationResult::succeeded(config, Some(ai_response))
            }
            Err(e) => {
                warn!(provider = provider.provider_name(), "AI generation failed: {}", e);
                GenerationResult::failed(e)
            }
        }
    }

    async fn try_generate_with_ai(
        &self,
        schema: &AnalyzedSchema,
        provider: &dyn LLMProvider,
    ) -> Result<(CacheConfig, AiCacheResponse)> {
        let messages = build_messages(schema);
        let response = provider
            .generate_chat(&messages, &self.generation)
            .await
            .map_err(|e| GenerationError::ProviderCall(format!("{:#}", e)))?;

        let mut ai_response = parse_ai_response(&response.content)?;
        let unknown = unknown_type_warnings(&ai_response, schema);
        ai_response.warnings.extend(unknown);

        let config = convert_to_config(&ai_response, &self.settings.name, self.settings.defaults);
        Ok((config, ai_response))
    }
}

/// Warnings for rule types that are not entities of the analyzed schema.
fn unknown_type_warnings(response: &AiCacheResponse, schema: &AnalyzedSchema) -> Vec<String> {
    let mut unknown: Vec<&str> = Vec::new();
    for type_name in response.rules.iter().flat_map(|r| r.types.iter()) {
        if schema.entity(type_name).is_none() && !unknown.contains(&type_name.as_str()) {
            unknown.push(type_name);
        }
    }
    unknown
        .into_iter()
        .map(|t| format!("Rule references unknown type '{}'", t))
        .collect()
}

/// Introspect `endpoint`, analyze the schema and generate a config, with the
/// AI path when a provider is given and the heuristic path otherwise.
pub async fn analyze_and_generate(
    client: &IntrospectionClient,
    endpoint: &str,
    cancel: &CancellationToken,
    generator: &CacheConfigGenerator,
    provider: Option<&dyn LLMProvider>,
) -> GenerationResult {
    let schema = match fetch_and_analyze(client, endpoint, cancel).await {
        Ok(schema) => schema,
        Err(e) => {
            warn!("Could not analyze {}: {}", endpoint, e);
            return GenerationResult::failed(e);
        }
    };

    match provider {
        Some(provider) => generator.generate_with_ai(&schema, provider).await,
        None => generator.generate_heuristic(&schema),
    }
}

async fn fetch_and_analyze(
    client: &IntrospectionClient,
    endpoint: &str,
    cancel: &CancellationToken,
) -> Result<AnalyzedSchema> {
    let schema = client.fetch_schema(endpoint, cancel).await?;
    Ok(analyze_schema(&schema)?)
}
