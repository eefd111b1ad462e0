use crate::llm_provider::*;
use crate::providers::{AuthStyle, ProviderKind, ProviderSpec};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for a cloud LLM provider
#[derive(Debug, Clone)]
pub struct CloudProviderConfig {
    pub kind: ProviderKind,
    /// API key for the provider
    pub api_key: String,
    /// Model to use, provider default when unset
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Replaces the provider URL, for proxies and tests
    pub endpoint_override: Option<String>,
}

impl CloudProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: None,
            timeout_secs: 120,
            endpoint_override: None,
        }
    }
}

/// An LLM provider driven by a [`ProviderSpec`]. Each call is a single
/// request; failures are returned immediately without retrying.
pub struct CloudProvider {
    spec: &'static ProviderSpec,
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

impl CloudProvider {
    pub fn new(config: CloudProviderConfig) -> Result<Self> {
        let spec = config.kind.spec();
        if config.api_key.trim().is_empty() {
            return Err(anyhow!(
                "{} API key is required. Set {} environment variable.",
                spec.name,
                spec.env_key
            ));
        }

        let model = config
            .model
            .unwrap_or_else(|| spec.default_model.to_string());
        let endpoint = config
            .endpoint_override
            .unwrap_or_else(|| spec.url(&model));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            spec,
            api_key: config.api_key,
            model,
            endpoint,
            client,
        })
    }

    async fn send_request(&self, body: &Value) -> Result<Value> {
        let mut request = self.client.post(&self.endpoint).json(body);

        request = match self.spec.auth {
            AuthStyle::Header { name, prefix } => {
                request.header(name, format!("{}{}", prefix, self.api_key))
            }
            AuthStyle::QueryParam { name } => request.query(&[(name, self.api_key.as_str())]),
        };
        for (name, value) in self.spec.extra_headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.spec.name))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(anyhow!(
                "{} API error ({}): {}",
                self.spec.name,
                status,
                error_text
            ));
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.spec.name))
    }
}

#[async_trait]
impl LLMProvider for CloudProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let start = Instant::now();
        info!(
            provider = self.spec.name,
            model = %self.model,
            "Sending LLM request"
        );

        let body = (self.spec.build_body)(&self.model, messages, config);
        let response = self.send_request(&body).await.inspect_err(|e| {
            warn!(provider = self.spec.name, "LLM request failed: {:#}", e);
        })?;

        let content = (self.spec.extract_text)(&response).ok_or_else(|| {
            anyhow!(
                "{} API response contained no text content",
                self.spec.name
            )
        })?;

        debug!(
            provider = self.spec.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "LLM request completed"
        );

        Ok(LLMResponse {
            content,
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &str {
        self.spec.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation_requires_api_key() {
        let config = CloudProviderConfig::new(ProviderKind::Anthropic, "  ");
        let err = CloudProvider::new(config).err().unwrap();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_default_model_and_endpoint() {
        let provider =
            CloudProvider::new(CloudProviderConfig::new(ProviderKind::Google, "key")).unwrap();
        assert_eq!(provider.provider_name(), "google");
        assert_eq!(provider.model_name(), "gemini-1.5-pro");
        assert!(provider.endpoint.contains("models/gemini-1.5-pro:generateContent"));
    }

    #[test]
    fn test_model_override() {
        let mut config = CloudProviderConfig::new(ProviderKind::OpenAI, "key");
        config.model = Some("gpt-4o-mini".to_string());
        let provider = CloudProvider::new(config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
        assert_eq!(provider.endpoint, "https://api.openai.com/v1/chat/completions");
    }
}
