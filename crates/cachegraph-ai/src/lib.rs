pub mod cloud_provider;
pub mod converter;
pub mod error;
pub mod generator;
pub mod llm_factory;
pub mod llm_provider;
pub mod prompt;
pub mod providers;
pub mod response;

pub use cloud_provider::{CloudProvider, CloudProviderConfig};
pub use converter::convert_to_config;
pub use error::GenerationError;
pub use generator::{analyze_and_generate, CacheConfigGenerator, GenerationResult};
pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use providers::{AuthStyle, ProviderKind, ProviderSpec};
pub use response::{parse_ai_response, strip_code_fences, AiCacheResponse, AiCacheRule};
