//! Model provider trait and the OpenAI implementation.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::FirechatConfig;
use crate::error::FirechatError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a single (non-streaming) completion.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, FirechatError>;
}

/// Create the chat-completions provider described by `config`.
pub fn create_provider(config: &FirechatConfig) -> Result<Box<dyn ModelProvider>, FirechatError> {
    Ok(Box::new(openai::OpenAiProvider::new(
        config.model.name.clone(),
        config.openai_api_key.clone(),
        Some(config.model.base_url.clone()),
        config.model.request_timeout,
    )?))
}
