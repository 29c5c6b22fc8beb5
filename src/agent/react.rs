//! Reason-and-act agent: alternate model calls and tool calls until the model answers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::FirechatError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::{AgentToolCall, AgentToolResult, GenerationSettings, ModelMessage, Usage};

use super::{Agent, AgentResponse};

/// Agent that lets the model call tools repeatedly before answering.
pub struct ReactAgent {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        settings: GenerationSettings,
        max_iterations: usize,
    ) -> Self {
        Self {
            provider,
            settings,
            max_iterations: max_iterations.max(1),
        }
    }

    async fn run_tool(
        tools: &[Arc<dyn Tool>],
        call: &AgentToolCall,
        turn_id: uuid::Uuid,
    ) -> AgentToolResult {
        let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
            warn!(tool = %call.name, "Tool not found");
            return AgentToolResult {
                tool_call_id: call.id.clone(),
                result: serde_json::json!({"error": format!("Tool '{}' not found", call.name)}),
                is_error: true,
            };
        };

        let ctx = ToolExecutionContext {
            tool_call_id: Some(call.id.clone()),
            turn_id: Some(turn_id),
        };
        match tool.execute(&ToolArguments::new(call.arguments.clone()), &ctx).await {
            Ok(result) => AgentToolResult {
                tool_call_id: call.id.clone(),
                result,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                AgentToolResult {
                    tool_call_id: call.id.clone(),
                    result: serde_json::json!({"error": e.to_string()}),
                    is_error: true,
                }
            }
        }
    }
}

#[async_trait]
impl Agent for ReactAgent {
    async fn invoke(
        &self,
        history: &[ModelMessage],
        tools: &[Arc<dyn Tool>],
    ) -> Result<AgentResponse, FirechatError> {
        let tool_defs: Option<Vec<ToolDefinition>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ToolDefinition {
                        name: t.name().to_string(),
                        description: t.description().to_string(),
                        parameters: t.parameters().schema.clone(),
                    })
                    .collect(),
            )
        };

        let turn_id = uuid::Uuid::new_v4();
        let mut messages = history.to_vec();
        let mut total_usage = Usage::default();

        for iteration in 0..self.max_iterations {
            let request = ProviderRequest {
                messages: messages.clone(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(%turn_id, iteration, model = self.provider.model_id(), "calling provider");
            let response = self.provider.generate_text(&request).await?;
            total_usage.merge(&response.usage);

            if response.tool_calls.is_empty() {
                debug!(
                    %turn_id,
                    iterations = iteration + 1,
                    total_tokens = total_usage.total_tokens,
                    "agent finished"
                );
                messages.push(ModelMessage::assistant(response.text));
                return Ok(AgentResponse::from_messages(messages));
            }

            let calls = response.tool_calls;
            messages.push(ModelMessage::assistant_tool_calls(
                response.text,
                calls.clone(),
            ));
            for call in &calls {
                debug!(%turn_id, tool = %call.name, call_id = %call.id, "executing tool");
                let result = Self::run_tool(tools, call, turn_id).await;
                messages.push(ModelMessage::tool_result(
                    result.tool_call_id,
                    result.result,
                    result.is_error,
                ));
            }
        }

        Err(FirechatError::InvalidState(format!(
            "agent stopped after {} tool iterations without a final answer",
            self.max_iterations
        )))
    }
}
