//! Shared test helpers: mock provider, scripted agent, and config builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use firechat::agent::{Agent, AgentResponse};
use firechat::config::{ConfigOverrides, FirechatConfig, SettingsFile};
use firechat::error::FirechatError;
use firechat::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use firechat::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};
use firechat::types::*;

/// A mock provider that returns canned responses.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<ProviderResponse>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        });
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        });
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, FirechatError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            });
        }
        Ok(responses.remove(0))
    }
}

/// An agent that replays scripted outcomes and records the history it was given.
#[derive(Default)]
pub struct MockAgent {
    outcomes: Mutex<VecDeque<Result<serde_json::Value, String>>>,
    pub seen: Mutex<Vec<Vec<ModelMessage>>>,
}

impl MockAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, value: serde_json::Value) -> Arc<Self> {
        self.outcomes.lock().unwrap().push_back(Ok(value));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>, message: &str) -> Arc<Self> {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        Arc::clone(self)
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn invoke(
        &self,
        history: &[ModelMessage],
        _tools: &[Arc<dyn Tool>],
    ) -> Result<AgentResponse, FirechatError> {
        self.seen.lock().unwrap().push(history.to_vec());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(AgentResponse::from_value(value)),
            Some(Err(message)) => Err(FirechatError::api(500, message)),
            None => Ok(AgentResponse::from_value(
                serde_json::json!({"output": "Mock response"}),
            )),
        }
    }
}

/// A tool that answers with a fixed value and records every call it receives.
pub struct RecordingTool {
    name: String,
    parameters: AgentToolParameters,
    reply: serde_json::Value,
    pub calls: Mutex<Vec<(serde_json::Value, ToolExecutionContext)>>,
}

impl RecordingTool {
    pub fn new(name: &str, parameters: AgentToolParameters, reply: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            parameters,
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "recording test tool"
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FirechatError> {
        self.calls
            .lock()
            .unwrap()
            .push((args.raw().clone(), ctx.clone()));
        Ok(self.reply.clone())
    }
}

/// Build a config from explicit env pairs, without touching the process environment.
pub fn config_with(pairs: &[(&str, &str)], overrides: &ConfigOverrides) -> FirechatConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    FirechatConfig::from_sources(
        SettingsFile::default(),
        |key: &str| env.get(key).cloned(),
        overrides,
    )
    .expect("test config should resolve")
}

/// Split captured writer output into text.
pub fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("output should be UTF-8")
}
