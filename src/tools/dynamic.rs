//! Runtime-discovered tools (the MCP server's tool list).

use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::FirechatError;

/// A tool discovered at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicTool {
    pub name: String,
    pub description: String,
    pub parameters: AgentToolParameters,
}

/// Source of tools that are only known once a connection is up.
#[async_trait]
pub trait DynamicToolProvider: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<DynamicTool>, FirechatError>;

    /// Execute a tool by name.
    async fn execute_tool(
        &self,
        name: &str,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FirechatError>;
}

/// Exposes one [`DynamicTool`] through the [`Tool`] trait, routing calls back to its provider.
pub struct DynamicToolAdapter {
    provider: Arc<dyn DynamicToolProvider>,
    tool: DynamicTool,
}

impl DynamicToolAdapter {
    pub fn new(provider: Arc<dyn DynamicToolProvider>, tool: DynamicTool) -> Self {
        Self { provider, tool }
    }

    /// List the provider's tools and wrap each one, preserving the provider's order.
    pub async fn load_all(
        provider: Arc<dyn DynamicToolProvider>,
    ) -> Result<Vec<Arc<dyn Tool>>, FirechatError> {
        let tools = provider.list_tools().await?;
        Ok(tools
            .into_iter()
            .map(|tool| Arc::new(Self::new(Arc::clone(&provider), tool)) as Arc<dyn Tool>)
            .collect())
    }
}

#[async_trait]
impl Tool for DynamicToolAdapter {
    fn name(&self) -> &str {
        &self.tool.name
    }

    fn description(&self) -> &str {
        &self.tool.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.tool.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FirechatError> {
        self.provider.execute_tool(&self.tool.name, args, ctx).await
    }
}
