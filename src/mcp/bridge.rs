//! Bridge MCP tools into the agent's tool system.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::FirechatError;
use crate::tools::arguments::ToolArguments;
use crate::tools::dynamic::{DynamicTool, DynamicToolProvider};
use crate::tools::tool::ToolExecutionContext;
use crate::tools::types::AgentToolParameters;

use super::client::{MCPClient, MCPToolCallResult};
use super::schema::MCPToolSchema;

#[async_trait]
trait MCPClientOps: Send {
    async fn initialize(&mut self) -> Result<(), FirechatError>;
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, FirechatError>;
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, FirechatError>;
    async fn close(&mut self) -> Result<(), FirechatError>;
}

#[async_trait]
impl MCPClientOps for MCPClient {
    async fn initialize(&mut self) -> Result<(), FirechatError> {
        MCPClient::initialize(self).await
    }

    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, FirechatError> {
        MCPClient::list_tools(self).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, FirechatError> {
        MCPClient::call_tool(self, name, arguments).await
    }

    async fn close(&mut self) -> Result<(), FirechatError> {
        MCPClient::close(self).await
    }
}

/// Adapts an MCP client to the DynamicToolProvider trait.
///
/// Calls are serialized through one lock; the server sees one request at a time.
pub struct MCPToolAdapter {
    client: Mutex<Box<dyn MCPClientOps>>,
}

impl MCPToolAdapter {
    pub fn new(client: MCPClient) -> Self {
        Self {
            client: Mutex::new(Box::new(client)),
        }
    }

    #[cfg(test)]
    fn from_client_ops(client: Box<dyn MCPClientOps>) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Launch and handshake if that has not happened yet.
    pub async fn connect(&self) -> Result<(), FirechatError> {
        self.client.lock().await.initialize().await
    }

    /// Terminate the session and the server process.
    pub async fn close(&self) -> Result<(), FirechatError> {
        self.client.lock().await.close().await
    }
}

#[async_trait]
impl DynamicToolProvider for MCPToolAdapter {
    async fn list_tools(&self) -> Result<Vec<DynamicTool>, FirechatError> {
        let mut client = self.client.lock().await;
        client.initialize().await?;
        let tools = client.list_tools().await?;
        Ok(tools.into_iter().map(map_mcp_tool_to_dynamic).collect())
    }

    async fn execute_tool(
        &self,
        name: &str,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FirechatError> {
        tracing::debug!(tool = name, call_id = ?ctx.tool_call_id, "calling MCP tool");
        let mut client = self.client.lock().await;
        client.initialize().await?;
        let result = client.call_tool(name, args.raw().clone()).await?;
        Ok(result.into_value_or_text())
    }
}

fn map_mcp_tool_to_dynamic(tool: MCPToolSchema) -> DynamicTool {
    DynamicTool {
        name: tool.name,
        description: tool.description.unwrap_or_default(),
        parameters: AgentToolParameters::from_schema(tool.input_schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;

    use crate::mcp::transport::{MCPRunningService, MCPTransport};
    use crate::tools::dynamic::DynamicToolAdapter;

    struct RefusingTransport;

    #[async_trait]
    impl MCPTransport for RefusingTransport {
        async fn connect(
            &mut self,
            _client_info: rmcp::model::ClientInfo,
        ) -> Result<MCPRunningService, FirechatError> {
            Err(FirechatError::Handshake("connection closed during initialize".into()))
        }

        fn describe(&self) -> String {
            "refusing".into()
        }
    }

    struct MockClientOps {
        initialize_error: Option<String>,
        list_tools_result: Result<Vec<MCPToolSchema>, String>,
        call_tool_results: VecDeque<Result<MCPToolCallResult, FirechatError>>,
        closed: bool,
    }

    impl MockClientOps {
        fn with_tools(tools: Vec<MCPToolSchema>) -> Self {
            Self {
                initialize_error: None,
                list_tools_result: Ok(tools),
                call_tool_results: VecDeque::new(),
                closed: false,
            }
        }
    }

    #[async_trait]
    impl MCPClientOps for MockClientOps {
        async fn initialize(&mut self) -> Result<(), FirechatError> {
            if self.closed {
                return Err(FirechatError::Stream("MCP session is closed".into()));
            }
            match &self.initialize_error {
                Some(message) => Err(FirechatError::Handshake(message.clone())),
                None => Ok(()),
            }
        }

        async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, FirechatError> {
            match &self.list_tools_result {
                Ok(tools) => Ok(tools.clone()),
                Err(message) => Err(FirechatError::Provider {
                    provider: "mcp".into(),
                    message: message.clone(),
                }),
            }
        }

        async fn call_tool(
            &mut self,
            _name: &str,
            _arguments: serde_json::Value,
        ) -> Result<MCPToolCallResult, FirechatError> {
            self.call_tool_results.pop_front().unwrap_or_else(|| {
                Err(FirechatError::Stream("missing mock call_tool result".into()))
            })
        }

        async fn close(&mut self) -> Result<(), FirechatError> {
            self.closed = true;
            Ok(())
        }
    }

    fn scrape_schema() -> MCPToolSchema {
        MCPToolSchema {
            name: "firecrawl_scrape".into(),
            description: Some("Scrape a single URL".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string" }
                },
                "required": ["url"]
            }),
        }
    }

    #[test]
    fn map_mcp_tool_to_dynamic_preserves_schema() {
        let dynamic = map_mcp_tool_to_dynamic(scrape_schema());

        assert_eq!(dynamic.name, "firecrawl_scrape");
        assert_eq!(dynamic.description, "Scrape a single URL");
        assert_eq!(dynamic.parameters.schema["type"], "object");
        assert_eq!(dynamic.parameters.schema["required"][0], "url");
    }

    #[test]
    fn missing_description_maps_to_empty_string() {
        let dynamic = map_mcp_tool_to_dynamic(MCPToolSchema {
            name: "firecrawl_map".into(),
            description: None,
            input_schema: json!({"type": "object"}),
        });
        assert_eq!(dynamic.description, "");
    }

    #[tokio::test]
    async fn list_tools_surfaces_handshake_failure() {
        let adapter = MCPToolAdapter::new(MCPClient::new(Box::new(RefusingTransport)));
        let err = adapter
            .list_tools()
            .await
            .expect_err("handshake failure should propagate");
        assert!(matches!(err, FirechatError::Handshake(_)));
    }

    #[tokio::test]
    async fn list_tools_error_propagates() {
        let mut ops = MockClientOps::with_tools(Vec::new());
        ops.list_tools_result = Err("tools/list failed".into());
        let adapter = MCPToolAdapter::from_client_ops(Box::new(ops));

        let err = adapter.list_tools().await.expect_err("listing should fail");
        assert!(matches!(
            err,
            FirechatError::Provider { message, .. } if message == "tools/list failed"
        ));
    }

    #[tokio::test]
    async fn execute_tool_returns_text_content() {
        let mut ops = MockClientOps::with_tools(vec![scrape_schema()]);
        ops.call_tool_results.push_back(Ok(MCPToolCallResult {
            structured_content: None,
            text_content: Some("# Example Domain".into()),
            content: Vec::new(),
        }));
        let adapter = Arc::new(MCPToolAdapter::from_client_ops(Box::new(ops)));

        let tools = DynamicToolAdapter::load_all(adapter.clone())
            .await
            .expect("tools should load");
        assert_eq!(tools.len(), 1);

        let value = tools[0]
            .execute(
                &ToolArguments::new(json!({"url": "https://example.com"})),
                &ToolExecutionContext::default(),
            )
            .await
            .expect("call should succeed");
        assert_eq!(value, json!("# Example Domain"));
    }

    #[tokio::test]
    async fn execute_tool_propagates_tool_error_without_panic() {
        let mut ops = MockClientOps::with_tools(Vec::new());
        ops.call_tool_results.push_back(Err(FirechatError::ToolExecution {
            tool_name: "firecrawl_scrape".into(),
            message: "downstream tool failure".into(),
        }));
        let adapter = MCPToolAdapter::from_client_ops(Box::new(ops));

        let err = adapter
            .execute_tool(
                "firecrawl_scrape",
                &ToolArguments::new(json!({"url":"https://example.com"})),
                &ToolExecutionContext::default(),
            )
            .await
            .expect_err("tool errors should be propagated");

        assert!(matches!(
            err,
            FirechatError::ToolExecution { tool_name, message }
            if tool_name == "firecrawl_scrape" && message.contains("downstream tool failure")
        ));
    }

    #[tokio::test]
    async fn calls_after_close_fail() {
        let adapter = MCPToolAdapter::from_client_ops(Box::new(MockClientOps::with_tools(vec![
            scrape_schema(),
        ])));
        adapter.close().await.expect("close should succeed");

        let err = adapter
            .list_tools()
            .await
            .expect_err("closed session should refuse");
        assert!(matches!(err, FirechatError::Stream(_)));
    }
}
