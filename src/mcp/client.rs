//! MCP client for the tool-provider process.

use rmcp::{
    model::{CallToolRequestParams, CallToolResult, Content, JsonObject, ResourceContents},
    service::ServiceError,
};

use crate::error::FirechatError;

use super::schema::MCPToolSchema;
use super::transport::{MCPRunningService, MCPTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCPConnectionState {
    Disconnected,
    Initialized,
    Closed,
}

#[derive(Debug, Clone)]
pub struct MCPToolCallResult {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl MCPToolCallResult {
    /// Prefer text (what the model reads best), then structured output, then raw content.
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        if let Some(structured) = self.structured_content {
            return structured;
        }
        serde_json::Value::Array(self.content)
    }
}

/// Client for a Model Context Protocol server.
pub struct MCPClient {
    transport: Option<Box<dyn MCPTransport>>,
    session: Option<MCPRunningService>,
    state: MCPConnectionState,
}

impl MCPClient {
    /// Create a new MCP client with the given transport. Nothing is launched until `initialize`.
    pub fn new(transport: Box<dyn MCPTransport>) -> Self {
        Self {
            transport: Some(transport),
            session: None,
            state: MCPConnectionState::Disconnected,
        }
    }

    pub fn connection_state(&self) -> MCPConnectionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == MCPConnectionState::Initialized
    }

    /// Name and version the server reported during the handshake.
    pub fn server_name(&self) -> Option<String> {
        let info = self.session.as_ref()?.peer_info()?;
        Some(format!("{} {}", info.server_info.name, info.server_info.version))
    }

    /// Launch the server (if needed) and perform the initialize handshake. Idempotent.
    pub async fn initialize(&mut self) -> Result<(), FirechatError> {
        match self.state {
            MCPConnectionState::Closed => {
                return Err(FirechatError::Stream("MCP session is closed".into()))
            }
            MCPConnectionState::Initialized => {
                if self.session.as_ref().is_some_and(|s| s.is_closed()) {
                    self.state = MCPConnectionState::Closed;
                    return Err(FirechatError::Stream("MCP session is closed".into()));
                }
                return Ok(());
            }
            MCPConnectionState::Disconnected => {}
        }

        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| FirechatError::Configuration("Missing MCP transport".into()))?;
        let session = transport
            .connect(rmcp::model::ClientInfo::default())
            .await?;
        self.session = Some(session);
        self.state = MCPConnectionState::Initialized;
        tracing::debug!(server = ?self.server_name(), "MCP session initialized");
        Ok(())
    }

    /// List available tools from the MCP server.
    pub async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, FirechatError> {
        let session = self.active_session()?;

        let tools = match session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => {
                session
                    .list_tools(None)
                    .await
                    .map_err(|e| map_service_error("list_tools", e))?
                    .tools
            }
            Err(e) => return Err(map_service_error("list_tools", e)),
        };

        Ok(tools.into_iter().map(map_mcp_tool_schema).collect())
    }

    /// Execute a tool on the MCP server.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, FirechatError> {
        let arguments = coerce_tool_arguments(arguments)?;
        let session = self.active_session()?;

        let result = session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error("call_tool", e))?;

        map_call_result(name, result)
    }

    /// Shut the session down, terminating the child process. Idempotent.
    pub async fn close(&mut self) -> Result<(), FirechatError> {
        self.state = MCPConnectionState::Closed;
        self.transport = None;
        if let Some(session) = self.session.take() {
            session
                .cancel()
                .await
                .map_err(|e| FirechatError::Stream(format!("MCP shutdown failed: {e}")))?;
        }
        Ok(())
    }

    fn active_session(&mut self) -> Result<&mut MCPRunningService, FirechatError> {
        match self.state {
            MCPConnectionState::Initialized => {}
            MCPConnectionState::Closed => {
                return Err(FirechatError::Stream("MCP session is closed".into()))
            }
            MCPConnectionState::Disconnected => {
                return Err(FirechatError::InvalidState(
                    "MCP client must be initialized first".into(),
                ))
            }
        }
        self.session
            .as_mut()
            .ok_or_else(|| FirechatError::Configuration("Missing MCP session".into()))
    }
}

pub(crate) fn map_mcp_tool_schema(tool: rmcp::model::Tool) -> MCPToolSchema {
    MCPToolSchema {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>, FirechatError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                FirechatError::InvalidArgument(format!("MCP tool arguments must be valid JSON: {e}"))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(FirechatError::InvalidArgument(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(
    name: &str,
    result: CallToolResult,
) -> Result<MCPToolCallResult, FirechatError> {
    let text_content = extract_text_content(&result.content);
    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect::<Vec<_>>();

    if result.is_error.unwrap_or(false) {
        let message = text_content
            .clone()
            .or_else(|| result.structured_content.as_ref().map(|v| v.to_string()))
            .unwrap_or_else(|| "MCP tool returned an error result".into());

        return Err(FirechatError::ToolExecution {
            tool_name: name.to_string(),
            message,
        });
    }

    Ok(MCPToolCallResult {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn map_service_error(context: &str, error: ServiceError) -> FirechatError {
    match error {
        ServiceError::McpError(error) => FirechatError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: MCP error {}: {}", error.code.0, error.message),
        },
        ServiceError::TransportSend(error) => {
            FirechatError::Stream(format!("{context}: MCP transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            FirechatError::Stream(format!("{context}: MCP transport closed"))
        }
        ServiceError::UnexpectedResponse => FirechatError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: unexpected MCP response"),
        },
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            FirechatError::Stream(format!("{context}: MCP request cancelled{suffix}"))
        }
        ServiceError::Timeout { timeout } => FirechatError::Timeout(timeout.as_millis() as u64),
        other => FirechatError::Provider {
            provider: "mcp".into(),
            message: format!("{context}: MCP service error: {other}"),
        },
    }
}
