//! Tool-server session: launch, handshake, tool discovery, shutdown.

use std::sync::Arc;

use crate::config::McpServerConfig;
use crate::error::FirechatError;
use crate::mcp::{MCPClient, MCPToolAdapter, MCPTransport, StdioTransport};
use crate::tools::{DynamicToolAdapter, Tool};

/// A connected MCP tool server and the tools it offers.
///
/// The child process is terminated by [`Session::close`], or when the session is dropped.
pub struct Session {
    adapter: Arc<MCPToolAdapter>,
    tools: Vec<Arc<dyn Tool>>,
}

impl Session {
    /// Launch the configured server and load its tools.
    pub async fn bootstrap(config: &McpServerConfig) -> Result<Self, FirechatError> {
        tracing::debug!(command = %config.display_command(), "bootstrapping MCP session");
        Self::connect(Box::new(StdioTransport::from_config(config))).await
    }

    /// Same as [`Session::bootstrap`] over an arbitrary transport.
    pub async fn connect(transport: Box<dyn MCPTransport>) -> Result<Self, FirechatError> {
        let adapter = Arc::new(MCPToolAdapter::new(MCPClient::new(transport)));
        adapter.connect().await?;

        let tools = match DynamicToolAdapter::load_all(adapter.clone()).await {
            Ok(tools) => tools,
            Err(e) => {
                if let Err(close_err) = adapter.close().await {
                    tracing::debug!(error = %close_err, "closing after failed tool listing");
                }
                return Err(e);
            }
        };
        tracing::debug!(tools = tools.len(), "MCP tools loaded");

        Ok(Self { adapter, tools })
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Tool names in the order the server listed them.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Shut down the server process. Tools handed out earlier stop working.
    pub async fn close(self) -> Result<(), FirechatError> {
        self.adapter.close().await
    }
}
