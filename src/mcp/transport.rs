//! MCP transport layer.

use async_trait::async_trait;
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, DynService, RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;

use crate::config::McpServerConfig;
use crate::error::FirechatError;

pub type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

/// Something that can produce an initialized rmcp client session.
#[async_trait]
pub trait MCPTransport: Send {
    /// Open the channel and complete the `initialize` handshake.
    async fn connect(&mut self, client_info: ClientInfo)
        -> Result<MCPRunningService, FirechatError>;

    /// Short human-readable description of the peer, for logs.
    fn describe(&self) -> String;
}

/// Stdio-based MCP transport: launches the server as a child process.
#[derive(Debug, Clone)]
pub struct StdioTransport {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl StdioTransport {
    /// Create a stdio transport from a server configuration.
    pub fn from_config(config: &McpServerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
        }
    }

    fn build_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }

    fn spawn(&self) -> Result<TokioChildProcess, FirechatError> {
        TokioChildProcess::new(self.build_command()).map_err(|source| FirechatError::Launch {
            command: self.command.clone(),
            source,
        })
    }
}

#[async_trait]
impl MCPTransport for StdioTransport {
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, FirechatError> {
        let transport = self.spawn()?;
        tracing::debug!(command = %self.describe(), "spawned MCP server, starting handshake");
        client_info
            .into_dyn()
            .serve(transport)
            .await
            .map_err(map_client_initialize_error)
    }

    fn describe(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub(crate) fn map_client_initialize_error(error: ClientInitializeError) -> FirechatError {
    match error {
        ClientInitializeError::ConnectionClosed(context) => {
            FirechatError::Handshake(format!("connection closed during {context}"))
        }
        ClientInitializeError::TransportError { error, context } => {
            FirechatError::Handshake(format!("transport error ({context}): {error}"))
        }
        ClientInitializeError::JsonRpcError(error) => FirechatError::Handshake(format!(
            "JSON-RPC error {}: {}",
            error.code.0, error.message
        )),
        ClientInitializeError::Cancelled => FirechatError::Handshake("initialize cancelled".into()),
        other => FirechatError::Handshake(other.to_string()),
    }
}
