//! Application wiring: bootstrap the tool server, then run the chat loop.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tokio::io::AsyncBufRead;

use crate::agent::ReactAgent;
use crate::chat::{LoopExit, TurnLoop};
use crate::config::FirechatConfig;
use crate::error::FirechatError;
use crate::provider::{create_provider, ModelProvider};
use crate::session::Session;

const RULE_WIDTH: usize = 60;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppExit {
    /// The chat loop ran and stopped normally.
    Completed(LoopExit),
    /// The tool server could not be started.
    LaunchFailed,
    /// The tool server started but the MCP handshake or tool listing failed.
    BootstrapFailed,
    /// The model provider could not be set up.
    StartupFailed,
}

impl AppExit {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed(_) | Self::LaunchFailed => 0,
            Self::BootstrapFailed | Self::StartupFailed => 1,
        }
    }
}

/// Run one interactive session to completion.
///
/// Conversation goes to `out`; warnings and errors to `err`.
pub async fn run<R, O, E, I>(
    config: &FirechatConfig,
    input: &mut R,
    out: &mut O,
    err: &mut E,
    interrupt: I,
) -> std::io::Result<AppExit>
where
    R: AsyncBufRead + Unpin,
    O: Write,
    E: Write,
    I: Future<Output = ()>,
{
    for warning in config.warnings() {
        writeln!(err, "{warning}")?;
    }

    let provider: Arc<dyn ModelProvider> = match create_provider(config) {
        Ok(provider) => Arc::from(provider),
        Err(e) => {
            writeln!(err, "Error: {e}")?;
            return Ok(AppExit::StartupFailed);
        }
    };

    let session = match Session::bootstrap(&config.server).await {
        Ok(session) => session,
        Err(e) => return report_bootstrap_error(err, &e),
    };

    writeln!(out, "Available Tools: {}", session.tool_names().join(", "))?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    out.flush()?;

    let agent = Arc::new(ReactAgent::new(
        provider,
        config.model.generation_settings(),
        config.chat.max_tool_iterations,
    ));
    let mut chat = TurnLoop::new(agent, session.tools().to_vec(), &config.chat);
    let result = chat.run(input, out, err, interrupt).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "MCP session did not shut down cleanly");
    }

    result.map(AppExit::Completed)
}

fn report_bootstrap_error<E: Write>(err: &mut E, error: &FirechatError) -> std::io::Result<AppExit> {
    let exit = match error {
        FirechatError::Launch { .. } => {
            writeln!(err, "Launch error: {error}")?;
            AppExit::LaunchFailed
        }
        _ => {
            writeln!(err, "Bootstrap error: {error}")?;
            AppExit::BootstrapFailed
        }
    };
    if let Some(hint) = error.recovery_suggestion().hint() {
        writeln!(err, "{hint}")?;
    }
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(AppExit::Completed(LoopExit::Quit).exit_code(), 0);
        assert_eq!(AppExit::Completed(LoopExit::Interrupted).exit_code(), 0);
        assert_eq!(AppExit::LaunchFailed.exit_code(), 0);
        assert_eq!(AppExit::BootstrapFailed.exit_code(), 1);
    }

    #[test]
    fn handshake_failure_reports_bootstrap_error_with_hint() {
        let mut err = Vec::new();
        let exit = report_bootstrap_error(
            &mut err,
            &FirechatError::Handshake("connection closed during initialize".into()),
        )
        .unwrap();
        assert_eq!(exit, AppExit::BootstrapFailed);
        let text = String::from_utf8(err).unwrap();
        assert!(text.starts_with("Bootstrap error: MCP handshake failed"));
        assert!(text.contains("npx firecrawl-mcp --help"));
    }
}
