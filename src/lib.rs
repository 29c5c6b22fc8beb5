//! firechat: a terminal chat agent that uses Firecrawl's MCP server as its toolbox.
//!
//! On start the binary launches the tool server over stdio, lists its tools,
//! and runs a read-invoke-print loop where a reason-and-act agent backed by an
//! OpenAI-compatible chat model may call those tools before answering.
//!
//! ```no_run
//! use firechat::config::{ConfigOverrides, FirechatConfig};
//!
//! # async fn example() -> firechat::error::Result<()> {
//! let config = FirechatConfig::load(&ConfigOverrides::default())?;
//! let session = firechat::session::Session::bootstrap(&config.server).await?;
//! println!("{}", session.tool_names().join(", "));
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod provider;
pub mod tools;
pub mod types;

#[cfg(feature = "mcp")]
pub mod app;

#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "mcp")]
pub mod session;

#[cfg(feature = "cli")]
pub mod cli;
