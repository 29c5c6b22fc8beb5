//! Command-line interface for firechat.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigOverrides;

/// Chat with a model that can scrape, crawl, and search the web through Firecrawl MCP tools.
#[derive(Parser, Debug)]
#[command(name = "firechat", version, about)]
pub struct Cli {
    /// Chat model to use (default: gpt-4o-mini, or FIRECHAT_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens per model reply
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Executable that starts the MCP tool server
    #[arg(long, value_name = "COMMAND")]
    pub server_command: Option<String>,

    /// Argument passed to the server command (repeatable; replaces the default args)
    #[arg(long = "server-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub server_args: Vec<String>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Settings file (default: ./firechat.toml, then ~/.firechat/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            server_command: self.server_command,
            server_args: self.server_args,
            system_prompt: self.system,
            config_path: self.config,
        }
    }
}
