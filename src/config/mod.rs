//! Configuration system (layered: CLI > env > settings file > defaults).

pub mod settings;

pub use settings::SettingsFile;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FirechatError;
use crate::types::GenerationSettings;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const FIRECRAWL_API_KEY_VAR: &str = "FIRECRAWL_API_KEY";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "FIRECHAT_MODEL";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SERVER_COMMAND: &str = "npx";
pub const DEFAULT_SERVER_ARGS: &[&str] = &["firecrawl-mcp"];
pub const DEFAULT_SYSTEM_PROMPT: &str = "You can scrape websites, crawl pages, and extract data \
using Firecrawl tools. Think step by step and use the appropriate tools.";
pub const DEFAULT_HISTORY_LIMIT: usize = 40;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 175_000;
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 25;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Values supplied on the command line. `None` (or an empty list) leaves lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub server_command: Option<String>,
    pub server_args: Vec<String>,
    pub system_prompt: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Chat model connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ModelConfig {
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            ..Default::default()
        }
    }
}

/// How to launch the MCP tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Extra variables added to the inherited environment of the child.
    pub env: Vec<(String, String)>,
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// `command arg1 arg2`, for messages.
    pub fn display_command(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Conversation-loop limits and the fixed system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub history_limit: usize,
    pub max_input_chars: usize,
    pub max_tool_iterations: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }
}

/// Fully resolved configuration, built once at startup and passed by reference.
#[derive(Clone, PartialEq)]
pub struct FirechatConfig {
    pub openai_api_key: String,
    pub firecrawl_api_key: Option<String>,
    pub model: ModelConfig,
    pub server: McpServerConfig,
    pub chat: ChatSettings,
}

impl std::fmt::Debug for FirechatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirechatConfig")
            .field("openai_api_key", &"..")
            .field("firecrawl_api_key", &self.firecrawl_api_key.as_ref().map(|_| ".."))
            .field("model", &self.model)
            .field("server", &self.server.display_command())
            .field("chat", &self.chat)
            .finish()
    }
}

impl FirechatConfig {
    /// Load from `.env`, the process environment, an optional settings file and CLI overrides.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, FirechatError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::load_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// Like [`FirechatConfig::load`], but variables come from `env` instead of the process.
    ///
    /// A missing `OPENAI_API_KEY` is reported before any settings file is read.
    pub fn load_with_env(
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FirechatError> {
        require_var(&env, OPENAI_API_KEY_VAR)?;

        let settings = match &overrides.config_path {
            Some(path) => SettingsFile::read(path)?,
            None => {
                let cwd = std::env::current_dir()?;
                SettingsFile::discover(&cwd, settings::home_dir().as_deref())?
            }
        };

        Self::from_sources(settings, env, overrides)
    }

    /// Resolve configuration from explicit layers. `env` looks up a variable by name.
    pub fn from_sources(
        settings: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, FirechatError> {
        let lookup = |key: &str| non_blank(&env, key);

        let openai_api_key = require_var(&env, OPENAI_API_KEY_VAR)?;
        let firecrawl_api_key = lookup(FIRECRAWL_API_KEY_VAR);

        let model = ModelConfig {
            name: overrides
                .model
                .clone()
                .or_else(|| lookup(MODEL_VAR))
                .or(settings.model.name)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: overrides
                .temperature
                .or(settings.model.temperature)
                .unwrap_or(0.0),
            max_tokens: overrides.max_tokens.or(settings.model.max_tokens),
            base_url: lookup(OPENAI_BASE_URL_VAR)
                .or(settings.model.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: settings
                .model
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };
        if !(0.0..=2.0).contains(&model.temperature) {
            return Err(FirechatError::Configuration(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                model.temperature
            )));
        }

        let command = overrides
            .server_command
            .clone()
            .or(settings.server.command)
            .unwrap_or_else(|| DEFAULT_SERVER_COMMAND.to_string());
        let args = if !overrides.server_args.is_empty() {
            overrides.server_args.clone()
        } else {
            settings
                .server
                .args
                .unwrap_or_else(|| DEFAULT_SERVER_ARGS.iter().map(|a| a.to_string()).collect())
        };
        let mut server = McpServerConfig::new(command, args);
        if let Some(key) = &firecrawl_api_key {
            server = server.with_env(FIRECRAWL_API_KEY_VAR, key.clone());
        }

        let defaults = ChatSettings::default();
        let chat = ChatSettings {
            system_prompt: overrides
                .system_prompt
                .clone()
                .or(settings.chat.system_prompt)
                .unwrap_or(defaults.system_prompt),
            history_limit: settings.chat.history_limit.unwrap_or(defaults.history_limit),
            max_input_chars: settings
                .chat
                .max_input_chars
                .unwrap_or(defaults.max_input_chars),
            max_tool_iterations: settings
                .chat
                .max_tool_iterations
                .unwrap_or(defaults.max_tool_iterations),
        };
        if chat.history_limit < 2 {
            return Err(FirechatError::Configuration(
                "history_limit must keep the system prompt and at least one message".into(),
            ));
        }
        if chat.max_tool_iterations == 0 {
            return Err(FirechatError::Configuration(
                "max_tool_iterations must be at least 1".into(),
            ));
        }

        Ok(Self {
            openai_api_key,
            firecrawl_api_key,
            model,
            server,
            chat,
        })
    }

    /// Non-fatal configuration problems to report before the session starts.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.firecrawl_api_key.is_none() {
            warnings.push(format!(
                "Warning: {FIRECRAWL_API_KEY_VAR} not set. Firecrawl tools may fail."
            ));
        }
        warnings
    }
}

fn non_blank(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

fn require_var(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, FirechatError> {
    non_blank(env, key).ok_or_else(|| FirechatError::MissingCredential {
        env_var: key.to_string(),
    })
}
