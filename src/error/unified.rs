//! Error classification and user-facing recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Launch,
    Handshake,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    InstallToolServer,
    IncreaseTimeout,
    ReduceInputSize,
    CheckToolServer,
    None,
}

impl RecoverySuggestion {
    /// Text shown to the user alongside the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RetryWithBackoff => Some("The request may succeed if you try again shortly."),
            Self::CheckCredentials => Some("Check OPENAI_API_KEY in your environment or .env file."),
            Self::CheckConfiguration => {
                Some("Check firechat.toml and the FIRECHAT_* environment variables.")
            }
            Self::InstallToolServer => {
                Some("Make sure Node+npx are installed and `npx firecrawl-mcp --help` works.")
            }
            Self::IncreaseTimeout => Some("The model did not answer in time; try again."),
            Self::ReduceInputSize => Some("Try a shorter message."),
            Self::CheckToolServer => Some("The tool server reported an error; check FIRECRAWL_API_KEY."),
            Self::None => None,
        }
    }
}
