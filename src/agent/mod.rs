//! Agent abstraction: turn a conversation plus a tool set into a response.

pub mod react;
pub mod response;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FirechatError;
use crate::tools::Tool;
use crate::types::ModelMessage;

pub use react::ReactAgent;
pub use response::{AgentResponse, ResponseMessage};

/// Something that can answer a conversation, possibly by calling tools.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run one turn over the full history. May take arbitrarily long.
    async fn invoke(
        &self,
        history: &[ModelMessage],
        tools: &[Arc<dyn Tool>],
    ) -> Result<AgentResponse, FirechatError>;
}
