//! The interactive read-invoke-print loop.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::config::ChatSettings;
use crate::tools::Tool;

use super::history::ConversationHistory;
use super::input::{classify_input, InputAction};

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    Processing,
    Terminated,
}

/// Why the loop stopped. All of these are normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The user typed `quit` or `exit`.
    Quit,
    /// Input stream closed.
    EndOfInput,
    /// Interrupt (Ctrl-C) while waiting for input.
    Interrupted,
}

pub struct TurnLoop {
    agent: Arc<dyn Agent>,
    tools: Vec<Arc<dyn Tool>>,
    history: ConversationHistory,
    max_input_chars: usize,
    state: TurnState,
}

impl TurnLoop {
    pub fn new(agent: Arc<dyn Agent>, tools: Vec<Arc<dyn Tool>>, settings: &ChatSettings) -> Self {
        Self {
            agent,
            tools,
            history: ConversationHistory::new(
                settings.system_prompt.clone(),
                settings.history_limit,
            ),
            max_input_chars: settings.max_input_chars,
            state: TurnState::AwaitingInput,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Run until the user quits, input ends, or `interrupt` resolves.
    ///
    /// Replies go to `out`; per-turn failures go to `err` and the loop keeps going.
    /// An interrupt that fires while the agent is working is seen at the next prompt.
    pub async fn run<R, O, E, I>(
        &mut self,
        input: &mut R,
        out: &mut O,
        err: &mut E,
        interrupt: I,
    ) -> std::io::Result<LoopExit>
    where
        R: AsyncBufRead + Unpin,
        O: Write,
        E: Write,
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        loop {
            self.state = TurnState::AwaitingInput;
            write!(out, "\nYou: ")?;
            out.flush()?;

            // Decoded lossily: one bad byte must not end the session.
            let mut raw = Vec::new();
            let read = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                n = input.read_until(b'\n', &mut raw) => Some(n?),
            };

            let text = match read {
                None => return self.terminate(out, LoopExit::Interrupted),
                Some(0) => return self.terminate(out, LoopExit::EndOfInput),
                Some(_) => match classify_input(&String::from_utf8_lossy(&raw)) {
                    InputAction::Skip => continue,
                    InputAction::Exit => return self.terminate(out, LoopExit::Quit),
                    InputAction::Message(text) => text,
                },
            };

            self.process(&text, out, err).await?;
        }
    }

    async fn process<O: Write, E: Write>(
        &mut self,
        text: &str,
        out: &mut O,
        err: &mut E,
    ) -> std::io::Result<()> {
        self.state = TurnState::Processing;
        self.history.push_user(text, self.max_input_chars);
        let snapshot = self.history.to_messages();
        debug!(history = snapshot.len(), "invoking agent");

        match self.agent.invoke(&snapshot, &self.tools).await {
            Ok(response) => {
                let reply = response.extract_text();
                writeln!(out, "\nAgent: {reply}")?;
                out.flush()?;
                self.history.push_assistant(reply);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    category = ?e.category(),
                    retryable = e.is_retryable(),
                    "agent invoke failed"
                );
                writeln!(err, "Error during agent invoke: {e}")?;
                err.flush()?;
            }
        }
        Ok(())
    }

    fn terminate<O: Write>(&mut self, out: &mut O, exit: LoopExit) -> std::io::Result<LoopExit> {
        self.state = TurnState::Terminated;
        match exit {
            LoopExit::Quit => writeln!(out, "Goodbye")?,
            LoopExit::EndOfInput | LoopExit::Interrupted => writeln!(out, "\nGoodbye")?,
        }
        out.flush()?;
        debug!(?exit, "turn loop finished");
        Ok(exit)
    }
}
