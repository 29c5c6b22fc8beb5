//! Interactive chat: bounded history, input handling, and the turn loop.

pub mod history;
pub mod input;
pub mod turn_loop;

pub use history::{truncate_chars, ConversationHistory};
pub use input::{classify_input, InputAction};
pub use turn_loop::{LoopExit, TurnLoop, TurnState};
