//! Answer generation: prompt composition and conversation history

pub mod prompt;
pub mod session;

pub use prompt::PromptBuilder;
pub use session::{ConversationSession, Turn};
