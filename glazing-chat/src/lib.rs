//! Chat assistant for the glazing site: persona prompt, session history and
//! a Gemini `generateContent` backend.

pub mod backend;
pub mod error;
pub mod message;
pub mod prompt;
pub mod session;

pub use backend::{ChatBackend, ChatConfig, GeminiClient};
pub use error::ChatError;
pub use message::{ChatMessage, ChatRole};
pub use prompt::system_instruction;
pub use session::ChatSession;
