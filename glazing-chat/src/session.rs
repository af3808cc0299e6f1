use glazing_core::catalog::Catalog;
use tracing::{error, warn};

use crate::backend::ChatBackend;
use crate::error::ChatError;
use crate::message::ChatMessage;
use crate::prompt::system_instruction;

pub const GREETING: &str =
    "Hello! I'm your A406 specialist. How can I help with your glazing project today?";
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that.";
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting to my knowledge base right now. \
                                  Please call us directly at 020 8889 9982.";

/// One customer conversation.
///
/// Backend failures never surface to the caller; the customer gets
/// [`FALLBACK_REPLY`] and the error is logged.
pub struct ChatSession<B> {
    backend: B,
    system: String,
    history: Vec<ChatMessage>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(
        backend: B,
        catalog: &Catalog,
    ) -> Self {
        Self {
            backend,
            system: system_instruction(catalog),
            history: vec![ChatMessage::model(GREETING)],
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Sends `text` and returns the model's reply as appended to history.
    ///
    /// # Errors
    ///
    /// [`ChatError::EmptyMessage`] if `text` is blank. History is unchanged.
    pub async fn send(
        &mut self,
        text: &str,
    ) -> Result<&ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let prior = self.history.len();
        self.history.push(ChatMessage::user(text));

        let reply = match self
            .backend
            .generate(&self.system, &self.history[..prior], text)
            .await
        {
            Ok(reply) if reply.trim().is_empty() => {
                warn!("chat backend returned an empty reply");
                EMPTY_REPLY.to_string()
            }
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "chat backend failed");
                FALLBACK_REPLY.to_string()
            }
        };

        self.history.push(ChatMessage::model(reply));
        let last = self.history.len() - 1;
        Ok(&self.history[last])
    }

    /// Back to just the greeting.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.push(ChatMessage::model(GREETING));
    }
}
