use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("chat API key not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {body}")]
    Status { code: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}
