use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while requesting a review
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Review request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Review endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Review endpoint returned no content")]
    EmptyResponse,

    #[error("Failed to parse review response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Something that reads a review document and answers with free text
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Model identifier, for display
    fn model(&self) -> &str;

    async fn review(&self, document: &str) -> Result<String, ReviewError>;
}
