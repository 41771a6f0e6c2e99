mod openai;
mod prompts;
mod traits;

pub use openai::{
    OpenAiReviewer, ReviewerConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use prompts::ReviewPrompts;
pub use traits::{ReviewError, Reviewer};
