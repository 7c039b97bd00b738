//! LLM clients for ticket processing.
//!
//! Two independent providers are involved: Anthropic classifies a ticket into
//! the fixed category/priority vocabularies, OpenAI drafts the initial reply.
//! They share no state, so the processor may run them concurrently.
//!
//! The traits are the seam between the processor and the providers; tests
//! substitute stubs behind them.

mod classifier;
mod drafter;

pub use classifier::AnthropicClassifier;
pub use drafter::OpenAiDrafter;

use async_trait::async_trait;

use crate::models::Classification;
use crate::utils::ApiResult;

/// Maps a ticket's subject/body to the fixed category/priority vocabularies
/// with confidence scores. Malformed model output or transport failure is an
/// [`crate::utils::ApiError::Classification`]; the caller must not default.
#[async_trait]
pub trait TicketClassifier: Send + Sync {
    async fn classify(&self, subject: &str, body: &str) -> ApiResult<Classification>;
}

/// Drafts a free-text reply to the customer. Failure is an
/// [`crate::utils::ApiError::Drafting`].
#[async_trait]
pub trait ResponseDrafter: Send + Sync {
    async fn draft(&self, subject: &str, body: &str) -> ApiResult<String>;
}
