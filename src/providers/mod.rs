//! Contracts for the hosted collaborators: web search and AI text generation.
//!
//! The crate does not talk to any network service itself. Frontends implement
//! [`search::SearchProvider`] and [`ai::AiTextProvider`] on top of whatever client they use, and
//! the helpers in this module turn the results into [`crate::model::ReportData`] updates.

pub mod ai;
pub mod search;

pub use ai::{AiTextProvider, DescriptionRequest, SummaryRequest};
pub use search::{SearchOutcome, SearchProvider, SearchRequest, SearchSources};

/// Failures reported by a collaborator. Every variant reads as a user-facing message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("rate limit exceeded, please try again later")]
    RateLimited,

    #[error("payment required, please add credits to the AI workspace")]
    PaymentRequired,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps an HTTP status code and response body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::PaymentRequired,
            _ => {
                let body = body.trim();
                if body.is_empty() {
                    Self::Unavailable(format!("status {status}"))
                } else {
                    Self::Unavailable(format!("status {status}: {body}"))
                }
            }
        }
    }
}
