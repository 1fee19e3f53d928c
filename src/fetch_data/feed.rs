use async_trait::async_trait;
use thiserror::Error;

use crate::model::{IndexPrice, InstrumentDescriptor, InstrumentSummary};

// ── Errors ──────────────────────────────────────────────────────────

/// Transport-level failure talking to the exchange. Always fatal for the run.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API response carried neither a result nor an error")]
    MissingResult,
}

// ── Feed trait ──────────────────────────────────────────────────────

/// Source of raw option-chain payloads for one currency.
///
/// The three calls are independent; callers fetch them in sequence
/// (index price, instruments, summaries) and abort on the first error.
#[async_trait]
pub trait OptionFeed: Send + Sync {
    /// Current index price for `currency`.
    async fn index_price(&self, currency: &str) -> Result<IndexPrice, FeedError>;

    /// Active (non-expired) option instruments.
    async fn option_instruments(&self, currency: &str) -> Result<Vec<InstrumentDescriptor>, FeedError>;

    /// Book summaries for every option of `currency`.
    async fn option_summaries(&self, currency: &str) -> Result<Vec<InstrumentSummary>, FeedError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
