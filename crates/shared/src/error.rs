use thiserror::Error;

/// The two outcomes a request cycle can fail with.
///
/// `Cancelled` marks a response that arrived after its request was superseded
/// by a newer one; it must never reach the display. `RequestFailed` carries
/// the message that replaces the displayed collection as its sole entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request superseded")]
    Cancelled,
    #[error("fetch failed: {0}")]
    RequestFailed(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
