use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Client cannot run at all, e.g. no API key.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Server kept failing until the backoff gave up, before any page arrived.
    #[error("server kept failing on page {page}, gave up retrying")]
    Exhausted { page: u32 },

    #[error("fetch cancelled")]
    Cancelled,
}
