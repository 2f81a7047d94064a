use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store's own error message, kept verbatim for display.
    #[error("{0}")]
    Rejected(String),

    #[error("malformed store response: {0}")]
    Decoding(String),
}
