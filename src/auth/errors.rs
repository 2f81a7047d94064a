use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("auth service rejected the request: {0}")]
    Rejected(String),

    #[error("malformed auth response: {0}")]
    Decoding(String),
}
