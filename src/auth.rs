use async_trait::async_trait;

use crate::data::Identity;

mod errors;
mod http;

pub use errors::AuthError;
pub use http::HttpAuthProvider;

/// The external authentication service. This client never mints or
/// validates an identity itself.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` means "nobody is signed in"; errors are reserved for the
    /// service itself misbehaving.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
