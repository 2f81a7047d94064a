use std::sync::Arc;

use log::{debug, warn};

use crate::auth::AuthProvider;
use crate::data::Identity;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GuardOutcome {
    Active(Identity),
    RedirectToLogin,
}

/// Resolves the active principal on view entry. A failed lookup is treated
/// the same as "nobody is signed in": the caller gets sent to the login
/// surface, with no retries.
pub struct SessionGuard {
    auth: Arc<dyn AuthProvider>,
}

impl SessionGuard {
    pub fn new(auth: Arc<dyn AuthProvider>) -> SessionGuard {
        SessionGuard { auth }
    }

    pub async fn resolve(&self) -> GuardOutcome {
        match self.auth.current_identity().await {
            Ok(Some(identity)) => {
                debug!("active session for {}", identity.id);
                GuardOutcome::Active(identity)
            },
            Ok(None) => {
                debug!("no active session");
                GuardOutcome::RedirectToLogin
            },
            Err(e) => {
                warn!("identity lookup failed, treating as signed out: {e}");
                GuardOutcome::RedirectToLogin
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::MockAuthProvider;
    use super::*;

    #[tokio::test]
    async fn resolves_signed_in_identity() {
        let auth = Arc::new(MockAuthProvider::signed_in("u1@example.com"));
        let identity = auth.identity().unwrap();
        let guard = SessionGuard::new(auth);
        assert_eq!(guard.resolve().await, GuardOutcome::Active(identity));
    }

    #[tokio::test]
    async fn missing_identity_redirects() {
        let guard = SessionGuard::new(Arc::new(MockAuthProvider::signed_out()));
        assert_eq!(guard.resolve().await, GuardOutcome::RedirectToLogin);
    }

    #[tokio::test]
    async fn failed_lookup_redirects() {
        let guard = SessionGuard::new(Arc::new(MockAuthProvider::failing()));
        assert_eq!(guard.resolve().await, GuardOutcome::RedirectToLogin);
    }
}
