use async_trait::async_trait;
use log::trace;
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::auth::{AuthError, AuthProvider};
use crate::config::app_config::AppConfig;
use crate::data::Identity;

/// `AuthProvider` over the hosted auth service's REST endpoints. The
/// caller's bearer token is the whole session: there is nothing to refresh
/// or persist on this side.
pub struct HttpAuthProvider {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl HttpAuthProvider {
    pub fn new(client: Client, config: &AppConfig) -> HttpAuthProvider {
        HttpAuthProvider {
            client,
            base_url: config.store_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> Option<RequestBuilder> {
        // no token means there is no session to ask about
        let token = self.access_token.as_deref()?;
        Some(
            request
                .header("apikey", &self.api_key)
                .bearer_auth(token),
        )
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        let request = self.client
            .get(format!("{}/auth/v1/user", self.base_url));
        let Some(request) = self.authorize(request) else {
            trace!("no access token configured, treating as signed out");
            return Ok(None);
        };
        let response = request.send().await?;
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                trace!("auth service does not recognize the token");
                Ok(None)
            },
            status if status.is_success() => {
                let identity = response
                    .json::<Identity>()
                    .await
                    .map_err(|e| AuthError::Decoding(e.to_string()))?;
                trace!("resolved identity {}", identity.id);
                Ok(Some(identity))
            },
            status => Err(AuthError::Rejected(status.to_string())),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let request = self.client
            .post(format!("{}/auth/v1/logout", self.base_url));
        let Some(request) = self.authorize(request) else {
            return Ok(());
        };
        let response = request.send().await?;
        let status = response.status();
        // an already-dead token signs out just as well
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::Rejected(status.to_string()))
        }
    }
}
