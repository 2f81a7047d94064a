use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    /// Base URL of the hosted row store, e.g. `https://xyz.example.co`.
    pub store_url: String,

    /// The store's public ("anon") API key.
    pub api_key: String,

    /// Bearer token of the signed-in principal. Absent means the session
    /// guard will send the caller to the login surface.
    pub access_token: Option<String>,

    /// Login surface unauthenticated callers are directed to.
    pub login_url: String,

    pub notes_collection: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_url: "http://localhost:54321".to_owned(),
            api_key: String::new(),
            access_token: None,
            login_url: "http://localhost:3000/login".to_owned(),
            notes_collection: "notes".to_owned(),
        }
    }
}
