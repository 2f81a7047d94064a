use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The authenticated principal, as reported by the auth service.
/// This client never mints or validates one.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// A stored note row. Field names on the wire follow the backing table
/// (`user_id`, `content`); `id` and `created_at` are store-assigned.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Note {
    pub id: Uuid,

    #[serde(rename = "user_id")]
    pub owner_id: Uuid,

    pub title: String,

    #[serde(rename = "content")]
    pub body: String,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload. The store assigns `id` and `created_at`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewNote {
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,

    pub title: String,

    #[serde(rename = "content")]
    pub body: String,
}
