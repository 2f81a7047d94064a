use async_trait::async_trait;
use uuid::Uuid;

use crate::data::{NewNote, Note};

mod errors;
mod http;

pub use errors::StoreError;
pub use http::HttpRowStore;

/// The only row filter this client ever supplies. The store is expected to
/// enforce per-row authorization independently of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Filter {
    OwnerEq(Uuid),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderBy {
    CreatedAtDesc,
}

/// A hosted row store holding the notes collection. Authorization decisions
/// are the store's alone: every operation here is issued with exactly the
/// filters the caller asked for, forged or missing ones included.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Note>, StoreError>;

    async fn insert(
        &self,
        collection: &str,
        row: NewNote,
    ) -> Result<Note, StoreError>;

    async fn delete(
        &self,
        collection: &str,
        id: Uuid,
        filter: Option<Filter>,
    ) -> Result<(), StoreError>;
}
