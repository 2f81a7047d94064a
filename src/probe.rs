use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::data::{Identity, NewNote, Note};
use crate::store::{Filter, OrderBy, RowStore, StoreError};


/// The four operations the notes view needs, all against one collection.
/// Scoped reads and writes carry the caller's own filter; `delete` and
/// `unscoped_list` deliberately carry none, leaving enforcement entirely to
/// the store's per-row policy.
pub struct RowAccessProbe {
    store: Arc<dyn RowStore>,
    collection: String,
}

impl RowAccessProbe {
    pub fn new(
        store: Arc<dyn RowStore>,
        collection: impl Into<String>,
    ) -> RowAccessProbe {
        RowAccessProbe {
            store,
            collection: collection.into(),
        }
    }

    /// All rows owned by `owner_id`, newest first. An empty result is a
    /// success, not an error.
    pub async fn scoped_list(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Note>, StoreError> {
        self.store
            .query(
                &self.collection,
                Some(Filter::OwnerEq(owner_id)),
                Some(OrderBy::CreatedAtDesc),
            )
            .await
    }

    pub async fn insert(
        &self,
        owner_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Note, StoreError> {
        self.store
            .insert(
                &self.collection,
                NewNote {
                    owner_id,
                    title: title.to_owned(),
                    body: body.to_owned(),
                },
            )
            .await
    }

    /// Issued without an owner filter: whether a caller may remove this row
    /// is the store's decision, and a rejection may be a silent no-op.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.store.delete(&self.collection, id, None).await
    }

    /// The probe itself: an unfiltered read of the whole collection. The
    /// returned rows are only classified locally, never filtered — a
    /// correctly policied store has already restricted them to the caller.
    pub async fn unscoped_list(
        &self,
        caller: &Identity,
    ) -> Result<ProbeReport, StoreError> {
        debug!("probing {} with an unfiltered read", self.collection);
        let rows = self.store
            .query(&self.collection, None, Some(OrderBy::CreatedAtDesc))
            .await?;
        let report = ProbeReport::partition(rows, caller.id);
        if report.is_isolated() {
            info!(
                "unfiltered read returned {} rows, all owned by the caller",
                report.total(),
            );
        } else {
            info!(
                "unfiltered read exposed {} foreign rows of {}",
                report.foreign.len(),
                report.total(),
            );
        }
        Ok(report)
    }
}

/// Unscoped read results, split by comparing each row's owner against the
/// caller. Relative order within each side is the store's.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeReport {
    pub own: Vec<Note>,
    pub foreign: Vec<Note>,
}

impl ProbeReport {
    pub fn partition(rows: Vec<Note>, caller_id: Uuid) -> ProbeReport {
        let (own, foreign): (Vec<Note>, Vec<Note>) = rows
            .into_iter()
            .partition(|note| note.owner_id == caller_id);
        ProbeReport { own, foreign }
    }

    pub fn total(&self) -> usize {
        self.own.len() + self.foreign.len()
    }

    /// True when the store kept other principals' rows out of the result.
    pub fn is_isolated(&self) -> bool {
        self.foreign.is_empty()
    }
}
