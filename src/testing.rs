use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider};
use crate::data::{Identity, NewNote, Note};
use crate::store::{Filter, OrderBy, RowStore, StoreError};

const CREATED_AT_BASE: i64 = 1_700_000_000;
const CREATED_AT_STEP: i64 = 60;

/// How the emulated store's row-level policy is configured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowPolicy {
    /// Policies restrict reads and deletes to the requesting principal's
    /// own rows, regardless of client-supplied filters.
    PerOwner,

    /// The misconfiguration under demonstration: requests touch whatever
    /// rows their own filters (or lack thereof) select.
    Unrestricted,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreEvent {
    Query {
        filter: Option<Filter>,
        order: Option<OrderBy>,
    },
    Insert {
        owner_id: Uuid,
    },
    Delete {
        id: Uuid,
        filter: Option<Filter>,
    },
}

/// In-memory stand-in for the hosted row store. It attributes every request
/// to `caller_id` (the bearer of the session) and applies `policy` on top
/// of whatever filter the client sent, the way the real store's row-level
/// security would.
pub struct MockRowStore {
    policy: RowPolicy,
    caller_id: Uuid,
    rows: Mutex<Vec<Note>>,
    events: Mutex<Vec<StoreEvent>>,
    created_at_seq: AtomicI64,
    query_failure: Mutex<Option<String>>,
    insert_failure: Mutex<Option<String>>,
    delete_failure: Mutex<Option<String>>,
}

impl MockRowStore {
    pub fn enforcing(caller_id: Uuid) -> MockRowStore {
        Self::new(RowPolicy::PerOwner, caller_id)
    }

    pub fn unrestricted(caller_id: Uuid) -> MockRowStore {
        Self::new(RowPolicy::Unrestricted, caller_id)
    }

    fn new(policy: RowPolicy, caller_id: Uuid) -> MockRowStore {
        MockRowStore {
            policy,
            caller_id,
            rows: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            created_at_seq: AtomicI64::new(0),
            query_failure: Mutex::new(None),
            insert_failure: Mutex::new(None),
            delete_failure: Mutex::new(None),
        }
    }

    /// Plants a row directly, bypassing the request path: this is how
    /// another principal's data gets into the table.
    pub fn seed(&self, owner_id: Uuid, title: &str, body: &str) -> Note {
        let note = self.make_note(owner_id, title, body);
        self.rows.lock().unwrap().push(note.clone());
        note
    }

    pub fn fail_next_query(&self, message: &str) {
        *self.query_failure.lock().unwrap() = Some(message.to_owned());
    }

    pub fn fail_next_insert(&self, message: &str) {
        *self.insert_failure.lock().unwrap() = Some(message.to_owned());
    }

    pub fn fail_next_delete(&self, message: &str) {
        *self.delete_failure.lock().unwrap() = Some(message.to_owned());
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn all_rows(&self) -> Vec<Note> {
        self.rows.lock().unwrap().clone()
    }

    fn make_note(&self, owner_id: Uuid, title: &str, body: &str) -> Note {
        let seq = self.created_at_seq.fetch_add(1, Ordering::Relaxed);
        Note {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_owned(),
            body: body.to_owned(),
            created_at: OffsetDateTime::from_unix_timestamp(
                CREATED_AT_BASE + seq * CREATED_AT_STEP,
            ).unwrap(),
        }
    }

    fn record(&self, event: StoreEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RowStore for MockRowStore {
    async fn query(
        &self,
        _collection: &str,
        filter: Option<Filter>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Note>, StoreError> {
        self.record(StoreEvent::Query { filter, order });
        if let Some(message) = self.query_failure.lock().unwrap().take() {
            return Err(StoreError::Rejected(message));
        }
        let mut rows = self.rows.lock().unwrap().clone();
        if let Some(Filter::OwnerEq(owner_id)) = filter {
            rows.retain(|note| note.owner_id == owner_id);
        }
        if self.policy == RowPolicy::PerOwner {
            rows.retain(|note| note.owner_id == self.caller_id);
        }
        match order {
            Some(OrderBy::CreatedAtDesc) => {
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            },
            None => (),
        }
        Ok(rows)
    }

    async fn insert(
        &self,
        _collection: &str,
        row: NewNote,
    ) -> Result<Note, StoreError> {
        self.record(StoreEvent::Insert { owner_id: row.owner_id });
        if let Some(message) = self.insert_failure.lock().unwrap().take() {
            return Err(StoreError::Rejected(message));
        }
        let note = self.make_note(row.owner_id, &row.title, &row.body);
        self.rows.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn delete(
        &self,
        _collection: &str,
        id: Uuid,
        filter: Option<Filter>,
    ) -> Result<(), StoreError> {
        self.record(StoreEvent::Delete { id, filter });
        if let Some(message) = self.delete_failure.lock().unwrap().take() {
            return Err(StoreError::Rejected(message));
        }
        let mut rows = self.rows.lock().unwrap();
        match self.policy {
            // an unauthorized delete is a silent no-op, not an error
            RowPolicy::PerOwner => rows.retain(|note|
                note.id != id || note.owner_id != self.caller_id
            ),
            RowPolicy::Unrestricted => rows.retain(|note| note.id != id),
        }
        Ok(())
    }
}

pub struct MockAuthProvider {
    identity: Option<Identity>,
    failing: bool,
    sign_outs: AtomicUsize,
}

impl MockAuthProvider {
    pub fn signed_in(email: &str) -> MockAuthProvider {
        MockAuthProvider {
            identity: Some(
                Identity {
                    id: Uuid::new_v4(),
                    email: email.to_owned(),
                }
            ),
            failing: false,
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn signed_out() -> MockAuthProvider {
        MockAuthProvider {
            identity: None,
            failing: false,
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> MockAuthProvider {
        MockAuthProvider {
            identity: None,
            failing: true,
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        if self.failing {
            return Err(
                AuthError::Rejected("auth service unavailable".to_owned())
            );
        }
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
