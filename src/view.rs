use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider};
use crate::guard::{GuardOutcome, SessionGuard};
use crate::probe::RowAccessProbe;
use crate::session::{NotesSession, SessionEvent, ViewState};
use crate::store::RowStore;

#[cfg(test)] mod tests;

/// The notes view: guard, probe and session wired together. Every public
/// operation is a complete user interaction — it drives the collaborators
/// and feeds their outcomes to the session as events.
pub struct NotesView {
    guard: SessionGuard,
    auth: Arc<dyn AuthProvider>,
    probe: RowAccessProbe,
    session: NotesSession,
}

impl NotesView {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RowStore>,
        collection: impl Into<String>,
    ) -> NotesView {
        NotesView {
            guard: SessionGuard::new(auth.clone()),
            auth,
            probe: RowAccessProbe::new(store, collection),
            session: NotesSession::new(),
        }
    }

    pub fn session(&self) -> &NotesSession {
        &self.session
    }

    /// View entry. No store query is issued unless the guard hands over an
    /// active principal.
    pub async fn activate(&mut self) -> &ViewState {
        match self.guard.resolve().await {
            GuardOutcome::Active(identity) => {
                self.session.apply(SessionEvent::SignedIn(identity));
                self.refresh().await;
            },
            GuardOutcome::RedirectToLogin => {
                self.session.apply(SessionEvent::SignInRequired);
            },
        }
        self.session.state()
    }

    /// Fresh authoritative read of the caller's own notes.
    pub async fn refresh(&mut self) {
        let Some(owner_id) = self.session.identity().map(|i| i.id) else {
            return;
        };
        let generation = self.session.begin_list();
        let outcome = self.probe.scoped_list(owner_id).await;
        self.session.apply(SessionEvent::NotesListed(generation, outcome));
    }

    pub async fn add_note(&mut self, title: &str, body: &str) {
        let Some(owner_id) = self.session.identity().map(|i| i.id) else {
            return;
        };
        let outcome = self.probe
            .insert(owner_id, title, body)
            .await
            .map(|_| ());
        // the mutation outcome is applied after the re-read so the
        // refresh cannot clear a surfaced failure
        self.refresh().await;
        self.session.apply(SessionEvent::MutationSettled(outcome));
    }

    pub async fn delete_note(&mut self, id: Uuid) {
        if self.session.identity().is_none() {
            return;
        }
        let outcome = self.probe.delete(id).await;
        // re-read regardless of whether the store accepted the delete
        self.refresh().await;
        self.session.apply(SessionEvent::MutationSettled(outcome));
    }

    /// The unfiltered read. Displayed notes are untouched; only the probe
    /// slot changes.
    pub async fn run_probe(&mut self) {
        let Some(caller) = self.session.identity().cloned() else {
            return;
        };
        let outcome = self.probe.unscoped_list(&caller).await;
        self.session.apply(SessionEvent::ProbeSettled(outcome));
    }

    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        self.session.apply(SessionEvent::SignedOut);
        Ok(())
    }
}
