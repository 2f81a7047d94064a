use log::debug;

use crate::data::{Identity, Note};
use crate::probe::ProbeReport;
use crate::store::StoreError;


#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ViewState {
    Unauthenticated,
    Loading {
        identity: Identity,
    },
    Ready {
        identity: Identity,
        notes: Vec<Note>,
    },
}

/// Probe results live beside the view state, not inside it: running the
/// probe never changes what the "my notes" side displays.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProbeState {
    NotRun,
    HasResult(ProbeReport),
    HasError(String),
}

/// Ticket for one issued list request. Only the most recently issued
/// generation's completion is applied, so a slow response can never
/// overwrite a newer one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListGeneration(u64);

#[derive(Debug)]
pub enum SessionEvent {
    SignedIn(Identity),
    SignInRequired,
    NotesListed(ListGeneration, Result<Vec<Note>, StoreError>),
    MutationSettled(Result<(), StoreError>),
    ProbeSettled(Result<ProbeReport, StoreError>),
    SignedOut,
}

/// All mutable view state, advanced exclusively through [`SessionEvent`]s.
/// Async completions produce events; nothing writes the fields directly.
pub struct NotesSession {
    state: ViewState,
    probe: ProbeState,
    error: Option<String>,
    issued_generation: u64,
}

impl Default for NotesSession {
    fn default() -> Self {
        Self::new()
    }
}

impl NotesSession {
    pub fn new() -> NotesSession {
        NotesSession {
            state: ViewState::Unauthenticated,
            probe: ProbeState::NotRun,
            error: None,
            issued_generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn probe_state(&self) -> &ProbeState {
        &self.probe
    }

    /// The most recent surfaced failure, read or mutation alike.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            ViewState::Unauthenticated => None,
            ViewState::Loading { identity }
                | ViewState::Ready { identity, .. } => Some(identity),
        }
    }

    /// Issues a ticket for a new list request, invalidating every earlier
    /// in-flight one.
    pub fn begin_list(&mut self) -> ListGeneration {
        self.issued_generation += 1;
        ListGeneration(self.issued_generation)
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(identity) => {
                self.state = ViewState::Loading { identity };
                self.probe = ProbeState::NotRun;
                self.error = None;
            },
            SessionEvent::SignInRequired | SessionEvent::SignedOut => {
                self.state = ViewState::Unauthenticated;
                self.probe = ProbeState::NotRun;
                self.error = None;
            },
            SessionEvent::NotesListed(generation, outcome) => {
                self.apply_notes_listed(generation, outcome);
            },
            SessionEvent::MutationSettled(outcome) => {
                if let Err(e) = outcome {
                    self.error = Some(e.to_string());
                }
            },
            SessionEvent::ProbeSettled(outcome) => {
                self.probe = match outcome {
                    Ok(report) => ProbeState::HasResult(report),
                    Err(e) => ProbeState::HasError(e.to_string()),
                };
            },
        }
    }

    fn apply_notes_listed(
        &mut self,
        generation: ListGeneration,
        outcome: Result<Vec<Note>, StoreError>,
    ) {
        if generation.0 != self.issued_generation {
            debug!(
                "dropping stale list result (generation {} of {})",
                generation.0,
                self.issued_generation,
            );
            return;
        }
        let identity = match &self.state {
            ViewState::Unauthenticated => {
                debug!("dropping list result without an active session");
                return;
            },
            ViewState::Loading { identity }
                | ViewState::Ready { identity, .. } => identity.clone(),
        };
        match outcome {
            Ok(notes) => {
                self.state = ViewState::Ready { identity, notes };
                self.error = None;
            },
            Err(e) => {
                // keep whatever was displayed; an initial load settles to
                // an empty Ready view rather than wedging in Loading
                if let ViewState::Loading { .. } = self.state {
                    self.state = ViewState::Ready {
                        identity,
                        notes: Vec::new(),
                    };
                }
                self.error = Some(e.to_string());
            },
        }
    }
}
