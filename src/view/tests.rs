use crate::data::Identity;
use crate::session::{ProbeState, ViewState};
use crate::store::{Filter, OrderBy};
use crate::testing::{MockAuthProvider, MockRowStore, StoreEvent};
use super::*;

const COLLECTION: &str = "notes";

fn make_view(
    auth: MockAuthProvider,
    store: MockRowStore,
) -> (NotesView, Arc<MockRowStore>, Arc<MockAuthProvider>) {
    let auth = Arc::new(auth);
    let store = Arc::new(store);
    (
        NotesView::new(auth.clone(), store.clone(), COLLECTION),
        store,
        auth,
    )
}

fn signed_in_fixtures() -> (MockAuthProvider, Identity) {
    let auth = MockAuthProvider::signed_in("u1@example.com");
    let identity = auth.identity().unwrap();
    (auth, identity)
}

fn displayed_titles(view: &NotesView) -> Vec<String> {
    match view.session().state() {
        ViewState::Ready { notes, .. } => {
            notes.iter().map(|note| note.title.clone()).collect()
        },
        state => panic!("not ready: {state:#?}"),
    }
}

#[tokio::test]
async fn unauthenticated_activation_redirects_before_any_query() {
    let (mut view, store, _) = make_view(
        MockAuthProvider::signed_out(),
        MockRowStore::enforcing(uuid::Uuid::new_v4()),
    );
    let state = view.activate().await;
    assert_eq!(*state, ViewState::Unauthenticated);
    assert!(store.events().is_empty());
}

#[tokio::test]
async fn failed_identity_lookup_redirects_before_any_query() {
    let (mut view, store, _) = make_view(
        MockAuthProvider::failing(),
        MockRowStore::enforcing(uuid::Uuid::new_v4()),
    );
    let state = view.activate().await;
    assert_eq!(*state, ViewState::Unauthenticated);
    assert!(store.events().is_empty());
}

#[tokio::test]
async fn activation_loads_the_callers_notes() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    store.seed(identity.id, "mine", "1");
    store.seed(uuid::Uuid::new_v4(), "theirs", "2");
    let (mut view, store, _) = make_view(auth, store);

    view.activate().await;

    assert_eq!(displayed_titles(&view), ["mine"]);
    assert_eq!(
        store.events(),
        [
            StoreEvent::Query {
                filter: Some(Filter::OwnerEq(identity.id)),
                order: Some(OrderBy::CreatedAtDesc),
            },
        ],
    );
}

#[tokio::test]
async fn add_note_rereads_authoritatively() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    let (mut view, store, _) = make_view(auth, store);
    view.activate().await;

    view.add_note("A", "secret1").await;

    assert_eq!(displayed_titles(&view), ["A"]);
    assert_eq!(view.session().error(), None);
    let events = store.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[1], StoreEvent::Insert { owner_id } if owner_id == identity.id));
    assert!(matches!(events[2], StoreEvent::Query { filter: Some(_), .. }));
}

#[tokio::test]
async fn add_note_failure_is_surfaced_not_dropped() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    let (mut view, store, _) = make_view(auth, store);
    view.activate().await;

    store.fail_next_insert("new row violates row-level security policy");
    view.add_note("A", "secret1").await;

    assert_eq!(
        view.session().error(),
        Some("new row violates row-level security policy"),
    );
    assert_eq!(displayed_titles(&view), Vec::<String>::new());
}

#[tokio::test]
async fn delete_rereads_even_when_store_silently_rejects() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    store.seed(identity.id, "mine", "1");
    let foreign = store.seed(uuid::Uuid::new_v4(), "theirs", "2");
    let (mut view, store, _) = make_view(auth, store);
    view.activate().await;

    view.delete_note(foreign.id).await;

    // rejected silently, so no error, but the view re-read anyway
    assert_eq!(view.session().error(), None);
    assert_eq!(displayed_titles(&view), ["mine"]);
    let events = store.events();
    assert!(matches!(events[1], StoreEvent::Delete { id, filter: None } if id == foreign.id));
    assert!(matches!(events[2], StoreEvent::Query { .. }));
    assert!(store.all_rows().iter().any(|note| note.id == foreign.id));
}

#[tokio::test]
async fn delete_failure_is_surfaced() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    let note = store.seed(identity.id, "mine", "1");
    let (mut view, store, _) = make_view(auth, store);
    view.activate().await;

    store.fail_next_delete("connection reset");
    view.delete_note(note.id).await;

    assert_eq!(view.session().error(), Some("connection reset"));
}

#[tokio::test]
async fn probe_reports_isolation_on_enforcing_store() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    store.seed(identity.id, "A", "secret1");
    store.seed(uuid::Uuid::new_v4(), "B", "secret2");
    let (mut view, _, _) = make_view(auth, store);
    view.activate().await;

    view.run_probe().await;

    match view.session().probe_state() {
        ProbeState::HasResult(report) => {
            assert!(report.is_isolated());
            assert_eq!(report.total(), 1);
        },
        state => panic!("wrong probe state: {state:#?}"),
    }
}

#[tokio::test]
async fn probe_exposes_foreign_rows_on_unrestricted_store() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::unrestricted(identity.id);
    store.seed(identity.id, "A", "secret1");
    store.seed(uuid::Uuid::new_v4(), "B", "secret2");
    let (mut view, _, _) = make_view(auth, store);
    view.activate().await;

    view.run_probe().await;

    match view.session().probe_state() {
        ProbeState::HasResult(report) => {
            assert!(!report.is_isolated());
            assert_eq!(report.foreign.len(), 1);
            assert_eq!(report.foreign[0].title, "B");
        },
        state => panic!("wrong probe state: {state:#?}"),
    }
}

#[tokio::test]
async fn probe_failure_goes_to_the_probe_slot() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    store.seed(identity.id, "mine", "1");
    let (mut view, store, _) = make_view(auth, store);
    view.activate().await;

    store.fail_next_query("permission denied for table notes");
    view.run_probe().await;

    assert_eq!(
        *view.session().probe_state(),
        ProbeState::HasError("permission denied for table notes".to_owned()),
    );
    // the "my notes" side is untouched
    assert_eq!(displayed_titles(&view), ["mine"]);
}

#[tokio::test]
async fn sign_out_resets_the_view() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    let (mut view, _, auth) = make_view(auth, store);
    view.activate().await;

    view.sign_out().await.expect("sign out failed");

    assert_eq!(*view.session().state(), ViewState::Unauthenticated);
    assert_eq!(*view.session().probe_state(), ProbeState::NotRun);
    assert_eq!(auth.sign_out_count(), 1);
}

#[tokio::test]
async fn operations_without_activation_touch_nothing() {
    let (auth, identity) = signed_in_fixtures();
    let store = MockRowStore::enforcing(identity.id);
    let (mut view, store, _) = make_view(auth, store);

    view.add_note("A", "secret1").await;
    view.delete_note(uuid::Uuid::new_v4()).await;
    view.run_probe().await;

    assert!(store.events().is_empty());
    assert_eq!(*view.session().state(), ViewState::Unauthenticated);
}
