use std::process::ExitCode;
use std::sync::Arc;

use log::error;
use reqwest::Client;

use noteprobe::auth::HttpAuthProvider;
use noteprobe::config::app_config::AppConfig;
use noteprobe::probe::ProbeReport;
use noteprobe::session::{ProbeState, ViewState};
use noteprobe::store::HttpRowStore;
use noteprobe::util::StrExt;
use noteprobe::view::NotesView;

use crate::cli::Command;

pub async fn execute(config: &AppConfig, command: Command) -> ExitCode {
    let client = Client::new();
    let auth = Arc::new(HttpAuthProvider::new(client.clone(), config));
    let store = Arc::new(HttpRowStore::new(client, config));
    let mut view = NotesView::new(
        auth,
        store,
        config.notes_collection.clone(),
    );

    if let ViewState::Unauthenticated = view.activate().await {
        eprintln!("Not signed in.");
        eprintln!(
            "Sign in at {} and put the session's access token into the \
                config as access_token.",
            config.login_url,
        );
        return ExitCode::FAILURE;
    }

    match command {
        Command::List => (),
        Command::Add { title, body } => {
            let (Some(title), Some(body)) =
                (title.nonblank_to_some(), body.nonblank_to_some())
            else {
                eprintln!("title and body must not be blank");
                return ExitCode::FAILURE;
            };
            view.add_note(&title, &body).await;
        },
        Command::Delete { id } => view.delete_note(id).await,
        Command::Probe => view.run_probe().await,
        Command::SignOut => {
            return match view.sign_out().await {
                Ok(()) => {
                    println!("Signed out.");
                    ExitCode::SUCCESS
                },
                Err(e) => {
                    error!("sign out failed: {e}");
                    ExitCode::FAILURE
                },
            };
        },
    }

    render(&view);
    if view.session().error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn render(view: &NotesView) {
    let session = view.session();
    let ViewState::Ready { identity, notes } = session.state() else {
        return;
    };

    println!("Signed in as {}", identity.email);
    println!("My notes ({}):", notes.len());
    if notes.is_empty() {
        println!("  (no notes yet)");
    }
    for note in notes {
        println!("  {}  {}: {}", note.id, note.title, note.body);
    }

    match session.probe_state() {
        ProbeState::NotRun => (),
        ProbeState::HasResult(report) => render_probe_report(report),
        ProbeState::HasError(message) => {
            println!();
            println!("Probe failed: {message}");
            println!(
                "The store refused the unfiltered read outright, which \
                    also counts as enforcement.",
            );
        },
    }

    if let Some(message) = session.error() {
        eprintln!("Error: {message}");
    }
}

fn render_probe_report(report: &ProbeReport) {
    println!();
    println!(
        "Unfiltered read returned {} row(s), {} owned by other users.",
        report.total(),
        report.foreign.len(),
    );
    if report.is_isolated() {
        println!("Row-level policies held: nothing foreign came back.");
    } else {
        println!("VULNERABLE: other users' private rows are readable:");
        for note in &report.foreign {
            println!(
                "  {}  {}: {} (owner {})",
                note.id,
                note.title,
                note.body,
                note.owner_id,
            );
        }
    }
}
