use std::path::PathBuf;
use clap::{Parser, Subcommand};
use uuid::Uuid;
use noteprobe::bin_constants::DEFAULT_CONFIG_FILE;

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, author, about)]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// List your notes, newest first.
    List,

    /// Create a note owned by the signed-in user.
    Add {
        title: String,
        body: String,
    },

    /// Delete a note by id. Whether you may delete somebody else's note
    /// is for the store to decide.
    Delete {
        id: Uuid,
    },

    /// Issue an unfiltered read of the whole notes collection and report
    /// whose rows came back.
    Probe,

    /// End the current session.
    SignOut,
}
