//! Clap config
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// davplay - browse and play media from WebDAV libraries.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Library file (default: <config dir>/davplay/libraries.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verify TLS certificates and hostnames
    #[arg(long, global = true)]
    pub verify_tls: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add or replace a library
    Add {
        name: String,
        /// Base URL, e.g. https://nas.local/dav/
        #[arg(long)]
        url: String,
        #[arg(long)]
        account: Option<String>,
        /// Stored in the system keyring, never in the library file
        #[arg(long)]
        password: Option<String>,
        /// Reject malformed PROPFIND responses
        #[arg(long)]
        strict: bool,
    },
    /// Remove a library and its stored password
    Remove { name: String },
    /// Show configured libraries
    Libraries,
    /// List a directory (default: the library root)
    List { library: String, path: Option<String> },
    /// Download a file to disk or stdout
    Cat {
        library: String,
        path: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a URL a media player can open directly
    PlayUrl { library: String, path: String },
    /// Check that a library is reachable
    Test { library: String },
}
