//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// filechat - upload a file, then chat about it
#[derive(Parser, Debug)]
#[command(name = "filechat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the filechat server (overrides the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Upload this file before the first prompt
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Upload a file, ask one question, print the answer and clean up
    Ask {
        /// File to upload
        #[arg(short, long)]
        file: PathBuf,

        /// Question to ask
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
    },

    /// Run the upload/query server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for uploaded files
        #[arg(long)]
        upload_dir: Option<PathBuf>,

        /// Open the landing page in a browser
        #[arg(long)]
        open: bool,
    },

    /// Check that the server is up
    Health,
}
