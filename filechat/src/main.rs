//! filechat - upload a file, then ask questions about it.
//!
//! Architecture:
//! - `chat` holds the client-side session state and the upload/query/clear
//!   controllers; it talks to the backend only through the `ChatApi` trait
//! - `api` is the HTTP implementation of that trait
//! - `server` is the backend the client talks to
//! - `render` turns session state into terminal output or an HTML page

mod api;
mod chat;
mod cli;
mod config;
mod models;
mod render;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "filechat=debug"
    } else {
        "filechat=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    execute(cli).await
}
