//! CLI command execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::api::HttpApi;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::render::terminal;
use crate::server;

use super::args::{Cli, Commands};
use super::repl;

pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.client.base_url = url;
    }

    match cli.command {
        None => repl::run(&HttpApi::new(&config.client.base_url), None).await,
        Some(Commands::Chat { file }) => {
            repl::run(&HttpApi::new(&config.client.base_url), file).await
        }
        Some(Commands::Ask { file, query }) => {
            let query = query.join(" ");
            ask_once(&HttpApi::new(&config.client.base_url), &file, &query).await
        }
        Some(Commands::Serve {
            host,
            port,
            upload_dir,
            open,
        }) => serve(config, host, port, upload_dir, open).await,
        Some(Commands::Health) => health(&HttpApi::new(&config.client.base_url)).await,
    }
}

async fn serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    upload_dir: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(dir) = upload_dir {
        config.server.upload_dir = dir;
    }

    server::start_server(config.server, open).await
}

/// Fresh session: cleanup, upload, one query, then clear what we uploaded.
async fn ask_once(api: &HttpApi, file: &Path, query: &str) -> Result<()> {
    let mut session = ChatSession::new();
    session.start(api).await;

    let uploaded = session.upload(api, Some(file)).await?;
    println!("{}\n", terminal::format_file_details(Some(uploaded)));

    let answer = session.ask(api, query).await?;
    println!("{}", terminal::format_entry(&answer));

    if let Err(e) = session.clear(api, true).await {
        warn!(error = %e, "Could not clear session after answering");
    }

    Ok(())
}

async fn health(api: &HttpApi) -> Result<()> {
    let health = api
        .health()
        .await
        .with_context(|| format!("Server at {} is not reachable", api.base_url()))?;
    println!("{} ({}): {}", api.base_url(), health.service, health.status);
    Ok(())
}
