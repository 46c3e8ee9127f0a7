//! Interactive chat loop.
//!
//! Input is read concurrently with the pending remote call, so the user can
//! still look at `/file` or `/transcript` while an answer is on its way. Any
//! operation started while another is in flight is rejected by the session.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{ApiError, ChatApi, ClearResponse, QueryResponse, UploadResponse};
use crate::chat::{
    self, ChatError, ChatSession, ClearTicket, QueryTicket, UploadTicket, ValidationError,
};
use crate::render::{html, terminal};

const HELP: &str = "\
Commands:
  /upload <path>    Upload a file (once per session)
  /clear            Clear chat history and the uploaded file
  /file             Show the uploaded file details
  /transcript       Print the whole conversation
  /export <path>    Write the conversation to an HTML file
  /status           Show the session id and control state
  /help             Show this help
  /quit             Exit
Anything else is sent as a question about the uploaded file.";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Upload(Option<PathBuf>),
    Clear,
    File,
    Transcript,
    Export(Option<PathBuf>),
    Status,
    Help,
    Quit,
    Unknown(String),
    Query(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Query(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let path = (!arg.is_empty()).then(|| PathBuf::from(arg));

        match name {
            "upload" => Self::Upload(path),
            "clear" => Self::Clear,
            "file" => Self::File,
            "transcript" | "history" => Self::Transcript,
            "export" => Self::Export(path),
            "status" | "session" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// A remote call that has come back, paired with its ticket.
enum Settled {
    Upload(UploadTicket, Result<UploadResponse, ChatError>),
    Query(QueryTicket, Result<QueryResponse, ApiError>),
    Clear(ClearTicket, Result<ClearResponse, ApiError>),
}

type PendingCall<'a> = Pin<Box<dyn Future<Output = Settled> + 'a>>;

async fn settle(pending: &mut Option<PendingCall<'_>>) -> Settled {
    match pending {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}

fn upload_call<'a>(session: &ChatSession, api: &'a dyn ChatApi, ticket: UploadTicket) -> PendingCall<'a> {
    let session_id = session.session_id().clone();
    Box::pin(async move {
        let result = chat::send_upload(api, &session_id, ticket.path()).await;
        Settled::Upload(ticket, result)
    })
}

fn query_call<'a>(session: &ChatSession, api: &'a dyn ChatApi, ticket: QueryTicket) -> PendingCall<'a> {
    let session_id = session.session_id().clone();
    Box::pin(async move {
        let result = api.query(&session_id, ticket.query()).await;
        Settled::Query(ticket, result)
    })
}

fn clear_call<'a>(session: &ChatSession, api: &'a dyn ChatApi, ticket: ClearTicket) -> PendingCall<'a> {
    let session_id = session.session_id().clone();
    Box::pin(async move {
        let result = api.clear(&session_id).await;
        Settled::Clear(ticket, result)
    })
}

fn print_error(err: &ChatError) {
    if err.is_validation() {
        eprintln!("{}", err.to_string().yellow());
    } else {
        eprintln!("{}", err.to_string().red());
    }
}

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".dimmed()
    }
}

fn format_status(session: &ChatSession) -> String {
    let busy = session
        .in_flight()
        .map_or_else(|| "idle".to_string(), |op| format!("{op} in progress"));
    let transcript = session.transcript();
    format!(
        "Session:   {id}\n\
         State:     {busy}\n\
         Chat:      {chat}\n\
         Upload:    {upload}{gate}\n\
         Submit:    {submit}\n\
         Clear:     {clear}\n\
         Messages:  {messages}{loading}",
        id = session.session_id(),
        chat = if session.chat_visible() { "visible" } else { "hidden" },
        upload = on_off(session.upload_enabled()),
        gate = if session.gate().is_consumed() {
            " (already used this session)"
        } else {
            ""
        },
        submit = on_off(session.submit_enabled()),
        clear = on_off(session.clear_enabled()),
        messages = transcript.entries().count(),
        loading = if transcript.is_loading() { " (waiting for reply)" } else { "" },
    )
}

fn prompt(session: &ChatSession) {
    let marker = if session.in_flight().is_some() {
        "…".dimmed()
    } else {
        ">".bold()
    };
    print!("{marker} ");
    let _ = std::io::stdout().flush();
}

fn handle_settled(session: &mut ChatSession, settled: Settled) {
    match settled {
        Settled::Upload(ticket, result) => match session.finish_upload(ticket, result) {
            Ok(file) => {
                println!("{}", terminal::format_file_details(Some(file)));
                if let Some(banner) = session.banner() {
                    println!("{}", banner.text.green());
                }
                println!("{}", terminal::format_transcript(session.transcript()));
            }
            Err(e) => print_error(&e),
        },
        Settled::Query(ticket, result) => match session.finish_query(ticket, result) {
            Ok(entry) => println!("{}", terminal::format_entry(&entry)),
            Err(e) => print_error(&e),
        },
        Settled::Clear(ticket, result) => match session.finish_clear(ticket, result) {
            Ok(message) => println!("{}", message.green()),
            Err(e) => print_error(&e),
        },
    }
}

async fn export(session: &ChatSession, path: &Path) -> Result<()> {
    let page = html::render_page(
        session.session_id().as_str(),
        session.file(),
        session.transcript(),
    );
    tokio::fs::write(path, page)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Run the interactive loop until `/quit` or end of input.
pub async fn run(api: &dyn ChatApi, initial_file: Option<PathBuf>) -> Result<()> {
    let mut session = ChatSession::new();
    session.start(api).await;

    println!("{} {}", "filechat".bold(), session.session_id().as_str().dimmed());
    println!("Type /help for commands.\n");

    let mut pending: Option<PendingCall<'_>> = None;
    let mut awaiting_confirm = false;

    match initial_file {
        Some(path) => match session.begin_upload(Some(&path)) {
            Ok(ticket) => pending = Some(upload_call(&session, api, ticket)),
            Err(e) => print_error(&e),
        },
        None => println!("{}", "Upload a file with /upload <path> to start.".dimmed()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&session);

    loop {
        tokio::select! {
            settled = settle(&mut pending) => {
                pending = None;
                handle_settled(&mut session, settled);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };

                if awaiting_confirm {
                    awaiting_confirm = false;
                    match session.begin_clear(is_confirmation(&line)) {
                        Ok(Some(ticket)) => pending = Some(clear_call(&session, api, ticket)),
                        Ok(None) => println!("{}", "Cancelled.".dimmed()),
                        Err(e) => print_error(&e),
                    }
                    prompt(&session);
                    continue;
                }

                match ReplCommand::parse(&line) {
                    ReplCommand::Quit => break,
                    ReplCommand::Help => println!("{HELP}"),
                    ReplCommand::Status => println!("{}", format_status(&session)),
                    ReplCommand::File => {
                        println!("{}", terminal::format_file_details(session.file()));
                    }
                    ReplCommand::Transcript => {
                        println!("{}", terminal::format_transcript(session.transcript()));
                    }
                    ReplCommand::Export(None) => eprintln!("{}", "Usage: /export <path>".yellow()),
                    ReplCommand::Export(Some(path)) => match export(&session, &path).await {
                        Ok(()) => println!("Transcript written to {}", path.display()),
                        Err(e) => eprintln!("{}", format!("{e:#}").red()),
                    },
                    ReplCommand::Upload(path) => match session.begin_upload(path.as_deref()) {
                        Ok(ticket) => {
                            println!("{}", format!("Uploading {}...", ticket.path().display()).dimmed());
                            pending = Some(upload_call(&session, api, ticket));
                        }
                        Err(e) => print_error(&e),
                    },
                    ReplCommand::Clear => match session.in_flight() {
                        Some(op) => print_error(&ValidationError::Busy(op).into()),
                        None => {
                            print!("Are you sure you want to clear the chat history? [y/N] ");
                            let _ = std::io::stdout().flush();
                            awaiting_confirm = true;
                            continue;
                        }
                    },
                    ReplCommand::Unknown(name) => {
                        eprintln!("{}", format!("Unknown command /{name}. Type /help.").yellow());
                    }
                    ReplCommand::Query(text) => {
                        if text.is_empty() {
                            prompt(&session);
                            continue;
                        }
                        match session.begin_query(&text) {
                            Ok(ticket) => {
                                println!("{}", terminal::format_loading());
                                pending = Some(query_call(&session, api, ticket));
                            }
                            Err(e) => print_error(&e),
                        }
                    }
                }
            }
        }
        prompt(&session);
    }

    // Let an answer that is already on its way land before exiting.
    if pending.is_some() {
        let settled = settle(&mut pending).await;
        handle_settled(&mut session, settled);
    }
    println!();

    Ok(())
}
