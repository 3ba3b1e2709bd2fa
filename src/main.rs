//! Catt Language Server Binary
//!
//! Speaks JSON-RPC over stdin/stdout with `Content-Length` framing and
//! dispatches to the language server. Logging goes to stderr; stdout
//! belongs to the protocol.

use catt_lsp::error::{CattError, Result};
use catt_lsp::lsp::{
    CattLanguageServer, Diagnostic, DocumentDiagnosticReport, LspMessage, PublishDiagnosticsParams,
};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, BufReader, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Catt LSP - language server for the Catt programming language
#[derive(Parser)]
#[command(name = "catt-lsp")]
#[command(version)]
#[command(about = "Language server for the Catt programming language", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Use stdio transport (the default; accepted for editor compatibility)
    #[arg(long)]
    stdio: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Starting Catt Language Server");
    if cli.stdio {
        debug!("stdio transport requested explicitly");
    }

    let mut server = CattLanguageServer::new();
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = io::stdout();

    loop {
        let raw = match read_message(&mut reader)? {
            Some(raw) => raw,
            None => {
                info!("Client closed the stream, exiting");
                break;
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                error!("Failed to parse message: {}", err);
                continue;
            }
        };

        if !handle_message(&mut server, &mut stdout, value)? {
            break;
        }
    }

    Ok(())
}

/// Read one `Content-Length`-framed message; `None` on end of stream
fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if line.to_lowercase().starts_with("content-length:") {
            if let Some(len_str) = line.split(':').nth(1) {
                content_length = len_str.trim().parse().ok();
            }
        }
    }

    let length = content_length
        .ok_or_else(|| CattError::Protocol("missing Content-Length header".to_string()))?;

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    Ok(Some(String::from_utf8_lossy(&body).into_owned()))
}

/// Dispatch one message; returns false when the server should exit
fn handle_message(
    server: &mut CattLanguageServer,
    stdout: &mut io::Stdout,
    value: Value,
) -> Result<bool> {
    let message: LspMessage = match serde_json::from_value(value.clone()) {
        Ok(message) => message,
        Err(_) => {
            let method = value
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>");
            if let Some(id) = value.get("id") {
                warn!("Unsupported request: {}", method);
                send_error(stdout, id.clone(), -32601, "method not found")?;
            } else {
                debug!("Ignoring notification: {}", method);
            }
            return Ok(true);
        }
    };

    match message {
        LspMessage::Initialize { id, params } => {
            debug!("Initializing for client process {:?}", params.process_id);
            let result = server.initialize(&params);
            send_response(stdout, id, &result)?;
        }
        LspMessage::Initialized => {
            debug!("Client initialized");
        }
        LspMessage::Shutdown { id } => {
            send_response(stdout, id, &Value::Null)?;
        }
        LspMessage::Exit => {
            info!("Exit requested");
            return Ok(false);
        }
        LspMessage::DidOpen { params } => {
            let uri = params.text_document.uri.clone();
            let diagnostics = server.did_open(&params);
            let version = server.document_version(&uri);
            publish_diagnostics(stdout, &uri, version, diagnostics)?;
        }
        LspMessage::DidChange { params } => {
            let uri = params.text_document.uri.clone();
            let diagnostics = server.did_change(&params);
            let version = server.document_version(&uri);
            publish_diagnostics(stdout, &uri, version, diagnostics)?;
        }
        LspMessage::DidClose { params } => {
            let uri = params.text_document.uri.clone();
            server.did_close(&params);
            // Clear any stale diagnostics for the closed document
            publish_diagnostics(stdout, &uri, None, Vec::new())?;
        }
        LspMessage::DocumentDiagnostic { id, params } => {
            // An unknown document yields an empty report; the analysis core
            // is never invoked for it
            let report = server
                .document_diagnostic(&params)
                .unwrap_or(DocumentDiagnosticReport {
                    kind: "full".to_string(),
                    items: Vec::new(),
                });
            send_response(stdout, id, &report)?;
        }
        LspMessage::Completion { id, params } => {
            let items = server.completion(&params);
            send_response(stdout, id, &items)?;
        }
        LspMessage::Hover { id, params } => {
            let hover = server.hover(&params);
            send_response(stdout, id, &hover)?;
        }
    }

    Ok(true)
}

fn send_response<T: Serialize>(stdout: &mut io::Stdout, id: i64, result: &T) -> Result<()> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    });
    write_message(stdout, &body)
}

fn send_error(stdout: &mut io::Stdout, id: Value, code: i64, message: &str) -> Result<()> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    });
    write_message(stdout, &body)
}

fn send_notification<T: Serialize>(
    stdout: &mut io::Stdout,
    method: &str,
    params: &T,
) -> Result<()> {
    let body = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    write_message(stdout, &body)
}

fn publish_diagnostics(
    stdout: &mut io::Stdout,
    uri: &str,
    version: Option<i64>,
    diagnostics: Vec<Diagnostic>,
) -> Result<()> {
    let params = PublishDiagnosticsParams {
        uri: uri.to_string(),
        version,
        diagnostics,
    };
    send_notification(stdout, "textDocument/publishDiagnostics", &params)
}

fn write_message(stdout: &mut io::Stdout, body: &Value) -> Result<()> {
    let content = serde_json::to_string(body)?;
    write!(stdout, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    stdout.flush()?;
    Ok(())
}
