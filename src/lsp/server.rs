//! Catt LSP Server Implementation

use super::completion::CompletionProvider;
use super::diagnostics::DiagnosticsProvider;
use super::hover::HoverProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// LSP message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum LspMessage {
    #[serde(rename = "initialize")]
    Initialize { id: i64, params: InitializeParams },

    #[serde(rename = "initialized")]
    Initialized,

    #[serde(rename = "shutdown")]
    Shutdown { id: i64 },

    #[serde(rename = "exit")]
    Exit,

    #[serde(rename = "textDocument/didOpen")]
    DidOpen { params: DidOpenParams },

    #[serde(rename = "textDocument/didChange")]
    DidChange { params: DidChangeParams },

    #[serde(rename = "textDocument/didClose")]
    DidClose { params: DidCloseParams },

    #[serde(rename = "textDocument/diagnostic")]
    DocumentDiagnostic {
        id: i64,
        params: DocumentDiagnosticParams,
    },

    #[serde(rename = "textDocument/completion")]
    Completion { id: i64, params: CompletionParams },

    #[serde(rename = "textDocument/hover")]
    Hover { id: i64, params: HoverParams },
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub process_id: Option<i64>,
    pub root_uri: Option<String>,
    #[serde(default)]
    pub capabilities: ClientCapabilities,
}

/// Client capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    pub text_document: Option<TextDocumentClientCapabilities>,
}

/// Text document capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentClientCapabilities {
    pub completion: Option<CompletionClientCapabilities>,
    pub hover: Option<HoverClientCapabilities>,
}

/// Completion capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionClientCapabilities {
    pub snippet_support: Option<bool>,
}

/// Hover capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoverClientCapabilities {}

/// Document open params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenParams {
    pub text_document: TextDocumentItem,
}

/// Document change params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeParams {
    pub text_document: VersionedTextDocumentIdentifier,
    pub content_changes: Vec<TextDocumentContentChangeEvent>,
}

/// Document close params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidCloseParams {
    pub text_document: TextDocumentIdentifier,
}

/// Pull diagnostics params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDiagnosticParams {
    pub text_document: TextDocumentIdentifier,
}

/// Completion params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

/// Hover params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

/// Text document item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    pub language_id: String,
    pub version: i64,
    pub text: String,
}

/// Text document identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

/// Versioned text document identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    pub version: i64,
}

/// Text document change event (full sync)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentContentChangeEvent {
    pub text: String,
}

/// Zero-based position in a document. `character` counts scanned units
/// since the last newline, one per character, not visual columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Range in a document; `end` is exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Diagnostic severity (LSP numeric codes). The validator only ever emits
/// `Error`; extensions must reuse these codes rather than invent new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

/// Diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Option<u8>,
    pub source: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<serde_json::Value>,
}

/// Full document diagnostic report, the shape editor clients expect for a
/// pull diagnostics response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDiagnosticReport {
    /// Always "full"; every request re-scans the whole document
    pub kind: String,
    pub items: Vec<Diagnostic>,
}

/// Publish diagnostics params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<i64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Server capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub text_document_sync: TextDocumentSyncOptions,
    pub completion_provider: Option<CompletionOptions>,
    pub hover_provider: Option<bool>,
    pub diagnostic_provider: Option<DiagnosticOptions>,
}

/// Text document sync options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentSyncOptions {
    pub open_close: bool,
    pub change: u8, // 1 = Full, 2 = Incremental
}

/// Completion options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub resolve_provider: bool,
}

/// Diagnostic options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticOptions {
    pub inter_file_dependencies: bool,
    pub workspace_diagnostics: bool,
}

/// Initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
}

/// Completion item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    pub kind: Option<u8>,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub insert_text: Option<String>,
    pub insert_text_format: Option<u8>,
}

/// Hover result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hover {
    pub contents: MarkupContent,
    pub range: Option<Range>,
}

/// Markup content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupContent {
    pub kind: String,
    pub value: String,
}

/// Document state
struct DocumentState {
    content: String,
    version: i64,
}

/// Catt Language Server
///
/// Owns the in-memory document store keyed by URI. Diagnostics are
/// recomputed from scratch on every request; nothing is cached between
/// calls.
pub struct CattLanguageServer {
    documents: Arc<RwLock<HashMap<String, DocumentState>>>,
    completion_provider: CompletionProvider,
    hover_provider: HoverProvider,
    diagnostics_provider: DiagnosticsProvider,
    snippet_support: bool,
}

impl CattLanguageServer {
    /// Create a new language server
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            completion_provider: CompletionProvider::new(),
            hover_provider: HoverProvider::new(),
            diagnostics_provider: DiagnosticsProvider::new(),
            snippet_support: false,
        }
    }

    /// Handle initialize request
    pub fn initialize(&mut self, params: &InitializeParams) -> InitializeResult {
        if let Some(ref td) = params.capabilities.text_document {
            if let Some(ref completion) = td.completion {
                self.snippet_support = completion.snippet_support.unwrap_or(false);
            }
        }

        InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: TextDocumentSyncOptions {
                    open_close: true,
                    change: 1, // Full sync
                },
                completion_provider: Some(CompletionOptions {
                    resolve_provider: false,
                }),
                hover_provider: Some(true),
                diagnostic_provider: Some(DiagnosticOptions {
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                }),
            },
        }
    }

    /// Handle document open
    pub fn did_open(&self, params: &DidOpenParams) -> Vec<Diagnostic> {
        let report = self
            .diagnostics_provider
            .produce_diagnostics(&params.text_document.text);

        let mut docs = self.documents.write().unwrap();
        docs.insert(
            params.text_document.uri.clone(),
            DocumentState {
                content: params.text_document.text.clone(),
                version: params.text_document.version,
            },
        );

        report.items
    }

    /// Handle document change (full sync: the last change event carries the
    /// whole document)
    pub fn did_change(&self, params: &DidChangeParams) -> Vec<Diagnostic> {
        if let Some(change) = params.content_changes.last() {
            let report = self.diagnostics_provider.produce_diagnostics(&change.text);

            let mut docs = self.documents.write().unwrap();
            docs.insert(
                params.text_document.uri.clone(),
                DocumentState {
                    content: change.text.clone(),
                    version: params.text_document.version,
                },
            );

            return report.items;
        }

        Vec::new()
    }

    /// Handle document close
    pub fn did_close(&self, params: &DidCloseParams) {
        let mut docs = self.documents.write().unwrap();
        docs.remove(&params.text_document.uri);
    }

    /// Handle a pull diagnostics request
    ///
    /// Returns `None` when the document is not in the store; the transport
    /// answers with an empty report and the analysis core is never invoked.
    pub fn document_diagnostic(
        &self,
        params: &DocumentDiagnosticParams,
    ) -> Option<DocumentDiagnosticReport> {
        let docs = self.documents.read().unwrap();
        let doc = docs.get(&params.text_document.uri)?;
        Some(self.diagnostics_provider.produce_diagnostics(&doc.content))
    }

    /// Handle completion request
    pub fn completion(&self, params: &CompletionParams) -> Vec<CompletionItem> {
        let docs = self.documents.read().unwrap();

        if let Some(doc) = docs.get(&params.text_document.uri) {
            return self.completion_provider.get_completions(
                &doc.content,
                params.position.line as usize,
                params.position.character as usize,
                self.snippet_support,
            );
        }

        Vec::new()
    }

    /// Handle hover request
    pub fn hover(&self, params: &HoverParams) -> Option<Hover> {
        let docs = self.documents.read().unwrap();

        if let Some(doc) = docs.get(&params.text_document.uri) {
            return self.hover_provider.get_hover(
                &doc.content,
                params.position.line as usize,
                params.position.character as usize,
            );
        }

        None
    }

    /// Current version of an open document, if any
    pub fn document_version(&self, uri: &str) -> Option<i64> {
        let docs = self.documents.read().unwrap();
        docs.get(uri).map(|doc| doc.version)
    }
}

impl Default for CattLanguageServer {
    fn default() -> Self {
        Self::new()
    }
}
