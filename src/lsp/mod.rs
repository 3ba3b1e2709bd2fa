//! Catt Language Server Protocol Implementation
//!
//! Provides IDE support for Catt editing including:
//! - Diagnostics (linting)
//! - Auto-completion
//! - Hover documentation

mod completion;
mod diagnostics;
mod hover;
mod lexer;
mod server;
mod validator;

pub use completion::CompletionProvider;
pub use diagnostics::DiagnosticsProvider;
pub use hover::HoverProvider;
pub use lexer::{Keyword, Lexer, Token, TokenType};
pub use server::{
    CattLanguageServer, Diagnostic, DiagnosticSeverity, DocumentDiagnosticReport, LspMessage,
    Position, PublishDiagnosticsParams, Range,
};
pub use validator::Validator;
