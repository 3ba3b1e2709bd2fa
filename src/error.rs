//! Error types for the Catt language server
//!
//! These cover the transport layer only. The analysis core (lexer and
//! validator) is total: malformed source text is exactly what diagnostics
//! describe, so it never surfaces as an error here.

use thiserror::Error;

/// Result type for Catt LSP operations
pub type Result<T> = std::result::Result<T, CattError>;

/// Catt language server error types
#[derive(Error, Debug)]
pub enum CattError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
