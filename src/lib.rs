//! Catt LSP - Language server for the Catt programming language
//!
//! Catt is a small cat-themed scripting language. This crate provides
//! editor support for it over the Language Server Protocol:
//!
//! - Diagnostics (lexical scanning + heuristic syntax/semantic validation)
//! - Auto-completion for keywords
//! - Hover documentation

pub mod error;
pub mod lsp;

pub use error::{CattError, Result};
pub use lsp::CattLanguageServer;
