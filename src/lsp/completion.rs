//! Completion Provider for the Catt LSP
//!
//! Static keyword completion: the candidate list is fixed and matched
//! against the word prefix before the cursor. No analysis of the document
//! beyond that.

use super::lexer::{is_identifier_continue, Keyword};
use super::server::CompletionItem;

/// Completion provider for Catt
pub struct CompletionProvider;

impl CompletionProvider {
    /// Create a new completion provider
    pub fn new() -> Self {
        Self
    }

    /// Get completions at the given position
    pub fn get_completions(
        &self,
        content: &str,
        line: usize,
        column: usize,
        snippet_support: bool,
    ) -> Vec<CompletionItem> {
        let lines: Vec<&str> = content.lines().collect();
        let current_line = lines.get(line).copied().unwrap_or("");
        let chars: Vec<char> = current_line.chars().collect();

        // The client column counts characters, not bytes
        let cursor = column.min(chars.len());
        let mut start = cursor;
        while start > 0 && is_identifier_continue(chars[start - 1]) {
            start -= 1;
        }
        let prefix: String = chars[start..cursor].iter().collect();

        self.keyword_completions(snippet_support)
            .into_iter()
            .filter(|item| prefix.is_empty() || item.label.starts_with(&prefix))
            .collect()
    }

    /// Get keyword completions
    fn keyword_completions(&self, snippet_support: bool) -> Vec<CompletionItem> {
        Keyword::ALL
            .iter()
            .map(|keyword| CompletionItem {
                label: keyword.as_str().to_string(),
                kind: Some(14), // Keyword
                detail: Some(format!("{} keyword", keyword.as_str())),
                documentation: Some(keyword.documentation().to_string()),
                insert_text: if snippet_support {
                    Some(keyword.snippet().to_string())
                } else {
                    Some(keyword.as_str().to_string())
                },
                insert_text_format: if snippet_support { Some(2) } else { Some(1) },
            })
            .collect()
    }
}

impl Default for CompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}
