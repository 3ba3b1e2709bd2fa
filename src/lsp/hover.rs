//! Hover Provider for the Catt LSP
//!
//! String matching only: extracts the word under the cursor and looks it up
//! in the fixed keyword documentation table.

use super::lexer::{is_identifier_continue, Keyword};
use super::server::{Hover, MarkupContent, Position, Range};

/// Hover provider for Catt
pub struct HoverProvider;

impl HoverProvider {
    /// Create a new hover provider
    pub fn new() -> Self {
        Self
    }

    /// Get hover information at the given position
    pub fn get_hover(&self, content: &str, line: usize, column: usize) -> Option<Hover> {
        let lines: Vec<&str> = content.lines().collect();
        let current_line = lines.get(line)?;
        let chars: Vec<char> = current_line.chars().collect();

        if column >= chars.len() || !is_identifier_continue(chars[column]) {
            return None;
        }

        let mut start = column;
        while start > 0 && is_identifier_continue(chars[start - 1]) {
            start -= 1;
        }
        let mut end = column;
        while end < chars.len() && is_identifier_continue(chars[end]) {
            end += 1;
        }

        let word: String = chars[start..end].iter().collect();
        let keyword = Keyword::from_str(&word)?;

        Some(Hover {
            contents: MarkupContent {
                kind: "markdown".to_string(),
                value: format!("```catt\n{}\n```\n\n{}", word, keyword.documentation()),
            },
            range: Some(Range {
                start: Position {
                    line: line as u32,
                    character: start as u32,
                },
                end: Position {
                    line: line as u32,
                    character: end as u32,
                },
            }),
        })
    }
}

impl Default for HoverProvider {
    fn default() -> Self {
        Self::new()
    }
}
