//! Catt Syntax/Semantic Validator
//!
//! Heuristic single-pass validation over the token sequence produced by the
//! lexer. The pass keeps a flat declared-variable set and an explicit stack
//! of open control blocks; every branch advances the cursor, so the whole
//! pass is linear and always reaches end of input. All state is local to
//! one call.

use std::collections::HashSet;

use super::lexer::{Token, TokenType};
use super::server::{Diagnostic, DiagnosticSeverity, Position, Range};

const DIAGNOSTIC_SOURCE: &str = "Catt LSP";

/// One open control-statement body on the block stack
struct BlockContext {
    is_if: bool,
    start_token: Token,
    start_index: usize,
    brace_count: usize,
}

/// Validator for Catt token sequences
pub struct Validator;

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Run one validation pass over the tokens
    ///
    /// The declared-variable set and block stack are fresh per call; the
    /// validator is reentrant and never mutates or reorders the tokens.
    pub fn validate(&self, tokens: &[Token]) -> Vec<Diagnostic> {
        Pass::new(tokens).run()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// State for a single forward pass
struct Pass<'a> {
    tokens: &'a [Token],
    index: usize,
    declared: HashSet<String>,
    blocks: Vec<BlockContext>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Pass<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            index: 0,
            declared: HashSet::new(),
            blocks: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Diagnostic> {
        while self.index < self.tokens.len() {
            self.step();
        }

        // Whatever is still open never saw its closing brace
        for block in &self.blocks {
            let message = format!("Unclosed block starting at position {}", block.start_index);
            self.diagnostics
                .push(create_error(&block.start_token, message));
        }

        self.diagnostics
    }

    fn step(&mut self) {
        let value = self.tokens[self.index].value.clone();
        let token_type = self.tokens[self.index].token_type;

        // Brace bookkeeping takes precedence over everything else. A stray
        // "}" with an empty stack and a "{" outside any tracked block are
        // both silently ignored.
        if value == "}" {
            if let Some(top) = self.blocks.last_mut() {
                top.brace_count -= 1;
                if top.brace_count == 0 {
                    self.blocks.pop();
                }
            }
            self.index += 1;
            return;
        }
        if value == "{" {
            if let Some(top) = self.blocks.last_mut() {
                // Nested brace inside the tracked block, not the one that
                // opened it
                if top.start_index != self.index {
                    top.brace_count += 1;
                }
            }
            self.index += 1;
            return;
        }

        match token_type {
            TokenType::Unknown => {
                self.report(self.index, format!("Unexpected character: {}", value));
                self.index += 1;
            }
            TokenType::Keyword => match value.as_str() {
                "var" => self.check_var_declaration(),
                "meow" | "meowln" => self.check_print_call(&value),
                "if" | "while" | "for" => self.check_conditional(&value),
                "else" => self.check_else(),
                _ => self.index += 1,
            },
            TokenType::Identifier => {
                if !self.declared.contains(&value) {
                    self.report(self.index, format!("Undefined variable \"{}\"", value));
                }
                self.index += 1;
            }
            _ => self.index += 1,
        }
    }

    /// `var IDENT = <initializer tokens> ;`
    fn check_var_declaration(&mut self) {
        let var_index = self.index;

        let name = match self.tokens.get(self.index + 1) {
            Some(t) if t.token_type == TokenType::Identifier => t.value.clone(),
            _ => {
                self.report(
                    var_index,
                    "var keyword must be followed by an identifier".to_string(),
                );
                self.index += 1;
                return;
            }
        };

        let has_assign = self
            .tokens
            .get(self.index + 2)
            .map(|t| t.value == "=")
            .unwrap_or(false);
        if !has_assign {
            self.report(
                var_index,
                "var declaration requires initialization with '='".to_string(),
            );
            self.index += 2;
            return;
        }

        // The name is registered before the initializer is scanned, so a
        // self-referential initializer like `var x = x;` is accepted.
        self.declared.insert(name);
        self.index += 3;

        while self.index < self.tokens.len() && self.tokens[self.index].value != ";" {
            let token = &self.tokens[self.index];
            if token.token_type == TokenType::Identifier && !self.declared.contains(&token.value) {
                let message = format!("Undefined variable \"{}\" in initialization", token.value);
                self.report(self.index, message);
            }
            self.index += 1;
        }

        if self.index >= self.tokens.len() {
            let last = self.tokens.len().saturating_sub(1);
            self.report(last, "var declaration must end with semicolon".to_string());
        } else {
            // Consume the ";"
            self.index += 1;
        }
    }

    /// `meow(...)` / `meowln(...)` — only paren balance is checked, the
    /// argument tokens themselves are opaque
    fn check_print_call(&mut self, keyword: &str) {
        let keyword_index = self.index;

        let has_paren = self
            .tokens
            .get(self.index + 1)
            .map(|t| t.value == "(")
            .unwrap_or(false);
        if !has_paren {
            self.report(
                keyword_index,
                format!("Invalid {keyword} call. Expected \"(\" after \"{keyword}\""),
            );
            self.index += 1;
            return;
        }

        let (after, balanced) = self.skip_balanced_parens(self.index + 1);
        if !balanced {
            self.report(
                keyword_index,
                format!("Unclosed parenthesis in {keyword} call"),
            );
        }
        self.index = after;
    }

    /// `if (...) {` / `while (...) {` / `for (...) {` — condition tokens are
    /// skipped, not validated
    fn check_conditional(&mut self, keyword: &str) {
        let keyword_index = self.index;

        let has_paren = self
            .tokens
            .get(self.index + 1)
            .map(|t| t.value == "(")
            .unwrap_or(false);
        if !has_paren {
            self.report(
                keyword_index,
                format!("Invalid {keyword} statement. Expected \"(\" after \"{keyword}\""),
            );
            self.index += 1;
            return;
        }

        let (after, balanced) = self.skip_balanced_parens(self.index + 1);
        if !balanced {
            self.report(
                keyword_index,
                format!("Unclosed parenthesis in {keyword} condition"),
            );
            self.index = after;
            return;
        }

        self.expect_block(keyword_index, after, keyword, keyword == "if");
    }

    /// `else { ... }` or `else if (...) { ... }`
    ///
    /// The else is accepted when *any* block on the stack is an if block,
    /// not just the top one. Deliberate laxity, kept as-is.
    fn check_else(&mut self) {
        let else_index = self.index;

        if !self.blocks.iter().any(|b| b.is_if) {
            self.report(
                else_index,
                "else statement without preceding if statement".to_string(),
            );
        }

        let mut brace_index = self.index + 1;
        let next_is_if = self
            .tokens
            .get(brace_index)
            .map(|t| t.value == "if")
            .unwrap_or(false);
        if next_is_if {
            let paren_index = brace_index + 1;
            let has_paren = self
                .tokens
                .get(paren_index)
                .map(|t| t.value == "(")
                .unwrap_or(false);
            if !has_paren {
                self.report(
                    else_index,
                    "Invalid else if statement. Expected \"(\" after \"else if\"".to_string(),
                );
                self.index = paren_index;
                return;
            }

            let (after, balanced) = self.skip_balanced_parens(paren_index);
            if !balanced {
                self.report(
                    else_index,
                    "Unclosed parenthesis in else if condition".to_string(),
                );
                self.index = after;
                return;
            }
            brace_index = after;
        }

        self.expect_block(else_index, brace_index, "else", false);
    }

    /// Require `{` at `brace_index` and open a tracked block anchored at
    /// `anchor_index`
    fn expect_block(&mut self, anchor_index: usize, brace_index: usize, keyword: &str, is_if: bool) {
        let brace = self.tokens.get(brace_index).map(|t| t.value.clone());
        match brace.as_deref() {
            Some("{") => {
                self.blocks.push(BlockContext {
                    is_if,
                    start_token: self.tokens[anchor_index].clone(),
                    start_index: brace_index,
                    brace_count: 1,
                });
                self.index = brace_index + 1;
            }
            Some(_) => {
                self.report(
                    brace_index,
                    format!("Expected block starting with \"{{\" for {keyword} statement"),
                );
                self.index = brace_index;
            }
            None => {
                self.report(
                    anchor_index,
                    format!("Expected block starting with \"{{\" for {keyword} statement"),
                );
                self.index = brace_index;
            }
        }
    }

    /// Skip forward from the opening paren at `open_index` until the
    /// matching close. Returns the index just past the close and whether the
    /// depth ever returned to zero.
    fn skip_balanced_parens(&self, open_index: usize) -> (usize, bool) {
        let mut depth = 1usize;
        let mut index = open_index + 1;
        while index < self.tokens.len() && depth > 0 {
            match self.tokens[index].value.as_str() {
                "(" => depth += 1,
                ")" => depth -= 1,
                _ => {}
            }
            index += 1;
        }
        (index, depth == 0)
    }

    fn report(&mut self, token_index: usize, message: String) {
        let diagnostic = create_error(&self.tokens[token_index], message);
        self.diagnostics.push(diagnostic);
    }
}

/// Build an Error diagnostic spanning the given token
fn create_error(token: &Token, message: String) -> Diagnostic {
    let start = token.position;
    let end = Position {
        line: start.line,
        character: start.character + token.length,
    };

    Diagnostic {
        range: Range { start, end },
        severity: Some(DiagnosticSeverity::Error as u8),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::lexer::Lexer;

    fn diagnostics_for(source: &str) -> Vec<Diagnostic> {
        Validator::new().validate(&Lexer::new().tokenize(source))
    }

    fn messages(source: &str) -> Vec<String> {
        diagnostics_for(source)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let source = "var lives = 9;\n\
                      var name = \"Whiskers\";\n\
                      if (lives) {\n\
                        meowln(name);\n\
                      }\n\
                      while (lives) {\n\
                        var step = lives;\n\
                        meow(step);\n\
                      }\n\
                      for (lives; lives; lives) {\n\
                        meowln(\"loop\");\n\
                      }";
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn test_valid_var_declaration() {
        assert!(diagnostics_for("var x = 5;").is_empty());
    }

    #[test]
    fn test_undefined_variable_in_initialization() {
        let diagnostics = diagnostics_for("var x = y;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Undefined variable \"y\" in initialization");
        assert_eq!(diagnostics[0].severity, Some(1));
    }

    #[test]
    fn test_self_referential_initializer_is_accepted() {
        // The name is registered before the initializer is scanned
        assert!(diagnostics_for("var x = x;").is_empty());
    }

    #[test]
    fn test_declared_variable_is_visible_later() {
        assert!(diagnostics_for("var x = 1;\nvar y = x;").is_empty());
    }

    #[test]
    fn test_undefined_variable_in_statement_position() {
        let msgs = messages("stray");
        assert_eq!(msgs, vec!["Undefined variable \"stray\""]);
    }

    #[test]
    fn test_var_requires_identifier() {
        let msgs = messages("var = 5;");
        assert!(msgs.contains(&"var keyword must be followed by an identifier".to_string()));
    }

    #[test]
    fn test_var_requires_initialization() {
        let msgs = messages("var x 5;");
        assert!(msgs.contains(&"var declaration requires initialization with '='".to_string()));
    }

    #[test]
    fn test_var_requires_semicolon() {
        let diagnostics = diagnostics_for("var x = 5");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "var declaration must end with semicolon");
        // Anchored at the last token examined
        assert_eq!(diagnostics[0].range.start.character, 8);
    }

    #[test]
    fn test_condition_tokens_are_not_validated() {
        // y is undeclared but lives inside the skipped condition
        assert!(diagnostics_for("if (y) { }").is_empty());
    }

    #[test]
    fn test_block_tokens_are_validated() {
        let msgs = messages("if (a) { y; }");
        assert_eq!(msgs, vec!["Undefined variable \"y\""]);
    }

    #[test]
    fn test_unclosed_block_anchored_at_keyword() {
        let diagnostics = diagnostics_for("if (a) {");
        assert_eq!(diagnostics.len(), 1);
        // The "{" is token index 4; the range covers the "if" keyword
        assert_eq!(diagnostics[0].message, "Unclosed block starting at position 4");
        assert_eq!(diagnostics[0].range.start.character, 0);
        assert_eq!(diagnostics[0].range.end.character, 2);
    }

    #[test]
    fn test_unclosed_parenthesis_in_print_call() {
        let msgs = messages("meow(\"hi\"");
        assert_eq!(msgs, vec!["Unclosed parenthesis in meow call"]);
    }

    #[test]
    fn test_print_call_requires_parenthesis() {
        let msgs = messages("meowln;");
        assert_eq!(
            msgs,
            vec!["Invalid meowln call. Expected \"(\" after \"meowln\""]
        );
    }

    #[test]
    fn test_else_without_if() {
        let msgs = messages("else { }");
        assert_eq!(msgs, vec!["else statement without preceding if statement"]);
    }

    #[test]
    fn test_else_inside_open_if_block_is_accepted() {
        // The else binds to any if block still on the stack
        assert!(diagnostics_for("if (a) { else { } }").is_empty());
    }

    #[test]
    fn test_else_binds_to_outer_if() {
        // The top of the stack is a while block; the if further down still
        // satisfies the else
        assert!(diagnostics_for("if (a) { while (b) { else { } } }").is_empty());
    }

    #[test]
    fn test_else_if_condition_is_skipped() {
        assert!(diagnostics_for("if (a) { else if (b) { } }").is_empty());
    }

    #[test]
    fn test_unclosed_parenthesis_in_condition() {
        let msgs = messages("while (a {");
        assert_eq!(msgs, vec!["Unclosed parenthesis in while condition"]);
    }

    #[test]
    fn test_conditional_requires_parenthesis() {
        let msgs = messages("if a { }");
        assert!(msgs.contains(&"Invalid if statement. Expected \"(\" after \"if\"".to_string()));
    }

    #[test]
    fn test_conditional_requires_block() {
        let msgs = messages("if (a) meow(\"hi\")");
        assert_eq!(
            msgs,
            vec!["Expected block starting with \"{\" for if statement"]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let msgs = messages("@");
        assert_eq!(msgs, vec!["Unexpected character: @"]);
    }

    #[test]
    fn test_stray_closing_brace_is_ignored() {
        assert!(diagnostics_for("}").is_empty());
        assert!(diagnostics_for("{ }").is_empty());
    }

    #[test]
    fn test_nested_braces_inside_tracked_block() {
        assert!(diagnostics_for("if (a) { { } }").is_empty());

        let diagnostics = diagnostics_for("if (a) { { }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("Unclosed block"));
    }

    #[test]
    fn test_validate_is_deterministic() {
        let source = "var x = y;\nif (a) {";
        let first = diagnostics_for(source);
        let second = diagnostics_for(source);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_token_sequence() {
        assert!(Validator::new().validate(&[]).is_empty());
    }
}
