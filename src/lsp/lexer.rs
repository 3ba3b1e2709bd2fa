//! Catt Lexical Scanner
//!
//! Converts Catt source text into an ordered token sequence for the
//! validator. Scanning is total: any input, including empty or malformed
//! text, terminates with a (possibly empty) token list and never fails.

use super::server::Position;

/// Catt language keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    Return,
    If,
    Else,
    While,
    For,
    Function,
    True,
    False,
    Null,
    Meow,
    Meowln,
}

impl Keyword {
    /// All keywords, in completion order
    pub const ALL: [Keyword; 12] = [
        Keyword::Var,
        Keyword::Return,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::For,
        Keyword::Function,
        Keyword::True,
        Keyword::False,
        Keyword::Null,
        Keyword::Meow,
        Keyword::Meowln,
    ];

    /// Parse a keyword from scanned text
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "var" => Some(Self::Var),
            "return" => Some(Self::Return),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "while" => Some(Self::While),
            "for" => Some(Self::For),
            "function" => Some(Self::Function),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "null" => Some(Self::Null),
            "meow" => Some(Self::Meow),
            "meowln" => Some(Self::Meowln),
            _ => None,
        }
    }

    /// The keyword's source text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Return => "return",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Function => "function",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Meow => "meow",
            Self::Meowln => "meowln",
        }
    }

    /// Get documentation for this keyword
    pub fn documentation(&self) -> &'static str {
        match self {
            Self::Var => r#"var - Declare a variable.

Usage:
  var <name> = <value>;

Example:
  var lives = 9;
  var name = "Whiskers";"#,

            Self::Return => r#"return - Return a value from a function.

Usage:
  return <value>;

Example:
  return lives;"#,

            Self::If => r#"if - Execute a block when a condition holds.

Usage:
  if (<condition>) { ... }

Example:
  if (hungry) {
    meowln("feed me");
  }"#,

            Self::Else => r#"else - Alternative block for an if statement.

Usage:
  if (<condition>) { ... } else { ... }
  if (<condition>) { ... } else if (<condition>) { ... }

Example:
  else {
    meowln("nap time");
  }"#,

            Self::While => r#"while - Repeat a block while a condition holds.

Usage:
  while (<condition>) { ... }

Example:
  while (awake) {
    meow("purr");
  }"#,

            Self::For => r#"for - Counted loop.

Usage:
  for (<init>; <condition>; <step>) { ... }

Example:
  for (var i = 0; i < 9; i = i + 1) {
    meowln(i);
  }"#,

            Self::Function => r#"function - Define a function.

Usage:
  function <name>(<params>) { ... }

Example:
  function greet(name) {
    meowln(name);
  }"#,

            Self::True => "true - Boolean literal.",

            Self::False => "false - Boolean literal.",

            Self::Null => "null - The absent value.",

            Self::Meow => r#"meow - Print a value without a trailing newline.

Usage:
  meow(<expression>)

Example:
  meow("purr")"#,

            Self::Meowln => r#"meowln - Print a value followed by a newline.

Usage:
  meowln(<expression>)

Example:
  meowln("meow!")"#,
        }
    }

    /// Get completion snippet for this keyword
    pub fn snippet(&self) -> &'static str {
        match self {
            Self::Var => "var ${1:name} = ${2:value};",
            Self::Return => "return ${1:value};",
            Self::If => "if (${1:condition}) {\n\t$0\n}",
            Self::Else => "else {\n\t$0\n}",
            Self::While => "while (${1:condition}) {\n\t$0\n}",
            Self::For => "for (${1:init}; ${2:condition}; ${3:step}) {\n\t$0\n}",
            Self::Function => "function ${1:name}(${2:params}) {\n\t$0\n}",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Meow => "meow(${1:value})",
            Self::Meowln => "meowln(${1:value})",
        }
    }
}

/// Token types produced by the scanner. The set is closed: the validator
/// dispatches on it by exhaustive case analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Identifier,
    Number,
    String,
    Operator,
    Punctuation,
    Unknown,
}

/// A classified lexical unit with its source position and length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: Position,
    pub length: u32,
}

impl Token {
    fn new(token_type: TokenType, value: String, position: Position) -> Self {
        let length = value.chars().count() as u32;
        Self {
            token_type,
            value,
            position,
            length,
        }
    }
}

/// Operator and punctuation set recognized by the scanner.
///
/// Two-character operators are matched by checking membership of the
/// concatenated pair in this same set, so `==`, `!=`, `&&` and `||` are the
/// only multi-character candidates. If the set ever grows, this merged
/// try-two-then-one rule needs revisiting.
const OPERATORS: [&str; 20] = [
    "+", "-", "*", "/", "%", "==", "!=", "<", ">", "&&", "||", "!", "=", "[", "]", "(", ")", "{",
    "}", ";",
];

fn is_operator(text: &str) -> bool {
    OPERATORS.contains(&text)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Single-pass scanner for Catt source text
pub struct Lexer;

impl Lexer {
    /// Create a new lexer
    pub fn new() -> Self {
        Self
    }

    /// Scan the full document text into a token sequence
    ///
    /// The character counter advances exactly once per consumed character;
    /// a newline outside a string resets it and bumps the line counter.
    /// A newline inside a string literal only advances the character
    /// counter, so positions on that logical line desynchronize from there
    /// on. Known boundary behavior, kept as-is.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut index = 0;
        let mut line = 0u32;
        let mut character = 0u32;

        while index < chars.len() {
            let c = chars[index];

            if c.is_whitespace() {
                if c == '\n' {
                    line += 1;
                    character = 0;
                } else {
                    character += 1;
                }
                index += 1;
                continue;
            }

            let position = Position { line, character };

            // Numbers: a maximal digit run. No sign, decimal point, or
            // exponent handling, so "3.14" scans as 3, ".", 14.
            if is_digit(c) {
                let mut value = String::new();
                while index < chars.len() && is_digit(chars[index]) {
                    value.push(chars[index]);
                    index += 1;
                    character += 1;
                }
                tokens.push(Token::new(TokenType::Number, value, position));
                continue;
            }

            // Identifiers and keywords
            if is_identifier_start(c) {
                let mut value = String::new();
                while index < chars.len() && is_identifier_continue(chars[index]) {
                    value.push(chars[index]);
                    index += 1;
                    character += 1;
                }
                let token_type = if Keyword::from_str(&value).is_some() {
                    TokenType::Keyword
                } else {
                    TokenType::Identifier
                };
                tokens.push(Token::new(token_type, value, position));
                continue;
            }

            // String literals: everything through the closing quote. An
            // unterminated string silently spans to end of input; the
            // validator is responsible for any diagnostics, not the scanner.
            if c == '"' {
                let mut value = String::new();
                value.push('"');
                index += 1;
                character += 1;
                while index < chars.len() && chars[index] != '"' {
                    value.push(chars[index]);
                    index += 1;
                    character += 1;
                }
                if index < chars.len() {
                    value.push('"');
                    index += 1;
                    character += 1;
                }
                tokens.push(Token::new(TokenType::String, value, position));
                continue;
            }

            if is_operator(c.to_string().as_str()) {
                // Greedy two-character match first
                if index + 1 < chars.len() {
                    let pair: String = [c, chars[index + 1]].iter().collect();
                    if is_operator(&pair) {
                        tokens.push(Token::new(TokenType::Operator, pair, position));
                        index += 2;
                        character += 2;
                        continue;
                    }
                }
                tokens.push(Token::new(TokenType::Operator, c.to_string(), position));
                index += 1;
                character += 1;
                continue;
            }

            // Anything else becomes a single-character unknown token
            tokens.push(Token::new(TokenType::Unknown, c.to_string(), position));
            index += 1;
            character += 1;
        }

        tokens
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    #[test]
    fn test_tokenize_var_declaration() {
        let tokens = tokenize("var x = 5;");

        let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::Keyword,
                TokenType::Identifier,
                TokenType::Operator,
                TokenType::Number,
                TokenType::Operator,
            ]
        );
        assert_eq!(values, vec!["var", "x", "=", "5", ";"]);
    }

    #[test]
    fn test_numbers_have_no_decimal_support() {
        let tokens = tokenize("3.14");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token_type, TokenType::Number);
        assert_eq!(tokens[0].value, "3");
        assert_eq!(tokens[1].token_type, TokenType::Unknown);
        assert_eq!(tokens[1].value, ".");
        assert_eq!(tokens[2].token_type, TokenType::Number);
        assert_eq!(tokens[2].value, "14");
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        let tokens = tokenize("var meowln whiskers if iffy");

        let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::Keyword,
                TokenType::Keyword,
                TokenType::Identifier,
                TokenType::Keyword,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn test_string_literal_includes_quotes() {
        let tokens = tokenize("meow(\"hi\")");

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].token_type, TokenType::String);
        assert_eq!(tokens[2].value, "\"hi\"");
        assert_eq!(tokens[2].length, 4);
    }

    #[test]
    fn test_unterminated_string_spans_to_eof() {
        let tokens = tokenize("var s = \"abc");

        let last = tokens.last().unwrap();
        assert_eq!(last.token_type, TokenType::String);
        assert_eq!(last.value, "\"abc");
    }

    #[test]
    fn test_two_character_operators() {
        let tokens = tokenize("a == b && c != d || !e");

        let operators: Vec<&str> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::Operator)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(operators, vec!["==", "&&", "!=", "||", "!"]);
    }

    #[test]
    fn test_position_tracking_across_lines() {
        let tokens = tokenize("var x = 1;\nvar y = 2;");

        let second_var = &tokens[5];
        assert_eq!(second_var.value, "var");
        assert_eq!(second_var.position.line, 1);
        assert_eq!(second_var.position.character, 0);

        let y = &tokens[6];
        assert_eq!(y.value, "y");
        assert_eq!(y.position.line, 1);
        assert_eq!(y.position.character, 4);
    }

    #[test]
    fn test_empty_and_whitespace_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n\n  ").is_empty());
    }

    #[test]
    fn test_unknown_characters() {
        let tokens = tokenize("@ , :");

        assert_eq!(tokens.len(), 3);
        for token in &tokens {
            assert_eq!(token.token_type, TokenType::Unknown);
            assert_eq!(token.length, 1);
        }
        assert_eq!(tokens[0].value, "@");
        assert_eq!(tokens[1].value, ",");
        assert_eq!(tokens[2].value, ":");
    }

    #[test]
    fn test_tokens_and_whitespace_reconstruct_source() {
        // Token values in scan order, interleaved with the exact skipped
        // whitespace, rebuild the input. Tokens never start with
        // whitespace, so the interleaving is unambiguous even though the
        // string literal contains a space.
        let source = "var count = 42;\nif (count) {\n\tmeowln(\"mrrp mrrp\");\n}";
        let tokens = tokenize(source);

        let mut source_chars = source.chars().peekable();
        let mut rebuilt = String::new();
        for token in &tokens {
            while source_chars.peek().map(|c| c.is_whitespace()).unwrap_or(false) {
                rebuilt.push(source_chars.next().unwrap());
            }
            for expected in token.value.chars() {
                let actual = source_chars.next().unwrap();
                assert_eq!(actual, expected);
                rebuilt.push(actual);
            }
        }
        for trailing in source_chars {
            assert!(trailing.is_whitespace());
            rebuilt.push(trailing);
        }

        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let source = "var x = 1; meow(x)";
        assert_eq!(tokenize(source), tokenize(source));
    }

    #[test]
    fn test_keyword_roundtrip() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::from_str(keyword.as_str()), Some(keyword));
        }
        assert_eq!(Keyword::from_str("purr"), None);
    }
}
