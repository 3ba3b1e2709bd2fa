//! Diagnostics Provider for the Catt LSP
//!
//! Ties the lexer and validator together and wraps the result in the
//! report shape editor clients expect. Stateless: every call re-scans the
//! whole document.

use super::lexer::Lexer;
use super::server::DocumentDiagnosticReport;
use super::validator::Validator;

/// Diagnostics provider for Catt documents
pub struct DiagnosticsProvider {
    lexer: Lexer,
    validator: Validator,
}

impl DiagnosticsProvider {
    /// Create a new diagnostics provider
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            validator: Validator::new(),
        }
    }

    /// Produce the full diagnostic report for a document text
    pub fn produce_diagnostics(&self, text: &str) -> DocumentDiagnosticReport {
        let tokens = self.lexer.tokenize(text);
        let items = self.validator.validate(&tokens);

        DocumentDiagnosticReport {
            kind: "full".to_string(),
            items,
        }
    }
}

impl Default for DiagnosticsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_is_full() {
        let provider = DiagnosticsProvider::new();
        let report = provider.produce_diagnostics("var x = 5;");
        assert_eq!(report.kind, "full");
        assert!(report.items.is_empty());
    }

    #[test]
    fn test_report_collects_validator_diagnostics() {
        let provider = DiagnosticsProvider::new();
        let report = provider.produce_diagnostics("var x = y;");
        assert_eq!(report.items.len(), 1);
        assert_eq!(
            report.items[0].message,
            "Undefined variable \"y\" in initialization"
        );
    }

    #[test]
    fn test_wire_shape() {
        let provider = DiagnosticsProvider::new();
        let report = provider.produce_diagnostics("var x = y;");

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "full");
        assert_eq!(value["items"][0]["severity"], 1);
        assert_eq!(value["items"][0]["source"], "Catt LSP");
        assert_eq!(value["items"][0]["range"]["start"]["line"], 0);
        assert_eq!(value["items"][0]["range"]["start"]["character"], 8);
        assert_eq!(value["items"][0]["range"]["end"]["character"], 9);
        // data is optional and absent when unset
        assert!(value["items"][0].get("data").is_none());
    }

    #[test]
    fn test_identical_input_produces_identical_report() {
        let provider = DiagnosticsProvider::new();
        let source = "if (a) {\nmeow(\"hi\"";
        let first = provider.produce_diagnostics(source);
        let second = provider.produce_diagnostics(source);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
