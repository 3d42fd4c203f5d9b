//! Recoverable diagnostics accumulated across pipeline stages.

use serde::{Deserialize, Serialize};

/// Codes for recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// W001: the harmony engine substituted a generic progression.
    HarmonyFallback,
    /// W002: a requested instrument was moved to a role it can play.
    InstrumentReassignment,
    /// W003: a style tag could not be resolved to a template.
    StyleUnavailable,
    /// W004: no style resolved and the registry default was used.
    DefaultStyleSubstituted,
    /// W005: an inferred value was clamped into bounds.
    ValueClamped,
}

impl DiagnosticCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::HarmonyFallback => "W001",
            DiagnosticCode::InstrumentReassignment => "W002",
            DiagnosticCode::StyleUnavailable => "W003",
            DiagnosticCode::DefaultStyleSubstituted => "W004",
            DiagnosticCode::ValueClamped => "W005",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single recoverable condition with the stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code.
    pub code: DiagnosticCode,
    /// Stage that raised the diagnostic (e.g., "harmony").
    pub stage: String,
    /// Human-readable message.
    pub message: String,
    /// Field or entity the diagnostic refers to (e.g., "tempo", "styles\[1\]").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            stage: stage.into(),
            message: message.into(),
            path: None,
        }
    }

    /// Attaches a field path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path {
            Some(ref path) => write!(
                f,
                "{} [{}]: {} (at {})",
                self.code, self.stage, self.message, path
            ),
            None => write!(f, "{} [{}]: {}", self.code, self.stage, self.message),
        }
    }
}

/// Ordered list of diagnostics for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Appends all diagnostics from another list, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Whether any diagnostic carries the given code.
    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    /// Number of diagnostics with the given code.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.0.iter().filter(|d| d.code == code).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self(items)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_codes() {
        assert_eq!(DiagnosticCode::HarmonyFallback.code(), "W001");
        assert_eq!(DiagnosticCode::InstrumentReassignment.code(), "W002");
        assert_eq!(DiagnosticCode::ValueClamped.code(), "W005");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(
            DiagnosticCode::ValueClamped,
            "parameters",
            "tempo 260 clamped to 240",
        );
        assert_eq!(d.to_string(), "W005 [parameters]: tempo 260 clamped to 240");

        let d = d.with_path("tempo");
        assert_eq!(
            d.to_string(),
            "W005 [parameters]: tempo 260 clamped to 240 (at tempo)"
        );
    }

    #[test]
    fn test_diagnostics_accumulate_in_order() {
        let mut all = Diagnostics::new();
        all.push(Diagnostic::new(DiagnosticCode::StyleUnavailable, "parameters", "a"));

        let mut more = Diagnostics::new();
        more.push(Diagnostic::new(DiagnosticCode::HarmonyFallback, "harmony", "b"));
        all.extend(more);

        assert_eq!(all.len(), 2);
        assert!(all.has(DiagnosticCode::HarmonyFallback));
        assert!(!all.has(DiagnosticCode::ValueClamped));
        let stages: Vec<_> = all.iter().map(|d| d.stage.as_str()).collect();
        assert_eq!(stages, vec!["parameters", "harmony"]);
    }

    #[test]
    fn test_diagnostics_serialize_as_array() {
        let mut all = Diagnostics::new();
        all.push(Diagnostic::new(DiagnosticCode::HarmonyFallback, "harmony", "generic"));
        let json = serde_json::to_string(&all).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"code\":\"harmony_fallback\""));
    }
}
