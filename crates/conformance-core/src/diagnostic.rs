//! Diagnostic types for reporting conformance violations.

use miette::SourceSpan;
use serde::{Deserialize, Serialize};

/// Severity level for conformance diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One reported conformance violation.
///
/// A diagnostic is a value object. The `identifier` is a stable machine key
/// (e.g., `"commandTest.missingCommandTester"`) used for suppression and
/// filtering; it must not change across versions for the same rule and
/// condition. The message must be self-explanatory without the tips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable machine identifier for this rule + condition pairing.
    pub identifier: String,
    /// Human-readable message.
    pub message: String,
    /// Ordered remediation tips; each one is independently actionable.
    pub tips: Vec<String>,
    /// 1-indexed source line, if known.
    pub line: Option<usize>,
    /// Severity of this diagnostic.
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates a new diagnostic with the default `Error` severity.
    #[must_use]
    pub fn new(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            message: message.into(),
            tips: Vec::new(),
            line: None,
            severity: Severity::Error,
        }
    }

    /// Appends a remediation tip. Tips keep their insertion order.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }

    /// Sets the source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = match self.line {
            Some(line) => format!("[{}] line {line}\n", self.identifier),
            None => format!("[{}]\n", self.identifier),
        };
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        for tip in &self.tips {
            let _ = writeln!(output, "  = tip: {tip}");
        }
        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{}: [{}] {} (line {line})",
                self.severity, self.identifier, self.message
            ),
            None => write!(f, "{}: [{}] {}", self.severity, self.identifier, self.message),
        }
    }
}

/// Two diagnostics are equal iff message, identifier, and location agree.
/// Tips and severity are presentation detail and do not affect identity.
impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.message == other.message
            && self.line == other.line
    }
}

impl Eq for Diagnostic {}

/// Adapts a [`Diagnostic`] to a miette diagnostic for rich error display.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct DiagnosticReport {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: format!("[{}] {}", d.identifier, d.message),
            // Tips are ordered and additive; every renderer keeps them all.
            help: if d.tips.is_empty() {
                None
            } else {
                Some(d.tips.join("\n"))
            },
            span: SourceSpan::from((0, 0)),
            label_message: d.identifier.clone(),
        }
    }
}
