use std::fmt;

use kiln_ir::SourcePosition;

use crate::{CallTrace, ErrorCode};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A reported compile failure.
///
/// Carries everything the driver prints for both recoverable aborts and
/// fatal generation errors: message, the kind of error it originated from,
/// the location the driver was at, and the conversion trace.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Kind of the underlying error (e.g. `unresolved node`, `lowering`).
    pub origin: Option<String>,
    /// Where the driver was when the failure surfaced.
    pub location: Option<SourcePosition>,
    /// Additional context.
    pub notes: Vec<String>,
    /// Constructs being converted at the failure point.
    pub trace: CallTrace,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            origin: None,
            location: None,
            notes: Vec::new(),
            trace: CallTrace::default(),
        }
    }

    /// Create an error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_location(mut self, location: SourcePosition) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_trace(mut self, trace: CallTrace) -> Self {
        self.trace = trace;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Plain multi-line rendering, no color.
    ///
    /// ```text
    /// error[E2001]: unable to resolve foo (unresolved node)
    ///   --> (eval):1
    ///   = note: ...
    /// conversion trace:
    ///   0: foo at (eval):1
    /// ```
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(origin) = &self.origin {
            write!(f, " ({origin})")?;
        }
        writeln!(f)?;
        if let Some(location) = &self.location {
            writeln!(f, "  --> {location}")?;
        }
        for note in &self.notes {
            writeln!(f, "  = note: {note}")?;
        }
        write!(f, "{}", self.trace)
    }
}
