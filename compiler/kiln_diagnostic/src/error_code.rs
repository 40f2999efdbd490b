//! Error codes for driver diagnostics.
//!
//! The first digit names the stage that failed.

use std::fmt;

/// Error codes for all driver diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E0xxx: Source parsing
/// - E1xxx: Session setup (plugins)
/// - E2xxx: Tree conversion
/// - E5xxx: Bytecode generation
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Source could not be turned into a tree
    E0001,
    /// Unknown plugin
    E1001,
    /// No conversion registered for a tree tag
    E2001,
    /// Conversion of a construct failed
    E2002,
    /// Eval conversion requested without an eval context
    E2003,
    /// Bytecode generation error
    E5001,
    /// Internal error (I/O, invariant violations)
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E1001,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E5001,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Whether this code marks a generation-stage failure.
    pub fn is_generation(&self) -> bool {
        matches!(self, ErrorCode::E5001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == upper)
            .ok_or(())
    }
}
