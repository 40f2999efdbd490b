use std::fmt;

/// File and line the driver is currently converting.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
}

impl SourcePosition {
    /// File name used before any position is known.
    pub const UNKNOWN_FILE: &'static str = "(unknown)";

    pub fn new(file: impl Into<String>, line: u32) -> Self {
        SourcePosition {
            file: file.into(),
            line,
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        SourcePosition::new(Self::UNKNOWN_FILE, 0)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
