//! Conversion call traces.
//!
//! While converting, the session keeps a stack of the constructs it is
//! inside. When a conversion fails, that stack is captured as a `CallTrace`
//! and rendered under the diagnostic, innermost frame first.

use std::fmt;

use kiln_ir::SourcePosition;

/// One construct being converted when an error occurred.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TraceFrame {
    /// Tag of the construct.
    pub name: String,
    /// Where the construct starts, when known.
    pub position: Option<SourcePosition>,
}

impl TraceFrame {
    pub fn new(name: impl Into<String>, position: Option<SourcePosition>) -> Self {
        TraceFrame {
            name: name.into(),
            position,
        }
    }
}

/// Immutable snapshot of the conversion stack, innermost frame first.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CallTrace {
    frames: Vec<TraceFrame>,
}

impl CallTrace {
    pub fn new(frames: Vec<TraceFrame>) -> Self {
        CallTrace { frames }
    }

    /// Capture from a stack stored outermost first.
    pub fn from_stack(stack: &[TraceFrame]) -> Self {
        CallTrace {
            frames: stack.iter().rev().cloned().collect(),
        }
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Render to a string; empty traces render as nothing.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "conversion trace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(position) = &frame.position {
                write!(f, " at {position}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
