//! Compile errors and their diagnostic form.
//!
//! Every error the driver can raise maps to exactly one `ErrorCode`. Most
//! are recoverable at the script boundary; `Generation` is the one kind
//! that always propagates to the caller.

use std::io;
use std::path::PathBuf;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_plugins::PluginError;
use thiserror::Error;

/// Message every lowering failure is re-raised with.
pub const GENERATION_FAILED: &str = "unable to generate bytecode";

/// Result type for conversion and compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised by the compiler driver.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A plugin was requested that nothing registered.
    #[error("unknown plugin '{name}'")]
    UnknownPlugin { name: String },

    /// No conversion is registered for this tag.
    #[error("unable to resolve {0}")]
    UnresolvedNode(String),

    /// A conversion rejected the shape of its tree.
    #[error("cannot convert {tag}: {reason}")]
    Conversion { tag: String, reason: String },

    /// `convert_eval` was called on a session without an eval context.
    #[error("eval conversion requires an eval context")]
    MissingEvalContext,

    /// The source parser rejected its input.
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Bytecode generation failed. Always fatal.
    #[error("{message}")]
    Generation { message: String },

    /// A source file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CompileError {
    /// Build a `Conversion` error.
    pub fn conversion(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::Conversion {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Generation failures are never contained.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::Generation { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Parse { .. } => ErrorCode::E0001,
            CompileError::UnknownPlugin { .. } => ErrorCode::E1001,
            CompileError::UnresolvedNode(_) => ErrorCode::E2001,
            CompileError::Conversion { .. } => ErrorCode::E2002,
            CompileError::MissingEvalContext => ErrorCode::E2003,
            CompileError::Generation { .. } => ErrorCode::E5001,
            CompileError::Io { .. } => ErrorCode::E9001,
        }
    }

    /// Short name of the error kind, shown next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Parse { .. } => "parse error",
            CompileError::UnknownPlugin { .. } => "unknown plugin",
            CompileError::UnresolvedNode(_) => "unresolved node",
            CompileError::Conversion { .. } => "conversion error",
            CompileError::MissingEvalContext => "missing eval context",
            CompileError::Generation { .. } => "generation error",
            CompileError::Io { .. } => "io error",
        }
    }

    /// Diagnostic carrying the code, message and kind. Location and trace
    /// are filled in by whoever knows them.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_origin(self.kind())
    }
}

impl From<PluginError> for CompileError {
    fn from(error: PluginError) -> Self {
        match error {
            PluginError::UnknownPlugin { name } => CompileError::UnknownPlugin { name },
        }
    }
}
