//! Lowering converted nodes into method descriptions.
//!
//! The bytecode encoder lives outside the driver. It plugs in through
//! [`Lowering`]; [`DescriptionLowering`] is the default and only packages
//! the converted tree with the metadata the encoder needs.

use kiln_diagnostic::CallTrace;
use kiln_ir::{CompileConfig, EvalContext, VersionNumber};
use kiln_scope::ScopeChain;
use thiserror::Error;

use crate::Node;

/// Name given to scripts compiled outside any activation.
pub const SCRIPT_NAME: &str = "__script__";

/// Name given to eval'd code.
pub const EVAL_SCRIPT_NAME: &str = "__eval_script__";

/// A compiled unit ready for the encoder.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MethodDescription {
    pub name: String,
    /// Source file, when one was named.
    pub file: Option<String>,
    pub first_line: u32,
    /// Locals declared at the top level of the unit, in slot order.
    pub local_names: Vec<String>,
    pub body: Node,
    /// The activation chain the code runs in, when compiled for eval.
    pub eval_context: Option<EvalContext>,
    pub version: VersionNumber,
}

/// Everything a lowering needs from the session.
#[derive(Debug)]
pub struct LowerRequest<'s> {
    pub name: &'s str,
    pub file: &'s str,
    pub first_line: u32,
    pub body: Node,
    pub scope: &'s ScopeChain,
    pub config: &'s CompileConfig,
}

/// Lowering failures.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LowerError {
    /// A generation error that has already been reported.
    #[error("{0}")]
    Generation(String),
    /// Anything else that went wrong while generating. `trace` is where
    /// in the encoder it happened; empty when the lowering cannot tell.
    #[error("{message}")]
    Failed {
        kind: String,
        message: String,
        trace: CallTrace,
    },
}

impl LowerError {
    /// Shorthand for a `Failed` error without a trace.
    pub fn failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        LowerError::Failed {
            kind: kind.into(),
            message: message.into(),
            trace: CallTrace::default(),
        }
    }

    /// Attach the trace of a `Failed` error.
    #[must_use]
    pub fn with_trace(mut self, new_trace: CallTrace) -> Self {
        if let LowerError::Failed { trace, .. } = &mut self {
            *trace = new_trace;
        }
        self
    }
}

/// Turns a converted tree into a method description.
pub trait Lowering {
    fn lower(&self, request: LowerRequest<'_>) -> Result<MethodDescription, LowerError>;
}

/// Package the converted tree as-is.
#[derive(Copy, Clone, Debug, Default)]
pub struct DescriptionLowering;

impl Lowering for DescriptionLowering {
    fn lower(&self, request: LowerRequest<'_>) -> Result<MethodDescription, LowerError> {
        let file = (!request.file.is_empty()).then(|| request.file.to_string());
        Ok(MethodDescription {
            name: request.name.to_string(),
            file,
            first_line: request.first_line,
            local_names: request.scope.innermost().names().to_vec(),
            body: request.body,
            eval_context: request.scope.context().cloned(),
            version: request.config.version(),
        })
    }
}
