//! Diagnostic reporting for the compiler driver.
//!
//! Every failure the driver reports, recoverable or fatal, is rendered the
//! same way:
//! - Error code for searchability
//! - Message (what went wrong) and the originating error kind
//! - Location (`file:line` the driver was at)
//! - Call trace (which constructs were being converted)
//!
//! Emitters decide where the rendered lines go.

mod diagnostic;
pub mod emitter;
mod error_code;
mod trace;

pub use diagnostic::{Diagnostic, Severity};
pub use emitter::{CollectingEmitter, ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
pub use trace::{CallTrace, TraceFrame};
