//! Kilnc - The Kiln compiler driver.
//!
//! Takes a tagged expression tree from an external parser and turns it
//! into a method description for the bytecode encoder:
//!
//! ```text
//! Tree ──► Session::convert ──► Node ──► Lowering ──► MethodDescription
//!            │      │
//!            │      └── ActivePlugins (hints for calls, methods, conditionals)
//!            └── NodeRegistry (tag → conversion)
//! ```
//!
//! # Modules
//!
//! - `dispatch`: the tag → conversion registry
//! - `nodes`: conversions for the core constructs
//! - `session`: per-compile state, conversion entry points, error containment
//! - `variables`: scoped directive overlays
//! - `lower`: the seam to the encoder
//! - `driver`: `Compiler`, the public compile entry points
//!
//! Scripts compile outside any activation. Eval'd code compiles against an
//! `EvalContext`, so its locals land on the slots the suspended frames
//! already use (see `kiln_scope`).
//!
//! # Tracing
//!
//! Call [`init_tracing`] once and set `RUST_LOG` (for example
//! `RUST_LOG=kilnc=debug`) to get an indented span tree of every compile.

mod dispatch;
mod driver;
mod errors;
mod lower;
mod node;
pub mod nodes;
mod session;
mod variables;

use std::sync::Once;

pub use dispatch::{NodeCapability, NodeRegistry};
pub use driver::{
    CompileInput, CompileOutcome, Compiler, SourceParser, DEFAULT_EVAL_FILE,
};
pub use errors::{CompileError, CompileResult, GENERATION_FAILED};
pub use lower::{
    DescriptionLowering, LowerError, LowerRequest, Lowering, MethodDescription,
    EVAL_SCRIPT_NAME, SCRIPT_NAME,
};
pub use node::{Node, Payload};
pub use nodes::tags;
pub use session::Session;
pub use variables::ScopedSession;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}
