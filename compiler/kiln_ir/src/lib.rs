//! Kiln IR - Inputs to the compiler driver.
//!
//! This crate contains the data the driver consumes but does not produce:
//! - `Tree`: the tagged expression tree handed over by an external parser
//! - `EvalContext`: a description of the suspended activations that eval'd
//!   code will run inside
//! - `CompileConfig`: named compile flags, snapshotted once per session
//! - `SourcePosition`: the file/line the driver is currently looking at
//! - `Variables`: transient directives overlaid during nested conversions
//!
//! # Design Philosophy
//!
//! Everything here is plain owned data. Nothing in this crate knows about plugins, scopes or lowering; those
//! layers build on top of these types.
//!
//! Floats are stored as their `u64` bit pattern so atoms stay `Hash + Eq`.

pub mod config;
mod eval_context;
mod position;
mod tree;
mod variables;

pub use config::{flags, CompileConfig, ConfigRegistry, ConfigValue, VersionNumber};
pub use eval_context::{BlockActivation, EvalContext, MethodActivation};
pub use position::SourcePosition;
pub use tree::{Atom, Child, Tag, Tree};
pub use variables::{DirectiveValue, SavedVariables, Variables};
