//! Kiln Scope - Lexical scopes for compiled code.
//!
//! Code compiled for an interactive eval runs inside activations that are
//! already suspended: a method frame and, possibly, a stack of block frames
//! nested inside it. Those frames have already laid out their locals, so
//! compiled references must land on exactly the slots and environment
//! indexes the running code uses.
//!
//! [`build_scope_chain`] reconstructs that layout from an [`EvalContext`]
//! as a [`ScopeChain`]. New locals introduced by the eval'd code are added
//! next to the existing ones and never displace them.
//!
//! [`EvalContext`]: kiln_ir::EvalContext

mod chain;
mod scope;

pub use chain::{build_scope_chain, ScopeChain};
pub use scope::{LexicalScope, Location, ScopeKind};
