//! Kiln Plugins - Codegen hooks for the compiler driver.
//!
//! This crate provides:
//! - The `Plugin` trait and the sites plugins are consulted at
//! - `PluginRegistry`: global name → descriptor table
//! - `ActivePlugins`: the per-session, per-kind ordered instance lists
//! - The built-in plugins and their fixed default activation sequence
//!
//! # Architecture
//!
//! Plugins let codegen behavior change without touching each construct's
//! conversion. A construct that supports hooks builds a `HookSite` and asks
//! `ActivePlugins::first_hint` for its kind; the first instance (in
//! activation order) that returns a `Hint` wins.
//!
//! Activation order is part of the codegen contract: the same config must
//! always produce the same order, so the same hints, so the same bytecode.

mod active;
mod builtins;
mod errors;
mod plugin;
mod registry;

pub use active::{ActivePlugins, DEFAULT_SEQUENCE};
pub use errors::PluginError;
pub use plugin::{
    CallSite, ConditionalSite, Hint, HookContext, HookSite, MethodSite, Plugin, PluginKind,
    Receiver,
};
pub use registry::{global_registry, PluginDescriptor, PluginFactory, PluginRegistry, PluginSetup};

/// Names of the built-in plugins.
pub mod names {
    pub const BLOCK_GIVEN: &str = "block-given";
    pub const PRIMITIVE: &str = "primitive";
    pub const ASSEMBLY: &str = "assembly";
    pub const FASTMATH: &str = "fastmath";
    pub const CURRENT_METHOD: &str = "current-method";
    pub const SAFEMATH: &str = "safemath";
    pub const CONST_EXPR: &str = "const-expr";
    pub const INLINE: &str = "inline";
    pub const FASTSYSTEM: &str = "fastsystem";
    pub const FASTGENERIC: &str = "fastgeneric";
    pub const AUTO_PRIMITIVE: &str = "auto-primitive";
    pub const CONDITIONAL_COMPILATION: &str = "conditional-compilation";
}

/// Directive consulted by the `inline` plugin; inlining is on unless this
/// is explicitly set to `false`.
pub const INLINING_DIRECTIVE: &str = "inlining";
