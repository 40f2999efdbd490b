//! Core node capabilities.
//!
//! These are the constructs the driver itself must understand: the two
//! roots, locals (which resolve through the scope chain), and the
//! constructs plugins hook into. Literal and structural tags are here so a
//! bare registry can already convert simple programs; everything else is
//! registered by the embedder.

mod calls;
mod control;
mod definitions;
mod literals;
mod locals;
mod roots;

use kiln_ir::Tree;

use crate::{CompileError, NodeRegistry};

/// Tags the core registers.
pub mod tags {
    pub const SCRIPT: &str = "script";
    pub const EVAL_EXPRESSION: &str = "eval_expression";
    pub const LVAR: &str = "lvar";
    pub const LASGN: &str = "lasgn";
    pub const CALL: &str = "call";
    pub const FCALL: &str = "fcall";
    pub const ITER: &str = "iter";
    pub const DEFN: &str = "defn";
    pub const IF: &str = "if";
    pub const BLOCK: &str = "block";
    pub const LIT: &str = "lit";
    pub const STR: &str = "str";
    pub const NIL: &str = "nil";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const SELF: &str = "self";
    pub const ARRAY: &str = "array";
    pub const CONST: &str = "const";
}

/// Register every core capability.
pub(crate) fn register_core(registry: &mut NodeRegistry) {
    // Roots
    registry.register(tags::SCRIPT, roots::Script);
    registry.register(tags::EVAL_EXPRESSION, roots::EvalExpression);

    // Locals
    registry.register(tags::LVAR, locals::LocalRead);
    registry.register(tags::LASGN, locals::LocalAssign);

    // Hooked constructs
    registry.register(tags::CALL, calls::Call);
    registry.register(tags::FCALL, calls::Call);
    registry.register(tags::ITER, calls::Iter);
    registry.register(tags::DEFN, definitions::MethodDefinition);
    registry.register(tags::IF, control::If);

    // Structure
    registry.register(tags::BLOCK, control::Block);
    registry.register(tags::ARRAY, control::Block);
    registry.register(tags::LIT, literals::Lit);
    registry.register(tags::STR, literals::Str);
    registry.register(tags::NIL, literals::Keyword);
    registry.register(tags::TRUE, literals::Keyword);
    registry.register(tags::FALSE, literals::Keyword);
    registry.register(tags::SELF, literals::Keyword);
    registry.register(tags::CONST, literals::Const);
}

/// Symbol child `index` of `tree`, or a conversion error naming `what`.
fn symbol_at<'t>(tree: &'t Tree, index: usize, what: &str) -> Result<&'t str, CompileError> {
    tree.symbol_at(index)
        .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), format!("missing {what}")))
}
