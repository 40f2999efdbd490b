//! Built-in plugins.
//!
//! Each plugin recognizes one narrow call shape and answers with a hint;
//! anything it does not recognize falls through to the next plugin.

use kiln_ir::{Atom, DirectiveValue};

use crate::{
    names, CallSite, Hint, HookContext, HookSite, MethodSite, Plugin, PluginDescriptor,
    PluginKind, PluginRegistry, Receiver, INLINING_DIRECTIVE,
};

/// Register every built-in plugin.
pub(crate) fn register_builtins(registry: &mut PluginRegistry) {
    // Call hooks
    registry.register(descriptor(names::BLOCK_GIVEN, PluginKind::Call, || BlockGiven));
    registry.register(descriptor(names::PRIMITIVE, PluginKind::Call, || PrimitiveDeclaration));
    registry.register(descriptor(names::ASSEMBLY, PluginKind::Call, || InlineAssembly));
    registry.register(descriptor(names::FASTMATH, PluginKind::Call, || FastMath));
    registry.register(descriptor(names::CURRENT_METHOD, PluginKind::Call, || CurrentMethod));
    registry.register(descriptor(names::SAFEMATH, PluginKind::Call, || SafeMath));
    registry.register(descriptor(names::CONST_EXPR, PluginKind::Call, || ConstantExpressions));
    registry.register(descriptor(names::INLINE, PluginKind::Call, || InlineTimes));
    registry.register(descriptor(names::FASTSYSTEM, PluginKind::Call, || FastSystem));
    registry.register(descriptor(names::FASTGENERIC, PluginKind::Call, || FastGeneric));

    // Method hooks
    registry.register(descriptor(names::AUTO_PRIMITIVE, PluginKind::Method, || AutoPrimitive));

    // Conditional hooks
    registry.register(descriptor(
        names::CONDITIONAL_COMPILATION,
        PluginKind::Conditional,
        || ConditionalCompilation,
    ));
}

fn descriptor<P, F>(name: &'static str, kind: PluginKind, make: F) -> PluginDescriptor
where
    P: Plugin + 'static,
    F: Fn() -> P + Send + Sync + 'static,
{
    PluginDescriptor::new(name, kind, move |_| Box::new(make()))
}

fn call<'s>(site: &'s HookSite<'_>) -> Option<&'s CallSite<'s>> {
    match site {
        HookSite::Call(call) => Some(call),
        _ => None,
    }
}

/// `Ruby.primitive :name` → the primitive name.
fn primitive_name<'a>(call: &CallSite<'a>) -> Option<&'a str> {
    if call.receiver.as_const() != Some("Ruby") || call.selector != "primitive" {
        return None;
    }
    call.literal_arg(0).and_then(Atom::as_symbol)
}

/// `block_given?` / `iterator?` without a receiver.
#[derive(Debug)]
struct BlockGiven;

impl Plugin for BlockGiven {
    fn name(&self) -> &'static str {
        names::BLOCK_GIVEN
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        let matches = call.receiver.is_implicit()
            && call.arity() == 0
            && matches!(call.selector, "block_given?" | "iterator?");
        matches.then_some(Hint::Opcode("push_has_block"))
    }
}

/// `Ruby.primitive :name` declarations.
#[derive(Debug)]
struct PrimitiveDeclaration;

impl Plugin for PrimitiveDeclaration {
    fn name(&self) -> &'static str {
        names::PRIMITIVE
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        primitive_name(call(site)?).map(|name| Hint::Primitive(name.to_string()))
    }
}

/// `Ruby.asm "text"`.
#[derive(Debug)]
struct InlineAssembly;

impl Plugin for InlineAssembly {
    fn name(&self) -> &'static str {
        names::ASSEMBLY
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        if call.receiver.as_const() != Some("Ruby") || call.selector != "asm" {
            return None;
        }
        let arg = call.args.first().filter(|arg| arg.is("str"))?;
        match arg.atom_at(0)? {
            Atom::Str(text) => Some(Hint::Assembly(text.clone())),
            _ => None,
        }
    }
}

/// Binary operators with a dedicated instruction.
#[derive(Debug)]
struct FastMath;

impl Plugin for FastMath {
    fn name(&self) -> &'static str {
        names::FASTMATH
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        if call.receiver.is_implicit() || call.arity() != 1 || call.has_block {
            return None;
        }
        let opcode = match call.selector {
            "+" => "meta_send_op_plus",
            "-" => "meta_send_op_minus",
            "*" => "meta_send_op_times",
            "==" => "meta_send_op_equal",
            "<" => "meta_send_op_lt",
            "<=" => "meta_send_op_le",
            ">" => "meta_send_op_gt",
            ">=" => "meta_send_op_ge",
            "===" => "meta_send_op_tequal",
            _ => return None,
        };
        Some(Hint::Opcode(opcode))
    }
}

/// `__method__` without a receiver.
#[derive(Debug)]
struct CurrentMethod;

impl Plugin for CurrentMethod {
    fn name(&self) -> &'static str {
        names::CURRENT_METHOD
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        let matches =
            call.receiver.is_implicit() && call.arity() == 0 && call.selector == "__method__";
        matches.then_some(Hint::Opcode("push_current_method"))
    }
}

/// Division that raises instead of producing garbage on a zero divisor.
#[derive(Debug)]
struct SafeMath;

impl Plugin for SafeMath {
    fn name(&self) -> &'static str {
        names::SAFEMATH
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        let matches = !call.receiver.is_implicit() && call.arity() == 1 && call.selector == "/";
        matches.then_some(Hint::Opcode("meta_send_op_div_safe"))
    }
}

/// Fold arithmetic on two integer literals.
#[derive(Debug)]
struct ConstantExpressions;

impl Plugin for ConstantExpressions {
    fn name(&self) -> &'static str {
        names::CONST_EXPR
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        let Receiver::Literal(lhs) = call.receiver else {
            return None;
        };
        if call.arity() != 1 {
            return None;
        }
        let lhs = lhs.as_int()?;
        let rhs = call.literal_arg(0)?.as_int()?;
        let value = match call.selector {
            "+" => lhs.checked_add(rhs),
            "-" => lhs.checked_sub(rhs),
            "*" => lhs.checked_mul(rhs),
            "/" => floor_div(lhs, rhs),
            _ => None,
        }?;
        Some(Hint::Folded(value))
    }
}

/// Integer division rounding toward negative infinity, as the runtime
/// divides. `None` on a zero divisor or overflow.
fn floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    let quotient = lhs.checked_div(rhs)?;
    let remainder = lhs.checked_rem(rhs)?;
    if remainder != 0 && (remainder < 0) != (rhs < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

/// Expand `n.times { ... }` in place.
#[derive(Debug)]
struct InlineTimes;

impl Plugin for InlineTimes {
    fn name(&self) -> &'static str {
        names::INLINE
    }

    fn handle(&self, cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        if matches!(
            cx.variables.get(INLINING_DIRECTIVE),
            Some(DirectiveValue::Flag(false))
        ) {
            return None;
        }
        let matches = call.has_block && call.arity() == 0 && call.selector == "times";
        matches.then_some(Hint::Inline("times"))
    }
}

/// Core object protocol with dedicated instructions.
#[derive(Debug)]
struct FastSystem;

impl Plugin for FastSystem {
    fn name(&self) -> &'static str {
        names::FASTSYSTEM
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        let opcode = match (call.selector, call.arity()) {
            ("__send__", n) if n >= 1 => "send_stack",
            ("kind_of?", 1) => "kind_of",
            ("instance_of?", 1) => "instance_of",
            ("nil?", 0) => "is_nil",
            ("equal?", 1) => "equal",
            _ => return None,
        };
        Some(Hint::Opcode(opcode))
    }
}

/// Element reference and assignment.
#[derive(Debug)]
struct FastGeneric;

impl Plugin for FastGeneric {
    fn name(&self) -> &'static str {
        names::FASTGENERIC
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let call = call(site)?;
        if call.receiver.is_implicit() || call.has_block {
            return None;
        }
        let opcode = match (call.selector, call.arity()) {
            ("[]", 1) => "meta_send_op_aref",
            ("[]=", 2) => "meta_send_op_aset",
            _ => return None,
        };
        Some(Hint::Opcode(opcode))
    }
}

/// A method whose whole body is `Ruby.primitive :name`.
#[derive(Debug)]
struct AutoPrimitive;

impl Plugin for AutoPrimitive {
    fn name(&self) -> &'static str {
        names::AUTO_PRIMITIVE
    }

    fn handle(&self, _cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let HookSite::Method(method) = site else {
            return None;
        };
        let stmt = MethodSite::sole_statement(method)?;
        let call = CallSite::from_tree(stmt)?;
        primitive_name(&call).map(|name| Hint::AutoPrimitive(name.to_string()))
    }
}

/// `if Rubinius.compile_if(:flag)` decided at compile time.
#[derive(Debug)]
struct ConditionalCompilation;

impl Plugin for ConditionalCompilation {
    fn name(&self) -> &'static str {
        names::CONDITIONAL_COMPILATION
    }

    fn handle(&self, cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        let HookSite::Conditional(conditional) = site else {
            return None;
        };
        let call = CallSite::from_tree(conditional.condition)?;
        if call.receiver.as_const() != Some("Rubinius") || call.selector != "compile_if" {
            return None;
        }
        let flag = call.literal_arg(0)?.as_symbol()?;
        Some(Hint::Eliminate {
            keep_then: cx.config.is_set(flag),
        })
    }
}
