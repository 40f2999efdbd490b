//! Plugin activation as seen through a compile.

use std::sync::Arc;

use kiln_ir::{flags, CompileConfig};
use kiln_plugins::{names, Hint, PluginKind, PluginRegistry};
use kilnc::{tags, CompileError, Node, NodeRegistry, Payload, Session};
use pretty_assertions::assert_eq;

use crate::common::{compiler, int, sample_program, send};

fn all_flags() -> CompileConfig {
    CompileConfig::new()
        .with_flag(flags::KERNEL)
        .with_flag(flags::SAFE_MATH)
        .with_flag(flags::INLINE_TIMES)
}

fn call_names(config: CompileConfig) -> Vec<&'static str> {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let session = Session::new(Arc::new(config), &nodes, &registry, None).unwrap();
    session.plugins().names(PluginKind::Call)
}

fn call_hints(node: &Node) -> Vec<(String, Option<Hint>)> {
    node.find_all(tags::CALL)
        .into_iter()
        .chain(node.find_all(tags::FCALL))
        .filter_map(|node| match &node.payload {
            Payload::Call { selector, hint } => Some((selector.clone(), hint.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn default_order_with_every_flag() {
    assert_eq!(
        call_names(all_flags()),
        vec![
            names::BLOCK_GIVEN,
            names::PRIMITIVE,
            names::ASSEMBLY,
            names::FASTMATH,
            names::CURRENT_METHOD,
            names::SAFEMATH,
            names::CONST_EXPR,
            names::INLINE,
            names::FASTSYSTEM,
            names::FASTGENERIC,
        ]
    );
}

#[test]
fn default_order_is_reproducible() {
    assert_eq!(call_names(all_flags()), call_names(all_flags()));
}

#[test]
fn disable_flags() {
    let config = all_flags()
        .with_flag(flags::disable(names::FASTMATH))
        .with_flag(flags::disable(names::INLINE))
        .with_flag(flags::disable(names::SAFEMATH))
        .with_flag(flags::disable(names::CONST_EXPR));
    let names = call_names(config);

    assert!(!names.contains(&names::FASTMATH));
    assert!(!names.contains(&names::INLINE));
    // only skippable through their own condition flag
    assert!(names.contains(&names::SAFEMATH));
    assert!(names.contains(&names::CONST_EXPR));
}

#[test]
fn unknown_plugin_leaves_buckets_alone() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = Session::new(Arc::new(all_flags()), &nodes, &registry, None).unwrap();
    let before: Vec<_> = PluginKind::ALL
        .iter()
        .map(|kind| session.plugins().names(*kind))
        .collect();

    let error = session.activate(&registry, "turbo").unwrap_err();

    assert!(matches!(error, CompileError::UnknownPlugin { ref name } if name == "turbo"));
    let after: Vec<_> = PluginKind::ALL
        .iter()
        .map(|kind| session.plugins().names(*kind))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn empty_registry_fails_session_setup() {
    let registry = PluginRegistry::new();
    let mut compiler = compiler(CompileConfig::new()).with_plugin_registry(&registry);

    let outcome = compiler.compile_tree(int(1), None, "a.rb", 1);

    assert!(matches!(
        outcome,
        Err(CompileError::UnknownPlugin { name }) if name == names::BLOCK_GIVEN
    ));
}

#[test]
fn hints_on_sample_program() {
    let mut compiler = compiler(all_flags());

    let description = compiler
        .compile_tree(sample_program(), None, "sample.rb", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(
        call_hints(&description.body),
        vec![
            ("+".to_string(), Some(Hint::Opcode("meta_send_op_plus"))),
            ("/".to_string(), Some(Hint::Opcode("meta_send_op_div_safe"))),
            ("times".to_string(), Some(Hint::Inline("times"))),
            ("primitive".to_string(), Some(Hint::Primitive("array_size".to_string()))),
            ("__method__".to_string(), Some(Hint::Opcode("push_current_method"))),
        ]
    );

    let method = &description.body.find_all(tags::DEFN)[0];
    assert!(matches!(
        &method.payload,
        Payload::Method { hint: Some(Hint::AutoPrimitive(name)), .. } if name == "array_size"
    ));

    let conditional = &description.body.find_all(tags::IF)[0];
    assert_eq!(
        conditional.payload,
        Payload::Conditional {
            hint: Some(Hint::Eliminate { keep_then: true }),
        }
    );
    assert_eq!(conditional.children.len(), 1);
}

#[test]
fn const_expr_folds_when_fastmath_disabled() {
    let config = CompileConfig::new()
        .with_flag(flags::KERNEL)
        .with_flag(flags::disable(names::FASTMATH));
    let mut compiler = compiler(config);

    let description = compiler
        .compile_tree(send(int(6), "*", [int(7)]), None, "a.rb", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(
        call_hints(&description.body),
        vec![("*".to_string(), Some(Hint::Folded(42)))]
    );
}
