//! Compiling into live activations.

use std::sync::Arc;

use kiln_ir::{BlockActivation, CompileConfig, EvalContext, MethodActivation, VersionNumber};
use kiln_plugins::PluginRegistry;
use kiln_scope::Location;
use kilnc::{
    tags, CompileError, Node, NodeRegistry, Payload, Session, EVAL_SCRIPT_NAME, SCRIPT_NAME,
};
use pretty_assertions::assert_eq;

use crate::common::{block, compiler, int, lasgn, lvar};

/// `def m(a, b); [1].each { |x| [2].each { |y| <eval> } }; end`
fn nested_context() -> EvalContext {
    EvalContext::in_method(MethodActivation::new(["a", "b"]).named("m"))
        .within(BlockActivation::new(["x"]))
        .within(BlockActivation::new(["y", "z"]))
}

fn locations(node: &Node) -> Vec<(String, Location)> {
    node.find_all(tags::LVAR)
        .into_iter()
        .chain(node.find_all(tags::LASGN))
        .filter_map(|node| match &node.payload {
            Payload::Local { name, location } => Some((name.clone(), *location)),
            _ => None,
        })
        .collect()
}

#[test]
fn existing_locals_keep_their_slots() {
    let mut compiler = compiler(CompileConfig::new());
    let program = block([lvar("z"), lvar("x"), lvar("b")]);

    let description = compiler
        .compile(program, Some(nested_context()), "(eval)", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(
        locations(&description.body),
        vec![
            ("z".to_string(), Location::Env { depth: 0, index: 1 }),
            ("x".to_string(), Location::Env { depth: 1, index: 0 }),
            ("b".to_string(), Location::Slot(1)),
        ]
    );
    assert_eq!(
        description.body.payload,
        Payload::EvalScript { block_depth: 2 }
    );
}

#[test]
fn new_locals_go_after_existing_ones() {
    let mut compiler = compiler(CompileConfig::new());
    let program = block([lasgn("fresh", int(1)), lasgn("y", int(2))]);

    let description = compiler
        .compile(program, Some(nested_context()), "(eval)", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(
        locations(&description.body),
        vec![
            ("fresh".to_string(), Location::Env { depth: 0, index: 2 }),
            ("y".to_string(), Location::Env { depth: 0, index: 0 }),
        ]
    );
    assert_eq!(
        description.local_names,
        vec!["y".to_string(), "z".to_string(), "fresh".to_string()]
    );
}

#[test]
fn eval_introduced_block_starts_empty() {
    let context = EvalContext::in_method(MethodActivation::new(["a"]))
        .within(BlockActivation::new(["hidden"]).from_eval());
    let mut compiler = compiler(CompileConfig::new());

    let outcome = compiler.compile(lvar("hidden"), Some(context), "(eval)", 1);

    assert!(matches!(outcome, Err(CompileError::Conversion { .. })));
}

#[test]
fn opaque_activation_gives_empty_scope() {
    let context = EvalContext::in_method(MethodActivation::opaque());
    let mut compiler = compiler(CompileConfig::new());

    let description = compiler
        .compile(lasgn("n", int(1)), Some(context), "(eval)", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(locations(&description.body), vec![("n".to_string(), Location::Slot(0))]);
}

#[test]
fn missing_context_on_eval_entry() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session =
        Session::new(Arc::new(CompileConfig::new()), &nodes, &registry, None).unwrap();

    let error = session.convert_eval(&lvar("a")).unwrap_err();

    assert!(matches!(error, CompileError::MissingEvalContext));
}

#[test]
fn names_and_version() {
    let version = VersionNumber::from_timestamp(1_141_027_200 + 99);
    let mut compiler = compiler(CompileConfig::new().with_version(version));

    let script = compiler
        .compile(int(1), None, "a.rb", 1)
        .unwrap()
        .into_description()
        .unwrap();
    let eval = compiler
        .compile(int(1), Some(nested_context()), "(eval)", 1)
        .unwrap()
        .into_description()
        .unwrap();

    assert_eq!(script.name, SCRIPT_NAME);
    assert_eq!(eval.name, EVAL_SCRIPT_NAME);
    assert_eq!(script.version.get(), 99);
    assert_eq!(eval.version, script.version);
    assert_eq!(script.eval_context, None);
    assert_eq!(eval.eval_context, Some(nested_context()));
}
