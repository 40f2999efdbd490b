//! Sessions share nothing, and overlays never leak out of a failure.

use std::sync::Arc;
use std::thread;

use kiln_ir::{flags, CompileConfig, Tree};
use kiln_plugins::PluginRegistry;
use kilnc::{CompileResult, Node, NodeRegistry, Payload, Session};
use pretty_assertions::assert_eq;

use crate::common::{compiler, int, sample_program};

fn compile_sample() -> kilnc::MethodDescription {
    let config = CompileConfig::new()
        .with_flag(flags::KERNEL)
        .with_flag(flags::INLINE_TIMES);
    compiler(config)
        .compile_tree(sample_program(), None, "sample.rb", 1)
        .unwrap()
        .into_description()
        .unwrap()
}

#[test]
fn parallel_compiles_agree() {
    let (left, right) = thread::scope(|scope| {
        let left = scope.spawn(compile_sample);
        let right = scope.spawn(compile_sample);
        (left.join().unwrap(), right.join().unwrap())
    });

    assert_eq!(left, right);
    assert_eq!(left, compile_sample());
}

/// `[:guarded, child]`: converts `child` with `mode` overlaid.
fn guarded(session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
    let child = tree.tree_at(0).cloned().unwrap_or_else(|| Tree::new("nil"));
    let converted = session.with_variable("mode", "guarded", |session| {
        session.with_variables([("depth", 2_i64)], |session| session.convert(&child))
    })?;
    Ok(Node::new(tree.tag.clone(), Payload::Generic).with_children(vec![converted]))
}

#[test]
fn overlays_restored_after_contained_failure() {
    let mut nodes = NodeRegistry::with_core();
    nodes.register("guarded", guarded);
    let registry = PluginRegistry::with_builtins();
    let mut session =
        Session::new(Arc::new(CompileConfig::new()), &nodes, &registry, None).unwrap();

    let program = Tree::new("guarded").push(Tree::new("guarded").push(Tree::new("foo")));
    let result = session.into_script(&program).unwrap();

    assert!(result.is_none());
    assert!(session.variables().is_empty());
    assert_eq!(session.diagnostics().len(), 1);

    // the session is still usable afterwards
    let script = session.into_script(&int(4)).unwrap();
    assert!(script.is_some());
    assert!(session.variables().is_empty());
}

#[test]
fn overlays_visible_inside_conversion() {
    let mut nodes = NodeRegistry::with_core();
    nodes.register("guarded", guarded);
    nodes.register("probe", |session: &mut Session<'_>, tree: &Tree| -> CompileResult<Node> {
        let mode = session.get("mode").cloned();
        assert_eq!(mode, Some(kiln_ir::DirectiveValue::from("guarded")));
        Ok(Node::new(tree.tag.clone(), Payload::Generic))
    });
    let registry = PluginRegistry::with_builtins();
    let mut session =
        Session::new(Arc::new(CompileConfig::new()), &nodes, &registry, None).unwrap();

    let node = session
        .convert(&Tree::new("guarded").push(Tree::new("probe")))
        .unwrap();

    assert_eq!(node.node_count(), 2);
    assert_eq!(session.get("mode"), None);
}
