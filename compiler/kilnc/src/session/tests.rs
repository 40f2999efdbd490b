use kiln_diagnostic::ErrorCode;
use kiln_ir::{flags, Atom, BlockActivation, MethodActivation};
use kiln_plugins::{names, PluginKind};
use kiln_scope::Location;
use pretty_assertions::assert_eq;

use super::*;
use crate::Payload;

fn new_session<'a>(
    nodes: &'a NodeRegistry,
    registry: &PluginRegistry,
    context: Option<EvalContext>,
) -> Session<'a> {
    match Session::new(Arc::new(CompileConfig::new()), nodes, registry, context) {
        Ok(session) => session,
        Err(error) => panic!("session setup failed: {error}"),
    }
}

fn eval_context() -> EvalContext {
    EvalContext::in_method(MethodActivation::new(["a", "b"]))
        .within(BlockActivation::new(["x"]))
}

#[test]
fn test_defaults_loaded() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let session = new_session(&nodes, &registry, None);

    let calls = session.plugins().names(PluginKind::Call);
    assert_eq!(calls.first(), Some(&names::BLOCK_GIVEN));
    assert!(!calls.contains(&names::SAFEMATH));
    assert_eq!(
        session.plugins().names(PluginKind::Method),
        vec![names::AUTO_PRIMITIVE]
    );
}

#[test]
fn test_unknown_plugin_on_activate() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    let before = session.plugins().len();

    let result = session.activate(&registry, "nonesuch");

    assert!(matches!(
        result,
        Err(CompileError::UnknownPlugin { name }) if name == "nonesuch"
    ));
    assert_eq!(session.plugins().len(), before);
}

#[test]
fn test_flagged_plugins_follow_config() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let config = CompileConfig::new()
        .with_flag(flags::SAFE_MATH)
        .with_flag(flags::KERNEL);
    let Ok(session) = Session::new(Arc::new(config), &nodes, &registry, None) else {
        panic!("session setup failed");
    };

    let calls = session.plugins().names(PluginKind::Call);
    assert!(calls.contains(&names::SAFEMATH));
    assert!(calls.contains(&names::CONST_EXPR));
    assert!(!calls.contains(&names::INLINE));
}

#[test]
fn test_position_tracks_tree_lines() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    session.set_position("lib/a.rb", 1);

    let tree = Tree::new("block")
        .at_line(3)
        .push(Tree::new("nil").at_line(7));
    let node = session.convert(&tree);

    assert_eq!(session.current_file(), "lib/a.rb");
    assert_eq!(session.current_line(), 7);
    assert_eq!(node.map(|node| node.line).ok(), Some(Some(3)));
}

#[test]
fn test_into_script_wraps_in_script_node() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);

    let result = session.into_script(&Tree::new("lit").push(Atom::Int(5)));

    let Ok(Some(script)) = result else {
        panic!("expected a script node, got {result:?}");
    };
    assert_eq!(script.payload, Payload::Script);
    assert_eq!(script.children.len(), 1);
    assert_eq!(script.children[0].payload, Payload::Literal(Atom::Int(5)));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_into_script_contains_unresolved_node() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    session.set_position("x.rb", 1);

    let tree = Tree::new("block").push(Tree::new("foo").at_line(4));
    let result = session.into_script(&tree);

    assert!(matches!(result, Ok(None)));
    let [diagnostic] = session.diagnostics() else {
        panic!("expected one diagnostic");
    };
    assert_eq!(diagnostic.code, ErrorCode::E2001);
    assert_eq!(diagnostic.message, "unable to resolve foo");
    assert_eq!(diagnostic.location, Some(SourcePosition::new("x.rb", 4)));

    let frames: Vec<_> = diagnostic
        .trace
        .frames()
        .iter()
        .map(|frame| frame.name.as_str())
        .collect();
    assert_eq!(frames, vec!["foo", "block", "script"]);
}

#[test]
fn test_into_script_propagates_generation_errors() {
    let mut nodes = NodeRegistry::with_core();
    nodes.register("boom", |_: &mut Session<'_>, _: &Tree| {
        Err(CompileError::Generation {
            message: "bad".to_string(),
        })
    });
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);

    let result = session.into_script(&Tree::new("boom"));

    assert!(matches!(result, Err(CompileError::Generation { .. })));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_convert_eval_without_context() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);

    assert!(!session.is_eval());
    assert!(matches!(
        session.convert_eval(&Tree::new("nil")),
        Err(CompileError::MissingEvalContext)
    ));
}

#[test]
fn test_convert_eval_resolves_existing_slots() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, Some(eval_context()));

    let tree = Tree::new("array")
        .push(Tree::new("lvar").push_symbol("b"))
        .push(Tree::new("lvar").push_symbol("x"));
    let result = session.convert_eval(&tree);

    let Ok(root) = result else {
        panic!("eval conversion failed: {result:?}");
    };
    assert_eq!(root.payload, Payload::EvalScript { block_depth: 1 });
    let locals: Vec<_> = root
        .find_all("lvar")
        .into_iter()
        .map(|node| node.payload.clone())
        .collect();
    assert_eq!(
        locals,
        vec![
            Payload::Local {
                name: "b".to_string(),
                location: Location::Slot(1),
            },
            Payload::Local {
                name: "x".to_string(),
                location: Location::Env { depth: 0, index: 0 },
            },
        ]
    );
}

#[test]
fn test_convert_eval_propagates_failures() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, Some(eval_context()));

    let result = session.convert_eval(&Tree::new("lvar").push_symbol("missing"));

    assert!(matches!(result, Err(CompileError::Conversion { .. })));
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_method_scope_is_isolated() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    session.scope_mut().declare("outer");

    let ((), method) = session.with_method_scope(|session| {
        assert_eq!(session.scope().resolve("outer"), None);
        session.scope_mut().declare("inner");
    });

    assert_eq!(method.resolve("inner"), Some(Location::Slot(0)));
    assert_eq!(session.scope().resolve("inner"), None);
    assert_eq!(session.scope().resolve("outer"), Some(Location::Slot(0)));
}

#[test]
fn test_take_diagnostics_drains() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    let error = CompileError::UnresolvedNode("foo".to_string());
    let diagnostic = session.diagnose(&error);
    session.report(diagnostic);

    assert_eq!(session.take_diagnostics().len(), 1);
    assert!(session.diagnostics().is_empty());
}

fn frame_names(diagnostic: &Diagnostic) -> Vec<&str> {
    diagnostic
        .trace
        .frames()
        .iter()
        .map(|frame| frame.name.as_str())
        .collect()
}

/// `[:attempt, child]`: tries `child` and falls back to nil.
fn attempt(session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
    if let Some(child) = tree.tree_at(0) {
        if let Ok(node) = session.convert(child) {
            return Ok(node);
        }
    }
    Ok(Node::literal(tree.tag.clone(), Atom::Nil))
}

#[test]
fn test_recovered_failure_leaves_no_trace_behind() {
    let mut nodes = NodeRegistry::with_core();
    nodes.register("attempt", attempt);
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);

    let tree = Tree::new("block")
        .push(Tree::new("attempt").push(Tree::new("foo")))
        .push(Tree::new("lvar").push_symbol("ghost"));
    let result = session.into_script(&tree);

    assert!(matches!(result, Ok(None)));
    let [diagnostic] = session.diagnostics() else {
        panic!("expected one diagnostic");
    };
    assert_eq!(diagnostic.message, "cannot convert lvar: undefined local variable 'ghost'");
    assert_eq!(frame_names(diagnostic), vec!["lvar", "block", "script"]);
}

#[test]
fn test_failure_after_recovery_traced_where_raised() {
    let mut nodes = NodeRegistry::with_core();
    nodes.register("picky", |session: &mut Session<'_>, tree: &Tree| -> CompileResult<Node> {
        let _ = session.convert(&Tree::new("foo"));
        Err(CompileError::conversion(tree.tag.as_str(), "nothing worked"))
    });
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);

    let result = session.into_script(&Tree::new("picky"));

    assert!(matches!(result, Ok(None)));
    let [diagnostic] = session.diagnostics() else {
        panic!("expected one diagnostic");
    };
    assert_eq!(diagnostic.message, "cannot convert picky: nothing worked");
    assert_eq!(frame_names(diagnostic), vec!["picky", "script"]);
}

#[test]
fn test_block_call_is_traced() {
    let nodes = NodeRegistry::with_core();
    let registry = PluginRegistry::with_builtins();
    let mut session = new_session(&nodes, &registry, None);
    session.set_position("x.rb", 1);

    let tree = Tree::new("iter")
        .at_line(2)
        .push(Tree::new("call").at_line(3));
    let result = session.into_script(&tree);

    assert!(matches!(result, Ok(None)));
    let [diagnostic] = session.diagnostics() else {
        panic!("expected one diagnostic");
    };
    assert_eq!(diagnostic.code, ErrorCode::E2002);
    assert_eq!(diagnostic.location, Some(SourcePosition::new("x.rb", 3)));
    assert_eq!(frame_names(diagnostic), vec!["call", "iter", "script"]);
}
