//! Containment, propagation and the diagnostics both produce.

use std::sync::Arc;

use kiln_diagnostic::{ColorMode, ErrorCode, TerminalEmitter};
use kiln_ir::{CompileConfig, SourcePosition, Tree};
use kilnc::{
    CompileError, CompileOutcome, Compiler, LowerError, LowerRequest, Lowering,
    MethodDescription, GENERATION_FAILED,
};
use pretty_assertions::assert_eq;

use crate::common::{block, compiler, int, lasgn, lvar};

struct Boom;

impl Lowering for Boom {
    fn lower(&self, _request: LowerRequest<'_>) -> Result<MethodDescription, LowerError> {
        Err(LowerError::failed("RuntimeError", "boom"))
    }
}

#[test]
fn unresolved_node_is_contained() {
    let mut compiler = compiler(CompileConfig::new());
    let program = block([int(1), Tree::new("foo").at_line(3)]);

    let outcome = compiler.compile_tree(program, None, "x.rb", 1).unwrap();

    let CompileOutcome::Aborted(diagnostic) = outcome else {
        panic!("expected an abort");
    };
    assert_eq!(diagnostic.code, ErrorCode::E2001);
    assert_eq!(diagnostic.message, "unable to resolve foo");
    assert_eq!(diagnostic.location, Some(SourcePosition::new("x.rb", 3)));
    let frames: Vec<_> = diagnostic
        .trace
        .frames()
        .iter()
        .map(|frame| frame.name.as_str())
        .collect();
    assert_eq!(frames, vec!["foo", "block", "script"]);
    assert_eq!(compiler.emitter().diagnostics().len(), 1);
}

#[test]
fn conversion_error_is_contained() {
    let mut compiler = compiler(CompileConfig::new());

    let outcome = compiler.compile_tree(lvar("ghost"), None, "x.rb", 1).unwrap();

    assert!(outcome.is_aborted());
    assert_eq!(
        compiler.emitter().diagnostics()[0].code,
        ErrorCode::E2002
    );
}

#[test]
fn aborted_script_prints_message_location_and_trace() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    let mut compiler = Compiler::new(Arc::new(CompileConfig::new())).with_emitter(emitter);

    let outcome = compiler.compile_tree(Tree::new("foo"), None, "x.rb", 7).unwrap();
    assert!(outcome.is_aborted());

    let output = String::from_utf8(compiler.into_emitter().into_inner()).unwrap();
    assert_eq!(
        output,
        "error[E2001]: unable to resolve foo (unresolved node)\n\
         \x20 --> x.rb:7\n\
         conversion trace:\n\
         \x20 0: foo at x.rb:7\n\
         \x20 1: script at x.rb:7\n\
         \n"
    );
}

#[test]
fn lowering_failure_is_reported_then_fatal() {
    let mut compiler = compiler(CompileConfig::new()).with_lowering(Boom);

    let error = compiler
        .compile_tree(lasgn("a", int(1)), None, "x.rb", 2)
        .unwrap_err();

    assert!(matches!(
        error,
        CompileError::Generation { ref message } if message == GENERATION_FAILED
    ));
    assert_eq!(error.to_string(), "unable to generate bytecode");

    let reported = compiler.emitter().diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].code, ErrorCode::E5001);
    assert_eq!(reported[0].message, "boom");
    assert_eq!(reported[0].origin.as_deref(), Some("RuntimeError"));
    assert_eq!(reported[0].location, Some(SourcePosition::new("x.rb", 2)));
}

#[test]
fn lowering_failure_is_fatal_for_eval_too() {
    let context = kiln_ir::EvalContext::in_method(kiln_ir::MethodActivation::opaque());
    let mut compiler = compiler(CompileConfig::new()).with_lowering(Boom);

    let error = compiler
        .compile(int(1), Some(context), "(eval)", 1)
        .unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(compiler.emitter().diagnostics().len(), 1);
}
