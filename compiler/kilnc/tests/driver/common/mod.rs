//! Tree builders and compiler setup shared by the driver tests.

use std::sync::Arc;

use kiln_diagnostic::CollectingEmitter;
use kiln_ir::{Atom, CompileConfig, Tree};
use kilnc::{tags, Compiler};

/// A compiler that collects diagnostics instead of printing them.
pub fn compiler(config: CompileConfig) -> Compiler<'static, CollectingEmitter> {
    Compiler::new(Arc::new(config)).with_emitter(CollectingEmitter::new())
}

pub fn int(value: i64) -> Tree {
    Tree::new(tags::LIT).push(Atom::Int(value))
}

pub fn sym(name: &str) -> Tree {
    Tree::new(tags::LIT).push(Atom::symbol(name))
}

pub fn lvar(name: &str) -> Tree {
    Tree::new(tags::LVAR).push_symbol(name)
}

pub fn lasgn(name: &str, value: Tree) -> Tree {
    Tree::new(tags::LASGN).push_symbol(name).push(value)
}

pub fn constant(name: &str) -> Tree {
    Tree::new(tags::CONST).push_symbol(name)
}

/// `receiver.selector(args...)`
pub fn send(receiver: Tree, selector: &str, args: impl IntoIterator<Item = Tree>) -> Tree {
    args.into_iter()
        .fold(Tree::new(tags::CALL).push(receiver).push_symbol(selector), |tree, arg| {
            tree.push(arg)
        })
}

/// `selector(args...)` with no receiver
pub fn fcall(selector: &str, args: impl IntoIterator<Item = Tree>) -> Tree {
    args.into_iter()
        .fold(Tree::new(tags::FCALL).push_symbol(selector), |tree, arg| tree.push(arg))
}

pub fn block(stmts: impl IntoIterator<Item = Tree>) -> Tree {
    stmts
        .into_iter()
        .fold(Tree::new(tags::BLOCK), |tree, stmt| tree.push(stmt))
}

/// A small program touching every hooked construct.
pub fn sample_program() -> Tree {
    block([
        lasgn("a", send(int(1), "+", [int(2)])),
        lasgn("b", send(lvar("a"), "/", [int(3)])),
        Tree::new(tags::ITER)
            .push(send(int(3), "times", []))
            .push(fcall("__method__", [])),
        Tree::new(tags::DEFN)
            .push_symbol("size")
            .push(send(constant("Ruby"), "primitive", [sym("array_size")])),
        Tree::new(tags::IF)
            .push(send(constant("Rubinius"), "compile_if", [sym("kernel")]))
            .push(lvar("a"))
            .push(lvar("b")),
    ])
}
