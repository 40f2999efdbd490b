use kiln_ir::{Atom, Tree};

use super::{symbol_at, tags};
use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:lit, atom]`
pub(crate) struct Lit;

impl NodeCapability for Lit {
    fn convert(&self, _session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let atom = tree
            .atom_at(0)
            .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), "missing literal value"))?;
        Ok(Node::literal(tree.tag.clone(), atom.clone()))
    }
}

/// `[:str, "text"]`
pub(crate) struct Str;

impl NodeCapability for Str {
    fn convert(&self, _session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        match tree.atom_at(0) {
            Some(text @ Atom::Str(_)) => Ok(Node::literal(tree.tag.clone(), text.clone())),
            _ => Err(CompileError::conversion(tree.tag.as_str(), "missing string")),
        }
    }
}

/// `[:nil]`, `[:true]`, `[:false]`, `[:self]`
pub(crate) struct Keyword;

impl NodeCapability for Keyword {
    fn convert(&self, _session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let payload = match tree.tag.as_str() {
            tags::NIL => Payload::Literal(Atom::Nil),
            tags::TRUE => Payload::Literal(Atom::True),
            tags::FALSE => Payload::Literal(Atom::False),
            _ => Payload::Generic,
        };
        Ok(Node::new(tree.tag.clone(), payload))
    }
}

/// `[:const, :Name]`
pub(crate) struct Const;

impl NodeCapability for Const {
    fn convert(&self, _session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let name = symbol_at(tree, 0, "constant name")?;
        Ok(Node::new(tree.tag.clone(), Payload::Constant(name.to_string())))
    }
}
