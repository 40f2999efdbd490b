use kiln_ir::Tree;

use super::symbol_at;
use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:lvar, :name]`
pub(crate) struct LocalRead;

impl NodeCapability for LocalRead {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let name = symbol_at(tree, 0, "local name")?;
        let location = session.scope().resolve(name).ok_or_else(|| {
            CompileError::conversion(
                tree.tag.as_str(),
                format!("undefined local variable '{name}'"),
            )
        })?;
        Ok(Node::new(
            tree.tag.clone(),
            Payload::Local {
                name: name.to_string(),
                location,
            },
        ))
    }
}

/// `[:lasgn, :name, value]`
///
/// Binds `name` in the innermost scope unless it already resolves.
pub(crate) struct LocalAssign;

impl NodeCapability for LocalAssign {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let name = symbol_at(tree, 0, "local name")?;
        let location = session.scope_mut().declare(name);
        let value = session.convert_opt(tree.tree_at(1))?;
        Ok(Node::new(
            tree.tag.clone(),
            Payload::Local {
                name: name.to_string(),
                location,
            },
        )
        .with_children(value.into_iter().collect()))
    }
}
