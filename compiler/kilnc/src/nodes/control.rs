use kiln_ir::{Atom, Tree};
use kiln_plugins::{ConditionalSite, Hint, HookSite};

use super::tags;
use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:if, condition, then, else]`
///
/// When a plugin eliminates a branch, only the kept branch is converted
/// and it becomes the node's only child.
pub(crate) struct If;

impl NodeCapability for If {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let site = ConditionalSite::from_tree(tree)
            .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), "missing condition"))?;
        let condition = site.condition;
        let hint = session.hint(&HookSite::Conditional(site));

        let children = match hint {
            Some(Hint::Eliminate { keep_then }) => {
                let kept = tree.tree_at(if keep_then { 1 } else { 2 });
                vec![branch(session, kept)?]
            }
            _ => vec![
                session.convert(condition)?,
                branch(session, tree.tree_at(1))?,
                branch(session, tree.tree_at(2))?,
            ],
        };

        Ok(Node::new(tree.tag.clone(), Payload::Conditional { hint }).with_children(children))
    }
}

/// A missing branch evaluates to `nil`.
fn branch(session: &mut Session<'_>, tree: Option<&Tree>) -> CompileResult<Node> {
    Ok(session
        .convert_opt(tree)?
        .unwrap_or_else(|| Node::literal(tags::NIL, Atom::Nil)))
}

/// `[:block, stmts...]` and `[:array, items...]`: children in order.
pub(crate) struct Block;

impl NodeCapability for Block {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let children = session.convert_children(tree)?;
        Ok(Node::new(tree.tag.clone(), Payload::Generic).with_children(children))
    }
}
