use kiln_ir::Tree;

use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:script, body]`: a program compiled outside any activation.
pub(crate) struct Script;

impl NodeCapability for Script {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let body = session.convert_opt(tree.tree_at(0))?;
        Ok(Node::new(tree.tag.clone(), Payload::Script).with_children(body.into_iter().collect()))
    }
}

/// `[:eval_expression, body]`: code compiled into a live activation.
///
/// Locals in `body` resolve against the session's reconstructed chain.
pub(crate) struct EvalExpression;

impl NodeCapability for EvalExpression {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        if !session.is_eval() {
            return Err(CompileError::MissingEvalContext);
        }
        let block_depth = session.scope().block_depth();
        let body = session.convert_opt(tree.tree_at(0))?;
        Ok(
            Node::new(tree.tag.clone(), Payload::EvalScript { block_depth })
                .with_children(body.into_iter().collect()),
        )
    }
}
