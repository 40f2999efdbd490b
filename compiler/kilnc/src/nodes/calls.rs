use kiln_ir::{Child, Tree};
use kiln_plugins::{CallSite, Hint, HookSite, INLINING_DIRECTIVE};

use super::tags;
use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:call, receiver, :selector, args...]` and `[:fcall, :selector, args...]`
pub(crate) struct Call;

impl NodeCapability for Call {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        convert_call(session, tree, false)
    }
}

/// `[:iter, call, body...]`: a call with a literal block.
///
/// The body of an inlined block is converted with inlining switched off,
/// so only the outermost loop of a nest is expanded.
pub(crate) struct Iter;

impl NodeCapability for Iter {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let call = tree
            .tree_at(0)
            .filter(|call| call.is(tags::CALL) || call.is(tags::FCALL))
            .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), "block without a call"))?;
        let call = session.enter(call, |session| convert_call(session, call, true))?;

        let body = tree.children.iter().skip(1).filter_map(Child::as_tree);
        let inlined = matches!(
            call.payload,
            Payload::Call {
                hint: Some(Hint::Inline(_)),
                ..
            }
        );
        let body = if inlined {
            session.with_variable(INLINING_DIRECTIVE, false, |session| {
                session.convert_all(body)
            })?
        } else {
            session.convert_all(body)?
        };

        let mut children = Vec::with_capacity(body.len() + 1);
        children.push(call);
        children.extend(body);
        Ok(Node::new(tree.tag.clone(), Payload::Generic).with_children(children))
    }
}

fn convert_call(session: &mut Session<'_>, tree: &Tree, has_block: bool) -> CompileResult<Node> {
    let site = CallSite::from_tree(tree)
        .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), "malformed call"))?;
    let site = if has_block { site.with_block() } else { site };

    let selector = site.selector.to_string();
    let args = site.args.clone();
    let hint = session.hint(&HookSite::Call(site));
    if let Some(hint) = &hint {
        tracing::trace!(%selector, ?hint, "call hinted");
    }

    let receiver = if tree.is(tags::CALL) {
        session.convert_opt(tree.tree_at(0))?
    } else {
        None
    };
    let mut children = Vec::with_capacity(args.len() + 1);
    children.extend(receiver);
    children.extend(session.convert_all(args)?);

    Ok(Node::new(tree.tag.clone(), Payload::Call { selector, hint }).with_children(children))
}
