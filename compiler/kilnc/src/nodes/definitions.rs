use kiln_ir::Tree;
use kiln_plugins::{HookSite, MethodSite};

use crate::dispatch::NodeCapability;
use crate::{CompileError, CompileResult, Node, Payload, Session};

/// `[:defn, :name, body...]`
///
/// The body gets a scope of its own; the enclosing chain is untouched.
pub(crate) struct MethodDefinition;

impl NodeCapability for MethodDefinition {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        let site = MethodSite::from_tree(tree)
            .ok_or_else(|| CompileError::conversion(tree.tag.as_str(), "missing method name"))?;
        let name = site.name.to_string();
        let body = site.body.clone();
        let hint = session.hint(&HookSite::Method(site));

        let (children, scope) = session.with_method_scope(|session| session.convert_all(body));
        let children = children?;
        let locals = scope.method_scope().names().to_vec();

        Ok(
            Node::new(tree.tag.clone(), Payload::Method { name, hint, locals })
                .with_children(children),
        )
    }
}
