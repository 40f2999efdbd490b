//! Compile sessions.
//!
//! A `Session` is the state of one compile call: the config snapshot, the
//! plugins activated for it, the directive overlay, the scope chain, where
//! in the source the driver currently is, and which constructs it is in
//! the middle of converting. Sessions are never shared; parallel compiles
//! each build their own.

use std::sync::Arc;

use kiln_diagnostic::{CallTrace, Diagnostic, TraceFrame};
use kiln_ir::{Child, CompileConfig, DirectiveValue, EvalContext, SourcePosition, Tree, Variables};
use kiln_plugins::{ActivePlugins, Hint, HookContext, HookSite, PluginRegistry, PluginSetup};
use kiln_scope::{build_scope_chain, ScopeChain};
use kiln_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::nodes::tags;
use crate::{CompileError, CompileResult, Node, NodeRegistry};

/// State of a single compile call.
#[derive(Debug)]
pub struct Session<'a> {
    config: Arc<CompileConfig>,
    nodes: &'a NodeRegistry,
    plugins: ActivePlugins,
    pub(crate) variables: Variables,
    scope: ScopeChain,
    position: SourcePosition,
    /// Constructs being converted, outermost first.
    trace: SmallVec<[TraceFrame; 8]>,
    /// Where the current failure started, keyed by its message.
    failure: Option<(String, CallTrace)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Session<'a> {
    /// Build a session and run the default plugin activation sequence.
    ///
    /// When `context` is given, the scope chain is reconstructed from it
    /// here, before any conversion runs.
    pub fn new(
        config: Arc<CompileConfig>,
        nodes: &'a NodeRegistry,
        registry: &PluginRegistry,
        context: Option<EvalContext>,
    ) -> CompileResult<Self> {
        let mut plugins = ActivePlugins::new();
        plugins.load_defaults(registry, &PluginSetup { config: &config })?;
        Ok(Self::with_plugins(config, nodes, plugins, context))
    }

    /// Build a session around an already activated plugin set.
    pub fn with_plugins(
        config: Arc<CompileConfig>,
        nodes: &'a NodeRegistry,
        plugins: ActivePlugins,
        context: Option<EvalContext>,
    ) -> Self {
        let scope = context.map_or_else(ScopeChain::for_script, build_scope_chain);
        Session {
            config,
            nodes,
            plugins,
            variables: Variables::new(),
            scope,
            position: SourcePosition::default(),
            trace: SmallVec::new(),
            failure: None,
            diagnostics: Vec::new(),
        }
    }

    /// Activate one more plugin from `registry`.
    pub fn activate(&mut self, registry: &PluginRegistry, name: &str) -> CompileResult<()> {
        let setup = PluginSetup {
            config: &self.config,
        };
        self.plugins.activate(registry, &setup, name)?;
        Ok(())
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn plugins(&self) -> &ActivePlugins {
        &self.plugins
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Current value of directive `key`.
    pub fn get(&self, key: &str) -> Option<&DirectiveValue> {
        self.variables.get(key)
    }

    pub fn scope(&self) -> &ScopeChain {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut ScopeChain {
        &mut self.scope
    }

    /// Whether the session compiles into a live activation.
    pub fn is_eval(&self) -> bool {
        self.scope.context().is_some()
    }

    pub fn eval_context(&self) -> Option<&EvalContext> {
        self.scope.context()
    }

    /// Run `f` with a fresh method scope in place of the current chain.
    ///
    /// Returns `f`'s result and the scope the method body populated.
    pub fn with_method_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, ScopeChain) {
        let outer = std::mem::replace(&mut self.scope, ScopeChain::for_script());
        let result = f(self);
        let method = std::mem::replace(&mut self.scope, outer);
        (result, method)
    }

    pub fn set_position(&mut self, file: impl Into<String>, line: u32) {
        self.position = SourcePosition::new(file, line);
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn current_file(&self) -> &str {
        &self.position.file
    }

    pub fn current_line(&self) -> u32 {
        self.position.line
    }

    /// Ask the active plugins about `site`; the first hint wins.
    pub fn hint(&self, site: &HookSite<'_>) -> Option<Hint> {
        let cx = HookContext {
            config: &self.config,
            variables: &self.variables,
            position: &self.position,
        };
        self.plugins.first_hint(&cx, site)
    }

    /// Convert `tree` with the capability registered for its tag.
    pub fn convert(&mut self, tree: &Tree) -> CompileResult<Node> {
        ensure_sufficient_stack(|| self.dispatch(tree))
    }

    #[tracing::instrument(level = "trace", skip_all, fields(tag = %tree.tag))]
    fn dispatch(&mut self, tree: &Tree) -> CompileResult<Node> {
        let nodes = self.nodes;
        self.enter(tree, |session| match nodes.get(tree.tag.as_str()) {
            Some(capability) => capability.convert(session, tree),
            None => Err(CompileError::UnresolvedNode(tree.tag.as_str().to_string())),
        })
    }

    /// Run `f` as the conversion of `tree`: its line becomes current and
    /// it sits on the trace while `f` runs.
    ///
    /// The failure trace is captured at the innermost frame an error
    /// surfaces from. It is dropped when a frame succeeds or a new one
    /// starts, and replaced when a frame fails with a different error: an
    /// error a capability recovered from must not reach a later diagnostic.
    pub(crate) fn enter(
        &mut self,
        tree: &Tree,
        f: impl FnOnce(&mut Self) -> CompileResult<Node>,
    ) -> CompileResult<Node> {
        self.failure = None;
        if let Some(line) = tree.line {
            self.position.line = line;
        }
        self.trace.push(TraceFrame::new(
            tree.tag.as_str(),
            Some(self.position.clone()),
        ));

        let result = f(self).map(|mut node| {
            node.line = node.line.or(tree.line);
            node
        });

        match &result {
            Ok(_) => self.failure = None,
            Err(error) => {
                let message = error.to_string();
                let propagated = matches!(&self.failure, Some((seen, _)) if *seen == message);
                if !propagated {
                    self.failure = Some((message, CallTrace::from_stack(&self.trace)));
                }
            }
        }
        self.trace.pop();
        result
    }

    /// Convert an optional child; absent trees convert to nothing.
    pub fn convert_opt(&mut self, tree: Option<&Tree>) -> CompileResult<Option<Node>> {
        tree.map(|tree| self.convert(tree)).transpose()
    }

    /// Convert every subtree child of `tree`, in order. Atom children are
    /// left to the caller.
    pub fn convert_children(&mut self, tree: &Tree) -> CompileResult<Vec<Node>> {
        self.convert_all(tree.children.iter().filter_map(Child::as_tree))
    }

    pub fn convert_all<'t>(
        &mut self,
        trees: impl IntoIterator<Item = &'t Tree>,
    ) -> CompileResult<Vec<Node>> {
        trees.into_iter().map(|tree| self.convert(tree)).collect()
    }

    /// Convert a whole program.
    ///
    /// The program is wrapped in a synthetic `script` node. A failure
    /// anywhere inside is contained: it is reported as a diagnostic and the
    /// call returns `Ok(None)`. Only fatal generation errors propagate.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.position.file))]
    pub fn into_script(&mut self, tree: &Tree) -> CompileResult<Option<Node>> {
        let script = Tree::new(tags::SCRIPT).push(tree.clone());
        self.failure = None;
        match self.convert(&script) {
            Ok(node) => Ok(Some(node)),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => {
                let diagnostic = self.diagnose(&error);
                self.report(diagnostic);
                Ok(None)
            }
        }
    }

    /// Convert code for a live activation.
    ///
    /// The tree is wrapped in `eval_expression` so references resolve
    /// against the session's scope chain. Failures are not contained.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn convert_eval(&mut self, tree: &Tree) -> CompileResult<Node> {
        if !self.is_eval() {
            return Err(CompileError::MissingEvalContext);
        }
        let wrapped = Tree::new(tags::EVAL_EXPRESSION).push(tree.clone());
        self.failure = None;
        self.convert(&wrapped)
    }

    /// Diagnostic for `error` at the current position, with the trace
    /// captured where it started.
    pub fn diagnose(&mut self, error: &CompileError) -> Diagnostic {
        let trace = self.failure.take().map(|(_, trace)| trace).unwrap_or_default();
        error
            .to_diagnostic()
            .with_location(self.position.clone())
            .with_trace(trace)
    }

    /// Record a diagnostic for the caller.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::error!(
            code = %diagnostic.code,
            location = ?diagnostic.location,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
