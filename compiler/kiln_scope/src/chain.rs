//! Scope chains and the builder that reconstructs them.

use kiln_ir::EvalContext;

use crate::{LexicalScope, Location, ScopeKind};

/// The scopes visible to compiled code, innermost first.
///
/// A chain always ends in a method scope. When code is compiled into a
/// block activation, the chain also holds one scope per enclosing block,
/// and remembers the [`EvalContext`] it was built from so codegen can emit
/// the metadata needed to re-enter those blocks.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScopeChain {
    /// Block scopes, innermost first.
    blocks: Vec<LexicalScope>,
    method: LexicalScope,
    context: Option<EvalContext>,
}

impl ScopeChain {
    /// A chain for a script compiled outside any activation.
    pub fn for_script() -> Self {
        ScopeChain {
            blocks: Vec::new(),
            method: LexicalScope::fresh(),
            context: None,
        }
    }

    /// The scope new locals are declared in.
    pub fn innermost(&self) -> &LexicalScope {
        self.blocks.first().unwrap_or(&self.method)
    }

    fn innermost_mut(&mut self) -> &mut LexicalScope {
        match self.blocks.first_mut() {
            Some(block) => block,
            None => &mut self.method,
        }
    }

    /// Enclosing block scopes between the method and the innermost scope,
    /// outermost first.
    pub fn intermediate(&self) -> impl Iterator<Item = &LexicalScope> + '_ {
        self.blocks.iter().skip(1).rev()
    }

    /// Every scope, innermost first, ending with the method scope.
    pub fn all(&self) -> impl Iterator<Item = &LexicalScope> + '_ {
        self.blocks.iter().chain(std::iter::once(&self.method))
    }

    /// The scope of the owning method activation.
    pub fn method_scope(&self) -> &LexicalScope {
        &self.method
    }

    /// The context the chain was built from; `None` for script chains.
    pub fn context(&self) -> Option<&EvalContext> {
        self.context.as_ref()
    }

    /// Innermost scope, intermediate block scopes, the full chain and the
    /// originating context, together.
    pub fn parts(
        &self,
    ) -> (
        &LexicalScope,
        Vec<&LexicalScope>,
        Vec<&LexicalScope>,
        Option<&EvalContext>,
    ) {
        (
            self.innermost(),
            self.intermediate().collect(),
            self.all().collect(),
            self.context(),
        )
    }

    /// Number of block scopes in the chain.
    pub fn block_depth(&self) -> usize {
        self.blocks.len()
    }

    /// Where `name` lives. The innermost binding wins.
    pub fn resolve(&self, name: &str) -> Option<Location> {
        self.all().find_map(|scope| scope.get(name))
    }

    /// Resolve `name`, binding it in the innermost scope if it is new.
    pub fn declare(&mut self, name: &str) -> Location {
        if let Some(location) = self.resolve(name) {
            return location;
        }
        let location = self.innermost_mut().declare(name);
        tracing::trace!(name, %location, "declared local");
        location
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::for_script()
    }
}

/// Reconstruct the scope chain for code compiled into `context`.
///
/// Every block from the innermost outward gets a fresh eval scope. Blocks
/// that were not themselves created by an eval keep their known locals at
/// the environment indexes they already use. The method scope keeps its
/// locals at their original flat slots. Activations that expose no local
/// table produce empty scopes.
#[tracing::instrument(level = "debug", skip_all, fields(blocks = context.block_depth()))]
pub fn build_scope_chain(context: EvalContext) -> ScopeChain {
    let blocks: Vec<_> = context
        .blocks_inner_to_outer()
        .enumerate()
        .map(|(depth, block)| {
            let scope = LexicalScope::for_eval(ScopeKind::Block { depth });
            match &block.local_names {
                Some(names) if !block.from_eval => scope.seeded(names.as_slice()),
                _ => scope,
            }
        })
        .collect();

    let method = LexicalScope::for_eval(ScopeKind::Method);
    let method = match &context.method().local_names {
        Some(names) => method.seeded(names.as_slice()),
        None => method,
    };

    tracing::debug!(
        method_locals = method.len(),
        block_locals = blocks.iter().map(LexicalScope::len).sum::<usize>(),
        "built scope chain"
    );

    ScopeChain {
        blocks,
        method,
        context: Some(context),
    }
}
