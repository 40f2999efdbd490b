//! Descriptions of suspended activations.
//!
//! When code is compiled to run inside a frame that already exists (an
//! interactive eval, a debugger expression), the driver is handed an
//! `EvalContext`: the chain of live block activations, innermost last,
//! ending in the method activation that owns them.

/// A suspended block activation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BlockActivation {
    /// Locals known to the block, in declaration order.
    ///
    /// `None` when the activation does not expose a local table.
    pub local_names: Option<Vec<String>>,
    /// Whether this block was itself created by an earlier eval.
    pub from_eval: bool,
}

impl BlockActivation {
    /// A block with the given known locals.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        BlockActivation {
            local_names: Some(names.into_iter().map(Into::into).collect()),
            from_eval: false,
        }
    }

    /// A block that exposes no local table.
    pub fn opaque() -> Self {
        BlockActivation::default()
    }

    /// Mark the block as created by a previous eval.
    #[must_use]
    pub fn from_eval(mut self) -> Self {
        self.from_eval = true;
        self
    }
}

/// The method activation at the bottom of an eval chain.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct MethodActivation {
    /// Method name, when known. Only used for diagnostics.
    pub name: Option<String>,
    /// Locals owned by the method, in slot order.
    pub local_names: Option<Vec<String>>,
}

impl MethodActivation {
    /// A method with the given known locals.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        MethodActivation {
            name: None,
            local_names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// A method that exposes no local table.
    pub fn opaque() -> Self {
        MethodActivation::default()
    }

    /// Attach the method name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A live execution context new code may be compiled to run inside.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EvalContext {
    method: MethodActivation,
    /// Enclosing blocks, outermost first.
    blocks: Vec<BlockActivation>,
}

impl EvalContext {
    /// A context that is a bare method activation.
    pub fn in_method(method: MethodActivation) -> Self {
        EvalContext {
            method,
            blocks: Vec::new(),
        }
    }

    /// Nest a new innermost block inside the current chain.
    #[must_use]
    pub fn within(mut self, block: BlockActivation) -> Self {
        self.blocks.push(block);
        self
    }

    /// The owning method activation.
    pub fn method(&self) -> &MethodActivation {
        &self.method
    }

    /// Whether the innermost activation is a block.
    pub fn is_block(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// The innermost block, if any.
    pub fn innermost_block(&self) -> Option<&BlockActivation> {
        self.blocks.last()
    }

    /// Blocks from the innermost outward.
    pub fn blocks_inner_to_outer(&self) -> impl Iterator<Item = &BlockActivation> {
        self.blocks.iter().rev()
    }

    /// Number of enclosing block activations.
    pub fn block_depth(&self) -> usize {
        self.blocks.len()
    }
}
