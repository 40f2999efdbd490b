//! The plugin trait and the sites plugins are consulted at.

use std::fmt;

use kiln_ir::{Atom, CompileConfig, SourcePosition, Tree, Variables};

/// Hook family a plugin participates in.
///
/// Ordering is the fixed order kinds are iterated in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub enum PluginKind {
    /// Consulted for every method call.
    Call,
    /// Consulted for every method definition.
    Method,
    /// Consulted for every conditional.
    Conditional,
}

impl PluginKind {
    pub const ALL: [PluginKind; 3] = [PluginKind::Call, PluginKind::Method, PluginKind::Conditional];

    pub fn as_str(self) -> &'static str {
        match self {
            PluginKind::Call => "call",
            PluginKind::Method => "method",
            PluginKind::Conditional => "conditional",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a plugin asks codegen to do differently.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Hint {
    /// Emit this instruction instead of a generic send.
    Opcode(&'static str),
    /// The enclosing method is backed by a VM primitive.
    Primitive(String),
    /// Inline assembly text to splice in.
    Assembly(String),
    /// The call folds to a constant.
    Folded(i64),
    /// Expand the call in place.
    Inline(&'static str),
    /// Method body is a lone primitive call; bind the primitive directly.
    AutoPrimitive(String),
    /// Drop one branch of a conditional at compile time.
    Eliminate { keep_then: bool },
}

/// Receiver of a call site.
#[derive(Clone, Copy, Debug)]
pub enum Receiver<'a> {
    /// No explicit receiver (`foo(1)`).
    Implicit,
    /// `self.foo`.
    SelfRef,
    /// A constant (`Ruby.primitive`).
    Const(&'a str),
    /// A literal (`1 + 2`).
    Literal(&'a Atom),
    /// Anything else.
    Expr(&'a Tree),
}

impl<'a> Receiver<'a> {
    /// Classify a receiver subtree.
    pub fn from_tree(tree: &'a Tree) -> Self {
        match tree.tag.as_str() {
            "self" => Receiver::SelfRef,
            "const" => tree.symbol_at(0).map_or(Receiver::Expr(tree), Receiver::Const),
            "lit" => tree.atom_at(0).map_or(Receiver::Expr(tree), Receiver::Literal),
            _ => Receiver::Expr(tree),
        }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self, Receiver::Implicit)
    }

    /// The constant name, if the receiver is one.
    pub fn as_const(&self) -> Option<&'a str> {
        match self {
            Receiver::Const(name) => Some(name),
            _ => None,
        }
    }
}

/// A method call, seen before conversion.
///
/// Recognized shapes: `[:call, receiver, :selector, args...]` and
/// `[:fcall, :selector, args...]`.
#[derive(Clone, Debug)]
pub struct CallSite<'a> {
    pub receiver: Receiver<'a>,
    pub selector: &'a str,
    pub args: Vec<&'a Tree>,
    pub has_block: bool,
}

impl<'a> CallSite<'a> {
    /// Read a call site from a `call` or `fcall` tree.
    pub fn from_tree(tree: &'a Tree) -> Option<Self> {
        let (receiver, selector_at) = match tree.tag.as_str() {
            "call" => (Receiver::from_tree(tree.tree_at(0)?), 1),
            "fcall" => (Receiver::Implicit, 0),
            _ => return None,
        };
        let selector = tree.symbol_at(selector_at)?;
        let args = tree
            .children
            .iter()
            .skip(selector_at + 1)
            .filter_map(kiln_ir::Child::as_tree)
            .collect();
        Some(CallSite {
            receiver,
            selector,
            args,
            has_block: false,
        })
    }

    /// Mark the call as carrying a block.
    #[must_use]
    pub fn with_block(mut self) -> Self {
        self.has_block = true;
        self
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Literal atom of argument `index`, when it is `[:lit, atom]`.
    pub fn literal_arg(&self, index: usize) -> Option<&'a Atom> {
        let arg = self.args.get(index)?;
        if arg.is("lit") {
            arg.atom_at(0)
        } else {
            None
        }
    }
}

/// A method definition: `[:defn, :name, body...]`.
#[derive(Clone, Debug)]
pub struct MethodSite<'a> {
    pub name: &'a str,
    pub body: Vec<&'a Tree>,
}

impl<'a> MethodSite<'a> {
    pub fn from_tree(tree: &'a Tree) -> Option<Self> {
        if !tree.is("defn") {
            return None;
        }
        let name = tree.symbol_at(0)?;
        let body = tree
            .children
            .iter()
            .skip(1)
            .filter_map(kiln_ir::Child::as_tree)
            .collect();
        Some(MethodSite { name, body })
    }

    /// The only statement of the body, looking through a one-statement `block`.
    pub fn sole_statement(&self) -> Option<&'a Tree> {
        let &[stmt] = self.body.as_slice() else {
            return None;
        };
        match stmt.children.as_slice() {
            [kiln_ir::Child::Tree(inner)] if stmt.is("block") => Some(inner),
            _ => Some(stmt),
        }
    }
}

/// A conditional: `[:if, condition, then, else]`.
#[derive(Clone, Copy, Debug)]
pub struct ConditionalSite<'a> {
    pub condition: &'a Tree,
}

impl<'a> ConditionalSite<'a> {
    pub fn from_tree(tree: &'a Tree) -> Option<Self> {
        if !tree.is("if") {
            return None;
        }
        tree.tree_at(0).map(|condition| ConditionalSite { condition })
    }
}

/// Where a hook is being consulted.
#[derive(Clone, Debug)]
pub enum HookSite<'a> {
    Call(CallSite<'a>),
    Method(MethodSite<'a>),
    Conditional(ConditionalSite<'a>),
}

impl HookSite<'_> {
    /// Kind of plugin that handles this site.
    pub fn kind(&self) -> PluginKind {
        match self {
            HookSite::Call(_) => PluginKind::Call,
            HookSite::Method(_) => PluginKind::Method,
            HookSite::Conditional(_) => PluginKind::Conditional,
        }
    }
}

/// Read-only view of the session handed to hooks.
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    pub config: &'a CompileConfig,
    pub variables: &'a Variables,
    pub position: &'a SourcePosition,
}

/// A codegen hook participant.
///
/// Instances are created fresh for every session by their descriptor's
/// factory and are never shared between sessions.
pub trait Plugin: fmt::Debug + Send {
    /// Registered name (`fastmath`, `block-given`, ...).
    fn name(&self) -> &'static str;

    /// Inspect `site`; return a hint to change how it is compiled.
    fn handle(&self, cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint>;
}
