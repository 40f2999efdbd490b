//! Converted nodes.

use std::fmt;

use kiln_ir::{Atom, Tag};
use kiln_plugins::Hint;
use kiln_scope::Location;

/// What conversion learned about a construct.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Payload {
    /// Root of a script compiled outside any activation.
    Script,
    /// Root of code compiled into a live activation, `block_depth`
    /// blocks deep.
    EvalScript { block_depth: usize },
    /// A local read or write, resolved through the scope chain.
    Local { name: String, location: Location },
    /// A method call and the hint a plugin attached to it.
    Call {
        selector: String,
        hint: Option<Hint>,
    },
    /// A method definition with the locals its body declared.
    Method {
        name: String,
        hint: Option<Hint>,
        locals: Vec<String>,
    },
    /// A conditional; `Some(Hint::Eliminate { .. })` when one branch was
    /// dropped at compile time.
    Conditional { hint: Option<Hint> },
    /// A constant reference.
    Constant(String),
    /// A literal value.
    Literal(Atom),
    /// Nothing beyond the tag and children.
    Generic,
}

/// A converted tree node.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Node {
    pub tag: Tag,
    pub line: Option<u32>,
    pub payload: Payload,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<Tag>, payload: Payload) -> Self {
        Node {
            tag: tag.into(),
            line: None,
            payload,
            children: Vec::new(),
        }
    }

    /// Shorthand for a literal node.
    pub fn literal(tag: impl Into<Tag>, atom: Atom) -> Self {
        Node::new(tag, Payload::Literal(atom))
    }

    #[must_use]
    pub fn at_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.as_str() == tag
    }

    /// Count of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Every node in this subtree with `tag`, in pre-order.
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Node>) {
        if self.is(tag) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(tag, found);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.tag)?;
        match &self.payload {
            Payload::Local { name, location } => write!(f, " {name}@{location}")?,
            Payload::Call { selector, hint } => {
                write!(f, " .{selector}")?;
                if let Some(hint) = hint {
                    write!(f, " {hint:?}")?;
                }
            }
            Payload::Method { name, .. } => write!(f, " {name}")?,
            Payload::Constant(name) => write!(f, " {name}")?,
            Payload::Literal(atom) => write!(f, " {atom}")?,
            Payload::EvalScript { block_depth } => write!(f, " depth={block_depth}")?,
            Payload::Conditional { hint: Some(hint) } => write!(f, " {hint:?}")?,
            Payload::Script | Payload::Conditional { hint: None } | Payload::Generic => {}
        }
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}
