//! Tagged expression trees.
//!
//! A `Tree` is what the parser hands to the driver: a tag naming the
//! construct, an optional source line, and an ordered list of children.
//! Each child is either another tree or a literal `Atom`.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// Name of a tree construct (`call`, `lasgn`, `script`, ...).
///
/// Core tags are `'static`; tags coming from a parser may be owned.
/// Hashes like the underlying `str`, so registries keyed by `Tag` can be
/// queried with a plain `&str`.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Create a tag from a static or owned string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Tag(name.into())
    }

    /// The tag's text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Tag {
    fn from(name: &'static str) -> Self {
        Tag(Cow::Borrowed(name))
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag(Cow::Owned(name))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A literal leaf in the tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Atom {
    Nil,
    True,
    False,
    Int(i64),
    /// Float stored as bits for `Hash`/`Eq`.
    Float(u64),
    Str(String),
    Symbol(String),
}

impl Atom {
    /// Build a float atom.
    pub fn float(value: f64) -> Self {
        Atom::Float(value.to_bits())
    }

    /// Build a symbol atom.
    pub fn symbol(name: impl Into<String>) -> Self {
        Atom::Symbol(name.into())
    }

    /// Build a string atom.
    pub fn string(text: impl Into<String>) -> Self {
        Atom::Str(text.into())
    }

    /// The symbol text, if this is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Atom::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Nil => write!(f, "nil"),
            Atom::True => write!(f, "true"),
            Atom::False => write!(f, "false"),
            Atom::Int(value) => write!(f, "{value}"),
            Atom::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Atom::Str(text) => write!(f, "{text:?}"),
            Atom::Symbol(name) => write!(f, ":{name}"),
        }
    }
}

/// One child of a tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Child {
    Tree(Tree),
    Atom(Atom),
}

impl Child {
    /// The subtree, if this child is one.
    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Child::Tree(tree) => Some(tree),
            Child::Atom(_) => None,
        }
    }

    /// The atom, if this child is one.
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Child::Atom(atom) => Some(atom),
            Child::Tree(_) => None,
        }
    }
}

impl From<Tree> for Child {
    fn from(tree: Tree) -> Self {
        Child::Tree(tree)
    }
}

impl From<Atom> for Child {
    fn from(atom: Atom) -> Self {
        Child::Atom(atom)
    }
}

/// A tagged expression tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Tree {
    pub tag: Tag,
    /// Source line this construct starts on, when the parser recorded one.
    pub line: Option<u32>,
    pub children: Vec<Child>,
}

impl Tree {
    /// Create a tree with no children.
    pub fn new(tag: impl Into<Tag>) -> Self {
        Tree {
            tag: tag.into(),
            line: None,
            children: Vec::new(),
        }
    }

    /// Create a tree with the given children.
    pub fn with_children(tag: impl Into<Tag>, children: impl IntoIterator<Item = Child>) -> Self {
        Tree {
            tag: tag.into(),
            line: None,
            children: children.into_iter().collect(),
        }
    }

    /// Record the source line.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn push(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a symbol atom.
    #[must_use]
    pub fn push_symbol(self, name: impl Into<String>) -> Self {
        self.push(Atom::symbol(name))
    }

    /// Child at `index`.
    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    /// Subtree at `index`, if that child is a tree.
    pub fn tree_at(&self, index: usize) -> Option<&Tree> {
        self.child(index).and_then(Child::as_tree)
    }

    /// Atom at `index`, if that child is an atom.
    pub fn atom_at(&self, index: usize) -> Option<&Atom> {
        self.child(index).and_then(Child::as_atom)
    }

    /// Symbol text at `index`, if that child is a symbol atom.
    pub fn symbol_at(&self, index: usize) -> Option<&str> {
        self.atom_at(index).and_then(Atom::as_symbol)
    }

    /// Check the tag.
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.as_str() == tag
    }

    /// Count of nodes in this tree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(Child::as_tree)
            .map(Tree::node_count)
            .sum::<usize>()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[:{}", self.tag)?;
        for child in &self.children {
            match child {
                Child::Tree(tree) => write!(f, ", {tree}")?,
                Child::Atom(atom) => write!(f, ", {atom}")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests;
