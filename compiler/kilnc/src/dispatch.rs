//! Tag → conversion dispatch.
//!
//! The core only looks conversions up. Everything that knows how to turn a
//! particular construct into a [`Node`] registers itself here, keyed by the
//! tree tag it handles.

use std::fmt;

use kiln_ir::{Tag, Tree};
use rustc_hash::FxHashMap;

use crate::{nodes, CompileResult, Node, Session};

/// Converts trees with one tag into nodes.
///
/// The session is passed in so a conversion can consult config, the scope
/// chain and the active plugins, and recurse into children through
/// [`Session::convert`].
pub trait NodeCapability: Send + Sync {
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node>;
}

impl<F> NodeCapability for F
where
    F: Fn(&mut Session<'_>, &Tree) -> CompileResult<Node> + Send + Sync,
{
    fn convert(&self, session: &mut Session<'_>, tree: &Tree) -> CompileResult<Node> {
        self(session, tree)
    }
}

/// Registry of node capabilities, keyed by tag.
#[derive(Default)]
pub struct NodeRegistry {
    capabilities: FxHashMap<Tag, Box<dyn NodeCapability>>,
}

impl NodeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the core constructs registered.
    pub fn with_core() -> Self {
        let mut registry = NodeRegistry::new();
        nodes::register_core(&mut registry);
        registry
    }

    /// Register `capability` for `tag`, replacing any previous one.
    pub fn register<C>(&mut self, tag: impl Into<Tag>, capability: C)
    where
        C: NodeCapability + 'static,
    {
        self.capabilities.insert(tag.into(), Box::new(capability));
    }

    pub fn get(&self, tag: &str) -> Option<&dyn NodeCapability> {
        self.capabilities.get(tag).map(|capability| &**capability)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.capabilities.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<_> = self.capabilities.keys().map(Tag::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
