//! Plugin registry for looking up plugin descriptors by name.
//!
//! The registry is populated once (built-ins plus anything an embedder
//! registers) and is only read while compiling. Activation never mutates
//! it; each session keeps its own instances in `ActivePlugins`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use kiln_ir::CompileConfig;
use rustc_hash::FxHashMap;

use crate::builtins;
use crate::{Plugin, PluginKind};

/// Global registry singleton with the built-in plugins.
static GLOBAL_REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();

/// Session data handed to plugin factories.
#[derive(Clone, Copy, Debug)]
pub struct PluginSetup<'a> {
    /// Config snapshot the session was built with.
    pub config: &'a Arc<CompileConfig>,
}

/// Builds a fresh plugin instance for one session.
pub type PluginFactory = Box<dyn Fn(&PluginSetup<'_>) -> Box<dyn Plugin> + Send + Sync>;

/// A registered plugin: its name, the hook kind it joins, and a factory.
pub struct PluginDescriptor {
    pub name: &'static str,
    pub kind: PluginKind,
    factory: PluginFactory,
}

impl PluginDescriptor {
    pub fn new<F>(name: &'static str, kind: PluginKind, factory: F) -> Self
    where
        F: Fn(&PluginSetup<'_>) -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        PluginDescriptor {
            name,
            kind,
            factory: Box::new(factory),
        }
    }

    /// Instantiate for a session.
    pub fn instantiate(&self, setup: &PluginSetup<'_>) -> Box<dyn Plugin> {
        (self.factory)(setup)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Registry of plugin descriptors.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    descriptors: FxHashMap<&'static str, PluginDescriptor>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in plugin registered.
    pub fn with_builtins() -> Self {
        let mut registry = PluginRegistry::new();
        builtins::register_builtins(&mut registry);
        registry
    }

    /// Register a descriptor, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: PluginDescriptor) {
        self.descriptors.insert(descriptor.name, descriptor);
    }

    /// Look up a descriptor by name.
    pub fn find(&self, name: &str) -> Option<&PluginDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.descriptors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// The global registry with all built-in plugins registered.
pub fn global_registry() -> &'static PluginRegistry {
    GLOBAL_REGISTRY.get_or_init(PluginRegistry::with_builtins)
}
