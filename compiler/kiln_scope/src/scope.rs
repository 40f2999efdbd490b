//! A single lexical scope.

use std::fmt;

use rustc_hash::FxHashMap;

/// Where a local lives at runtime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Location {
    /// A flat slot in the method's local table.
    Slot(usize),
    /// An entry in a block environment `depth` levels out from the
    /// innermost activation.
    Env { depth: usize, index: usize },
}

impl Location {
    pub fn is_slot(self) -> bool {
        matches!(self, Location::Slot(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Slot(slot) => write!(f, "slot {slot}"),
            Location::Env { depth, index } => write!(f, "env {depth}:{index}"),
        }
    }
}

/// The activation a scope mirrors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    /// A method body; locals are flat slots.
    Method,
    /// A block `depth` levels out from the innermost activation.
    Block { depth: usize },
}

/// Ordered name → location bindings for one activation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LexicalScope {
    kind: ScopeKind,
    from_eval: bool,
    names: Vec<String>,
    locations: FxHashMap<String, Location>,
    next_index: usize,
}

impl LexicalScope {
    /// An empty method scope for code compiled outside any activation.
    pub fn fresh() -> Self {
        Self::empty(ScopeKind::Method, false)
    }

    /// An empty scope created for eval'd code.
    pub fn for_eval(kind: ScopeKind) -> Self {
        Self::empty(kind, true)
    }

    fn empty(kind: ScopeKind, from_eval: bool) -> Self {
        LexicalScope {
            kind,
            from_eval,
            names: Vec::new(),
            locations: FxHashMap::default(),
            next_index: 0,
        }
    }

    /// Bind `names` at the indexes they already occupy in the activation.
    ///
    /// A name listed twice keeps its last index, as the activation's
    /// later slot shadows the earlier one.
    #[must_use]
    pub fn seeded<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for (index, name) in names.iter().enumerate() {
            let location = self.location_at(index);
            self.bind(name.as_ref(), location);
        }
        self.next_index = self.next_index.max(names.len());
        self
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Whether this scope was created for eval'd code.
    pub fn is_from_eval(&self) -> bool {
        self.from_eval
    }

    pub fn get(&self, name: &str) -> Option<Location> {
        self.locations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Bound names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, Location)> + '_ {
        self.names
            .iter()
            .filter_map(|name| self.get(name).map(|location| (name.as_str(), location)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bind `name` at the next free index, or return its existing location.
    pub fn declare(&mut self, name: &str) -> Location {
        if let Some(location) = self.get(name) {
            return location;
        }
        let location = self.location_at(self.next_index);
        self.next_index += 1;
        self.bind(name, location);
        location
    }

    fn location_at(&self, index: usize) -> Location {
        match self.kind {
            ScopeKind::Method => Location::Slot(index),
            ScopeKind::Block { depth } => Location::Env { depth, index },
        }
    }

    fn bind(&mut self, name: &str, location: Location) {
        if self.locations.insert(name.to_string(), location).is_none() {
            self.names.push(name.to_string());
        }
    }
}
