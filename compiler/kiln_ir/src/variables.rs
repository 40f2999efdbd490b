//! Transient compile directives.
//!
//! Conversions pass short-lived directives ("inlining permitted here",
//! "inside a loop body") to the constructs nested beneath them through a
//! `Variables` overlay. Every overlay is paired with a `SavedVariables`
//! token; handing the token back to [`Variables::restore`] puts the map
//! back exactly as it was. The session wraps this in a guard so the restore
//! runs on every exit path.

use rustc_hash::FxHashMap;

/// Value of a directive.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DirectiveValue {
    Flag(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for DirectiveValue {
    fn from(value: bool) -> Self {
        DirectiveValue::Flag(value)
    }
}

impl From<i64> for DirectiveValue {
    fn from(value: i64) -> Self {
        DirectiveValue::Int(value)
    }
}

impl From<&str> for DirectiveValue {
    fn from(value: &str) -> Self {
        DirectiveValue::Text(value.to_string())
    }
}

/// What an overlay replaced.
#[derive(Debug)]
#[must_use = "dropping the token loses the state needed to undo the overlay"]
pub enum SavedVariables {
    /// A single key and the value it had (`None` = absent).
    One {
        key: String,
        previous: Option<DirectiveValue>,
    },
    /// The entire map as it was before a mapping overlay.
    Snapshot(FxHashMap<String, DirectiveValue>),
}

/// Current directive values.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Variables {
    values: FxHashMap<String, DirectiveValue>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`; `None` is the built-in default.
    pub fn get(&self, key: &str) -> Option<&DirectiveValue> {
        self.values.get(key)
    }

    /// Boolean directive, `false` when absent.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(DirectiveValue::Flag(true)))
    }

    /// Overlay one key, returning what it replaced.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<DirectiveValue>) -> SavedVariables {
        let key = key.into();
        let previous = self.values.insert(key.clone(), value.into());
        SavedVariables::One { key, previous }
    }

    /// Merge `mapping` over the current values, returning the full prior map.
    pub fn push_all<I, K, V>(&mut self, mapping: I) -> SavedVariables
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DirectiveValue>,
    {
        let snapshot = self.values.clone();
        self.values
            .extend(mapping.into_iter().map(|(k, v)| (k.into(), v.into())));
        SavedVariables::Snapshot(snapshot)
    }

    /// Undo the overlay that produced `saved`.
    pub fn restore(&mut self, saved: SavedVariables) {
        match saved {
            SavedVariables::One { key, previous } => match previous {
                Some(value) => {
                    self.values.insert(key, value);
                }
                None => {
                    self.values.remove(&key);
                }
            },
            SavedVariables::Snapshot(snapshot) => self.values = snapshot,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
