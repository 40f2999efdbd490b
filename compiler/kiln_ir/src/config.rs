//! Compile configuration.
//!
//! `CompileConfig` is a flat map from flag name to value. The process-wide
//! `ConfigRegistry` is mutated by the embedding program before compiling;
//! each session takes an immutable `Arc` snapshot when it is built and never
//! looks at the registry again.
//!
//! # Thread Safety
//!
//! The registry lock only protects the map itself. Mutating the registry
//! while a compile is in flight is unsupported: the running session keeps
//! the snapshot it started with, the next one sees the change.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Well-known flag names.
pub mod flags {
    /// Compiling the core library; enables constant-expression folding.
    pub const KERNEL: &str = "kernel";
    /// Activate the checked-division plugin.
    pub const SAFE_MATH: &str = "safe-math";
    /// Activate the `times` inliner.
    pub const INLINE_TIMES: &str = "inline-times";

    /// Flag that suppresses a default plugin: `no-<name>`.
    pub fn disable(plugin: &str) -> String {
        format!("no-{plugin}")
    }
}

/// Seconds since the Unix epoch at which version numbers start.
const VERSION_EPOCH: u64 = 1_141_027_200;

/// Compiler version number recorded on every method description.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug, Default)]
pub struct VersionNumber(u64);

impl VersionNumber {
    /// Version derived from a timestamp (seconds since the Unix epoch).
    pub fn from_timestamp(secs: u64) -> Self {
        VersionNumber(secs.saturating_sub(VERSION_EPOCH))
    }

    /// Version forced by the embedder; `None` resets it to zero.
    pub fn forced(secs: Option<u64>) -> Self {
        secs.map_or(VersionNumber(0), Self::from_timestamp)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Value of a config flag.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConfigValue {
    Flag(bool),
    Int(i64),
    Text(String),
}

impl ConfigValue {
    /// Everything except `Flag(false)` counts as set.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, ConfigValue::Flag(false))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Flag(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

/// Named compile flags.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct CompileConfig {
    values: FxHashMap<String, ConfigValue>,
    version: VersionNumber,
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `flag`, or `None` when it was never set.
    pub fn get(&self, flag: &str) -> Option<&ConfigValue> {
        self.values.get(flag)
    }

    /// Whether `flag` is present and truthy. Missing flags are unset.
    pub fn is_set(&self, flag: &str) -> bool {
        self.get(flag).is_some_and(ConfigValue::is_truthy)
    }

    pub fn set(&mut self, flag: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(flag.into(), value.into());
    }

    /// Set `flag` to `true`.
    pub fn enable(&mut self, flag: impl Into<String>) {
        self.set(flag, true);
    }

    pub fn remove(&mut self, flag: &str) -> Option<ConfigValue> {
        self.values.remove(flag)
    }

    /// Enable every flag in `flags`.
    pub fn apply_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for flag in flags {
            self.enable(flag);
        }
    }

    /// Builder form of [`enable`](Self::enable).
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.enable(flag);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: VersionNumber) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> VersionNumber {
        self.version
    }

    pub fn set_version(&mut self, version: VersionNumber) {
        self.version = version;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Process-wide config, read once per compile session.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    config: RwLock<CompileConfig>,
}

static GLOBAL_CONFIG: OnceLock<ConfigRegistry> = OnceLock::new();

impl ConfigRegistry {
    pub fn new(config: CompileConfig) -> Self {
        ConfigRegistry {
            config: RwLock::new(config),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static ConfigRegistry {
        GLOBAL_CONFIG.get_or_init(ConfigRegistry::default)
    }

    pub fn get(&self, flag: &str) -> Option<ConfigValue> {
        self.config.read().get(flag).cloned()
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.config.read().is_set(flag)
    }

    pub fn set(&self, flag: impl Into<String>, value: impl Into<ConfigValue>) {
        self.config.write().set(flag, value);
    }

    pub fn enable(&self, flag: impl Into<String>) {
        self.config.write().enable(flag);
    }

    pub fn remove(&self, flag: &str) -> Option<ConfigValue> {
        self.config.write().remove(flag)
    }

    pub fn set_version(&self, version: VersionNumber) {
        self.config.write().set_version(version);
    }

    /// Drop every flag and reset the version.
    pub fn clear(&self) {
        *self.config.write() = CompileConfig::default();
    }

    /// Immutable copy for a session.
    pub fn snapshot(&self) -> Arc<CompileConfig> {
        Arc::new(self.config.read().clone())
    }
}
