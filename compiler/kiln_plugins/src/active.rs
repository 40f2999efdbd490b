//! Per-session plugin activation.
//!
//! `ActivePlugins` holds the instances one compile session activated,
//! bucketed by kind. Within a bucket the order is exactly the order the
//! `activate*` calls were made; downstream hooks see that order, so the
//! same config must always produce the same buckets.

use std::collections::BTreeMap;

use kiln_ir::flags;

use crate::{
    names, Hint, HookContext, HookSite, Plugin, PluginError, PluginKind, PluginRegistry,
    PluginSetup,
};

/// The default activation sequence as `(name, condition)` pairs.
///
/// Entries with a condition only run when that config flag is set.
/// Conditional entries other than `inline` ignore `no-<name>`.
pub const DEFAULT_SEQUENCE: [(&str, Option<&str>); 12] = [
    (names::BLOCK_GIVEN, None),
    (names::PRIMITIVE, None),
    (names::ASSEMBLY, None),
    (names::FASTMATH, None),
    (names::CURRENT_METHOD, None),
    (names::SAFEMATH, Some(flags::SAFE_MATH)),
    (names::CONST_EXPR, Some(flags::KERNEL)),
    (names::INLINE, Some(flags::INLINE_TIMES)),
    (names::FASTSYSTEM, None),
    (names::FASTGENERIC, None),
    (names::AUTO_PRIMITIVE, None),
    (names::CONDITIONAL_COMPILATION, None),
];

/// Activated plugin instances, per kind, in activation order.
#[derive(Debug, Default)]
pub struct ActivePlugins {
    buckets: BTreeMap<PluginKind, Vec<Box<dyn Plugin>>>,
}

impl ActivePlugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate `name` and append it to its kind's bucket.
    ///
    /// Nothing is mutated when `name` is not registered.
    pub fn activate(
        &mut self,
        registry: &PluginRegistry,
        setup: &PluginSetup<'_>,
        name: &str,
    ) -> Result<(), PluginError> {
        let Some(descriptor) = registry.find(name) else {
            return Err(PluginError::UnknownPlugin {
                name: name.to_string(),
            });
        };
        let instance = descriptor.instantiate(setup);
        tracing::debug!(plugin = name, kind = %descriptor.kind, "activated plugin");
        self.buckets.entry(descriptor.kind).or_default().push(instance);
        Ok(())
    }

    /// Like [`activate`](Self::activate), unless `no-<name>` is set.
    pub fn activate_default(
        &mut self,
        registry: &PluginRegistry,
        setup: &PluginSetup<'_>,
        name: &str,
    ) -> Result<(), PluginError> {
        if setup.config.is_set(&flags::disable(name)) {
            tracing::debug!(plugin = name, "plugin disabled by config");
            return Ok(());
        }
        self.activate(registry, setup, name)
    }

    /// Run the default activation sequence.
    pub fn load_defaults(
        &mut self,
        registry: &PluginRegistry,
        setup: &PluginSetup<'_>,
    ) -> Result<(), PluginError> {
        for (name, condition) in DEFAULT_SEQUENCE {
            match condition {
                None => self.activate_default(registry, setup, name)?,
                Some(flag) if !setup.config.is_set(flag) => {}
                Some(_) if name == names::INLINE => {
                    self.activate_default(registry, setup, name)?;
                }
                Some(_) => self.activate(registry, setup, name)?,
            }
        }
        Ok(())
    }

    /// Instances of `kind`, in activation order.
    pub fn of_kind(&self, kind: PluginKind) -> &[Box<dyn Plugin>] {
        self.buckets.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Names of the active instances of `kind`, in activation order.
    pub fn names(&self, kind: PluginKind) -> Vec<&'static str> {
        self.of_kind(kind).iter().map(|plugin| plugin.name()).collect()
    }

    /// Kinds with at least one instance, in their fixed order.
    pub fn kinds(&self) -> impl Iterator<Item = PluginKind> + '_ {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ask each instance handling `site` in order; the first hint wins.
    pub fn first_hint(&self, cx: &HookContext<'_>, site: &HookSite<'_>) -> Option<Hint> {
        self.of_kind(site.kind()).iter().find_map(|plugin| {
            let hint = plugin.handle(cx, site);
            if let Some(hint) = &hint {
                tracing::trace!(plugin = plugin.name(), ?hint, "plugin hint");
            }
            hint
        })
    }
}
