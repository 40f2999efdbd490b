use thiserror::Error;

/// Errors raised while activating plugins.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PluginError {
    /// No descriptor is registered under this name.
    #[error("unknown plugin '{name}'")]
    UnknownPlugin { name: String },
}
