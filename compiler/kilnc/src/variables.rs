//! RAII guards for directive overlays.
//!
//! Provides panic-safe overlay management through the [`ScopedSession`]
//! guard. The guard restores the session's directives when dropped, so a
//! nested conversion that fails (or panics) can never leak its overlay to
//! the constructs around it.
//!
//! # Usage
//!
//! ```text
//! // Direct guard usage
//! {
//!     let mut scoped = session.scoped_variable("inlining", false);
//!     scoped.convert(body)?;
//! } // directives restored here, even on panic
//!
//! // Closure-based
//! session.with_variable("inlining", false, |session| session.convert(body))
//! ```

use std::ops::{Deref, DerefMut};

use kiln_ir::{DirectiveValue, SavedVariables};

use crate::Session;

/// Guard that undoes one directive overlay on drop.
///
/// Dereferences to the session, so conversions run through it directly.
pub struct ScopedSession<'guard, 'a> {
    session: &'guard mut Session<'a>,
    saved: Option<SavedVariables>,
}

impl Drop for ScopedSession<'_, '_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.session.variables.restore(saved);
        }
    }
}

impl<'a> Deref for ScopedSession<'_, 'a> {
    type Target = Session<'a>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for ScopedSession<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<'a> Session<'a> {
    /// Overlay one directive until the returned guard drops.
    pub fn scoped_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DirectiveValue>,
    ) -> ScopedSession<'_, 'a> {
        let saved = self.variables.push(key, value);
        ScopedSession {
            session: self,
            saved: Some(saved),
        }
    }

    /// Overlay several directives until the returned guard drops. Keys not
    /// in `mapping` stay visible underneath.
    pub fn scoped_variables<I, K, V>(&mut self, mapping: I) -> ScopedSession<'_, 'a>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DirectiveValue>,
    {
        let saved = self.variables.push_all(mapping);
        ScopedSession {
            session: self,
            saved: Some(saved),
        }
    }

    /// Run `f` with `key` set to `value`, restoring the previous value on
    /// every exit path.
    pub fn with_variable<T, F>(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DirectiveValue>,
        f: F,
    ) -> T
    where
        F: FnOnce(&mut Session<'a>) -> T,
    {
        let mut scoped = self.scoped_variable(key, value);
        f(&mut *scoped)
    }

    /// Run `f` with `mapping` merged over the directives, restoring the
    /// whole previous set on every exit path.
    pub fn with_variables<I, K, V, T, F>(&mut self, mapping: I, f: F) -> T
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DirectiveValue>,
        F: FnOnce(&mut Session<'a>) -> T,
    {
        let mut scoped = self.scoped_variables(mapping);
        f(&mut *scoped)
    }
}
