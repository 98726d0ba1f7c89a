//! Process-wide switches held for the duration of a streaming session.

use horizon_common::SettingsStore;

/// Replace content discarded by the LOD manager with reference content.
pub const REPLACE_DISCARDED_WITH_REFERENCE: &str = "horizon.ReplaceDiscardedWithReference";
/// Only spend update time on objects close to a view center.
pub const ONLY_UPDATE_CLOSE_OBJECTS: &str = "horizon.OnlyUpdateCloseObjects";

/// The switches a streaming session turns on.
pub const SESSION_TOGGLES: [(&str, bool); 2] = [
    (REPLACE_DISCARDED_WITH_REFERENCE, true),
    (ONLY_UPDATE_CLOSE_OBJECTS, true),
];

/// Scoped ownership of a set of switches.
///
/// Acquiring sets each switch and remembers its previous value; dropping
/// restores them in reverse order. A switch without a previous value is
/// restored to `false`. Switches that cannot be written are logged and left
/// alone on both ends.
pub struct SessionToggles {
    store: Box<dyn SettingsStore>,
    saved: Vec<(&'static str, Option<bool>)>,
}

impl SessionToggles {
    pub fn acquire(mut store: Box<dyn SettingsStore>, toggles: &[(&'static str, bool)]) -> Self {
        let mut saved = Vec::with_capacity(toggles.len());
        for &(name, value) in toggles {
            let prior = store.flag(name);
            match store.set_flag(name, value) {
                Ok(()) => {
                    tracing::debug!(name, value, ?prior, "session toggle set");
                    saved.push((name, prior));
                }
                Err(err) => tracing::warn!(name, %err, "session toggle unavailable"),
            }
        }
        Self { store, saved }
    }

    /// Names of the switches that will be restored on drop.
    pub fn held(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.saved.iter().map(|(name, _)| *name)
    }
}

impl Drop for SessionToggles {
    fn drop(&mut self) {
        for (name, prior) in self.saved.drain(..).rev() {
            let value = prior.unwrap_or(false);
            if let Err(err) = self.store.set_flag(name, value) {
                tracing::warn!(name, %err, "failed to restore session toggle");
            }
        }
    }
}

impl std::fmt::Debug for SessionToggles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToggles")
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}
