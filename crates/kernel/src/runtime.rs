//! In-process stand-ins for the LOD manager and the console-variable registry.
//!
//! Both are cheap clonable handles onto shared state, so a caller can hand
//! one clone to the streaming controller and keep another to inspect.

use horizon_common::{LodHintSink, ObserverId, SettingsError, SettingsStore};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Last state pushed to the LOD manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodHints {
    pub update_distance: Option<f32>,
    pub view_centers: Vec<ObserverId>,
    /// Number of `clear_view_centers` calls received.
    pub clears: u64,
}

/// Records LOD hints instead of acting on them.
#[derive(Debug, Clone, Default)]
pub struct LodHintRecorder {
    inner: Rc<RefCell<LodHints>>,
}

impl LodHintRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> LodHints {
        self.inner.borrow().clone()
    }
}

impl LodHintSink for LodHintRecorder {
    fn set_update_distance(&mut self, distance: f32) {
        self.inner.borrow_mut().update_distance = Some(distance);
    }

    fn clear_view_centers(&mut self) {
        let mut hints = self.inner.borrow_mut();
        hints.view_centers.clear();
        hints.clears += 1;
    }

    fn add_view_center(&mut self, observer: ObserverId) {
        self.inner.borrow_mut().view_centers.push(observer);
    }
}

/// Registry of named boolean switches. Only declared names can be written.
#[derive(Debug, Clone, Default)]
pub struct ConsoleVariables {
    vars: Rc<RefCell<BTreeMap<String, bool>>>,
}

impl ConsoleVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with an initial value.
    pub fn declare(&self, name: impl Into<String>, value: bool) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// Builder-style [`ConsoleVariables::declare`].
    pub fn with(self, name: impl Into<String>, value: bool) -> Self {
        self.declare(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.vars.borrow().get(name).copied()
    }
}

impl SettingsStore for ConsoleVariables {
    fn flag(&self, name: &str) -> Option<bool> {
        self.get(name)
    }

    fn set_flag(&mut self, name: &str, value: bool) -> Result<(), SettingsError> {
        match self.vars.borrow_mut().get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SettingsError::Unknown(name.to_string())),
        }
    }
}
