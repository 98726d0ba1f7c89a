//! Seams to the collaborators that live outside the streaming core.

use std::fmt::Debug;

use glam::Vec3;

use crate::types::{ObserverId, TemplateId, Transform};

/// Something that can construct and destroy placed objects.
///
/// Construction is split in two steps so a caller can inspect a freshly
/// constructed object (for example measure it) before it is finalized. The
/// transform is fixed at construction.
pub trait SceneryBackend {
    type Handle: Copy + Eq + Debug;

    /// Construct an object from `template`. Returns `None` when the object
    /// could not be built (unknown template, spawner refused).
    fn begin_spawn(&mut self, template: &TemplateId, transform: &Transform) -> Option<Self::Handle>;

    /// Finalize an object returned by [`SceneryBackend::begin_spawn`].
    fn finish_spawn(&mut self, handle: Self::Handle);

    /// Construct and finalize in one go.
    fn spawn(&mut self, template: &TemplateId, transform: &Transform) -> Option<Self::Handle> {
        let handle = self.begin_spawn(template, transform)?;
        self.finish_spawn(handle);
        Some(handle)
    }

    /// Destroy an object. Destroying an already destroyed handle is a no-op.
    fn destroy(&mut self, handle: Self::Handle);

    /// Size of the object's bounding box in its local space.
    fn local_bounds(&self, handle: Self::Handle) -> Option<Vec3>;
}

/// Receiver of level-of-detail hints. Fire-and-forget.
pub trait LodHintSink {
    fn set_update_distance(&mut self, distance: f32);
    fn clear_view_centers(&mut self);
    fn add_view_center(&mut self, observer: ObserverId);
}

/// Errors from reading or writing a named runtime setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    Unknown(String),
    #[error("setting {name} rejected value {value}")]
    Rejected { name: String, value: bool },
}

/// Named boolean switches shared by the whole process (console-variable style).
pub trait SettingsStore {
    /// Current value, or `None` if no such setting exists.
    fn flag(&self, name: &str) -> Option<bool>;

    fn set_flag(&mut self, name: &str, value: bool) -> Result<(), SettingsError>;
}
