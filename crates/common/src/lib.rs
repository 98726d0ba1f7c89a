//! Shared types for horizon streaming and the capability traits through which
//! the streaming core talks to spawners, LOD managers and runtime settings.

pub mod capability;
pub mod types;

pub use capability::{LodHintSink, SceneryBackend, SettingsError, SettingsStore};
pub use types::{ObjectId, Observer, ObserverId, TemplateId, Transform};
