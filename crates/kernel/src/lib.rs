//! Kernel: in-memory implementations of the collaborators the streaming core
//! drives (spawner, LOD manager, console variables).
//!
//! # Invariants
//! - Every scene mutation is recorded in an append-only event log.
//! - Object ids are sequential, so identical call sequences give identical scenes.

pub mod runtime;
pub mod scene;

pub use runtime::{ConsoleVariables, LodHintRecorder, LodHints};
pub use scene::{Scene, SceneEvent, SceneObject};
