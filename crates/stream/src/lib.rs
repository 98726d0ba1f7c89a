//! Streaming: infinite procedural scenery around a moving observer.
//!
//! The world plane is cut into fixed-size square regions. Regions near the
//! observer are populated with a ground plane and randomly placed occluders;
//! regions that fall outside the retention radius are evicted.
//!
//! # Invariants
//! - A region's handles are destroyed exactly once, before its entry leaves the grid.
//! - Eviction precedes population within a tick.
//! - Same seed + same observer trajectory = same placements.

pub mod config;
pub mod controller;
pub mod grid;
pub mod placement;
pub mod session;
pub mod spiral;
pub mod stats;

pub use config::{ConfigError, StreamConfig};
pub use controller::{SessionHooks, StreamError, StreamingController};
pub use grid::{EvictionReport, Region, RegionCoord, RegionGrid};
pub use placement::{Placement, PlacementStream};
pub use spiral::Spiral;
pub use stats::{TickHistory, TickStats};

pub fn crate_info() -> &'static str {
    "horizon-stream v0.1.0"
}
