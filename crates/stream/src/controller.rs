use glam::Vec3;
use horizon_common::{LodHintSink, Observer, SceneryBackend, SettingsStore, TemplateId, Transform};
use std::time::Instant;

use crate::config::{ConfigError, StreamConfig};
use crate::grid::{EvictionReport, RegionCoord, RegionGrid};
use crate::placement::{self, PlacementStream};
use crate::session::{SESSION_TOGGLES, SessionToggles};
use crate::spiral;
use crate::stats::TickStats;

/// Errors from starting a streaming session.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Optional collaborators a session talks to besides the spawner.
#[derive(Default)]
pub struct SessionHooks {
    pub lod: Option<Box<dyn LodHintSink>>,
    pub settings: Option<Box<dyn SettingsStore>>,
}

impl SessionHooks {
    pub fn with_lod(mut self, sink: impl LodHintSink + 'static) -> Self {
        self.lod = Some(Box::new(sink));
        self
    }

    pub fn with_settings(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings = Some(Box::new(store));
        self
    }
}

/// Streams procedural scenery around a moving observer.
///
/// Each [`tick`](Self::tick) first evicts every region farther than the
/// retention radius from the observer's region, then walks the spiral around
/// it and populates empty regions until `regions_per_tick` of them have been
/// populated. With the default of one, at most one region appears per tick:
/// the nearest empty one in spiral order.
///
/// Dropping the controller destroys everything it spawned and restores the
/// session toggles.
pub struct StreamingController<B: SceneryBackend> {
    config: StreamConfig,
    backend: B,
    lod: Option<Box<dyn LodHintSink>>,
    grid: RegionGrid<B::Handle>,
    stream: PlacementStream,
    /// Local bounds of the occluder template; divisor for occluder scales.
    reference: Vec3,
    tick: u64,
    current: Option<RegionCoord>,
    stats: TickStats,
    toggles: Option<SessionToggles>,
}

impl<B: SceneryBackend> StreamingController<B> {
    /// Start a session: validate `config`, take the session toggles, push the
    /// LOD update distance and measure the occluder template.
    pub fn new(config: StreamConfig, mut backend: B, hooks: SessionHooks) -> Result<Self, StreamError> {
        config.validate()?;

        let SessionHooks { mut lod, settings } = hooks;
        let toggles = settings.map(|store| SessionToggles::acquire(store, &SESSION_TOGGLES));
        if let Some(lod) = lod.as_mut() {
            lod.set_update_distance(config.update_distance);
        }
        let reference = measure_reference(&mut backend, config.occluder_template.as_ref());
        let stream = PlacementStream::new(config.seed);

        tracing::info!(
            retention_radius = config.retention_radius,
            region_size = ?config.region_size,
            seed = config.seed,
            ?reference,
            "streaming session started"
        );

        Ok(Self {
            config,
            backend,
            lod,
            grid: RegionGrid::new(),
            stream,
            reference,
            tick: 0,
            current: None,
            stats: TickStats::default(),
            toggles,
        })
    }

    /// Advance streaming by one step for the observer's current position.
    ///
    /// Without an observer the origin is used and no view-center hints are sent.
    pub fn tick(&mut self, observer: Option<&Observer>) -> &TickStats {
        self.tick += 1;
        let _span = tracing::info_span!("stream_tick", tick = self.tick).entered();
        let tick_start = Instant::now();

        let position = match observer {
            Some(observer) => {
                if let Some(lod) = self.lod.as_mut() {
                    lod.clear_view_centers();
                    lod.add_view_center(observer.id);
                }
                observer.position
            }
            None => Vec3::ZERO,
        };

        let current = RegionCoord::from_world(position, self.config.region_size);
        if self.current != Some(current) {
            tracing::debug!(?current, "observer entered region");
            self.current = Some(current);
        }

        // Eviction must finish before population starts.
        let evicted = self.evict_outside(current);
        let (regions_populated, handles_spawned) = self.populate_around(current);

        self.stats = TickStats {
            tick: self.tick,
            current_region: Some(current),
            regions_evicted: evicted.regions,
            handles_released: evicted.handles,
            regions_populated,
            handles_spawned,
            live_regions: self.grid.len(),
            live_handles: self.grid.total_handles(),
            tick_time: tick_start.elapsed(),
        };

        tracing::trace!(
            evicted = evicted.regions,
            populated = regions_populated,
            live = self.stats.live_regions,
            "stream tick complete"
        );

        &self.stats
    }

    /// Remove every region with an axis offset from `current` larger than the
    /// retention radius, destroying its content.
    fn evict_outside(&mut self, current: RegionCoord) -> EvictionReport {
        let radius = self.config.retention_radius;
        let backend = &mut self.backend;
        self.grid.evict_where(
            |coord| {
                let evict = !coord.within(current, radius);
                if evict {
                    tracing::debug!(?coord, "evicting region");
                }
                evict
            },
            |_, handle| backend.destroy(handle),
        )
    }

    /// Walk the spiral around `current`, populating regions until the
    /// per-tick limit is reached. Returns (regions, handles) populated.
    fn populate_around(&mut self, current: RegionCoord) -> (usize, usize) {
        let ring_limit = self.config.retention_radius;
        let limit = self.config.regions_per_tick;
        let mut regions = 0;
        let mut handles = 0;

        spiral::enumerate(current, ring_limit, |coord, ring| {
            if !self.populate_region(coord, ring) {
                return false;
            }
            regions += 1;
            handles += self.grid.get(coord).map_or(0, |r| r.content().len());
            regions >= limit
        });

        (regions, handles)
    }

    /// Population step for one visited region.
    ///
    /// Returns `true` when the region was empty and got populated on this
    /// call (even if every spawn failed), `false` when it is outside the
    /// retention rings or already has content.
    pub fn populate_region(&mut self, coord: RegionCoord, ring: i32) -> bool {
        if ring >= self.config.retention_radius {
            return false;
        }
        if !self.grid.find_or_create(coord).is_empty() {
            return false;
        }

        let size = self.config.region_size;
        let origin = coord.origin(size);
        let mut spawned = Vec::with_capacity(1 + self.config.occluders_per_region);

        if let Some(template) = &self.config.ground_template {
            let transform = placement::ground_plane(origin, size);
            spawn_into(&mut self.backend, template, &transform, &mut spawned);
        }

        if let Some(template) = &self.config.occluder_template {
            let placements = placement::occluders(
                &mut self.stream,
                origin,
                size,
                self.reference,
                self.config.occluders_per_region,
            );
            for p in &placements {
                spawn_into(&mut self.backend, template, &p.transform, &mut spawned);
            }
        }

        tracing::debug!(?coord, ring, handles = spawned.len(), "populated region");
        self.grid.find_or_create(coord).extend(spawned);
        true
    }

    /// Destroy all streamed content and empty the grid.
    pub fn release_all(&mut self) -> EvictionReport {
        let backend = &mut self.backend;
        self.grid.release_all(|_, handle| backend.destroy(handle))
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn grid(&self) -> &RegionGrid<B::Handle> {
        &self.grid
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Occluder reference size measured at session start.
    pub fn reference_extent(&self) -> Vec3 {
        self.reference
    }

    /// Region the observer was in on the last tick.
    pub fn current_region(&self) -> Option<RegionCoord> {
        self.current
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Statistics from the last tick.
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Names of the session toggles this controller holds.
    pub fn held_toggles(&self) -> Vec<&'static str> {
        self.toggles
            .as_ref()
            .map(|t| t.held().collect())
            .unwrap_or_default()
    }
}

impl<B: SceneryBackend> Drop for StreamingController<B> {
    fn drop(&mut self) {
        let report = self.release_all();
        tracing::info!(
            regions = report.regions,
            handles = report.handles,
            "streaming session ended"
        );
        // Toggles are restored when `self.toggles` drops after this.
    }
}

fn spawn_into<B: SceneryBackend>(
    backend: &mut B,
    template: &TemplateId,
    transform: &Transform,
    out: &mut Vec<B::Handle>,
) {
    match backend.spawn(template, transform) {
        Some(handle) => out.push(handle),
        None => tracing::debug!(%template, "spawn produced no object"),
    }
}

/// Size of the occluder template, measured on a temporary instance.
///
/// Falls back to a unit extent when there is nothing usable to measure.
fn measure_reference<B: SceneryBackend>(backend: &mut B, template: Option<&TemplateId>) -> Vec3 {
    let Some(template) = template else {
        return Vec3::ONE;
    };
    let Some(handle) = backend.begin_spawn(template, &Transform::default()) else {
        tracing::warn!(%template, "could not spawn occluder template for measurement");
        return Vec3::ONE;
    };
    backend.finish_spawn(handle);
    let bounds = backend.local_bounds(handle);
    backend.destroy(handle);

    match bounds {
        Some(bounds) if bounds.is_finite() && bounds.cmpgt(Vec3::ZERO).all() => bounds,
        other => {
            tracing::warn!(%template, bounds = ?other, "unusable occluder bounds, using unit extent");
            Vec3::ONE
        }
    }
}
