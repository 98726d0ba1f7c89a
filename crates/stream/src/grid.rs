use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// A 2D region coordinate in the world grid (ignoring Y axis for partitioning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionCoord {
    pub x: i32,
    pub z: i32,
}

impl RegionCoord {
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing `pos`, rounding to the nearest region center per axis.
    ///
    /// Halves round up (`-0.5` maps to `0`, `0.5` maps to `1`).
    pub fn from_world(pos: Vec3, region_size: Vec2) -> Self {
        Self {
            x: (pos.x / region_size.x + 0.5).floor() as i32,
            z: (pos.z / region_size.y + 0.5).floor() as i32,
        }
    }

    /// World-space center of this region on the ground plane.
    pub fn origin(self, region_size: Vec2) -> Vec3 {
        Vec3::new(
            self.x as f32 * region_size.x,
            0.0,
            self.z as f32 * region_size.y,
        )
    }

    /// Shifted coordinate, clamped at the edges of the `i32` grid.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// Chebyshev distance (ring index) between two regions, clamped to `i32::MAX`.
    pub fn ring_distance(self, other: Self) -> i32 {
        let d = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// True when neither axis offset from `center` exceeds `radius`.
    pub fn within(self, center: Self, radius: i32) -> bool {
        let Ok(radius) = u32::try_from(radius) else {
            return false;
        };
        self.x.abs_diff(center.x) <= radius && self.z.abs_diff(center.z) <= radius
    }
}

/// One grid cell's streamed state: the handles of everything spawned for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<H> {
    coord: RegionCoord,
    content: Vec<H>,
}

impl<H> Region<H> {
    fn new(coord: RegionCoord) -> Self {
        Self {
            coord,
            content: Vec::new(),
        }
    }

    pub fn coord(&self) -> RegionCoord {
        self.coord
    }

    pub fn content(&self) -> &[H] {
        &self.content
    }

    /// An empty region counts as not yet populated.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn extend(&mut self, handles: impl IntoIterator<Item = H>) {
        self.content.extend(handles);
    }
}

/// What a removal pass released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub regions: usize,
    pub handles: usize,
}

/// Registry of streamed regions keyed by grid coordinate.
///
/// This is the single source of truth for what currently exists. Entries can
/// only leave the index through [`RegionGrid::evict_where`] or
/// [`RegionGrid::release_all`], both of which hand every owned handle to the
/// caller's release function before the entry is dropped.
#[derive(Debug)]
pub struct RegionGrid<H> {
    regions: HashMap<RegionCoord, Region<H>>,
}

impl<H> Default for RegionGrid<H> {
    fn default() -> Self {
        Self {
            regions: HashMap::new(),
        }
    }
}

impl<H> RegionGrid<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region at `coord`, inserting an empty one if absent.
    pub fn find_or_create(&mut self, coord: RegionCoord) -> &mut Region<H> {
        self.regions
            .entry(coord)
            .or_insert_with(|| Region::new(coord))
    }

    pub fn get(&self, coord: RegionCoord) -> Option<&Region<H>> {
        self.regions.get(&coord)
    }

    pub fn contains(&self, coord: RegionCoord) -> bool {
        self.regions.contains_key(&coord)
    }

    /// Number of regions in the index (populated or not).
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions, in no particular order.
    pub fn iter(&self) -> hash_map::Values<'_, RegionCoord, Region<H>> {
        self.regions.values()
    }

    /// Total handles owned across all regions.
    pub fn total_handles(&self) -> usize {
        self.regions.values().map(|r| r.content.len()).sum()
    }

    /// Remove every region whose coordinate matches `evict`, passing each of
    /// its handles to `release` first.
    pub fn evict_where(
        &mut self,
        mut evict: impl FnMut(RegionCoord) -> bool,
        mut release: impl FnMut(RegionCoord, H),
    ) -> EvictionReport {
        let mut report = EvictionReport::default();
        self.regions.retain(|coord, region| {
            if !evict(*coord) {
                return true;
            }
            report.regions += 1;
            report.handles += region.content.len();
            for handle in region.content.drain(..) {
                release(*coord, handle);
            }
            false
        });
        report
    }

    /// Remove every region, releasing all handles.
    pub fn release_all(&mut self, mut release: impl FnMut(RegionCoord, H)) -> EvictionReport {
        self.evict_where(|_| true, &mut release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(4000.0, 4000.0);

    #[test]
    fn from_world_rounds_to_nearest() {
        assert_eq!(
            RegionCoord::from_world(Vec3::new(1999.0, 0.0, -1999.0), SIZE),
            RegionCoord::new(0, 0)
        );
        assert_eq!(
            RegionCoord::from_world(Vec3::new(2001.0, 50.0, -2001.0), SIZE),
            RegionCoord::new(1, -1)
        );
        assert_eq!(
            RegionCoord::from_world(Vec3::new(36_000.0, 0.0, 0.0), SIZE),
            RegionCoord::new(9, 0)
        );
    }

    #[test]
    fn from_world_halves_round_up() {
        assert_eq!(
            RegionCoord::from_world(Vec3::new(2000.0, 0.0, -2000.0), SIZE),
            RegionCoord::new(1, 0)
        );
    }

    #[test]
    fn from_world_ignores_height_and_uses_per_axis_size() {
        let size = Vec2::new(100.0, 10.0);
        let coord = RegionCoord::from_world(Vec3::new(240.0, 9999.0, 240.0), size);
        assert_eq!(coord, RegionCoord::new(2, 24));
    }

    #[test]
    fn origin_scales_by_region_size() {
        let origin = RegionCoord::new(-2, 3).origin(Vec2::new(10.0, 20.0));
        assert_eq!(origin, Vec3::new(-20.0, 0.0, 60.0));
    }

    #[test]
    fn ring_distance_is_chebyshev() {
        let c = RegionCoord::new(1, 1);
        assert_eq!(c.ring_distance(RegionCoord::new(1, 1)), 0);
        assert_eq!(c.ring_distance(RegionCoord::new(4, -1)), 3);
        assert!(RegionCoord::new(9, 0).within(RegionCoord::new(1, 8), 8));
        assert!(!RegionCoord::new(0, 0).within(RegionCoord::new(9, 0), 8));
    }

    #[test]
    fn distances_at_grid_edges_do_not_overflow() {
        let low = RegionCoord::new(i32::MIN, i32::MIN);
        let high = RegionCoord::new(i32::MAX, i32::MAX);
        assert!(!low.within(high, 8));
        assert!(!high.within(low, i32::MAX));
        assert!(high.within(high, 0));
        assert_eq!(low.ring_distance(high), i32::MAX);
        assert_eq!(high.offset(1, 1), high);
        assert_eq!(low.offset(-3, 2), RegionCoord::new(i32::MIN, i32::MIN + 2));
    }

    #[test]
    fn negative_radius_keeps_nothing() {
        assert!(!RegionCoord::ORIGIN.within(RegionCoord::ORIGIN, -1));
    }

    #[test]
    fn far_positions_clamp_to_grid_edges() {
        let far = RegionCoord::from_world(Vec3::new(1.0e13, 0.0, -1.0e13), SIZE);
        assert_eq!(far, RegionCoord::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn find_or_create_inserts_once() {
        let mut grid: RegionGrid<u32> = RegionGrid::new();
        grid.find_or_create(RegionCoord::new(1, 2)).extend([7]);
        let region = grid.find_or_create(RegionCoord::new(1, 2));
        assert_eq!(region.content(), &[7]);
        assert_eq!(region.coord(), RegionCoord::new(1, 2));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn new_region_is_empty() {
        let mut grid: RegionGrid<u32> = RegionGrid::new();
        assert!(grid.find_or_create(RegionCoord::ORIGIN).is_empty());
        assert!(grid.contains(RegionCoord::ORIGIN));
        assert!(grid.get(RegionCoord::new(5, 5)).is_none());
    }

    #[test]
    fn evict_where_releases_every_handle_of_removed_regions() {
        let mut grid: RegionGrid<u32> = RegionGrid::new();
        grid.find_or_create(RegionCoord::new(0, 0)).extend([1, 2]);
        grid.find_or_create(RegionCoord::new(5, 0)).extend([3, 4, 5]);
        grid.find_or_create(RegionCoord::new(-5, 0)).extend([6]);

        let mut released = Vec::new();
        let report = grid.evict_where(|c| c.x.abs() > 2, |_, h| released.push(h));
        released.sort();

        assert_eq!(released, vec![3, 4, 5, 6]);
        assert_eq!(report, EvictionReport { regions: 2, handles: 4 });
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.total_handles(), 2);
    }

    #[test]
    fn release_all_empties_grid() {
        let mut grid: RegionGrid<u32> = RegionGrid::new();
        for i in 0..10 {
            grid.find_or_create(RegionCoord::new(i, -i)).extend([i as u32]);
        }
        let mut count = 0;
        let report = grid.release_all(|_, _| count += 1);
        assert_eq!(count, 10);
        assert_eq!(report.regions, 10);
        assert!(grid.is_empty());
    }
}
