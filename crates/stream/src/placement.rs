use glam::{Vec2, Vec3};
use horizon_common::Transform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::{Range, RangeInclusive};

/// Occluder width and depth are drawn from this range (world units).
pub const OCCLUDER_FOOTPRINT: Range<f32> = 200.0..1000.0;
/// Occluder height is drawn from this range (whole world units).
pub const OCCLUDER_HEIGHT: RangeInclusive<i32> = 500..=3000;

/// The random stream every placement draws from.
///
/// Seeded once per session. Draws happen in a fixed order so the same seed
/// and the same region visiting order give the same placements.
#[derive(Debug, Clone)]
pub struct PlacementStream {
    rng: ChaCha8Rng,
}

impl PlacementStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn range(&mut self, range: Range<f32>) -> f32 {
        self.rng.gen_range(range)
    }

    fn int_range(&mut self, range: RangeInclusive<i32>) -> i32 {
        self.rng.gen_range(range)
    }

    /// Uniform fraction in `[0, 1)`.
    fn fraction(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// One computed occluder placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Size the placed object should end up with (x = width, y = height, z = depth).
    pub extent: Vec3,
    /// Transform to spawn the template with; `scale` maps the template's
    /// reference size onto `extent`.
    pub transform: Transform,
}

/// Transform of the ground plane of a region centered at `origin`.
pub fn ground_plane(origin: Vec3, region_size: Vec2) -> Transform {
    Transform::from_position_scale(origin, Vec3::new(region_size.x, 1.0, region_size.y))
}

/// Compute `count` occluder placements for the region centered at `origin`.
///
/// Per occluder the stream is consumed as: width, depth, height, fraction x,
/// fraction z. Positions cover the whole region footprint; overlaps are kept.
pub fn occluders(
    stream: &mut PlacementStream,
    origin: Vec3,
    region_size: Vec2,
    reference: Vec3,
    count: usize,
) -> Vec<Placement> {
    let half = region_size / 2.0;
    (0..count)
        .map(|_| {
            let width = stream.range(OCCLUDER_FOOTPRINT);
            let depth = stream.range(OCCLUDER_FOOTPRINT);
            let height = stream.int_range(OCCLUDER_HEIGHT) as f32;
            let fx = stream.fraction();
            let fz = stream.fraction();

            let extent = Vec3::new(width, height, depth);
            let position = Vec3::new(
                origin.x + fx * region_size.x - half.x,
                origin.y + height * 0.5,
                origin.z + fz * region_size.y - half.y,
            );
            Placement {
                extent,
                transform: Transform::from_position_scale(position, extent / reference),
            }
        })
        .collect()
}
