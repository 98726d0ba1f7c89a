//! Spiral walk over the regions around a center.
//!
//! The center is visited first as ring 0. Each following ring `r` visits the
//! `8 * r` regions of the perimeter of the `(2r + 1) x (2r + 1)` square around
//! the center, starting at the corner `(+r, +r)` and walking `2r` steps in
//! each of the directions -z, -x, +z, +x. Rings run from 1 while `r < ring_limit`,
//! so a limit of 0 or 1 visits only the center.

use crate::grid::RegionCoord;

/// Step applied after each visit, selected by `index / (2 * ring)`.
const STEPS: [(i32, i32); 4] = [(0, -1), (-1, 0), (0, 1), (1, 0)];

/// Iterator over `(region, ring)` pairs in spiral order.
#[derive(Debug, Clone)]
pub struct Spiral {
    center: RegionCoord,
    ring_limit: i32,
    ring: i32,
    index: i32,
    local: (i32, i32),
}

impl Spiral {
    pub fn new(center: RegionCoord, ring_limit: i32) -> Self {
        Self {
            center,
            ring_limit: ring_limit.max(0),
            ring: 0,
            index: 0,
            local: (0, 0),
        }
    }
}

impl Iterator for Spiral {
    type Item = (RegionCoord, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.ring == 0 {
            self.ring = 1;
            self.local = (1, 1);
            return Some((self.center, 0));
        }
        if self.ring >= self.ring_limit {
            return None;
        }

        let ring = self.ring;
        let coord = self.center.offset(self.local.0, self.local.1);
        let (dx, dz) = STEPS[(self.index / (2 * ring)) as usize];
        self.local = (self.local.0 + dx, self.local.1 + dz);
        self.index += 1;

        if self.index == 8 * ring {
            self.ring += 1;
            self.index = 0;
            self.local = (self.ring, self.ring);
        }
        Some((coord, ring))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.ring == 0 {
            region_count(self.ring_limit)
        } else if self.ring >= self.ring_limit {
            0
        } else {
            region_count(self.ring_limit) - region_count(self.ring) - self.index as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Spiral {}

/// Walk the spiral around `center`, calling `visit` for each region until it
/// returns `true`. Returns whether the walk was stopped by `visit`.
pub fn enumerate(
    center: RegionCoord,
    ring_limit: i32,
    mut visit: impl FnMut(RegionCoord, i32) -> bool,
) -> bool {
    Spiral::new(center, ring_limit).any(|(coord, ring)| visit(coord, ring))
}

/// Number of regions an exhaustive walk with `ring_limit` visits.
pub fn region_count(ring_limit: i32) -> usize {
    let rings = ring_limit.max(1) as usize;
    // 1 + sum_{k=1}^{rings-1} 8k
    1 + 4 * rings * (rings - 1)
}
