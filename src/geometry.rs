//! Geometric helpers for collision and support checks in solver space.
//!
//! All values are integer centimeters in solver axes: `x` = width, `y` = height
//! (vertical), `z` = depth. The footprint of a box is its extent in the x–z plane.

use crate::solver::SolverDims;

/// Axis-aligned box given by its lower corner and its extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cuboid {
    pub position: SolverDims,
    pub dims: SolverDims,
}

impl Cuboid {
    pub fn new(position: SolverDims, dims: SolverDims) -> Self {
        Self { position, dims }
    }

    /// Y coordinate of the upper face.
    #[inline]
    pub fn top(&self) -> u64 {
        u64::from(self.position.1) + u64::from(self.dims.1)
    }

    /// Far corner (position + dims), widened so it cannot overflow.
    #[inline]
    pub fn max_corner(&self) -> (u64, u64, u64) {
        (
            u64::from(self.position.0) + u64::from(self.dims.0),
            u64::from(self.position.1) + u64::from(self.dims.1),
            u64::from(self.position.2) + u64::from(self.dims.2),
        )
    }

    /// Lower corner, widened to match [`Cuboid::max_corner`].
    #[inline]
    pub fn min_corner(&self) -> (u64, u64, u64) {
        (
            u64::from(self.position.0),
            u64::from(self.position.1),
            u64::from(self.position.2),
        )
    }

    /// Footprint area in the x–z plane.
    #[inline]
    pub fn base_area(&self) -> u64 {
        u64::from(self.dims.0) * u64::from(self.dims.2)
    }

    /// Whether the box lies completely inside a container of `bin` extent.
    #[inline]
    pub fn fits_inside(&self, bin: SolverDims) -> bool {
        let (mx, my, mz) = self.max_corner();
        mx <= u64::from(bin.0) && my <= u64::from(bin.1) && mz <= u64::from(bin.2)
    }
}

/// Checks whether two boxes overlap in space.
///
/// Uses the separating axis test for AABBs: two boxes do NOT intersect if they
/// are separated along at least one axis. Touching faces do not count.
pub fn intersects(a: &Cuboid, b: &Cuboid) -> bool {
    let (ax, ay, az) = a.min_corner();
    let (ax2, ay2, az2) = a.max_corner();
    let (bx, by, bz) = b.min_corner();
    let (bx2, by2, bz2) = b.max_corner();

    !(ax2 <= bx || bx2 <= ax || ay2 <= by || by2 <= ay || az2 <= bz || bz2 <= az)
}

/// Length of the overlap of two intervals `[a1, a2)` and `[b1, b2)`, at least 0.
///
/// # Example
/// ```
/// use pack_normalizer::geometry::overlap_1d;
///
/// assert_eq!(overlap_1d(0, 5, 3, 8), 2);
/// assert_eq!(overlap_1d(0, 5, 6, 8), 0);
/// ```
pub fn overlap_1d(a1: u64, a2: u64, b1: u64, b2: u64) -> u64 {
    a2.min(b2).saturating_sub(a1.max(b1))
}

/// Overlap area of the two footprints in the x–z plane.
pub fn footprint_overlap(a: &Cuboid, b: &Cuboid) -> u64 {
    let (ax, _, az) = a.min_corner();
    let (ax2, _, az2) = a.max_corner();
    let (bx, _, bz) = b.min_corner();
    let (bx2, _, bz2) = b.max_corner();
    overlap_1d(ax, ax2, bx, bx2) * overlap_1d(az, az2, bz, bz2)
}

/// Whether the footprint centre of `a` lies on the footprint of `b` (edges included).
///
/// Works on doubled coordinates so odd extents stay exact.
pub fn footprint_center_inside(a: &Cuboid, b: &Cuboid) -> bool {
    let (ax, _, az) = a.min_corner();
    let cx = 2 * ax + u64::from(a.dims.0);
    let cz = 2 * az + u64::from(a.dims.2);
    let (bx, _, bz) = b.min_corner();
    let (bx2, _, bz2) = b.max_corner();

    cx >= 2 * bx && cx <= 2 * bx2 && cz >= 2 * bz && cz <= 2 * bz2
}
