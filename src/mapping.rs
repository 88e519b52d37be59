//! Axis mapping between caller space and solver space.
//!
//! Callers describe geometry as (length, width, height). The solver works in
//! (width, height, depth) and runs its support checks on its height axis, so
//! physical height must land in the solver's second slot:
//!
//! | caller | solver |
//! |--------|--------|
//! | length | width  (x) |
//! | height | height (y) |
//! | width  | depth  (z) |

/// Maps container dimensions (l, w, h) to solver (width, height, depth).
#[inline]
pub fn to_solver_bin<T>(lwh: (T, T, T)) -> (T, T, T) {
    let (l, w, h) = lwh;
    (l, h, w)
}

/// Maps item dimensions (l, w, h) to solver (width, height, depth).
///
/// Applied identically to every expanded unit.
#[inline]
pub fn to_solver_item<T>(lwh: (T, T, T)) -> (T, T, T) {
    let (l, w, h) = lwh;
    (l, h, w)
}

/// Maps a solver position (x, y, z) back to caller (x along length, y along width, z up).
///
/// # Examples
/// ```
/// use pack_normalizer::mapping::{from_solver_position, to_solver_item};
///
/// assert_eq!(from_solver_position(to_solver_item((120, 80, 45))), (120, 80, 45));
/// ```
#[inline]
pub fn from_solver_position<T>(xyz: (T, T, T)) -> (T, T, T) {
    let (x, y, z) = xyz;
    (x, z, y)
}

/// Maps post-placement solver dimensions back to (l, w, h) order.
#[inline]
pub fn from_solver_dims<T>(dims: (T, T, T)) -> (T, T, T) {
    let (dx, dy, dz) = dims;
    (dx, dz, dy)
}
