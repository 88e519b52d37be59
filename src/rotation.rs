//! Orientation codes for placed items.
//!
//! The six axis-aligned orientations of a box are numbered in a fixed order.
//! The order is part of the public contract: previously emitted codes keep
//! their meaning only as long as this table is unchanged.
//!
//! ```text
//! 0: (L, W, H)   1: (W, L, H)   2: (W, H, L)
//! 3: (H, W, L)   4: (H, L, W)   5: (L, H, W)
//! ```

/// Number of distinct orientation codes.
pub const ORIENTATION_COUNT: usize = 6;

/// Returns the orientation table for `original`, indexed by rotation code.
pub fn orientations<T: Copy>(original: (T, T, T)) -> [(T, T, T); ORIENTATION_COUNT] {
    let (l, w, h) = original;
    [
        (l, w, h),
        (w, l, h),
        (w, h, l),
        (h, w, l),
        (h, l, w),
        (l, h, w),
    ]
}

/// Derives the rotation code the solver applied.
///
/// `placed` must already be in (L, W, H) order. An exact match in the table
/// wins; items with equal sides fall back to the first entry with the same
/// multiset of values; anything else decodes as 0.
///
/// # Examples
/// ```
/// use pack_normalizer::rotation::decode;
///
/// assert_eq!(decode((100, 60, 40), (40, 100, 60)), 4);
/// assert_eq!(decode((100, 60, 40), (60, 100, 40)), 1);
/// ```
pub fn decode<T: Copy + Ord>(original: (T, T, T), placed: (T, T, T)) -> u8 {
    let table = orientations(original);

    if let Some(code) = table.iter().position(|dims| *dims == placed) {
        return code as u8;
    }

    let wanted = sorted(placed);
    table
        .iter()
        .position(|dims| sorted(*dims) == wanted)
        .map_or(0, |code| code as u8)
}

fn sorted<T: Copy + Ord>(dims: (T, T, T)) -> [T; 3] {
    let mut values = [dims.0, dims.1, dims.2];
    values.sort_unstable();
    values
}
