use crate::Float;

// Order of the particle shape function.
pub const ORDER: usize = 2;
// Number of points the stencil reaches on each side of the nearest grid point.
pub const STENCIL_RADIUS: usize = ORDER;
pub const STENCIL_WIDTH: usize = 2 * STENCIL_RADIUS + 1;
// Extra primal points kept around a patch or a bin window.
pub const HALO: usize = STENCIL_RADIUS;

const _: () = assert!(HALO >= STENCIL_RADIUS);

/// Quadratic spline weights at the grid points `-1, 0, +1` around the
/// nearest grid point, for a sub-cell offset `delta` in `[-0.5, 0.5]`.
#[inline(always)]
pub fn shape_2nd_order(delta: Float) -> [Float; 3] {
    let delta2 = delta * delta;
    [
        0.5 * (delta2 - delta + 0.25),
        0.75 - delta2,
        0.5 * (delta2 + delta + 0.25),
    ]
}

/// A full stencil with the three weights starting at slot `first`.
#[inline(always)]
pub fn stencil(delta: Float, first: usize) -> [Float; STENCIL_WIDTH] {
    let mut s = [0.0; STENCIL_WIDTH];
    s[first..first + 3].copy_from_slice(&shape_2nd_order(delta));
    s
}
