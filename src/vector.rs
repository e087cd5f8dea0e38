//! Helpers on top of [`Vector2`].
//!
//! Addition, subtraction, scaling and magnitudes come straight from nalgebra
//! (`a + b`, `a - b`, `a * s`, `a.norm()`, `a.norm_squared()`); this module only
//! adds the handful of named operations the engine relies on.

use crate::{Float, Vector2};

/// The vector pointing from `source` to `target`, as handed to a
/// [`ForceLaw`](crate::ForceLaw).
#[inline]
#[must_use]
pub fn separation(target: &Vector2, source: &Vector2) -> Vector2 {
    target - source
}

#[inline]
#[must_use]
pub fn distance_squared(a: &Vector2, b: &Vector2) -> Float {
    (a - b).norm_squared()
}

#[inline]
#[must_use]
pub fn distance(a: &Vector2, b: &Vector2) -> Float {
    distance_squared(a, b).sqrt()
}

#[inline]
#[must_use]
pub fn is_finite(v: &Vector2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
