// Re-export glam for convenience
pub use glam::*;

// Whitted math types
mod aabb;
mod interval;
mod ray;
mod triangle;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use triangle::{Culling, Triangle, TriangleHit, INTERSECT_EPSILON};

/// Mirror `v` about the plane with unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
