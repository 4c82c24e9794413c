//! Triangle primitive in barycentric form.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. The
//! triangle is stored as an anchor vertex plus the two edges leaving it,
//! which is exactly what the intersection test consumes.

use crate::{Ray, Vec3};

/// Determinant threshold below which a ray counts as parallel to the plane.
pub const INTERSECT_EPSILON: f32 = 1e-6;

/// Which sides of a triangle a ray may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Culling {
    /// Both faces are hittable; only near-parallel rays miss.
    #[default]
    DoubleSided,
    /// Rays travelling along the geometric normal `u x v` miss.
    BackFace,
}

/// Result of a successful ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit (may be negative; callers bound it)
    pub t: f32,
    /// Barycentric weight of the `u` edge
    pub u: f32,
    /// Barycentric weight of the `v` edge
    pub v: f32,
}

/// A triangle stored as `P`, `u = V1 - P`, `v = V2 - P`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    anchor: Vec3,
    edge_u: Vec3,
    edge_v: Vec3,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            anchor: v0,
            edge_u: v1 - v0,
            edge_v: v2 - v0,
        }
    }

    /// Create a triangle directly from its anchor and edge vectors.
    pub fn from_edges(anchor: Vec3, edge_u: Vec3, edge_v: Vec3) -> Self {
        Self {
            anchor,
            edge_u,
            edge_v,
        }
    }

    #[inline]
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    #[inline]
    pub fn edge_u(&self) -> Vec3 {
        self.edge_u
    }

    #[inline]
    pub fn edge_v(&self) -> Vec3 {
        self.edge_v
    }

    /// The original vertices `P, P + u, P + v`.
    pub fn vertices(&self) -> [Vec3; 3] {
        [
            self.anchor,
            self.anchor + self.edge_u,
            self.anchor + self.edge_v,
        ]
    }

    /// Point at barycentric coordinates `(u, v)`.
    #[inline]
    pub fn point_at(&self, u: f32, v: f32) -> Vec3 {
        self.anchor + u * self.edge_u + v * self.edge_v
    }

    /// Unit geometric normal `normalize(u x v)`, or zero for a degenerate triangle.
    pub fn face_normal(&self) -> Vec3 {
        self.edge_u.cross(self.edge_v).normalize_or_zero()
    }

    /// Twice the triangle area.
    pub fn double_area(&self) -> f32 {
        self.edge_u.cross(self.edge_v).length()
    }

    /// Scale every vertex about the world origin.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::from_edges(
            self.anchor * factor,
            self.edge_u * factor,
            self.edge_v * factor,
        )
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the ray parameter and barycentric coordinates of the hit. The
    /// parameter is not range-checked: scene queries decide which `t` count.
    pub fn intersect(&self, ray: &Ray, culling: Culling) -> Option<TriangleHit> {
        let pvec = ray.direction.cross(self.edge_v);
        let det = self.edge_u.dot(pvec);

        // Ray is parallel to the plane, or hits a culled back face
        let rejected = match culling {
            Culling::DoubleSided => det.abs() < INTERSECT_EPSILON,
            Culling::BackFace => det < INTERSECT_EPSILON,
        };
        if rejected {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.anchor;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(self.edge_u);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.edge_v.dot(qvec) * inv_det;
        Some(TriangleHit { t, u, v })
    }
}
