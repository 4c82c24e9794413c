//! Scene queries: nearest hit and shadow occlusion.

use whitted_core::Scene;
use whitted_math::{Culling, Interval, Ray, Vec3};

/// Record of a ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Index of the triangle that was hit
    pub triangle: usize,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Flat outward normal of the triangle (not flipped towards the ray)
    pub normal: Vec3,
}

/// Geometry queries the tracer needs from a scene.
///
/// An acceleration structure only has to answer these two questions to
/// replace the brute-force scan.
pub trait Hittable: Send + Sync {
    /// Closest hit with `t` strictly inside `ray_t`, skipping `exclude`.
    fn nearest_hit(&self, ray: &Ray, ray_t: Interval, exclude: Option<usize>) -> Option<HitRecord>;

    /// True if any triangle other than `exclude` is hit with `t` strictly
    /// inside `ray_t`. Never culls back faces.
    fn occluded(&self, ray: &Ray, ray_t: Interval, exclude: Option<usize>) -> bool;
}

/// Tests every triangle of a scene against every ray.
pub struct LinearScan<'a> {
    scene: &'a Scene,
    culling: Culling,
}

impl<'a> LinearScan<'a> {
    pub fn new(scene: &'a Scene, culling: Culling) -> Self {
        Self { scene, culling }
    }
}

impl Hittable for LinearScan<'_> {
    fn nearest_hit(&self, ray: &Ray, ray_t: Interval, exclude: Option<usize>) -> Option<HitRecord> {
        let mut closest: Option<(usize, f32)> = None;
        let mut closest_so_far = ray_t.max;

        for (id, triangle) in self.scene.triangles().iter().enumerate() {
            if exclude == Some(id) {
                continue;
            }
            if let Some(hit) = triangle.intersect(ray, self.culling) {
                if ray_t.with_max(closest_so_far).surrounds(hit.t) {
                    closest_so_far = hit.t;
                    closest = Some((id, hit.t));
                }
            }
        }

        closest.map(|(triangle, t)| HitRecord {
            triangle,
            t,
            p: ray.at(t),
            normal: self.scene.normal(triangle),
        })
    }

    fn occluded(&self, ray: &Ray, ray_t: Interval, exclude: Option<usize>) -> bool {
        self.scene
            .triangles()
            .iter()
            .enumerate()
            .filter(|(id, _)| exclude != Some(*id))
            .any(|(_, triangle)| {
                triangle
                    .intersect(ray, Culling::DoubleSided)
                    .is_some_and(|hit| ray_t.surrounds(hit.t))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whitted_core::Material;
    use whitted_math::Triangle;

    /// Two parallel unit triangles facing +z, at z = 0 and z = -1.
    fn stacked_scene() -> Scene {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::default());
        for z in [0.0, -1.0] {
            let tri = Triangle::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z), Vec3::new(0.0, 1.0, z));
            scene.add_triangle(tri, Vec3::Z, mat).unwrap();
        }
        scene
    }

    #[test]
    fn test_nearest_hit_picks_closest() {
        let scene = stacked_scene();
        let world = LinearScan::new(&scene, Culling::DoubleSided);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 2.0), Vec3::NEG_Z);

        let hit = world.nearest_hit(&ray, Interval::above(1e-4), None).unwrap();
        assert_eq!(hit.triangle, 0);
        assert!((hit.t - 2.0).abs() < 1e-6);
        assert!((hit.p - Vec3::new(0.2, 0.2, 0.0)).length() < 1e-6);
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_nearest_hit_skips_excluded() {
        let scene = stacked_scene();
        let world = LinearScan::new(&scene, Culling::DoubleSided);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 2.0), Vec3::NEG_Z);

        let hit = world.nearest_hit(&ray, Interval::above(1e-4), Some(0)).unwrap();
        assert_eq!(hit.triangle, 1);
        assert!((hit.t - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_hit_ignores_hits_behind() {
        let scene = stacked_scene();
        let world = LinearScan::new(&scene, Culling::DoubleSided);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 2.0), Vec3::Z);

        assert!(world.nearest_hit(&ray, Interval::above(1e-4), None).is_none());
    }

    #[test]
    fn test_back_face_culling_policy() {
        let scene = stacked_scene();
        let ray = Ray::new(Vec3::new(0.2, 0.2, -2.0), Vec3::Z);

        let culled = LinearScan::new(&scene, Culling::BackFace);
        assert!(culled.nearest_hit(&ray, Interval::above(1e-4), None).is_none());

        let double = LinearScan::new(&scene, Culling::DoubleSided);
        let hit = double.nearest_hit(&ray, Interval::above(1e-4), None).unwrap();
        assert_eq!(hit.triangle, 1);
    }

    #[test]
    fn test_occlusion_between_point_and_light() {
        let scene = stacked_scene();
        // Culling never applies to shadow rays
        let world = LinearScan::new(&scene, Culling::BackFace);
        let shadow_interval = Interval::new(1e-4, 1.0 - 1e-4);

        // From below both triangles up to a light above them
        let ray = Ray::between(Vec3::new(0.2, 0.2, -2.0), Vec3::new(0.2, 0.2, 3.0));
        assert!(world.occluded(&ray, shadow_interval, None));

        // Leaving triangle 1 upwards, triangle 0 still blocks
        let ray = Ray::between(Vec3::new(0.2, 0.2, -1.0), Vec3::new(0.2, 0.2, 3.0));
        assert!(world.occluded(&ray, shadow_interval, Some(1)));

        // Light between the two triangles
        let ray = Ray::between(Vec3::new(0.2, 0.2, -1.0), Vec3::new(0.2, 0.2, -0.5));
        assert!(!world.occluded(&ray, shadow_interval, Some(1)));

        // Blocker beyond the light does not count
        let ray = Ray::between(Vec3::new(0.2, 0.2, -3.0), Vec3::new(0.2, 0.2, -2.0));
        assert!(!world.occluded(&ray, shadow_interval, None));
    }
}
