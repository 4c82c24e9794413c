//! Recursive Whitted tracing.
//!
//! Each hit is shaded locally against every unshadowed light and then
//! continues along the mirror direction, one level shallower, until the
//! depth budget runs out.

use crate::hittable::Hittable;
use crate::shading::{LightSum, ShadingCoefficients};
use crate::{RenderConfig, RenderMode};
use whitted_core::{Color, Scene};
use whitted_math::{reflect, Interval, Ray};

/// Traces rays through one scene with one configuration.
pub struct Tracer<'a> {
    scene: &'a Scene,
    world: &'a dyn Hittable,
    config: &'a RenderConfig,
    coeffs: ShadingCoefficients,
}

impl<'a> Tracer<'a> {
    /// `world` must answer queries about the triangles of `scene`.
    pub fn new(scene: &'a Scene, world: &'a dyn Hittable, config: &'a RenderConfig) -> Self {
        Self {
            scene,
            world,
            config,
            coeffs: config.calibration.coefficients(),
        }
    }

    /// Color for a primary ray under the configured mode and depth.
    pub fn shade_primary(&self, ray: &Ray) -> Color {
        match self.config.mode {
            RenderMode::Full => self.trace(ray, self.config.max_depth),
            RenderMode::Preview => self.preview(ray),
        }
    }

    /// Radiance arriving along `ray`, following at most `depth` surfaces.
    pub fn trace(&self, ray: &Ray, depth: u32) -> Color {
        self.trace_from(ray, depth, None)
    }

    /// First-hit `ka + kd`, without lights or recursion.
    pub fn preview(&self, ray: &Ray) -> Color {
        match self.world.nearest_hit(ray, Interval::above(self.config.ray_epsilon), None) {
            Some(hit) => {
                let material = self.scene.material_of(hit.triangle);
                material.ka + material.kd
            }
            None => Color::ZERO,
        }
    }

    fn trace_from(&self, ray: &Ray, depth: u32, exclude: Option<usize>) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }

        let eps = self.config.ray_epsilon;
        let Some(hit) = self.world.nearest_hit(ray, Interval::above(eps), exclude) else {
            return Color::ZERO;
        };

        let material = self.scene.material_of(hit.triangle);
        let n = hit.normal;
        let r = reflect(ray.direction, n);

        let mut lights = LightSum::default();
        for light in self.scene.lights() {
            let shadow_ray = Ray::between(hit.p, light.position);
            if self
                .world
                .occluded(&shadow_ray, Interval::new(eps, 1.0 - eps), Some(hit.triangle))
            {
                continue;
            }
            lights.add_light(&self.coeffs, light, hit.p, n, r, self.config.distance_bound);
        }
        let local = lights.shade(material);

        // Mirror bounce, weighted by how much the surface faces it
        let weight = self.config.reflect_damping * (n.dot(r).max(0.0) * material.kd + material.ks);
        if depth == 1 || weight == Color::ZERO {
            return local;
        }
        let Some(dir) = r.try_normalize() else {
            return local;
        };
        let bounce = Ray::new(hit.p, dir);

        local + weight * self.trace_from(&bounce, depth - 1, Some(hit.triangle))
    }
}
