//! Local illumination: ambient plus attenuated diffuse and Phong specular.

use whitted_core::{Color, Light, Material};
use whitted_math::Vec3;

/// Attenuation and highlight constants, always used as one set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingCoefficients {
    /// Quadratic attenuation term
    pub a: f32,
    /// Linear attenuation term
    pub b: f32,
    /// Constant attenuation term
    pub c: f32,
    /// Phong exponent
    pub specular_pow: f32,
}

impl ShadingCoefficients {
    /// `1 / (A d^2 + B d + C)`
    #[inline]
    pub fn attenuation(&self, dist: f32) -> f32 {
        1.0 / (self.a * dist * dist + self.b * dist + self.c)
    }
}

/// Named shading calibrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calibration {
    #[default]
    Classic,
    /// Stronger linear falloff, tighter highlights
    Soft,
}

impl Calibration {
    pub fn coefficients(self) -> ShadingCoefficients {
        match self {
            Calibration::Classic => ShadingCoefficients {
                a: 1.0,
                b: 1.0,
                c: 0.4,
                specular_pow: 10.0,
            },
            Calibration::Soft => ShadingCoefficients {
                a: 1.0,
                b: 3.0,
                c: 0.3,
                specular_pow: 15.0,
            },
        }
    }
}

/// Diffuse and specular light gathered at one surface point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightSum {
    pub diffuse: Color,
    pub specular: Color,
}

impl LightSum {
    /// Add the contribution of `light` seen from `point`.
    ///
    /// `normal` is the unit surface normal and `reflected` the mirrored
    /// incoming direction. Distances are divided by `distance_bound` before
    /// attenuation when one is given.
    pub fn add_light(
        &mut self,
        coeffs: &ShadingCoefficients,
        light: &Light,
        point: Vec3,
        normal: Vec3,
        reflected: Vec3,
        distance_bound: Option<f32>,
    ) {
        let to_light = light.position - point;
        let dist = to_light.length();
        let Some(l) = to_light.try_normalize() else {
            return;
        };

        let diffuse_term = l.dot(normal).max(0.0);
        let specular_term = reflected.normalize_or_zero().dot(l).max(0.0).powf(coeffs.specular_pow);

        let dist = distance_bound.map_or(dist, |bound| dist / bound);
        let radiance = coeffs.attenuation(dist) * light.power();

        self.diffuse += radiance * diffuse_term;
        self.specular += radiance * specular_term;
    }

    /// `ka + kd * diffuse + ks * specular`
    pub fn shade(&self, material: &Material) -> Color {
        material.ka + material.kd * self.diffuse + material.ks * self.specular
    }
}
