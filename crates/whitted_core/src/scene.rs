//! Flattened scene model for the tracer.
//!
//! Everything is stored per triangle in parallel arrays: the triangle in
//! barycentric form, its flat shading normal, and the index of its material.
//! The scene is assembled once by a loader and only read while tracing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use whitted_math::{Aabb, Triangle, Vec3};

/// Color type alias (RGB, unclamped)
pub type Color = Vec3;

/// Most point lights a scene configuration may declare.
pub const MAX_LIGHTS: usize = 20;

/// Errors raised while assembling a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error(
        "Scene arrays disagree: {triangles} triangles, {normals} normals, {material_indices} material indices"
    )]
    LengthMismatch {
        triangles: usize,
        normals: usize,
        material_indices: usize,
    },

    #[error("Triangle {triangle} references material {material}, but the scene has {count} materials")]
    InvalidMaterial {
        triangle: usize,
        material: usize,
        count: usize,
    },

    #[error("Triangle {0} has a zero-length or non-finite normal")]
    DegenerateNormal(usize),

    #[error("Light {index} has invalid intensity {intensity}")]
    InvalidLight { index: usize, intensity: f32 },
}

/// Result type for scene assembly.
pub type SceneResult<T> = Result<T, SceneError>;

/// Phong-style reflectance triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Ambient reflectance
    pub ka: Color,
    /// Diffuse reflectance
    pub kd: Color,
    /// Specular reflectance (also weights the mirror bounce)
    pub ks: Color,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ka: Color::ZERO,
            kd: Color::splat(0.5), // Grey default
            ks: Color::ZERO,
        }
    }
}

impl Material {
    /// Create a new material from its three reflectances.
    pub fn new(ka: Color, kd: Color, ks: Color) -> Self {
        Self { ka, kd, ks }
    }
}

/// A point light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// World-space position
    pub position: Vec3,
    /// Color, each channel in [0, 1]
    pub color: Color,
    /// Non-negative scalar intensity
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }

    /// Radiance scale `intensity * color`.
    #[inline]
    pub fn power(&self) -> Color {
        self.intensity * self.color
    }
}

/// A triangle soup with per-triangle normal and material, plus lights.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    triangles: Vec<Triangle>,
    normals: Vec<Vec3>,
    material_indices: Vec<usize>,
    materials: Vec<Material>,
    lights: Vec<Light>,
    bounds: Aabb,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a scene from parallel arrays, validating every invariant.
    pub fn from_parts(
        triangles: Vec<Triangle>,
        normals: Vec<Vec3>,
        material_indices: Vec<usize>,
        materials: Vec<Material>,
        lights: Vec<Light>,
    ) -> SceneResult<Self> {
        if triangles.len() != normals.len() || triangles.len() != material_indices.len() {
            return Err(SceneError::LengthMismatch {
                triangles: triangles.len(),
                normals: normals.len(),
                material_indices: material_indices.len(),
            });
        }

        let mut scene = Self {
            materials,
            ..Self::default()
        };
        for light in lights {
            scene.add_light(light)?;
        }

        scene.triangles.reserve(triangles.len());
        scene.normals.reserve(triangles.len());
        scene.material_indices.reserve(triangles.len());
        for ((triangle, normal), material) in triangles.into_iter().zip(normals).zip(material_indices) {
            scene.add_triangle(triangle, normal, material)?;
        }

        Ok(scene)
    }

    /// Add a material to the scene and return its ID.
    pub fn add_material(&mut self, material: Material) -> usize {
        let id = self.materials.len();
        self.materials.push(material);
        id
    }

    /// Add a point light.
    pub fn add_light(&mut self, light: Light) -> SceneResult<()> {
        if !(light.intensity >= 0.0 && light.intensity.is_finite()) {
            return Err(SceneError::InvalidLight {
                index: self.lights.len(),
                intensity: light.intensity,
            });
        }
        self.lights.push(light);
        Ok(())
    }

    /// Add a triangle with its flat normal and material, returning its ID.
    ///
    /// The normal is normalized on the way in; the material must already exist.
    pub fn add_triangle(
        &mut self,
        triangle: Triangle,
        normal: Vec3,
        material: usize,
    ) -> SceneResult<usize> {
        let id = self.triangles.len();
        if material >= self.materials.len() {
            return Err(SceneError::InvalidMaterial {
                triangle: id,
                material,
                count: self.materials.len(),
            });
        }
        let normal = normal.try_normalize().ok_or(SceneError::DegenerateNormal(id))?;

        self.bounds = triangle
            .vertices()
            .into_iter()
            .fold(self.bounds, |acc, p| acc.include_point(p));
        self.triangles.push(triangle);
        self.normals.push(normal);
        self.material_indices.push(material);
        Ok(id)
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when the scene has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Flat shading normal of triangle `id`.
    #[inline]
    pub fn normal(&self, id: usize) -> Vec3 {
        self.normals[id]
    }

    /// Material of triangle `id`.
    #[inline]
    pub fn material_of(&self, id: usize) -> &Material {
        &self.materials[self.material_indices[id]]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Bounding box of all triangle vertices.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}
