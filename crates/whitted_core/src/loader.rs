//! OBJ/MTL scene loading.
//!
//! Reads a Wavefront OBJ file (and its MTL library) with `tobj`, flattens
//! every mesh into per-triangle records and, unless told otherwise, rescales
//! the scene so that the diagonal of its bounding box has unit length. The
//! tracer's epsilons are tuned for that scale.

use std::path::{Path, PathBuf};

use thiserror::Error;
use whitted_math::{Aabb, Vec3};

use crate::mesh::Mesh;
use crate::scene::{Color, Light, Material, Scene, SceneError, MAX_LIGHTS};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read OBJ file {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("No triangles found in {0}")]
    NoGeometry(String),

    #[error("Too many lights: {0} (at most {max} are supported)", max = MAX_LIGHTS)]
    TooManyLights(usize),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Options controlling how a model becomes a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadOptions {
    /// Divide every position by the scene's bounding-box diagonal.
    pub normalize: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// A scene together with the scale it was brought to.
#[derive(Clone, Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    /// Bounding-box diagonal of the model in file units
    pub dist_bound: f32,
    /// Whether positions were divided by `dist_bound`
    pub normalized: bool,
}

impl LoadedScene {
    /// Distance unit for light attenuation.
    ///
    /// `None` for a normalized scene, whose distances are already relative
    /// to its size.
    pub fn distance_bound(&self) -> Option<f32> {
        if self.normalized {
            None
        } else {
            Some(self.dist_bound)
        }
    }

    /// Map a point given in file units (camera eye, look-at point) into the
    /// coordinate frame of the loaded scene.
    pub fn to_scene_space(&self, p: Vec3) -> Vec3 {
        if self.normalized {
            p / self.dist_bound
        } else {
            p
        }
    }
}

/// Load an OBJ file and its materials, add `lights`, and build a scene.
///
/// Light positions are given in file units and are transformed together
/// with the geometry.
pub fn load_obj<P: AsRef<Path>>(
    path: P,
    lights: &[Light],
    options: LoadOptions,
) -> LoadResult<LoadedScene> {
    let path = path.as_ref();
    let name = path.display().to_string();

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(|source| LoadError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("{}: could not load materials ({}), using defaults", name, e);
            Vec::new()
        }
    };
    let materials: Vec<Material> = materials.iter().map(convert_material).collect();

    let meshes: Vec<Mesh> = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            Mesh::new(
                model.name,
                to_vec3s(&mesh.positions),
                mesh.indices,
                (!mesh.normals.is_empty()).then(|| to_vec3s(&mesh.normals)),
            )
            .with_material(mesh.material_id)
        })
        .collect();

    log::info!(
        "Read {}: {} meshes, {} materials",
        name,
        meshes.len(),
        materials.len()
    );

    build_scene(&name, &meshes, &materials, lights, options)
}

/// Flatten meshes, materials and lights into a validated [`Scene`].
///
/// `name` only labels log messages and errors.
pub fn build_scene(
    name: &str,
    meshes: &[Mesh],
    materials: &[Material],
    lights: &[Light],
    options: LoadOptions,
) -> LoadResult<LoadedScene> {
    if lights.len() > MAX_LIGHTS {
        return Err(LoadError::TooManyLights(lights.len()));
    }

    let bounds = meshes
        .iter()
        .fold(Aabb::EMPTY, |acc, mesh| Aabb::surrounding(&acc, &mesh.bounds));
    let mut dist_bound = bounds.diagonal();
    if !(dist_bound > 0.0 && dist_bound.is_finite()) {
        log::warn!("{}: degenerate bounds ({}), not rescaling", name, dist_bound);
        dist_bound = 1.0;
    }
    let scale = if options.normalize { 1.0 / dist_bound } else { 1.0 };

    let mut materials = materials.to_vec();
    let known_materials = materials.len();
    let mut default_material = None;
    let mut triangles = Vec::new();
    let mut normals = Vec::new();
    let mut material_indices = Vec::new();
    let mut skipped = 0usize;

    for mesh in meshes {
        log::debug!(
            "Mesh '{}': {} triangles, {}",
            mesh.name,
            mesh.triangle_count(),
            if mesh.has_normals() {
                "vertex normals"
            } else {
                "face normals"
            }
        );
        let material = match mesh.material {
            Some(id) if id < known_materials => id,
            other => {
                if let Some(id) = other {
                    log::warn!("Mesh '{}': unknown material {}, using default", mesh.name, id);
                } else {
                    log::debug!("Mesh '{}' has no material, using default", mesh.name);
                }
                *default_material.get_or_insert_with(|| {
                    materials.push(Material::default());
                    materials.len() - 1
                })
            }
        };

        for face in mesh.triangles() {
            let triangle = face.triangle.scaled(scale);
            // Zero-area faces can never be hit
            if triangle.double_area() == 0.0 {
                skipped += 1;
                continue;
            }
            let normal = face
                .vertex_normal
                .and_then(Vec3::try_normalize)
                .unwrap_or_else(|| triangle.face_normal());
            if normal == Vec3::ZERO {
                skipped += 1;
                continue;
            }
            triangles.push(triangle);
            normals.push(normal);
            material_indices.push(material);
        }
    }

    if skipped > 0 {
        log::debug!("{}: skipped {} degenerate triangles", name, skipped);
    }
    if triangles.is_empty() {
        return Err(LoadError::NoGeometry(name.to_string()));
    }

    let lights = lights
        .iter()
        .map(|light| Light::new(light.position * scale, light.color, light.intensity))
        .collect();
    let scene = Scene::from_parts(triangles, normals, material_indices, materials, lights)?;

    log::info!(
        "Built scene {}: {} triangles, {} materials, {} lights, diagonal {:.4}",
        name,
        scene.len(),
        scene.materials().len(),
        scene.lights().len(),
        dist_bound
    );

    Ok(LoadedScene {
        scene,
        dist_bound,
        normalized: options.normalize,
    })
}

fn convert_material(material: &tobj::Material) -> Material {
    let channel = |c: Option<[f32; 3]>| c.map(Color::from_array);
    Material::new(
        channel(material.ambient).unwrap_or(Color::ZERO),
        channel(material.diffuse).unwrap_or(Material::default().kd),
        channel(material.specular).unwrap_or(Color::ZERO),
    )
}

fn to_vec3s(flat: &[f32]) -> Vec<Vec3> {
    flat.chunks_exact(3).map(Vec3::from_slice).collect()
}
