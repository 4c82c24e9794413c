//! Indexed mesh geometry as read from a model file.
//!
//! A `Mesh` keeps the shared-vertex layout of the source file. The loader
//! flattens it into per-triangle records with [`Mesh::triangles`] when the
//! scene is assembled.

use whitted_math::{Aabb, Triangle, Vec3};

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Name from the source file
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, parallel to `positions` when present
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Index into the file's material list
    pub material: Option<usize>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

/// One flattened face of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshFace {
    pub triangle: Triangle,
    /// Normal of the face's first vertex, if the mesh carries normals
    pub vertex_normal: Option<Vec3>,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// Normals whose count does not match the vertex count are dropped.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
    ) -> Self {
        let name = name.into();
        let normals = normals.filter(|n| {
            let matches = n.len() == positions.len();
            if !matches {
                log::debug!(
                    "Mesh '{}': {} normals for {} vertices, ignoring normals",
                    name,
                    n.len(),
                    positions.len()
                );
            }
            matches
        });
        let bounds = positions.iter().copied().collect();

        Self {
            name,
            positions,
            normals,
            indices,
            material: None,
            bounds,
        }
    }

    /// Attach a material index.
    pub fn with_material(mut self, material: Option<usize>) -> Self {
        self.material = material;
        self
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the faces in index order.
    ///
    /// Faces with an out-of-range index or a trailing partial index triple
    /// are skipped with a warning.
    pub fn triangles(&self) -> impl Iterator<Item = MeshFace> + '_ {
        self.indices.chunks(3).filter_map(move |chunk| {
            if chunk.len() < 3 {
                return None;
            }

            let i0 = chunk[0] as usize;
            let i1 = chunk[1] as usize;
            let i2 = chunk[2] as usize;

            let count = self.positions.len();
            if i0 >= count || i1 >= count || i2 >= count {
                log::warn!(
                    "Mesh '{}': invalid triangle indices [{}, {}, {}], vertex count: {}",
                    self.name,
                    i0,
                    i1,
                    i2,
                    count
                );
                return None;
            }

            Some(MeshFace {
                triangle: Triangle::new(self.positions[i0], self.positions[i1], self.positions[i2]),
                vertex_normal: self.normals.as_ref().map(|n| n[i0]),
            })
        })
    }
}
