//! Whitted Core - scene model and scene I/O for the Whitted ray tracer.
//!
//! This crate provides:
//!
//! - **Scene model**: `Scene`, `Material`, `Light`, flattened per triangle
//! - **Mesh loading**: OBJ/MTL files via `tobj`, normalized to unit scale
//! - **Scene configuration**: the line-oriented `.cfg` format and JSON
//!
//! # Example
//!
//! ```ignore
//! use whitted_core::{load_obj, LoadOptions, SceneConfig};
//!
//! let config = SceneConfig::load("scenes/room.cfg")?;
//! let loaded = load_obj(&config.obj_path, &config.lights, LoadOptions::default())?;
//! println!("Loaded {} triangles", loaded.scene.len());
//! ```

pub mod config;
pub mod loader;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, SceneConfig};
pub use loader::{build_scene, load_obj, LoadError, LoadOptions, LoadResult, LoadedScene};
pub use mesh::{Mesh, MeshFace};
pub use scene::{Color, Light, Material, Scene, SceneError, SceneResult, MAX_LIGHTS};
