//! Whitted Renderer - recursive ray tracing on the CPU.
//!
//! Primary rays from a pinhole camera are traced against a flattened
//! triangle scene. Every hit gathers ambient, diffuse and specular light from
//! unshadowed point lights and recurses along the mirror direction up to a
//! fixed depth. Rows of the image are traced in parallel with rayon.

mod camera;
mod hittable;
mod renderer;
mod shading;
mod tracer;

pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, LinearScan};
pub use renderer::{
    color_to_rgb, quantize, render, render_image, ImageBuffer, RenderConfig, RenderError,
    RenderMode, RenderResult,
};
pub use shading::{Calibration, LightSum, ShadingCoefficients};
pub use tracer::Tracer;

/// Re-export common math and scene types
pub use whitted_core::{Color, Scene};
pub use whitted_math::{Culling, Ray, Vec3};
