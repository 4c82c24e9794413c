//! Image driver: one primary ray per pixel, rows traced in parallel.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use whitted_core::{Color, Scene};
use whitted_math::Culling;

use crate::hittable::LinearScan;
use crate::shading::Calibration;
use crate::tracer::Tracer;
use crate::Camera;

/// Errors that can occur while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Output buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// What a primary ray computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Full recursive shading
    #[default]
    Full,
    /// `ka + kd` of the first hit only
    Preview,
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Recursion depth; 0 renders black
    pub max_depth: u32,
    pub mode: RenderMode,
    pub calibration: Calibration,
    /// Scale of the mirror bounce term
    pub reflect_damping: f32,
    /// Smallest ray parameter counted as a hit
    pub ray_epsilon: f32,
    /// Face policy for visibility; shadow rays are always double-sided
    pub culling: Culling,
    /// Unit for light distances when the scene was not normalized
    pub distance_bound: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            mode: RenderMode::Full,
            calibration: Calibration::Classic,
            reflect_damping: 0.1,
            ray_epsilon: 1e-4,
            culling: Culling::DoubleSided,
            distance_bound: None,
        }
    }
}

impl RenderConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_reflect_damping(mut self, reflect_damping: f32) -> Self {
        self.reflect_damping = reflect_damping;
        self
    }

    pub fn with_ray_epsilon(mut self, ray_epsilon: f32) -> Self {
        self.ray_epsilon = ray_epsilon;
        self
    }

    pub fn with_culling(mut self, culling: Culling) -> Self {
        self.culling = culling;
        self
    }

    pub fn with_distance_bound(mut self, distance_bound: Option<f32>) -> Self {
        self.distance_bound = distance_bound;
        self
    }
}

/// Quantize one channel: clamp to `[0, 1 - 1e-6]`, scale by 256, truncate.
#[inline]
pub fn quantize(c: f32) -> u8 {
    (c.clamp(0.0, 1.0 - 1e-6) * 256.0) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Row-major image buffer, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Quantized 8-bit copy for encoding.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(color_to_rgb(self.get(x, y))))
    }

    /// Encode to `path`; the format follows the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        self.to_rgb8().save(path.as_ref())?;
        log::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }
}

/// Trace every pixel of `camera` into `output`, `output[i * xres + j]` for
/// row `i` and column `j`.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    output: &mut [Color],
) -> RenderResult<()> {
    let expected = camera.pixel_count();
    if output.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: output.len(),
        });
    }
    if scene.is_empty() {
        log::warn!("Rendering an empty scene");
    }

    let world = LinearScan::new(scene, config.culling);
    let tracer = Tracer::new(scene, &world, config);

    log::debug!(
        "Rendering {}x{}: depth {}, {:?}, {:?}, {:?} culling",
        camera.xres(),
        camera.yres(),
        config.max_depth,
        config.mode,
        config.calibration,
        config.culling
    );
    let start = Instant::now();

    output
        .par_chunks_mut(camera.xres() as usize)
        .enumerate()
        .for_each(|(i, row)| {
            for (j, pixel) in row.iter_mut().enumerate() {
                let ray = camera.primary_ray(i as u32, j as u32);
                *pixel = tracer.shade_primary(&ray);
            }
        });

    log::info!(
        "Rendered {}x{} ({} triangles, {} lights) in {:.2?}",
        camera.xres(),
        camera.yres(),
        scene.len(),
        scene.lights().len(),
        start.elapsed()
    );
    Ok(())
}

/// Render into a fresh [`ImageBuffer`].
pub fn render_image(scene: &Scene, camera: &Camera, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    let mut image = ImageBuffer::new(camera.xres(), camera.yres());
    render(scene, camera, config, &mut image.pixels)?;
    Ok(image)
}
