//! Pinhole camera for primary ray generation.

use crate::{RenderError, RenderResult};
use whitted_math::{Ray, Vec3};

/// Pinhole camera with one primary ray per pixel.
///
/// Pixel `(i, j)` (row, column) looks along
/// `focal_length * forward + x * right + y * up` with
/// `x = 2j - (xres - 1)`, `y = 2i - (yres - 1)` and
/// `up = forward x right`, so row 0 is the top of the image when `right`
/// was built as `forward x up_hint`.
///
/// Fields are only set through [`Camera::new`], so every camera has a
/// non-empty resolution and a usable basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    /// Distance to the image plane, in pixel units
    focal_length: f32,
    xres: u32,
    yres: u32,
}

impl Camera {
    /// Create a camera from an explicit basis.
    pub fn new(
        origin: Vec3,
        forward: Vec3,
        right: Vec3,
        focal_length: f32,
        xres: u32,
        yres: u32,
    ) -> RenderResult<Self> {
        if xres == 0 || yres == 0 {
            return Err(RenderError::InvalidCamera(format!(
                "resolution {}x{} is empty",
                xres, yres
            )));
        }
        if !(focal_length > 0.0 && focal_length.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "focal length {} must be positive",
                focal_length
            )));
        }
        if !origin.is_finite() || !forward.is_finite() || !right.is_finite() {
            return Err(RenderError::InvalidCamera("non-finite camera basis".into()));
        }
        if forward.cross(right).length_squared() < f32::EPSILON {
            return Err(RenderError::InvalidCamera(
                "forward and right vectors are degenerate".into(),
            ));
        }

        Ok(Self {
            origin,
            forward,
            right,
            focal_length,
            xres,
            yres,
        })
    }

    /// Build a camera at `eye` looking at `target`.
    ///
    /// `forward = normalize(target - eye)`, `right = normalize(forward x up)`
    /// and the focal length is `yres / yview`, where `yview` is the
    /// vertical extent of the view at unit distance.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        yview: f32,
        xres: u32,
        yres: u32,
    ) -> RenderResult<Self> {
        let forward = (target - eye)
            .try_normalize()
            .ok_or_else(|| RenderError::InvalidCamera("eye and look-at point coincide".into()))?;
        let up = up
            .try_normalize()
            .ok_or_else(|| RenderError::InvalidCamera("up vector is zero".into()))?;
        let right = forward.cross(up).try_normalize().ok_or_else(|| {
            RenderError::InvalidCamera("up vector is parallel to the view direction".into())
        })?;
        if !(yview > 0.0 && yview.is_finite()) {
            return Err(RenderError::InvalidCamera(format!(
                "vertical view {} must be positive",
                yview
            )));
        }

        Self::new(eye, forward, right, yres as f32 / yview, xres, yres)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    /// Horizontal resolution, at least 1.
    pub fn xres(&self) -> u32 {
        self.xres
    }

    /// Vertical resolution, at least 1.
    pub fn yres(&self) -> u32 {
        self.yres
    }

    /// Image-plane up vector, `forward x right`.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.forward.cross(self.right)
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.xres as usize * self.yres as usize
    }

    /// Normalized primary ray through row `i`, column `j`.
    pub fn primary_ray(&self, i: u32, j: u32) -> Ray {
        let x = 2.0 * j as f32 - (self.xres - 1) as f32;
        let y = 2.0 * i as f32 - (self.yres - 1) as f32;
        let direction = self.focal_length * self.forward + x * self.right + y * self.up();
        Ray::normalized(self.origin, direction)
    }
}
