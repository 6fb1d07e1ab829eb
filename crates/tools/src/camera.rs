//! Cameras as seen by tools: a ray per pixel and a dominant view axis.

use glam::{IVec2, UVec2, Vec3};
use winged::{Dimension, PrimRay};

/// Source of picking rays.
pub trait Camera {
    /// World-space ray through the center of `pixel`
    fn ray(&self, pixel: IVec2) -> PrimRay;

    /// Axis the view direction is most aligned with
    fn primary_dimension(&self) -> Dimension;

    /// Viewport size in pixels
    fn resolution(&self) -> UVec2;
}

/// Pinhole camera looking from `position` at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub resolution: UVec2,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        // Default position: (5, 5, 5) looking at origin
        Self {
            position: Vec3::splat(5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            resolution: UVec2::new(800, 600),
        }
    }
}

impl PerspectiveCamera {
    pub fn look_at(position: Vec3, target: Vec3, resolution: UVec2) -> Self {
        Self {
            position,
            target,
            resolution,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Orthonormal (right, up) basis of the image plane
    fn basis(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(self.up).try_normalize().unwrap_or_else(|| {
            // Looking along `up`: pick any perpendicular axis
            forward.any_orthonormal_vector()
        });
        (right, right.cross(forward))
    }
}

impl Camera for PerspectiveCamera {
    fn ray(&self, pixel: IVec2) -> PrimRay {
        let size = self.resolution.max(UVec2::ONE).as_vec2();
        let ndc_x = 2.0 * (pixel.x as f32 + 0.5) / size.x - 1.0;
        let ndc_y = 1.0 - 2.0 * (pixel.y as f32 + 0.5) / size.y;

        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * size.x / size.y;
        let (right, up) = self.basis();

        let direction = self.forward() + right * (ndc_x * half_width) + up * (ndc_y * half_height);
        PrimRay::new(self.position, direction)
    }

    fn primary_dimension(&self) -> Dimension {
        Dimension::dominant(self.forward())
    }

    fn resolution(&self) -> UVec2 {
        self.resolution
    }
}
