use glam::Vec3;

use super::Aabb;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl PrimSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Outward unit normal at a point on (or near) the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.center - Vec3::splat(self.radius),
            self.center + Vec3::splat(self.radius),
        )
    }

    /// Zero or negative radius spheres never intersect anything.
    pub fn is_degenerated(&self) -> bool {
        self.radius <= 0.0
    }
}
