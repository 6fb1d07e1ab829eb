use glam::Vec3;

/// A half-line starting at `origin`.
///
/// The direction is normalized on construction so that hit distances `t`
/// are world-space distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimRay {
    origin: Vec3,
    direction: Vec3,
}

impl PrimRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parameter of the point on the ray closest to `point` (may be negative).
    pub fn project(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.direction)
    }

    /// Distance from `point` to the ray (the half-line, not the full line).
    pub fn distance(&self, point: Vec3) -> f32 {
        let t = self.project(point).max(0.0);
        self.point_at(t).distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = PrimRay::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.direction(), Vec3::Z);
        assert_eq!(ray.point_at(2.0), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_distance_behind_origin_uses_origin() {
        let ray = PrimRay::new(Vec3::ZERO, Vec3::X);
        assert!((ray.distance(Vec3::new(-3.0, 4.0, 0.0)) - 5.0).abs() < 1e-6);
        assert!((ray.distance(Vec3::new(3.0, 4.0, 0.0)) - 4.0).abs() < 1e-6);
    }
}
