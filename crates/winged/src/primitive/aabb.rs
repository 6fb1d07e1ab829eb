use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube around `center` with edge length `width`.
    pub fn cube(center: Vec3, width: f32) -> Self {
        let half = Vec3::splat(width * 0.5);
        Self::new(center - half, center + half)
    }

    /// Inverted box that any included point replaces.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// True if `other` lies completely inside this box.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Get the octant index for a point (0-7).
    pub fn octant_for_point(&self, point: Vec3) -> usize {
        let center = self.center();
        let mut index = 0;
        if point.x >= center.x {
            index |= 1;
        }
        if point.y >= center.y {
            index |= 2;
        }
        if point.z >= center.z {
            index |= 4;
        }
        index
    }

    /// Get the bounds for a specific octant.
    pub fn octant_bounds(&self, octant: usize) -> Aabb {
        let center = self.center();
        let min = Vec3::new(
            if octant & 1 != 0 { center.x } else { self.min.x },
            if octant & 2 != 0 { center.y } else { self.min.y },
            if octant & 4 != 0 { center.z } else { self.min.z },
        );
        let max = Vec3::new(
            if octant & 1 != 0 { self.max.x } else { center.x },
            if octant & 2 != 0 { self.max.y } else { center.y },
            if octant & 4 != 0 { self.max.z } else { center.z },
        );
        Aabb::new(min, max)
    }

    /// Octant of this box that fully contains `other`, if any.
    pub fn octant_containing(&self, other: &Aabb) -> Option<usize> {
        let octant = self.octant_for_point(other.center());
        self.octant_bounds(octant)
            .contains_aabb(other)
            .then_some(octant)
    }
}
