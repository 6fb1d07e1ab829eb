use glam::Vec3;

use super::Aabb;
use crate::EPSILON;

/// A triangle with counter-clockwise vertices `v1`, `v2`, `v3`.
///
/// The winding determines the normal and therefore the orientation of any
/// face created from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimTriangle {
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
}

impl PrimTriangle {
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self { v1, v2, v3 }
    }

    /// Unnormalized normal; its length is twice the triangle's area.
    pub fn cross(&self) -> Vec3 {
        (self.v2 - self.v1).cross(self.v3 - self.v1)
    }

    pub fn normal(&self) -> Vec3 {
        self.cross().normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        self.cross().length() * 0.5
    }

    pub fn center(&self) -> Vec3 {
        (self.v1 + self.v2 + self.v3) / 3.0
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// True if the triangle has (nearly) zero area.
    pub fn is_degenerated(&self) -> bool {
        self.cross().length_squared() < EPSILON * EPSILON
    }

    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in self.vertices() {
            aabb.include_point(v);
        }
        aabb
    }

    /// Largest extent of the bounding box along any axis.
    pub fn max_dimension_extent(&self) -> f32 {
        self.aabb().size().max_element()
    }

    /// Same triangle with opposite winding.
    pub fn flipped(&self) -> Self {
        Self::new(self.v1, self.v3, self.v2)
    }

    /// Closest point on the triangle to `p` (Ericson, Real-Time Collision Detection 5.1.5).
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.v1, self.v2, self.v3);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}
