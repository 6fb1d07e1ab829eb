//! Coordinate axes, used to express mirror planes and camera orientation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the three coordinate axes.
///
/// A mirror across a dimension negates that coordinate, so the mirror plane
/// always passes through the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Dimension {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::X, Dimension::Y, Dimension::Z];

    /// Component index (0, 1 or 2).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit vector along this axis.
    pub fn vector(self) -> Vec3 {
        match self {
            Dimension::X => Vec3::X,
            Dimension::Y => Vec3::Y,
            Dimension::Z => Vec3::Z,
        }
    }

    /// Reflect a point across the plane through the origin orthogonal to this axis.
    pub fn mirror(self, point: Vec3) -> Vec3 {
        let mut mirrored = point;
        mirrored[self.index()] = -mirrored[self.index()];
        mirrored
    }

    /// Signed distance of a point to the mirror plane.
    pub fn coordinate(self, point: Vec3) -> f32 {
        point[self.index()]
    }

    /// The axis a direction vector is most aligned with.
    pub fn dominant(direction: Vec3) -> Dimension {
        let a = direction.abs();
        if a.x >= a.y && a.x >= a.z {
            Dimension::X
        } else if a.y >= a.z {
            Dimension::Y
        } else {
            Dimension::Z
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_negates_one_coordinate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Dimension::X.mirror(p), Vec3::new(-1.0, 2.0, 3.0));
        assert_eq!(Dimension::Y.mirror(p), Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(Dimension::Z.mirror(p), Vec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(Dimension::dominant(Vec3::new(0.1, -0.9, 0.2)), Dimension::Y);
        assert_eq!(Dimension::dominant(Vec3::new(0.0, 0.0, -1.0)), Dimension::Z);
    }
}
