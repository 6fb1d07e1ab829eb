//! Sketch paths: ordered spheres laid down by a stroke.

use glam::Vec3;
use winged::{Dimension, PrimSphere};

use crate::shell::Shell;
use crate::types::PathId;

/// A sphere of a path together with the shell it contributed to the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSphere {
    pub sphere: PrimSphere,
    pub shell: Shell,
}

/// Ordered run of spheres.
///
/// A path may be paired with a mirror partner in the same sketch mesh; edits
/// to one are replayed on the other across the mirror plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchPath {
    id: PathId,
    pub(crate) spheres: Vec<PathSphere>,
    pub(crate) mirror: Option<PathId>,
}

impl SketchPath {
    pub(crate) fn new(id: PathId) -> Self {
        Self {
            id,
            spheres: Vec::new(),
            mirror: None,
        }
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    /// Mirror partner path, if any.
    pub fn mirror(&self) -> Option<PathId> {
        self.mirror
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn spheres(&self) -> impl Iterator<Item = &PrimSphere> {
        self.spheres.iter().map(|s| &s.sphere)
    }

    pub fn sphere(&self, index: usize) -> Option<&PathSphere> {
        self.spheres.get(index)
    }

    pub fn last_sphere(&self) -> Option<&PrimSphere> {
        self.spheres.last().map(|s| &s.sphere)
    }

    /// Sum of distances between consecutive sphere centers.
    pub fn length(&self) -> f32 {
        self.spheres
            .windows(2)
            .map(|w| w[0].sphere.center.distance(w[1].sphere.center))
            .sum()
    }

    /// Length of the segments whose both ends lie inside `region`.
    pub fn length_within(&self, region: &PrimSphere) -> f32 {
        self.spheres
            .windows(2)
            .filter(|w| region.contains(w[0].sphere.center) && region.contains(w[1].sphere.center))
            .map(|w| w[0].sphere.center.distance(w[1].sphere.center))
            .sum()
    }

    /// Indices of spheres whose centers lie inside `region`.
    pub fn indices_within(&self, region: &PrimSphere) -> Vec<usize> {
        self.spheres
            .iter()
            .enumerate()
            .filter(|(_, s)| region.contains(s.sphere.center))
            .map(|(i, _)| i)
            .collect()
    }

    /// Sphere centers along the path.
    pub fn centers(&self) -> Vec<Vec3> {
        self.spheres.iter().map(|s| s.sphere.center).collect()
    }
}

/// Sphere mirrored across the plane orthogonal to `dimension`.
pub(crate) fn mirror_sphere(sphere: &PrimSphere, dimension: Dimension) -> PrimSphere {
    PrimSphere::new(dimension.mirror(sphere.center), sphere.radius)
}

/// Spheres strictly between `from` and `to`, at most `step` apart.
///
/// Radii are interpolated linearly.
pub(crate) fn fill_spheres(from: &PrimSphere, to: &PrimSphere, step: f32) -> Vec<PrimSphere> {
    let distance = from.center.distance(to.center);
    if step <= winged::EPSILON || distance <= step {
        return Vec::new();
    }
    let segments = (distance / step).ceil() as usize;
    (1..segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            PrimSphere::new(
                from.center.lerp(to.center, t),
                from.radius + (to.radius - from.radius) * t,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_spheres_respects_step() {
        let from = PrimSphere::new(Vec3::ZERO, 0.1);
        let to = PrimSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.3);
        let filled = fill_spheres(&from, &to, 0.25);

        assert_eq!(filled.len(), 3);
        let mut previous = from.center;
        for sphere in filled.iter().chain([&to]) {
            assert!(previous.distance(sphere.center) <= 0.25 + 1e-6);
            previous = sphere.center;
        }
        assert!((filled[1].radius - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_fill_spheres_short_gap() {
        let from = PrimSphere::new(Vec3::ZERO, 0.1);
        let to = PrimSphere::new(Vec3::new(0.01, 0.0, 0.0), 0.1);
        assert!(fill_spheres(&from, &to, 0.05).is_empty());
    }
}
