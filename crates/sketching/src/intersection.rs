//! Ray queries against sketch meshes.
//!
//! Both queries can skip the most recently started paths, so a stroke that
//! is still being drawn does not pick its own spheres.

use std::collections::HashSet;

use glam::Vec3;
use winged::intersection::ray_sphere;
use winged::{Intersection, PrimRay};

use crate::mesh::SketchMesh;
use crate::types::{PathId, SketchMeshId};

/// Closest hit on the derived mesh of a sketch mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchMeshIntersection {
    pub intersection: Intersection,
    pub mesh: SketchMeshId,
}

impl SketchMeshIntersection {
    /// Hit that did not come from the mesh surface, e.g. a fallback plane.
    pub fn new(mesh: SketchMeshId, distance: f32, position: Vec3, normal: Vec3) -> Self {
        let mut intersection = Intersection::new();
        intersection.update(distance, position, normal);
        Self { intersection, mesh }
    }

    pub fn distance(&self) -> f32 {
        self.intersection.distance()
    }

    pub fn position(&self) -> Vec3 {
        self.intersection.position()
    }

    pub fn normal(&self) -> Vec3 {
        self.intersection.normal()
    }
}

/// Closest hit on the raw spheres of a sketch path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPathIntersection {
    pub intersection: Intersection,
    pub mesh: SketchMeshId,
    pub path: PathId,
}

impl SketchPathIntersection {
    pub fn distance(&self) -> f32 {
        self.intersection.distance()
    }

    pub fn position(&self) -> Vec3 {
        self.intersection.position()
    }

    pub fn normal(&self) -> Vec3 {
        self.intersection.normal()
    }

    /// The same hit, seen as a hit on the mesh owning the path.
    pub fn as_mesh_intersection(&self) -> SketchMeshIntersection {
        SketchMeshIntersection {
            intersection: self.intersection,
            mesh: self.mesh,
        }
    }
}

impl SketchMesh {
    /// Closest hit on the derived mesh, ignoring faces owned by the last
    /// `excluded_last_paths` paths.
    pub fn intersects_mesh(
        &self,
        ray: &PrimRay,
        excluded_last_paths: usize,
    ) -> Option<SketchMeshIntersection> {
        let excluded: HashSet<PathId> = self.last_paths(excluded_last_paths).into_iter().collect();
        let hit = self.mesh.intersects_ray_filtered(ray, |face| {
            self.face_owner(face)
                .is_none_or(|(path, _)| !excluded.contains(&path))
        })?;
        Some(SketchMeshIntersection {
            intersection: hit.intersection,
            mesh: self.id(),
        })
    }

    /// Closest hit on the spheres of any path but the last
    /// `excluded_last_paths` ones.
    pub fn intersects_path(
        &self,
        ray: &PrimRay,
        excluded_last_paths: usize,
    ) -> Option<SketchPathIntersection> {
        let considered = self.paths.len().saturating_sub(excluded_last_paths);
        let mut intersection = Intersection::new();
        let mut closest = None;

        for path in &self.paths[..considered] {
            for sphere in path.spheres() {
                if let Some(t) = ray_sphere(ray, sphere) {
                    let position = ray.point_at(t);
                    if intersection.update(t, position, sphere.normal_at(position)) {
                        closest = Some(path.id());
                    }
                }
            }
        }

        closest.map(|path| SketchPathIntersection {
            intersection,
            mesh: self.id(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SketchConfig;

    fn spaced_paths() -> SketchMesh {
        let config = SketchConfig {
            shell_subdivisions: 1,
            ..SketchConfig::default()
        };
        let mut sketch = SketchMesh::with_config(SketchMeshId(4), config);
        for x in [0.0, 1.0, 2.0, 3.0] {
            let p = Vec3::new(x, 0.0, 0.0);
            sketch.add_sphere(true, p, p, 0.2, None);
        }
        sketch
    }

    #[test]
    fn test_hits_along_line_are_ordered() {
        let sketch = spaced_paths();
        let ray = PrimRay::new(Vec3::new(-10.0, 0.01, 0.02), Vec3::X);

        let mut hit_paths = HashSet::new();
        let mut last_distance = 0.0;
        let mut order = Vec::new();
        while let Some(hit) = sketch.mesh().intersects_ray_filtered(&ray, |face| {
            sketch
                .face_owner(face)
                .is_some_and(|(path, _)| !hit_paths.contains(&path))
        }) {
            let (path, _) = sketch.face_owner(hit.face).unwrap();
            assert!(hit.distance() > last_distance);
            last_distance = hit.distance();
            hit_paths.insert(path);
            order.push(path);
        }
        assert_eq!(order, vec![PathId(0), PathId(1), PathId(2), PathId(3)]);
    }

    #[test]
    fn test_excluded_last_paths() {
        let sketch = spaced_paths();
        // From the far end the last path is hit first
        let ray = PrimRay::new(Vec3::new(10.0, 0.01, 0.02), -Vec3::X);

        let hit = sketch.intersects_mesh(&ray, 0).unwrap();
        assert!((hit.position().x - 3.2).abs() < 0.02);

        let hit = sketch.intersects_mesh(&ray, 2).unwrap();
        assert!((hit.position().x - 1.2).abs() < 0.02);
        assert_eq!(hit.mesh, SketchMeshId(4));

        assert!(sketch.intersects_mesh(&ray, 4).is_none());
    }

    #[test]
    fn test_path_intersection() {
        let sketch = spaced_paths();
        let ray = PrimRay::new(Vec3::new(10.0, 0.0, 0.0), -Vec3::X);

        let hit = sketch.intersects_path(&ray, 0).unwrap();
        assert_eq!(hit.path, PathId(3));
        assert!((hit.position() - Vec3::new(3.2, 0.0, 0.0)).length() < 1e-5);
        assert!((hit.normal() - Vec3::X).length() < 1e-5);

        let hit = sketch.intersects_path(&ray, 1).unwrap();
        assert_eq!(hit.path, PathId(2));
        assert!(sketch.intersects_path(&ray, 10).is_none());
    }

    #[test]
    fn test_miss() {
        let sketch = spaced_paths();
        let ray = PrimRay::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(sketch.intersects_mesh(&ray, 0).is_none());
        assert!(sketch.intersects_path(&ray, 0).is_none());
    }
}
