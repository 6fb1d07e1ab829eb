//! Ray and sphere queries against a WingedMesh.

use super::WingedMesh;
use super::types::FaceId;
use crate::intersection::{Intersection, WingedFaceIntersection, ray_triangle, sphere_triangle};
use crate::primitive::{PrimRay, PrimSphere};

impl WingedMesh {
    /// Closest face hit by the ray, if any.
    pub fn intersects_ray(&self, ray: &PrimRay) -> Option<WingedFaceIntersection> {
        self.intersects_ray_filtered(ray, |_| true)
    }

    /// Closest hit among faces accepted by `accept`.
    ///
    /// The reported normal is the cached face normal.
    pub fn intersects_ray_filtered(
        &self,
        ray: &PrimRay,
        mut accept: impl FnMut(FaceId) -> bool,
    ) -> Option<WingedFaceIntersection> {
        let mut intersection = Intersection::new();
        let mut closest = None;

        for face in self.octree.intersects_ray(ray) {
            if !accept(face) {
                continue;
            }
            let triangle = self.face_triangle(face);
            if let Some(hit) = ray_triangle(ray, &triangle)
                && intersection.update(hit.t, ray.point_at(hit.t), self.face_normal(face))
            {
                closest = Some(face);
            }
        }

        closest.map(|face| WingedFaceIntersection {
            intersection,
            mesh: self.id(),
            face,
        })
    }

    /// Faces touching the sphere, in ascending id order.
    pub fn intersects_sphere(&self, sphere: &PrimSphere) -> Vec<FaceId> {
        let mut faces: Vec<FaceId> = self
            .octree
            .intersects_sphere(sphere)
            .into_iter()
            .filter(|&face| sphere_triangle(sphere, &self.face_triangle(face)))
            .collect();
        faces.sort_unstable();
        faces
    }
}
