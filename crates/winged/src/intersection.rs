//! Exact intersection tests between primitives.
//!
//! Ray tests return the hit distance `t` along the (normalized) ray; callers
//! combine several candidate hits through [`Intersection::update`], which
//! keeps the closest one. Degenerate input (parallel rays, zero radii,
//! zero-area triangles) is reported as "no hit" rather than as an error.

use glam::Vec3;

use crate::EPSILON;
use crate::mesh::{FaceId, MeshId};
use crate::primitive::{Aabb, PrimPlane, PrimRay, PrimSphere, PrimTriangle};

/// Closest hit collected so far during a query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intersection {
    hit: Option<Hit>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    distance: f32,
    position: Vec3,
    normal: Vec3,
}

impl Intersection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit if it is closer than the current one.
    ///
    /// Returns `true` if the hit replaced the stored one.
    pub fn update(&mut self, distance: f32, position: Vec3, normal: Vec3) -> bool {
        let closer = self.hit.is_none_or(|hit| distance < hit.distance);
        if closer {
            self.hit = Some(Hit {
                distance,
                position,
                normal,
            });
        }
        closer
    }

    pub fn is_intersection(&self) -> bool {
        self.hit.is_some()
    }

    pub fn reset(&mut self) {
        self.hit = None;
    }

    /// Distance along the ray; `f32::MAX` if nothing was hit.
    pub fn distance(&self) -> f32 {
        self.hit.map_or(f32::MAX, |hit| hit.distance)
    }

    pub fn position(&self) -> Vec3 {
        self.hit.map_or(Vec3::ZERO, |hit| hit.position)
    }

    pub fn normal(&self) -> Vec3 {
        self.hit.map_or(Vec3::ZERO, |hit| hit.normal)
    }
}

/// Closest hit on a face of a winged mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingedFaceIntersection {
    pub intersection: Intersection,
    pub mesh: MeshId,
    pub face: FaceId,
}

impl WingedFaceIntersection {
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

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 2)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 3)
    pub v: f32,
}

/// Ray-plane intersection: `t = dot(p0 - o, n) / dot(d, n)`.
///
/// `None` if the ray is parallel to the plane or the plane lies behind it.
pub fn ray_plane(ray: &PrimRay, plane: &PrimPlane) -> Option<f32> {
    let denom = ray.direction().dot(plane.normal());
    if denom.abs() < EPSILON {
        return None;
    }
    let t = (plane.point() - ray.origin()).dot(plane.normal()) / denom;
    (t >= 0.0).then_some(t)
}

/// Ray-sphere intersection returning the nearest non-negative root.
///
/// A ray starting inside the sphere reports the exit point.
pub fn ray_sphere(ray: &PrimRay, sphere: &PrimSphere) -> Option<f32> {
    if sphere.is_degenerated() {
        return None;
    }

    let oc = ray.origin() - sphere.center;
    let b = oc.dot(ray.direction());
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t0 = -b - root;
    let t1 = -b + root;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both windings are hit; only hits in front of the ray origin count.
pub fn ray_triangle(ray: &PrimRay, triangle: &PrimTriangle) -> Option<TriangleHit> {
    let ray_origin = ray.origin();
    let ray_dir = ray.direction();

    // Edge vectors
    let edge1 = triangle.v2 - triangle.v1;
    let edge2 = triangle.v3 - triangle.v1;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray lies in the plane of the triangle, or the triangle is degenerate
    if det.abs() < EPSILON * EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - triangle.v1;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Slab test. Returns the entry distance (0 if the origin is inside).
pub fn ray_aabb(ray: &PrimRay, aabb: &Aabb) -> Option<f32> {
    let origin = ray.origin();
    let dir = ray.direction();
    let mut t_min = 0.0_f32;
    let mut t_max = f32::MAX;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if d.abs() < EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

pub fn sphere_aabb(sphere: &PrimSphere, aabb: &Aabb) -> bool {
    aabb.intersects_sphere(sphere.center, sphere.radius)
}

/// True if the sphere touches the triangle (closest point within radius).
pub fn sphere_triangle(sphere: &PrimSphere, triangle: &PrimTriangle) -> bool {
    if sphere.is_degenerated() {
        return false;
    }
    sphere.contains(triangle.closest_point(sphere.center))
}

/// True if the two spheres overlap or touch.
pub fn sphere_sphere(a: &PrimSphere, b: &PrimSphere) -> bool {
    let r = a.radius + b.radius;
    a.center.distance_squared(b.center) <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_triangle() -> PrimTriangle {
        PrimTriangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }

    #[test]
    fn test_ray_triangle_hit() {
        let ray = PrimRay::new(Vec3::new(0.25, 0.25, 1.0), -Vec3::Z);
        let hit = ray_triangle(&ray, &xy_triangle()).unwrap();
        assert!((hit.t - 1.0).abs() < EPSILON);
        assert!((hit.u - 0.25).abs() < EPSILON);
        assert!((hit.v - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let ray = PrimRay::new(Vec3::new(2.0, 2.0, 1.0), -Vec3::Z);
        assert!(ray_triangle(&ray, &xy_triangle()).is_none());
    }

    #[test]
    fn test_ray_triangle_behind() {
        let ray = PrimRay::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z);
        assert!(ray_triangle(&ray, &xy_triangle()).is_none());
    }

    #[test]
    fn test_ray_triangle_degenerate() {
        let t = PrimTriangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        let ray = PrimRay::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z);
        assert!(ray_triangle(&ray, &t).is_none());
    }

    #[test]
    fn test_ray_plane() {
        let plane = PrimPlane::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        let ray = PrimRay::new(Vec3::ZERO, Vec3::Z);
        assert!((ray_plane(&ray, &plane).unwrap() - 5.0).abs() < EPSILON);

        // Parallel
        let ray = PrimRay::new(Vec3::ZERO, Vec3::X);
        assert!(ray_plane(&ray, &plane).is_none());

        // Plane behind the ray
        let ray = PrimRay::new(Vec3::ZERO, -Vec3::Z);
        assert!(ray_plane(&ray, &plane).is_none());
    }

    #[test]
    fn test_ray_sphere_nearest_root() {
        let sphere = PrimSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let ray = PrimRay::new(Vec3::ZERO, Vec3::Z);
        assert!((ray_sphere(&ray, &sphere).unwrap() - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_sphere_from_inside_reports_exit() {
        let sphere = PrimSphere::new(Vec3::ZERO, 1.0);
        let ray = PrimRay::new(Vec3::ZERO, Vec3::Y);
        assert!((ray_sphere(&ray, &sphere).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_sphere_matches_closest_approach() {
        // Hit iff the closest approach of the ray to the center is within the radius
        let sphere = PrimSphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        for i in 0..40 {
            let offset = i as f32 * 0.05 + 0.013;
            for dir in [Vec3::Z, -Vec3::Z] {
                let ray = PrimRay::new(Vec3::new(offset, 0.0, 0.0), dir);
                let expected = ray.distance(sphere.center) <= sphere.radius;
                assert_eq!(ray_sphere(&ray, &sphere).is_some(), expected, "offset {offset}");
                if let Some(t) = ray_sphere(&ray, &sphere) {
                    assert!(t >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_ray_sphere_degenerate_radius() {
        let sphere = PrimSphere::new(Vec3::new(0.0, 0.0, 5.0), 0.0);
        let ray = PrimRay::new(Vec3::ZERO, Vec3::Z);
        assert!(ray_sphere(&ray, &sphere).is_none());
    }

    #[test]
    fn test_ray_aabb() {
        let aabb = Aabb::cube(Vec3::new(0.0, 0.0, 5.0), 2.0);
        let ray = PrimRay::new(Vec3::ZERO, Vec3::Z);
        assert!((ray_aabb(&ray, &aabb).unwrap() - 4.0).abs() < 1e-6);

        let ray = PrimRay::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Z);
        assert!(ray_aabb(&ray, &aabb).is_none());

        let ray = PrimRay::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        assert_eq!(ray_aabb(&ray, &aabb), Some(0.0));
    }

    #[test]
    fn test_sphere_triangle() {
        let t = xy_triangle();
        assert!(sphere_triangle(&PrimSphere::new(Vec3::new(0.2, 0.2, 0.5), 0.6), &t));
        assert!(!sphere_triangle(&PrimSphere::new(Vec3::new(0.2, 0.2, 0.5), 0.4), &t));
    }

    #[test]
    fn test_sphere_sphere() {
        let a = PrimSphere::new(Vec3::ZERO, 1.0);
        assert!(sphere_sphere(&a, &PrimSphere::new(Vec3::new(1.5, 0.0, 0.0), 0.5)));
        assert!(sphere_sphere(&a, &PrimSphere::new(Vec3::new(0.2, 0.0, 0.0), 0.1)));
        assert!(!sphere_sphere(&a, &PrimSphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5)));
    }

    #[test]
    fn test_intersection_keeps_closest() {
        let mut intersection = Intersection::new();
        assert!(!intersection.is_intersection());
        assert!(intersection.update(5.0, Vec3::X, Vec3::Y));
        assert!(!intersection.update(7.0, Vec3::Z, Vec3::Y));
        assert!(intersection.update(2.0, Vec3::Z, Vec3::X));
        assert_eq!(intersection.distance(), 2.0);
        assert_eq!(intersection.position(), Vec3::Z);
        assert_eq!(intersection.normal(), Vec3::X);
    }
}
