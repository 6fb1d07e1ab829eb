//! Geometric primitives used for picking and spatial indexing.

mod aabb;
mod plane;
mod ray;
mod sphere;
mod triangle;

pub use aabb::Aabb;
pub use plane::PrimPlane;
pub use ray::PrimRay;
pub use sphere::PrimSphere;
pub use triangle::PrimTriangle;
