//! Winged-edge mesh geometry core for Trellis.
//!
//! This crate provides the geometry that sketch meshes are built on:
//! - Spatial primitives (rays, planes, spheres, triangles, boxes)
//! - Exact ray/shape and shape/shape intersection tests
//! - An octree indexing mesh faces for candidate queries
//! - An arena-backed winged-edge triangle mesh
//!
//! # Architecture
//!
//! Mesh entities (vertices, edges, faces) live in slot arenas addressed by
//! stable ids. Edges carry the four "wing" references to neighbouring edges,
//! so local topology walks never allocate. Every live face is also stored in
//! the mesh's octree; ray and sphere queries ask the octree for candidates
//! and run the exact tests from [`intersection`] on them.
//!
//! ## Failure model
//!
//! Queries never fail: "no hit" is `None` or an empty `Vec`. Structural
//! mutations assert their preconditions (live ids, manifold insertion) and
//! panic when a caller breaks them, since a desynchronised topology cannot
//! be repaired in place. [`WingedMesh::validate`] reports desync as
//! [`WingedError`] for tests and debug checks.

pub mod dimension;
pub mod intersection;
pub mod mesh;
pub mod octree;
pub mod primitive;

pub use dimension::Dimension;
pub use intersection::{Intersection, TriangleHit, WingedFaceIntersection};
pub use mesh::{
    BufferVertex, Edge, EdgeId, Face, FaceId, MeshBuffers, MeshId, Vertex, VertexId, WingedError,
    WingedMesh,
};
pub use octree::{Octree, OctreeConfig};
pub use primitive::{Aabb, PrimPlane, PrimRay, PrimSphere, PrimTriangle};

/// Epsilon for floating point comparisons in intersection tests
pub const EPSILON: f32 = 1e-6;
