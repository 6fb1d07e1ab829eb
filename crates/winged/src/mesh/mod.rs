//! Winged-edge mesh data structure
//!
//! Vertices, edges and faces are stored in arenas and reference each other
//! by id. Every live face is also indexed by the mesh's [`Octree`], which
//! the ray and sphere queries use for candidate generation.

mod arena;
mod buffer;
mod construction;
mod modification;
mod query;
mod topology;
mod types;
mod validation;

use std::collections::HashMap;

use arena::Arena;
use glam::Vec3;

use crate::octree::{Octree, OctreeConfig};

pub use buffer::{BufferVertex, MeshBuffers};
pub use types::{Edge, EdgeId, Face, FaceId, MeshId, Side, Vertex, VertexId, WingedError};

/// Edge length of the octree root of a freshly created mesh
pub const DEFAULT_OCTREE_WIDTH: f32 = 4.0;

/// Winged-edge triangle mesh
#[derive(Debug, Clone)]
pub struct WingedMesh {
    id: MeshId,
    pub(crate) vertices: Arena<Vertex>,
    pub(crate) edges: Arena<Edge>,
    pub(crate) faces: Arena<Face>,
    /// Map from unordered vertex pair (smaller id first) to edge
    pub(crate) edge_map: HashMap<(VertexId, VertexId), EdgeId>,
    /// Render index buffer, rewritten by `write_all_indices`
    pub(crate) indices: Vec<u32>,
    pub(crate) octree: Octree,
    /// Set by every mutation, cleared when render buffers are produced
    pub(crate) dirty: bool,
}

impl WingedMesh {
    /// Create an empty mesh with a default octree root around the origin.
    pub fn new(id: MeshId) -> Self {
        Self::with_octree(id, Vec3::ZERO, DEFAULT_OCTREE_WIDTH, OctreeConfig::default())
    }

    /// Create an empty mesh with an explicit octree root and configuration.
    pub fn with_octree(id: MeshId, center: Vec3, width: f32, config: OctreeConfig) -> Self {
        Self {
            id,
            vertices: Arena::default(),
            edges: Arena::default(),
            faces: Arena::default(),
            edge_map: HashMap::new(),
            indices: Vec::new(),
            octree: Octree::with_config(center, width, config),
            dirty: false,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    /// True if render buffers are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

pub(crate) fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{PrimRay, PrimSphere, PrimTriangle};

    /// Closed tetrahedron with outward facing normals.
    pub(crate) fn tetrahedron() -> (WingedMesh, [FaceId; 4]) {
        let mut mesh = WingedMesh::new(MeshId(1));
        let a = mesh.add_vertex(Vec3::new(1.0, 1.0, 1.0));
        let b = mesh.add_vertex(Vec3::new(1.0, -1.0, -1.0));
        let c = mesh.add_vertex(Vec3::new(-1.0, 1.0, -1.0));
        let d = mesh.add_vertex(Vec3::new(-1.0, -1.0, 1.0));

        let faces = [
            mesh.add_triangle(a, b, c),
            mesh.add_triangle(a, d, b),
            mesh.add_triangle(a, c, d),
            mesh.add_triangle(b, d, c),
        ];
        (mesh, faces)
    }

    #[test]
    fn test_tetrahedron_is_valid() {
        let (mesh, faces) = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());

        // Normals point away from the centroid
        for face in faces {
            let triangle = mesh.face_triangle(face);
            assert!(mesh.face_normal(face).dot(triangle.center()) > 0.0);
        }
        assert!(mesh.edges().all(|e| !e.is_boundary()));
    }

    #[test]
    fn test_vertex_faces_fan() {
        let (mesh, _) = tetrahedron();
        for vertex in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_faces(vertex).len(), 3);
            assert_eq!(mesh.vertex_edges(vertex).len(), 3);
        }
    }

    #[test]
    fn test_empty_on_construction() {
        let mesh = WingedMesh::new(MeshId(0));
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.intersects_ray(&PrimRay::new(Vec3::Z, -Vec3::Z)).is_none());
    }

    #[test]
    fn test_ray_reports_closest_face() {
        let (mesh, _) = tetrahedron();
        let ray = PrimRay::new(Vec3::new(0.1, 0.2, -10.0), Vec3::Z);
        let hit = mesh.intersects_ray(&ray).unwrap();

        // Enters through the face on x + y - z = 1 and leaves through the far side
        assert!((hit.position().z + 0.7).abs() < 1e-4);
        assert!((hit.distance() - 9.3).abs() < 1e-4);
        assert!(hit.normal().z < 0.0);
        assert_eq!(hit.mesh, MeshId(1));
    }

    #[test]
    fn test_delete_all_faces_any_order() {
        let orders: [[usize; 4]; 3] = [[0, 1, 2, 3], [3, 1, 0, 2], [2, 3, 1, 0]];
        for order in orders {
            let (mut mesh, faces) = tetrahedron();
            for (n, &i) in order.iter().enumerate() {
                mesh.delete_face(faces[i]);
                assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
                assert_eq!(mesh.num_faces(), 3 - n);
            }
            assert_eq!(mesh.num_faces(), 0);
            assert!(mesh.is_empty());
            assert!(mesh.octree().is_empty());

            let ray = PrimRay::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
            assert!(mesh.intersects_ray(&ray).is_none());
            assert!(mesh.intersects_sphere(&PrimSphere::new(Vec3::ZERO, 10.0)).is_empty());
        }
    }

    /// Octahedron with unit vertices; every vertex has valence 4
    fn octahedron() -> (WingedMesh, Vec<FaceId>) {
        let mut mesh = WingedMesh::new(MeshId(2));
        let positions = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let triangles = [
            [0, 2, 4],
            [1, 4, 2],
            [0, 4, 3],
            [1, 3, 4],
            [0, 5, 2],
            [1, 2, 5],
            [0, 3, 5],
            [1, 5, 3],
        ];
        let faces = mesh.add_triangles(&positions, &triangles);
        (mesh, faces)
    }

    #[test]
    fn test_octahedron_delete_all_faces_any_order() {
        let orders: [[usize; 8]; 4] = [
            [0, 2, 1, 3, 4, 5, 6, 7],
            [7, 6, 5, 4, 3, 2, 1, 0],
            [0, 6, 2, 4, 1, 7, 3, 5],
            [5, 0, 7, 2, 4, 1, 6, 3],
        ];
        for order in orders {
            let (mut mesh, faces) = octahedron();
            assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
            for (n, &i) in order.iter().enumerate() {
                mesh.delete_face(faces[i]);
                assert!(
                    mesh.validate().is_ok(),
                    "order {order:?}, step {n}: {:?}",
                    mesh.validate()
                );
                assert_eq!(mesh.num_faces(), 7 - n);
            }
            assert!(mesh.is_empty());
            assert_eq!(mesh.num_vertices(), 0);
            assert_eq!(mesh.num_edges(), 0);
            assert!(mesh.octree().is_empty());
        }
    }

    #[test]
    fn test_split_fan_keeps_all_incident_faces() {
        let (mut mesh, faces) = octahedron();
        // Removing two opposite faces at +X leaves it with two fans that
        // only touch at the vertex
        mesh.delete_face(faces[0]);
        mesh.delete_face(faces[6]);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());

        let px = VertexId(0);
        assert_eq!(mesh.vertex_edges(px).len(), 4);
        let mut around = mesh.vertex_faces(px);
        around.sort();
        assert_eq!(around, vec![faces[2], faces[4]]);

        // Moving the vertex refreshes the faces of both fans
        mesh.set_vertex(px, Vec3::new(2.0, 0.0, 0.0));
        for face in [faces[2], faces[4]] {
            let expected = mesh.face_triangle(face).normal();
            assert!((mesh.face_normal(face) - expected).length() < 1e-6);
        }
        let hits = mesh.intersects_sphere(&PrimSphere::new(Vec3::new(2.0, 0.0, 0.0), 0.1));
        assert_eq!(hits.len(), 2);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
    }

    #[test]
    fn test_deleted_slots_are_reused() {
        let (mut mesh, faces) = tetrahedron();
        mesh.delete_face(faces[0]);
        let verts: Vec<_> = mesh.vertex_ids().collect();
        let face = mesh.add_triangle(verts[0], verts[1], verts[2]);
        assert_eq!(face, faces[0]);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
    }

    #[test]
    fn test_realign_face_updates_octree() {
        let (mut mesh, faces) = tetrahedron();
        let face = faces[0];
        let old = mesh.face_triangle(face);
        let moved = PrimTriangle::new(old.v1 * 1.5, old.v2 * 1.5, old.v3 * 1.5);

        let flipped = mesh.realign_face(face, &moved);
        assert!(!flipped);
        assert_eq!(mesh.face_triangle(face), moved);

        let around_new = PrimSphere::new(moved.center(), moved.max_dimension_extent());
        assert!(mesh.intersects_sphere(&around_new).contains(&face));
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
    }

    #[test]
    fn test_realign_face_reports_flip() {
        let (mut mesh, faces) = tetrahedron();
        let face = faces[0];
        let old = mesh.face_triangle(face);
        assert!(mesh.realign_face(face, &old.flipped()));
        assert!(mesh.face_normal(face).dot(old.normal()) < 0.0);
    }

    #[test]
    #[should_panic(expected = "already has a face")]
    fn test_third_face_on_edge_side_panics() {
        let (mut mesh, _) = tetrahedron();
        let verts: Vec<_> = mesh.vertex_ids().collect();
        // a -> b -> c already exists
        mesh.add_triangle(verts[0], verts[1], verts[2]);
    }

    #[test]
    #[should_panic]
    fn test_dead_face_lookup_panics() {
        let (mut mesh, faces) = tetrahedron();
        mesh.delete_face(faces[1]);
        mesh.delete_face(faces[1]);
    }
}
