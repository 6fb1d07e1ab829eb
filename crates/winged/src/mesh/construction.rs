//! Construction methods for WingedMesh.

use glam::Vec3;
use tracing::{debug, trace};

use super::types::{Edge, EdgeId, Face, FaceId, Side, Vertex, VertexId};
use super::{WingedMesh, edge_key};
use crate::primitive::PrimTriangle;

impl WingedMesh {
    /// Replace the octree root of an empty mesh.
    ///
    /// Use this before adding faces when the mesh is known to live far from
    /// the origin, to avoid repeated root growth.
    pub fn setup_octree_root(&mut self, center: Vec3, width: f32) {
        assert!(
            self.faces.is_empty(),
            "octree root can only be set up on a mesh without faces"
        );
        let config = self.octree.config().clone();
        self.octree = crate::octree::Octree::with_config(center, width, config);
    }

    pub fn add_vertex(&mut self, position: Vec3) -> VertexId {
        let index = self.vertices.insert_with(|index| Vertex {
            id: VertexId(index),
            position,
            normal: Vec3::ZERO,
            edge: None,
            valence: 0,
        });
        self.dirty = true;
        VertexId(index)
    }

    /// Add an edge between two live, distinct, not yet connected vertices.
    pub fn add_edge(&mut self, vertex1: VertexId, vertex2: VertexId) -> EdgeId {
        assert!(vertex1 != vertex2, "edge endpoints must differ: {vertex1:?}");
        assert!(
            self.vertices.contains(vertex1.0) && self.vertices.contains(vertex2.0),
            "edge endpoints must be live vertices: {vertex1:?}, {vertex2:?}"
        );
        let key = edge_key(vertex1, vertex2);
        assert!(
            !self.edge_map.contains_key(&key),
            "vertices {vertex1:?} and {vertex2:?} are already connected"
        );

        let index = self
            .edges
            .insert_with(|index| Edge::new(EdgeId(index), vertex1, vertex2));
        let id = EdgeId(index);
        self.edge_map.insert(key, id);

        for vertex in [vertex1, vertex2] {
            let v = self.vertex_mut_checked(vertex);
            v.valence += 1;
            if v.edge.is_none() {
                v.edge = Some(id);
            }
        }
        self.dirty = true;
        id
    }

    /// Store a face whose cycle contains `edge` and index it in the octree.
    ///
    /// The caller is responsible for linking the face into its edges.
    pub(crate) fn add_face(&mut self, edge: EdgeId, triangle: &PrimTriangle) -> FaceId {
        let normal = triangle.normal();
        let index = self.faces.insert_with(|index| Face {
            id: FaceId(index),
            edge,
            normal,
        });
        let id = FaceId(index);
        self.octree.insert(id, triangle);
        self.dirty = true;
        id
    }

    /// True if the directed edges `a -> b`, `b -> c`, `c -> a` all have a free side.
    pub fn can_add_triangle(&self, a: VertexId, b: VertexId, c: VertexId) -> bool {
        if a == b || b == c || c == a {
            return false;
        }
        if [a, b, c].iter().any(|v| !self.vertices.contains(v.0)) {
            return false;
        }
        [(a, b), (b, c), (c, a)].into_iter().all(|(from, to)| {
            match self.directed_edge(from, to) {
                Some((edge, side)) => self.edge_checked(edge).face(side).is_none(),
                None => true,
            }
        })
    }

    /// Add a triangle with counter-clockwise winding `a -> b -> c`.
    ///
    /// Missing edges are created. Panics if one of the directed edges already
    /// carries a face on that side, which would make the mesh non-manifold.
    pub fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> FaceId {
        // ===== PHASE 1: GATHER =====
        let directed = [(a, b), (b, c), (c, a)];
        let mut existing: [Option<(EdgeId, Side)>; 3] = [None; 3];
        for (slot, &(from, to)) in existing.iter_mut().zip(directed.iter()) {
            *slot = self.directed_edge(from, to);
            if let Some((edge, side)) = *slot {
                assert!(
                    self.edge_checked(edge).face(side).is_none(),
                    "edge {from:?} -> {to:?} already has a face on this side"
                );
            }
        }

        // ===== PHASE 2: CREATE EDGES AND FACE =====
        let mut edges = [(EdgeId(0), Side::Left); 3];
        for (i, &(from, to)) in directed.iter().enumerate() {
            edges[i] = match existing[i] {
                Some(found) => found,
                None => (self.add_edge(from, to), Side::Left),
            };
        }

        let triangle = PrimTriangle::new(
            self.vertex_checked(a).position,
            self.vertex_checked(b).position,
            self.vertex_checked(c).position,
        );
        let face = self.add_face(edges[0].0, &triangle);

        // ===== PHASE 3: LINK CYCLE =====
        for i in 0..3 {
            let (edge, side) = edges[i];
            let predecessor = edges[(i + 2) % 3].0;
            let successor = edges[(i + 1) % 3].0;
            self.edge_mut_checked(edge)
                .set_side(side, Some(face), Some(predecessor), Some(successor));
        }

        trace!(?face, ?a, ?b, ?c, "Added triangle");
        face
    }

    /// Add a batch of triangles over fresh vertices.
    ///
    /// Returns the created faces in input order.
    pub fn add_triangles(&mut self, positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<FaceId> {
        let vertices: Vec<VertexId> = positions.iter().map(|&p| self.add_vertex(p)).collect();
        let faces: Vec<FaceId> = triangles
            .iter()
            .map(|t| {
                self.add_triangle(
                    vertices[t[0] as usize],
                    vertices[t[1] as usize],
                    vertices[t[2] as usize],
                )
            })
            .collect();
        debug!(
            mesh = ?self.id(),
            vertices = vertices.len(),
            faces = faces.len(),
            "Added triangle batch"
        );
        faces
    }

    /// Edge between `from` and `to`, with the side on which it runs `from -> to`.
    pub(crate) fn directed_edge(&self, from: VertexId, to: VertexId) -> Option<(EdgeId, Side)> {
        let id = *self.edge_map.get(&edge_key(from, to))?;
        let edge = self.edges.get(id.0)?;
        let side = if edge.vertex1 == from {
            Side::Left
        } else {
            Side::Right
        };
        Some((id, side))
    }
}
