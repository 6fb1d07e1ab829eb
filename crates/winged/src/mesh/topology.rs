//! Topology queries for WingedMesh.

use std::collections::{HashSet, VecDeque};

use glam::Vec3;

use super::types::{Edge, EdgeId, Face, FaceId, Side, Vertex, VertexId};
use super::{WingedMesh, edge_key};
use crate::primitive::{Aabb, PrimTriangle};

impl WingedMesh {
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0)
    }

    pub(crate) fn vertex_checked(&self, id: VertexId) -> &Vertex {
        match self.vertices.get(id.0) {
            Some(v) => v,
            None => panic!("vertex {id:?} is not alive"),
        }
    }

    pub(crate) fn vertex_mut_checked(&mut self, id: VertexId) -> &mut Vertex {
        match self.vertices.get_mut(id.0) {
            Some(v) => v,
            None => panic!("vertex {id:?} is not alive"),
        }
    }

    pub(crate) fn edge_checked(&self, id: EdgeId) -> &Edge {
        match self.edges.get(id.0) {
            Some(e) => e,
            None => panic!("edge {id:?} is not alive"),
        }
    }

    pub(crate) fn edge_mut_checked(&mut self, id: EdgeId) -> &mut Edge {
        match self.edges.get_mut(id.0) {
            Some(e) => e,
            None => panic!("edge {id:?} is not alive"),
        }
    }

    pub(crate) fn face_checked(&self, id: FaceId) -> &Face {
        match self.faces.get(id.0) {
            Some(f) => f,
            None => panic!("face {id:?} is not alive"),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Length of the index buffer last written by `write_all_indices`.
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// True if the mesh holds no vertices, edges or faces.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.iter()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().map(|v| v.id)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().map(|f| f.id)
    }

    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_map.get(&edge_key(a, b)).copied()
    }

    /// The three edges of a face in cycle order, starting at the face's
    /// reference edge, each with the side the face lies on.
    pub(crate) fn face_cycle(&self, face: FaceId) -> [(EdgeId, Side); 3] {
        let start = self.face_checked(face).edge;
        let mut cycle = [(start, Side::Left); 3];
        let mut current = start;
        for slot in cycle.iter_mut() {
            let edge = self.edge_checked(current);
            let Some(side) = edge.side(face) else {
                panic!("edge {current:?} is not adjacent to face {face:?}");
            };
            *slot = (current, side);
            current = match edge.successor(side) {
                Some(next) => next,
                None => panic!("edge {current:?} has no successor in face {face:?}"),
            };
        }
        cycle
    }

    pub fn face_edges(&self, face: FaceId) -> [EdgeId; 3] {
        self.face_cycle(face).map(|(edge, _)| edge)
    }

    /// Vertices of a face in winding order.
    pub fn face_vertices(&self, face: FaceId) -> [VertexId; 3] {
        self.face_cycle(face)
            .map(|(edge, side)| self.edge_checked(edge).first_vertex(side))
    }

    pub fn face_triangle(&self, face: FaceId) -> PrimTriangle {
        let [a, b, c] = self
            .face_vertices(face)
            .map(|v| self.vertex_checked(v).position);
        PrimTriangle::new(a, b, c)
    }

    /// Cached face normal, refreshed whenever the face is realigned.
    pub fn face_normal(&self, face: FaceId) -> Vec3 {
        self.face_checked(face).normal
    }

    pub fn vertex_position(&self, vertex: VertexId) -> Vec3 {
        self.vertex_checked(vertex).position
    }

    /// Every live edge with `vertex` as an endpoint, by edge map scan.
    pub(crate) fn incident_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_map
            .iter()
            .filter(move |((a, b), _)| *a == vertex || *b == vertex)
            .map(|(_, &id)| id)
    }

    /// Edges incident to a vertex.
    ///
    /// Walks from the vertex's reference edge across adjacent faces. If the
    /// faces around the vertex are split into separate fans the walk misses
    /// some edges, which the valence reveals; those vertices fall back to a
    /// scan of the edge map.
    pub fn vertex_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        let v = self.vertex_checked(vertex);
        let Some(start) = v.edge else {
            return Vec::new();
        };

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut result = Vec::new();
        while let Some(id) = queue.pop_front() {
            result.push(id);
            let edge = self.edge_checked(id);
            for side in [Side::Left, Side::Right] {
                if edge.face(side).is_none() {
                    continue;
                }
                // Exactly one of the cycle neighbours shares the vertex
                let neighbour = if edge.first_vertex(side) == vertex {
                    edge.predecessor(side)
                } else {
                    edge.successor(side)
                };
                if let Some(next) = neighbour
                    && seen.insert(next)
                {
                    queue.push_back(next);
                }
            }
        }
        if result.len() < v.valence as usize {
            result.extend(self.incident_edges(vertex).filter(|e| !seen.contains(e)));
        }
        result
    }

    /// Faces incident to a vertex, without duplicates.
    pub fn vertex_faces(&self, vertex: VertexId) -> Vec<FaceId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for id in self.vertex_edges(vertex) {
            let edge = self.edge_checked(id);
            for face in [edge.left_face, edge.right_face].into_iter().flatten() {
                if seen.insert(face) {
                    result.push(face);
                }
            }
        }
        result
    }

    /// Bounding box of all live vertices; empty if the mesh has none.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in self.vertices.iter() {
            aabb.include_point(v.position);
        }
        aabb
    }
}
