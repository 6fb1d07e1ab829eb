//! Modification methods for WingedMesh.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tracing::{debug, trace, warn};

use super::types::{EdgeId, FaceId, VertexId};
use super::{DEFAULT_OCTREE_WIDTH, WingedMesh, edge_key};
use crate::dimension::Dimension;
use crate::octree::Octree;
use crate::primitive::PrimTriangle;
use crate::EPSILON;

/// Vertices closer than this to a mirror plane are snapped onto it.
const MIRROR_SNAP_DISTANCE: f32 = 1e-4;

impl WingedMesh {
    /// Delete a face.
    ///
    /// Edges left without any face are deleted as well, and vertices left
    /// without any edge are freed.
    pub fn delete_face(&mut self, face: FaceId) {
        // ===== PHASE 1: GATHER =====
        let cycle = self.face_cycle(face);
        let vertices = self.face_vertices(face);
        let candidates = vertices.map(|v| self.vertex_edges(v));

        // ===== PHASE 2: UNLINK FACE =====
        assert!(
            self.octree.remove(face),
            "face {face:?} is missing from the octree"
        );
        for (edge, side) in cycle {
            self.edge_mut_checked(edge).set_side(side, None, None, None);
        }
        self.faces.remove(face.0);

        for (edge, _) in cycle {
            if !self.edge_checked(edge).has_faces() {
                self.remove_edge_unchecked(edge);
            }
        }

        // ===== PHASE 3: RELINK OR FREE VERTICES =====
        // Liveness comes from the valence: after earlier deletions the
        // remaining faces around a vertex may form several separate fans
        for (vertex, candidates) in vertices.into_iter().zip(candidates) {
            let v = self.vertex_checked(vertex);
            if v.valence == 0 {
                self.vertices.remove(vertex.0);
                continue;
            }
            if v.edge.is_some_and(|e| self.edges.contains(e.0)) {
                continue;
            }
            let replacement = candidates
                .into_iter()
                .find(|e| self.edges.contains(e.0))
                .or_else(|| self.incident_edges(vertex).next());
            self.vertex_mut_checked(vertex).edge = replacement;
        }

        self.dirty = true;
        trace!(?face, "Deleted face");
    }

    /// Delete an edge that has no adjacent face.
    ///
    /// The endpoints stay alive even if they lose their last edge.
    pub fn delete_edge(&mut self, edge: EdgeId) {
        let (vertex1, vertex2) = {
            let e = self.edge_checked(edge);
            assert!(!e.has_faces(), "edge {edge:?} still has adjacent faces");
            (e.vertex1, e.vertex2)
        };
        self.remove_edge_unchecked(edge);

        for vertex in [vertex1, vertex2] {
            if self.vertex_checked(vertex).edge.is_some() {
                continue;
            }
            let replacement = self.incident_edges(vertex).next();
            self.vertex_mut_checked(vertex).edge = replacement;
        }
        self.dirty = true;
    }

    /// Drop an edge from the arena and edge map and unlink its wings.
    ///
    /// Endpoints referencing the edge lose their reference edge.
    fn remove_edge_unchecked(&mut self, edge: EdgeId) {
        let Some(removed) = self.edges.remove(edge.0) else {
            return;
        };
        for neighbour in removed.neighbours().into_iter().flatten() {
            if let Some(n) = self.edges.get_mut(neighbour.0) {
                n.unlink(edge);
            }
        }
        self.edge_map
            .remove(&edge_key(removed.vertex1, removed.vertex2));
        for vertex in [removed.vertex1, removed.vertex2] {
            if let Some(v) = self.vertices.get_mut(vertex.0) {
                v.valence -= 1;
                if v.edge == Some(edge) {
                    v.edge = None;
                }
            }
        }
    }

    /// Recompute a face's cached normal and octree entry from its vertices.
    pub(crate) fn refresh_face(&mut self, face: FaceId) {
        let triangle = self.face_triangle(face);
        if let Some(f) = self.faces.get_mut(face.0) {
            f.normal = triangle.normal();
        }
        self.octree.update(face, &triangle);
    }

    fn refresh_faces_around(&mut self, vertices: impl IntoIterator<Item = VertexId>) {
        let mut affected = HashSet::new();
        for vertex in vertices {
            affected.extend(self.vertex_faces(vertex));
        }
        for face in affected {
            self.refresh_face(face);
        }
        self.dirty = true;
    }

    /// Move a vertex and refresh every face around it.
    pub fn set_vertex(&mut self, vertex: VertexId, position: Vec3) {
        self.vertex_mut_checked(vertex).position = position;
        self.refresh_faces_around([vertex]);
    }

    /// Snap the vertices of `face` onto `triangle`, in winding order.
    ///
    /// Neighbouring faces sharing the moved vertices are refreshed too.
    /// Returns `true` if the face's orientation flipped.
    pub fn realign_face(&mut self, face: FaceId, triangle: &PrimTriangle) -> bool {
        let old_normal = self.face_normal(face);
        let vertices = self.face_vertices(face);
        for (vertex, position) in vertices.into_iter().zip(triangle.vertices()) {
            self.vertex_mut_checked(vertex).position = position;
        }
        self.refresh_faces_around(vertices);
        old_normal.dot(self.face_normal(face)) < 0.0
    }

    /// Batched [`WingedMesh::realign_face`]. Returns the faces that flipped.
    pub fn realign_faces(&mut self, faces: &[(FaceId, PrimTriangle)]) -> Vec<FaceId> {
        let old_normals: Vec<Vec3> = faces.iter().map(|(f, _)| self.face_normal(*f)).collect();
        let mut moved = Vec::with_capacity(faces.len() * 3);
        for (face, triangle) in faces {
            let vertices = self.face_vertices(*face);
            for (vertex, position) in vertices.into_iter().zip(triangle.vertices()) {
                self.vertex_mut_checked(vertex).position = position;
                moved.push(vertex);
            }
        }
        self.refresh_faces_around(moved);

        faces
            .iter()
            .zip(old_normals)
            .filter(|((face, _), old)| old.dot(self.face_normal(*face)) < 0.0)
            .map(|((face, _), _)| *face)
            .collect()
    }

    /// Rebuild the octree around the current geometry.
    fn rebuild_octree(&mut self) {
        let bounds = self.bounds();
        let (center, width) = if bounds.is_empty() {
            (Vec3::ZERO, DEFAULT_OCTREE_WIDTH)
        } else {
            (bounds.center(), (bounds.size().max_element() * 1.1).max(EPSILON))
        };
        let config = self.octree.config().clone();
        self.octree = Octree::with_config(center, width, config);

        let faces: Vec<FaceId> = self.face_ids().collect();
        for face in faces {
            let triangle = self.face_triangle(face);
            if let Some(f) = self.faces.get_mut(face.0) {
                f.normal = triangle.normal();
            }
            self.octree.insert(face, &triangle);
        }
        self.dirty = true;
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in self.vertices.iter_mut() {
            v.position += offset;
        }
        self.rebuild_octree();
    }

    /// Scale all vertices about the origin.
    pub fn scale(&mut self, factor: Vec3) {
        for v in self.vertices.iter_mut() {
            v.position *= factor;
        }
        self.rebuild_octree();
    }

    /// Center the mesh at the origin and scale its largest half extent to 1.
    ///
    /// Empty or degenerate (single point) meshes are left untouched.
    pub fn normalize(&mut self) {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return;
        }
        let half_extent = bounds.size().max_element() * 0.5;
        if half_extent < EPSILON {
            return;
        }
        let center = bounds.center();
        for v in self.vertices.iter_mut() {
            v.position = (v.position - center) / half_extent;
        }
        self.rebuild_octree();
        debug!(mesh = ?self.id(), ?center, half_extent, "Normalized mesh");
    }

    /// Make the mesh symmetric across the plane orthogonal to `dimension`.
    ///
    /// Faces on the negative side are deleted and replaced by mirrored
    /// copies of the positive side. Vertices on the plane are shared by
    /// both halves.
    pub fn mirror(&mut self, dimension: Dimension) {
        // ===== PHASE 1: DROP NEGATIVE HALF =====
        let negative: Vec<FaceId> = self
            .face_ids()
            .filter(|&f| dimension.coordinate(self.face_triangle(f).center()) < 0.0)
            .collect();
        for face in &negative {
            self.delete_face(*face);
        }

        // ===== PHASE 2: SNAP TO PLANE =====
        let mut on_plane = HashSet::new();
        for v in self.vertices.iter_mut() {
            if dimension.coordinate(v.position).abs() < MIRROR_SNAP_DISTANCE {
                v.position[dimension.index()] = 0.0;
                on_plane.insert(v.id);
            }
        }

        // ===== PHASE 3: DUPLICATE POSITIVE HALF =====
        let originals: Vec<[VertexId; 3]> =
            self.face_ids().map(|f| self.face_vertices(f)).collect();
        let mut mirrored: HashMap<VertexId, VertexId> = HashMap::new();
        let mut skipped = 0;
        for [a, b, c] in originals {
            if [a, b, c].iter().all(|v| on_plane.contains(v)) {
                continue;
            }
            let [ma, mb, mc] = [a, b, c].map(|v| {
                if on_plane.contains(&v) {
                    return v;
                }
                *mirrored.entry(v).or_insert_with(|| {
                    let position = dimension.mirror(self.vertex_checked(v).position);
                    self.add_vertex(position)
                })
            });
            // Reversed winding keeps the mirrored normals pointing outward
            if self.can_add_triangle(ma, mc, mb) {
                self.add_triangle(ma, mc, mb);
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!(
                mesh = ?self.id(),
                skipped, "mirror: skipped faces that would break manifoldness"
            );
        }

        self.rebuild_octree();
        debug!(
            mesh = ?self.id(),
            ?dimension,
            deleted = negative.len(),
            faces = self.num_faces(),
            "Mirrored mesh"
        );
    }

    /// Remove all geometry, keeping the mesh id and octree configuration.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.edge_map.clear();
        self.indices.clear();
        let config = self.octree.config().clone();
        self.octree = Octree::with_config(Vec3::ZERO, DEFAULT_OCTREE_WIDTH, config);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshId;
    use crate::primitive::{PrimRay, PrimSphere};

    /// Strip of two quads in the xy-plane spanning x in [-1, 1].
    fn strip() -> WingedMesh {
        let mut mesh = WingedMesh::new(MeshId(3));
        mesh.add_triangles(
            &[
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            &[[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4]],
        );
        mesh
    }

    #[test]
    fn test_delete_face_keeps_shared_edges() {
        let mut mesh = strip();
        let face = mesh.face_ids().next().unwrap();
        mesh.delete_face(face);

        assert_eq!(mesh.num_faces(), 3);
        // Only the edge not shared with another face disappears
        assert_eq!(mesh.num_edges(), 8);
        assert_eq!(mesh.num_vertices(), 6);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
    }

    #[test]
    fn test_delete_edge_without_faces() {
        let mut mesh = WingedMesh::new(MeshId(0));
        let a = mesh.add_vertex(Vec3::ZERO);
        let b = mesh.add_vertex(Vec3::X);
        let edge = mesh.add_edge(a, b);
        mesh.delete_edge(edge);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_vertices(), 2);
        assert!(mesh.find_edge(a, b).is_none());
        assert!(mesh.vertex(a).unwrap().edge.is_none());
    }

    #[test]
    #[should_panic(expected = "still has adjacent faces")]
    fn test_delete_edge_with_faces_panics() {
        let mut mesh = strip();
        let edge = mesh.find_edge(VertexId(0), VertexId(1)).unwrap();
        mesh.delete_edge(edge);
    }

    #[test]
    fn test_set_vertex_refreshes_queries() {
        let mut mesh = strip();
        mesh.set_vertex(VertexId(4), Vec3::new(0.0, 1.0, 2.0));
        let sphere = PrimSphere::new(Vec3::new(0.0, 1.0, 2.0), 0.1);
        assert_eq!(mesh.intersects_sphere(&sphere).len(), 3);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
    }

    #[test]
    fn test_normalize() {
        let mut mesh = strip();
        mesh.translate(Vec3::new(10.0, 5.0, 0.0));
        mesh.scale(Vec3::splat(3.0));
        mesh.normalize();

        let bounds = mesh.bounds();
        assert!(bounds.center().length() < 1e-4);
        assert!((bounds.size().max_element() - 2.0).abs() < 1e-4);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());

        let ray = PrimRay::new(Vec3::new(0.1, 0.1, 5.0), -Vec3::Z);
        assert!(mesh.intersects_ray(&ray).is_some());
    }

    #[test]
    fn test_normalize_empty_is_noop() {
        let mut mesh = WingedMesh::new(MeshId(0));
        mesh.normalize();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_mirror_rebuilds_negative_half() {
        let mut mesh = strip();
        // Break the symmetry on the negative side
        mesh.set_vertex(VertexId(3), Vec3::new(-3.0, 1.0, 0.0));
        mesh.mirror(Dimension::X);

        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.validate().is_ok(), "{:?}", mesh.validate());
        let bounds = mesh.bounds();
        assert!((bounds.min.x + 1.0).abs() < 1e-6);
        assert!((bounds.max.x - 1.0).abs() < 1e-6);

        // Mirrored faces keep facing the same way
        for face in mesh.faces() {
            assert!(face.normal.z > 0.0);
        }
    }

    #[test]
    fn test_reset() {
        let mut mesh = strip();
        mesh.reset();
        assert!(mesh.is_empty());
        assert!(mesh.octree().is_empty());
        assert_eq!(mesh.id(), MeshId(3));
    }
}
