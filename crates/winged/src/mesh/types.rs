//! Type definitions for the winged-edge mesh data structure.

use glam::Vec3;

/// Identifier of a mesh within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MeshId(pub u32);

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

/// Type-safe edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

/// Type-safe face identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u32);

/// A vertex in the winged-edge mesh
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec3,
    /// Interpolated normal, written by `write_all_normals`
    pub normal: Vec3,
    /// One incident edge (arbitrary choice if multiple)
    pub edge: Option<EdgeId>,
    /// Number of live incident edges
    pub(crate) valence: u32,
}

/// Side of an edge a face lies on.
///
/// The left face traverses the edge from `vertex1` to `vertex2`, the right
/// face from `vertex2` to `vertex1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A winged edge
///
/// Besides its endpoints and adjacent faces, each edge stores the previous
/// and next edge of both adjacent face cycles, which makes local traversal
/// constant time.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub vertex1: VertexId,
    pub vertex2: VertexId,
    pub left_face: Option<FaceId>,
    pub right_face: Option<FaceId>,
    /// Edge before this one in the left face cycle (ends at `vertex1`)
    pub left_predecessor: Option<EdgeId>,
    /// Edge after this one in the left face cycle (starts at `vertex2`)
    pub left_successor: Option<EdgeId>,
    /// Edge before this one in the right face cycle (ends at `vertex2`)
    pub right_predecessor: Option<EdgeId>,
    /// Edge after this one in the right face cycle (starts at `vertex1`)
    pub right_successor: Option<EdgeId>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, vertex1: VertexId, vertex2: VertexId) -> Self {
        Self {
            id,
            vertex1,
            vertex2,
            left_face: None,
            right_face: None,
            left_predecessor: None,
            left_successor: None,
            right_predecessor: None,
            right_successor: None,
        }
    }

    pub fn side(&self, face: FaceId) -> Option<Side> {
        if self.left_face == Some(face) {
            Some(Side::Left)
        } else if self.right_face == Some(face) {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn face(&self, side: Side) -> Option<FaceId> {
        match side {
            Side::Left => self.left_face,
            Side::Right => self.right_face,
        }
    }

    /// The face on the opposite side of `face`, if any.
    pub fn other_face(&self, face: FaceId) -> Option<FaceId> {
        match self.side(face)? {
            Side::Left => self.right_face,
            Side::Right => self.left_face,
        }
    }

    pub fn predecessor(&self, side: Side) -> Option<EdgeId> {
        match side {
            Side::Left => self.left_predecessor,
            Side::Right => self.right_predecessor,
        }
    }

    pub fn successor(&self, side: Side) -> Option<EdgeId> {
        match side {
            Side::Left => self.left_successor,
            Side::Right => self.right_successor,
        }
    }

    /// First vertex when walking the edge along the cycle of `side`.
    pub fn first_vertex(&self, side: Side) -> VertexId {
        match side {
            Side::Left => self.vertex1,
            Side::Right => self.vertex2,
        }
    }

    /// Second vertex when walking the edge along the cycle of `side`.
    pub fn second_vertex(&self, side: Side) -> VertexId {
        match side {
            Side::Left => self.vertex2,
            Side::Right => self.vertex1,
        }
    }

    pub fn other_vertex(&self, vertex: VertexId) -> VertexId {
        if self.vertex1 == vertex {
            self.vertex2
        } else {
            self.vertex1
        }
    }

    pub fn is_incident(&self, vertex: VertexId) -> bool {
        self.vertex1 == vertex || self.vertex2 == vertex
    }

    /// Edge with a face on one side only
    pub fn is_boundary(&self) -> bool {
        self.left_face.is_some() != self.right_face.is_some()
    }

    pub fn has_faces(&self) -> bool {
        self.left_face.is_some() || self.right_face.is_some()
    }

    /// Set the face and its cycle neighbours on one side.
    pub(crate) fn set_side(
        &mut self,
        side: Side,
        face: Option<FaceId>,
        predecessor: Option<EdgeId>,
        successor: Option<EdgeId>,
    ) {
        match side {
            Side::Left => {
                self.left_face = face;
                self.left_predecessor = predecessor;
                self.left_successor = successor;
            }
            Side::Right => {
                self.right_face = face;
                self.right_predecessor = predecessor;
                self.right_successor = successor;
            }
        }
    }

    /// The four wing references.
    pub fn neighbours(&self) -> [Option<EdgeId>; 4] {
        [
            self.left_predecessor,
            self.left_successor,
            self.right_predecessor,
            self.right_successor,
        ]
    }

    /// Clear every wing reference that points at `edge`.
    pub(crate) fn unlink(&mut self, edge: EdgeId) {
        for wing in [
            &mut self.left_predecessor,
            &mut self.left_successor,
            &mut self.right_predecessor,
            &mut self.right_successor,
        ] {
            if *wing == Some(edge) {
                *wing = None;
            }
        }
    }
}

/// A triangular face in the mesh
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    /// One edge of this face's cycle
    pub edge: EdgeId,
    /// Cached face normal
    pub normal: Vec3,
}

/// Inconsistencies found by `WingedMesh::validate`
#[derive(Debug, thiserror::Error)]
pub enum WingedError {
    #[error("Edge {edge:?} references missing vertex {vertex:?}")]
    DanglingVertex { edge: EdgeId, vertex: VertexId },
    #[error("Edge {edge:?} references missing face {face:?}")]
    DanglingFace { edge: EdgeId, face: FaceId },
    #[error("Edge {edge:?} references missing neighbour edge {neighbour:?}")]
    DanglingEdge { edge: EdgeId, neighbour: EdgeId },
    #[error("Edge {0:?} has no adjacent face")]
    OrphanedEdge(EdgeId),
    #[error("Face {face:?} has a broken edge cycle: {reason}")]
    BrokenCycle { face: FaceId, reason: String },
    #[error("Vertex {vertex:?} has an invalid incident edge: {reason}")]
    BrokenVertex { vertex: VertexId, reason: String },
    #[error("Edge map out of sync: {0}")]
    EdgeMapDesync(String),
    #[error("Octree out of sync: {0}")]
    OctreeDesync(String),
}
