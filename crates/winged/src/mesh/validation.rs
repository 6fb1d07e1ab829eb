//! Validation methods for WingedMesh.
//!
//! Checks that the arenas, the wing references, the edge map and the octree
//! all describe the same mesh. Intended for tests and debug assertions.

use std::collections::{HashMap, HashSet};

use super::types::{EdgeId, FaceId, VertexId, WingedError};
use super::{WingedMesh, edge_key};

impl WingedMesh {
    /// Check every structural invariant of the mesh.
    ///
    /// Validates that:
    /// 1. Edges reference live vertices, faces and neighbour edges, and have at least one face
    /// 2. The edge map holds exactly the live edges
    /// 3. Every face cycle closes after three consistently linked edges
    /// 4. Every vertex reference edge is live and incident, and the valence matches
    /// 5. The octree holds exactly the live faces
    pub fn validate(&self) -> Result<(), WingedError> {
        self.validate_edges()?;
        self.validate_edge_map()?;
        for face in self.faces.iter() {
            self.validate_cycle(face.id)?;
        }
        self.validate_vertices()?;
        self.validate_octree()
    }

    fn validate_edges(&self) -> Result<(), WingedError> {
        for edge in self.edges.iter() {
            for vertex in [edge.vertex1, edge.vertex2] {
                if !self.vertices.contains(vertex.0) {
                    return Err(WingedError::DanglingVertex {
                        edge: edge.id,
                        vertex,
                    });
                }
            }
            for face in [edge.left_face, edge.right_face].into_iter().flatten() {
                if !self.faces.contains(face.0) {
                    return Err(WingedError::DanglingFace {
                        edge: edge.id,
                        face,
                    });
                }
            }
            for neighbour in edge.neighbours().into_iter().flatten() {
                if !self.edges.contains(neighbour.0) {
                    return Err(WingedError::DanglingEdge {
                        edge: edge.id,
                        neighbour,
                    });
                }
            }
            if !edge.has_faces() {
                return Err(WingedError::OrphanedEdge(edge.id));
            }
        }
        Ok(())
    }

    fn validate_edge_map(&self) -> Result<(), WingedError> {
        if self.edge_map.len() != self.edges.len() {
            return Err(WingedError::EdgeMapDesync(format!(
                "{} entries for {} edges",
                self.edge_map.len(),
                self.edges.len()
            )));
        }
        for edge in self.edges.iter() {
            let key = edge_key(edge.vertex1, edge.vertex2);
            if self.edge_map.get(&key) != Some(&edge.id) {
                return Err(WingedError::EdgeMapDesync(format!(
                    "edge {:?} is mapped as {:?}",
                    edge.id,
                    self.edge_map.get(&key)
                )));
            }
        }
        Ok(())
    }

    fn validate_cycle(&self, face: FaceId) -> Result<(), WingedError> {
        let broken = |reason: String| WingedError::BrokenCycle { face, reason };

        let start = self
            .faces
            .get(face.0)
            .map(|f| f.edge)
            .ok_or_else(|| broken("missing face".into()))?;
        let mut current: EdgeId = start;
        let mut visited = Vec::with_capacity(3);

        for _ in 0..3 {
            let edge = self
                .edges
                .get(current.0)
                .ok_or_else(|| broken(format!("missing edge {current:?}")))?;
            let side = edge
                .side(face)
                .ok_or_else(|| broken(format!("edge {current:?} is not adjacent")))?;
            let next_id = edge
                .successor(side)
                .ok_or_else(|| broken(format!("edge {current:?} has no successor")))?;
            let next = self
                .edges
                .get(next_id.0)
                .ok_or_else(|| broken(format!("missing successor {next_id:?}")))?;
            let next_side = next
                .side(face)
                .ok_or_else(|| broken(format!("successor {next_id:?} is not adjacent")))?;

            if next.predecessor(next_side) != Some(current) {
                return Err(broken(format!(
                    "predecessor of {next_id:?} is {:?}, expected {current:?}",
                    next.predecessor(next_side)
                )));
            }
            if edge.second_vertex(side) != next.first_vertex(next_side) {
                return Err(broken(format!(
                    "edges {current:?} and {next_id:?} do not share a vertex"
                )));
            }

            visited.push(current);
            current = next_id;
        }

        if current != start {
            return Err(broken("cycle does not close after three edges".into()));
        }
        let distinct: HashSet<EdgeId> = visited.iter().copied().collect();
        if distinct.len() != 3 {
            return Err(broken("cycle visits an edge twice".into()));
        }
        Ok(())
    }

    fn validate_vertices(&self) -> Result<(), WingedError> {
        let mut valence: HashMap<VertexId, u32> = HashMap::new();
        for e in self.edges.iter() {
            *valence.entry(e.vertex1).or_default() += 1;
            *valence.entry(e.vertex2).or_default() += 1;
        }

        for vertex in self.vertices.iter() {
            let broken = |reason: String| WingedError::BrokenVertex {
                vertex: vertex.id,
                reason,
            };
            match vertex.edge {
                Some(id) => {
                    let edge = self
                        .edges
                        .get(id.0)
                        .ok_or_else(|| broken(format!("edge {id:?} is not alive")))?;
                    if !edge.is_incident(vertex.id) {
                        return Err(broken(format!("edge {id:?} is not incident")));
                    }
                }
                None if valence.contains_key(&vertex.id) => {
                    return Err(broken("has incident edges but no reference edge".into()));
                }
                None => {}
            }
            let counted = valence.get(&vertex.id).copied().unwrap_or(0);
            if vertex.valence != counted {
                return Err(broken(format!(
                    "valence {} but {counted} incident edges",
                    vertex.valence
                )));
            }
        }
        Ok(())
    }

    fn validate_octree(&self) -> Result<(), WingedError> {
        let stored = self.octree.stored_items();
        if self.octree.len() != self.faces.len() || stored != self.faces.len() {
            return Err(WingedError::OctreeDesync(format!(
                "{} located and {} stored entries for {} faces",
                self.octree.len(),
                stored,
                self.faces.len()
            )));
        }
        for face in self.faces.iter() {
            if !self.octree.contains(face.id) {
                return Err(WingedError::OctreeDesync(format!(
                    "face {:?} is not indexed",
                    face.id
                )));
            }
        }
        Ok(())
    }
}
