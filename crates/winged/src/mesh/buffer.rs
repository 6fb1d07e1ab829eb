//! Render buffer generation for WingedMesh.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::WingedMesh;
use super::types::VertexId;

/// Interleaved vertex layout handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct BufferVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Compacted vertex and index buffers of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<BufferVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl WingedMesh {
    /// Dense buffer index of each live vertex, in arena order.
    fn compact_vertex_indices(&self) -> HashMap<VertexId, u32> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i as u32))
            .collect()
    }

    /// Rewrite the index buffer from the live faces.
    ///
    /// Indices refer to vertices in compacted arena order, so freed slots
    /// never show up in the buffer.
    pub fn write_all_indices(&mut self) {
        let compact = self.compact_vertex_indices();
        let mut indices = Vec::with_capacity(self.faces.len() * 3);
        for face in self.face_ids() {
            for vertex in self.face_vertices(face) {
                indices.push(compact[&vertex]);
            }
        }
        self.indices = indices;
    }

    /// Recompute vertex normals as the area weighted mean of face normals.
    pub fn write_all_normals(&mut self) {
        let mut sums: HashMap<VertexId, Vec3> = HashMap::with_capacity(self.vertices.len());
        for face in self.face_ids() {
            // Cross product length is twice the area, which is the weight
            let weighted = self.face_triangle(face).cross();
            for vertex in self.face_vertices(face) {
                *sums.entry(vertex).or_insert(Vec3::ZERO) += weighted;
            }
        }
        for v in self.vertices.iter_mut() {
            v.normal = sums
                .get(&v.id)
                .map_or(Vec3::ZERO, |sum| sum.normalize_or_zero());
        }
    }

    /// Produce render buffers and mark the mesh clean.
    pub fn buffer_data(&mut self) -> MeshBuffers {
        self.write_all_normals();
        self.write_all_indices();
        let vertices = self
            .vertices
            .iter()
            .map(|v| BufferVertex {
                position: v.position.to_array(),
                normal: v.normal.to_array(),
            })
            .collect();
        self.dirty = false;
        MeshBuffers {
            vertices,
            indices: self.indices.clone(),
        }
    }
}
