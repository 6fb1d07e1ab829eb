//! Sphere shells: the icosphere geometry a single path sphere contributes.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use winged::{FaceId, PrimSphere, PrimTriangle, VertexId, WingedMesh};

/// Unit icosphere that shells are stamped from.
///
/// Tilted off the coordinate axes, so axis aligned picking rays do not run
/// through shell vertices.
#[derive(Debug, Clone)]
pub struct ShellTemplate {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl ShellTemplate {
    /// Icosahedron subdivided `subdivisions` times, projected onto the unit sphere.
    pub fn icosphere(subdivisions: u32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let mut positions: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        let mut triangles: Vec<[u32; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
                let key = if a < b { (a, b) } else { (b, a) };
                *midpoints.entry(key).or_insert_with(|| {
                    let p = (positions[a as usize] + positions[b as usize]).normalize();
                    positions.push(p);
                    (positions.len() - 1) as u32
                })
            };

            let mut refined = Vec::with_capacity(triangles.len() * 4);
            for [a, b, c] in triangles {
                let ab = midpoint(a, b, &mut positions);
                let bc = midpoint(b, c, &mut positions);
                let ca = midpoint(c, a, &mut positions);
                refined.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
            }
            triangles = refined;
        }

        let tilt = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 0.5);
        for p in positions.iter_mut() {
            *p = tilt * *p;
        }

        Self {
            positions,
            triangles,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    fn vertex_positions(&self, sphere: &PrimSphere) -> impl Iterator<Item = Vec3> + '_ {
        let (center, radius) = (sphere.center, sphere.radius);
        self.positions.iter().map(move |&p| center + p * radius)
    }

    /// Tessellate a shell for `sphere` into `mesh`.
    pub fn stamp(&self, mesh: &mut WingedMesh, sphere: &PrimSphere) -> Shell {
        let vertices: Vec<VertexId> = self
            .vertex_positions(sphere)
            .map(|p| mesh.add_vertex(p))
            .collect();
        let faces = self
            .triangles
            .iter()
            .map(|&[a, b, c]| {
                mesh.add_triangle(
                    vertices[a as usize],
                    vertices[b as usize],
                    vertices[c as usize],
                )
            })
            .collect();
        Shell { vertices, faces }
    }

    /// Snap an existing shell onto `sphere`.
    ///
    /// Returns the number of faces whose orientation flipped, which only
    /// happens for a degenerate sphere.
    pub fn realign(&self, mesh: &mut WingedMesh, shell: &Shell, sphere: &PrimSphere) -> usize {
        let moves: Vec<(FaceId, PrimTriangle)> = shell
            .faces
            .iter()
            .copied()
            .zip(self.triangles(sphere))
            .collect();
        mesh.realign_faces(&moves).len()
    }

    /// Triangles of the shell of `sphere`, in template face order.
    pub fn triangles(&self, sphere: &PrimSphere) -> Vec<PrimTriangle> {
        let positions: Vec<Vec3> = self.vertex_positions(sphere).collect();
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                PrimTriangle::new(
                    positions[a as usize],
                    positions[b as usize],
                    positions[c as usize],
                )
            })
            .collect()
    }
}

/// Mesh geometry owned by one path sphere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shell {
    pub vertices: Vec<VertexId>,
    pub faces: Vec<FaceId>,
}

impl Shell {
    /// Remove the shell's faces (and with them its edges and vertices) from `mesh`.
    pub fn delete(&self, mesh: &mut WingedMesh) {
        for &face in &self.faces {
            mesh.delete_face(face);
        }
    }
}
