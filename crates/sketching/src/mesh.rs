//! Sketch mesh: paths of spheres and the winged mesh derived from them.

use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, trace};
use winged::{Dimension, FaceId, MeshBuffers, MeshId, PrimSphere, WingedMesh};

use crate::path::{PathSphere, SketchPath, fill_spheres, mirror_sphere};
use crate::shell::ShellTemplate;
use crate::types::{PathId, SketchConfig, SketchMeshId};

/// Paths of spheres and the union of their shells.
///
/// Cloning produces an independent deep copy, which is how scenes snapshot
/// meshes before an edit.
#[derive(Debug, Clone)]
pub struct SketchMesh {
    id: SketchMeshId,
    config: SketchConfig,
    pub(crate) template: ShellTemplate,
    pub(crate) paths: Vec<SketchPath>,
    /// Path and sphere index owning each face of `mesh`
    pub(crate) face_owner: HashMap<FaceId, (PathId, usize)>,
    pub(crate) mesh: WingedMesh,
    active: Option<PathId>,
    next_path: u32,
}

impl SketchMesh {
    pub fn new(id: SketchMeshId) -> Self {
        Self::with_config(id, SketchConfig::default())
    }

    pub fn with_config(id: SketchMeshId, config: SketchConfig) -> Self {
        let mesh = WingedMesh::with_octree(
            MeshId(id.0),
            Vec3::ZERO,
            winged::mesh::DEFAULT_OCTREE_WIDTH,
            config.octree.clone(),
        );
        Self {
            id,
            template: ShellTemplate::icosphere(config.shell_subdivisions),
            config,
            paths: Vec::new(),
            face_owner: HashMap::new(),
            mesh,
            active: None,
            next_path: 0,
        }
    }

    pub fn id(&self) -> SketchMeshId {
        self.id
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// The derived winged mesh.
    pub fn mesh(&self) -> &WingedMesh {
        &self.mesh
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.mesh.is_empty()
    }

    pub fn num_faces(&self) -> usize {
        self.mesh.num_faces()
    }

    pub fn paths(&self) -> &[SketchPath] {
        &self.paths
    }

    pub fn path(&self, id: PathId) -> Option<&SketchPath> {
        self.paths.iter().find(|p| p.id() == id)
    }

    /// Path that non-first `add_sphere` calls append to.
    pub fn active_path(&self) -> Option<PathId> {
        self.active
    }

    /// Path and sphere index that contributed `face`.
    pub fn face_owner(&self, face: FaceId) -> Option<(PathId, usize)> {
        self.face_owner.get(&face).copied()
    }

    /// Ids of the `count` most recently started paths.
    pub fn last_paths(&self, count: usize) -> Vec<PathId> {
        self.paths.iter().rev().take(count).map(|p| p.id()).collect()
    }

    pub(crate) fn path_index(&self, id: PathId) -> Option<usize> {
        self.paths.iter().position(|p| p.id() == id)
    }

    fn start_path(&mut self) -> PathId {
        let id = PathId(self.next_path);
        self.next_path += 1;
        self.paths.push(SketchPath::new(id));
        id
    }

    /// Append a sphere to a path and tessellate its shell.
    fn push_sphere(&mut self, path: PathId, sphere: PrimSphere) {
        let Some(index) = self.path_index(path) else {
            panic!("path {path:?} does not belong to sketch mesh {:?}", self.id);
        };
        let shell = self.template.stamp(&mut self.mesh, &sphere);
        let position = self.paths[index].spheres.len();
        for &face in &shell.faces {
            self.face_owner.insert(face, (path, position));
        }
        self.paths[index].spheres.push(PathSphere { sphere, shell });
    }

    /// Append `sphere` to `path`, filling gaps wider than the step width, and
    /// replay the same on the mirror partner.
    fn extend_path(&mut self, path: PathId, sphere: PrimSphere, mirror: Option<Dimension>) {
        let step = sphere.radius * self.config.step_factor;
        let previous = self
            .path(path)
            .and_then(|p| p.last_sphere().copied());

        let mut spheres = match previous {
            Some(previous) => fill_spheres(&previous, &sphere, step),
            None => Vec::new(),
        };
        spheres.push(sphere);

        let partner = mirror.zip(self.path(path).and_then(|p| p.mirror()));
        for s in spheres {
            self.push_sphere(path, s);
            if let Some((dimension, partner)) = partner {
                self.push_sphere(partner, mirror_sphere(&s, dimension));
            }
        }
    }

    /// Add a sphere to the sketch.
    ///
    /// With `is_first` a new path is started (plus a mirror partner when
    /// `mirror` is set). If `hit_position` is farther than `radius` from
    /// `sphere_position`, spheres are laid from the hit point first, so the
    /// new path stays attached to the surface it grew from. Otherwise the
    /// sphere is appended to the active path. Gaps wider than
    /// `radius * step_factor` are filled with interpolated spheres.
    ///
    /// A non-positive radius is ignored.
    pub fn add_sphere(
        &mut self,
        is_first: bool,
        hit_position: Vec3,
        sphere_position: Vec3,
        radius: f32,
        mirror: Option<Dimension>,
    ) {
        if radius <= 0.0 {
            trace!(radius, "add_sphere: ignoring degenerate radius");
            return;
        }

        let path = match self.active {
            Some(active) if !is_first && self.path_index(active).is_some() => active,
            _ => {
                let path = self.start_path();
                if let Some(dimension) = mirror {
                    let partner = self.start_path();
                    let [a, b] = [path, partner].map(|id| self.path_index(id));
                    if let (Some(a), Some(b)) = (a, b) {
                        self.paths[a].mirror = Some(partner);
                        self.paths[b].mirror = Some(path);
                    }
                    debug!(?path, ?partner, ?dimension, "Started mirrored sketch path");
                } else {
                    debug!(?path, "Started sketch path");
                }
                self.active = Some(path);

                if hit_position.distance(sphere_position) > radius {
                    self.extend_path(path, PrimSphere::new(hit_position, radius), mirror);
                }
                path
            }
        };

        self.extend_path(path, PrimSphere::new(sphere_position, radius), mirror);
        trace!(
            mesh = ?self.id,
            ?path,
            faces = self.mesh.num_faces(),
            "Added sphere"
        );
    }

    /// Give every path without a partner a mirrored copy across `dimension`.
    pub fn mirror(&mut self, dimension: Dimension) {
        let unpaired: Vec<PathId> = self
            .paths
            .iter()
            .filter(|p| p.mirror().is_none())
            .map(|p| p.id())
            .collect();

        for path in &unpaired {
            let spheres: Vec<PrimSphere> = self
                .path(*path)
                .map(|p| p.spheres().copied().collect())
                .unwrap_or_default();
            let partner = self.start_path();
            for sphere in &spheres {
                self.push_sphere(partner, mirror_sphere(sphere, dimension));
            }
            if let Some(a) = self.path_index(*path) {
                self.paths[a].mirror = Some(partner);
            }
            if let Some(b) = self.path_index(partner) {
                self.paths[b].mirror = Some(*path);
            }
        }
        debug!(mesh = ?self.id, ?dimension, mirrored = unpaired.len(), "Mirrored sketch paths");
    }

    /// Remove a path and the shells of its spheres from the mesh.
    ///
    /// With `with_partner` the mirror partner is removed as well; otherwise
    /// the partner stays and loses its pairing. Returns `false` for an
    /// unknown path.
    pub fn delete_path(&mut self, path: PathId, with_partner: bool) -> bool {
        let Some(index) = self.path_index(path) else {
            return false;
        };
        let removed = self.paths.remove(index);
        for entry in &removed.spheres {
            for face in &entry.shell.faces {
                self.face_owner.remove(face);
            }
            entry.shell.delete(&mut self.mesh);
        }
        if self.active == Some(path) {
            self.active = None;
        }

        if let Some(partner) = removed.mirror() {
            if with_partner {
                self.delete_path(partner, false);
            } else if let Some(i) = self.path_index(partner) {
                self.paths[i].mirror = None;
            }
        }
        debug!(
            mesh = ?self.id,
            ?path,
            spheres = removed.len(),
            faces = self.mesh.num_faces(),
            "Deleted sketch path"
        );
        true
    }

    /// Render buffers of the derived mesh.
    pub fn buffer_data(&mut self) -> MeshBuffers {
        self.mesh.buffer_data()
    }

    pub fn is_dirty(&self) -> bool {
        self.mesh.is_dirty()
    }
}
