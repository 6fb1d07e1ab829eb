//! Meshes being edited and their undo history.

use glam::Vec3;
use tracing::debug;
use winged::{Dimension, Intersection, MeshId, PrimRay, WingedMesh};

use sketching::{
    SketchConfig, SketchMesh, SketchMeshId, SketchMeshIntersection, SketchPathIntersection,
};

/// Maximum number of snapshots kept for undo
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 20;

/// All meshes of a document.
///
/// Undo history covers sketch meshes only: tools call
/// [`Scene::snapshot_sketch_meshes`] before an edit and [`Scene::undo`]
/// restores the snapshot.
#[derive(Debug, Clone)]
pub struct Scene {
    sketch_config: SketchConfig,
    sketch_meshes: Vec<SketchMesh>,
    winged_meshes: Vec<WingedMesh>,
    next_sketch_id: u32,
    next_winged_id: u32,
    undo_stack: Vec<Vec<SketchMesh>>,
    redo_stack: Vec<Vec<SketchMesh>>,
    max_undo_levels: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SketchConfig::default())
    }

    /// Scene whose new sketch meshes use `sketch_config`
    pub fn with_config(sketch_config: SketchConfig) -> Self {
        Self {
            sketch_config,
            sketch_meshes: Vec::new(),
            winged_meshes: Vec::new(),
            next_sketch_id: 0,
            next_winged_id: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
        }
    }

    pub fn set_max_undo_levels(&mut self, levels: usize) {
        self.max_undo_levels = levels;
        self.trim_history();
    }

    pub fn is_empty(&self) -> bool {
        self.sketch_meshes.is_empty() && self.winged_meshes.is_empty()
    }

    // ===== Sketch meshes =====

    /// New sketch mesh holding a single sphere.
    pub fn add_sketch_mesh(&mut self, center: Vec3, radius: f32) -> SketchMeshId {
        let id = SketchMeshId(self.next_sketch_id);
        self.next_sketch_id += 1;

        let mut mesh = SketchMesh::with_config(id, self.sketch_config.clone());
        mesh.add_sphere(true, center, center, radius, None);
        self.sketch_meshes.push(mesh);
        debug!(?id, ?center, radius, "Added sketch mesh");
        id
    }

    pub fn sketch_meshes(&self) -> &[SketchMesh] {
        &self.sketch_meshes
    }

    pub fn sketch_mesh(&self, id: SketchMeshId) -> Option<&SketchMesh> {
        self.sketch_meshes.iter().find(|m| m.id() == id)
    }

    pub fn sketch_mesh_mut(&mut self, id: SketchMeshId) -> Option<&mut SketchMesh> {
        self.sketch_meshes.iter_mut().find(|m| m.id() == id)
    }

    pub fn delete_sketch_mesh(&mut self, id: SketchMeshId) -> bool {
        let before = self.sketch_meshes.len();
        self.sketch_meshes.retain(|m| m.id() != id);
        before != self.sketch_meshes.len()
    }

    // ===== Winged meshes =====

    /// New winged mesh built from an indexed triangle list.
    pub fn add_winged_mesh(&mut self, positions: &[Vec3], triangles: &[[u32; 3]]) -> MeshId {
        let id = MeshId(self.next_winged_id);
        self.next_winged_id += 1;

        let mut mesh = WingedMesh::new(id);
        mesh.add_triangles(positions, triangles);
        self.winged_meshes.push(mesh);
        id
    }

    pub fn winged_meshes(&self) -> &[WingedMesh] {
        &self.winged_meshes
    }

    pub fn winged_mesh(&self, id: MeshId) -> Option<&WingedMesh> {
        self.winged_meshes.iter().find(|m| m.id() == id)
    }

    pub fn winged_mesh_mut(&mut self, id: MeshId) -> Option<&mut WingedMesh> {
        self.winged_meshes.iter_mut().find(|m| m.id() == id)
    }

    // ===== Queries =====

    /// Closest hit over all sketch meshes, ignoring the last
    /// `excluded_last_paths` paths of each.
    pub fn intersects_sketch_mesh(
        &self,
        ray: &PrimRay,
        excluded_last_paths: usize,
    ) -> Option<SketchMeshIntersection> {
        self.sketch_meshes
            .iter()
            .filter_map(|m| m.intersects_mesh(ray, excluded_last_paths))
            .min_by(|a, b| a.distance().total_cmp(&b.distance()))
    }

    /// Closest hit on the raw path spheres over all sketch meshes.
    pub fn intersects_sketch_path(
        &self,
        ray: &PrimRay,
        excluded_last_paths: usize,
    ) -> Option<SketchPathIntersection> {
        self.sketch_meshes
            .iter()
            .filter_map(|m| m.intersects_path(ray, excluded_last_paths))
            .min_by(|a, b| a.distance().total_cmp(&b.distance()))
    }

    /// Closest hit on any mesh of the scene.
    pub fn intersects(&self, ray: &PrimRay) -> Option<Intersection> {
        let mut intersection = Intersection::new();
        for hit in self.sketch_meshes.iter().filter_map(|m| m.intersects_mesh(ray, 0)) {
            intersection.update(hit.distance(), hit.position(), hit.normal());
        }
        for hit in self.winged_meshes.iter().filter_map(|m| m.intersects_ray(ray)) {
            intersection.update(hit.distance(), hit.position(), hit.normal());
        }
        intersection.is_intersection().then_some(intersection)
    }

    // ===== Mirroring =====

    pub fn mirror_winged_meshes(&mut self, dimension: Dimension) {
        for mesh in &mut self.winged_meshes {
            mesh.mirror(dimension);
        }
    }

    pub fn mirror_sketch_meshes(&mut self, dimension: Dimension) {
        for mesh in &mut self.sketch_meshes {
            mesh.mirror(dimension);
        }
    }

    // ===== History =====

    /// Record the current sketch meshes so the next edit can be undone.
    pub fn snapshot_sketch_meshes(&mut self) {
        self.undo_stack.push(self.sketch_meshes.clone());
        self.redo_stack.clear();
        self.trim_history();
        debug!("Snapshot sketch meshes ({} undo levels)", self.undo_stack.len());
    }

    fn trim_history(&mut self) {
        while self.undo_stack.len() > self.max_undo_levels {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Restore the last snapshot.
    ///
    /// Returns true if an undo was performed, false if no undo available
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            debug!("Undo: no snapshots available");
            return false;
        };
        let current = std::mem::replace(&mut self.sketch_meshes, snapshot);
        self.redo_stack.push(current);
        debug!("Undo: restored {} sketch meshes", self.sketch_meshes.len());
        true
    }

    /// Reapply the last undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            debug!("Redo: no snapshots available");
            return false;
        };
        let current = std::mem::replace(&mut self.sketch_meshes, snapshot);
        self.undo_stack.push(current);
        debug!("Redo: restored {} sketch meshes", self.sketch_meshes.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SketchConfig {
        SketchConfig {
            shell_subdivisions: 1,
            ..SketchConfig::default()
        }
    }

    #[test]
    fn test_add_sketch_mesh() {
        let mut scene = Scene::with_config(small_config());
        assert!(scene.is_empty());

        let a = scene.add_sketch_mesh(Vec3::ZERO, 0.5);
        let b = scene.add_sketch_mesh(Vec3::new(3.0, 0.0, 0.0), 0.5);
        assert_ne!(a, b);
        assert_eq!(scene.sketch_meshes().len(), 2);

        let mesh = scene.sketch_mesh(a).unwrap();
        assert_eq!(mesh.paths().len(), 1);
        assert_eq!(mesh.paths()[0].len(), 1);
        assert!(mesh.mesh().validate().is_ok());

        assert!(scene.delete_sketch_mesh(a));
        assert!(!scene.delete_sketch_mesh(a));
        assert!(scene.sketch_mesh(a).is_none());
    }

    #[test]
    fn test_closest_mesh_wins() {
        let mut scene = Scene::with_config(small_config());
        let near = scene.add_sketch_mesh(Vec3::new(0.0, 0.0, 2.0), 0.5);
        let _far = scene.add_sketch_mesh(Vec3::ZERO, 0.5);

        let ray = PrimRay::new(Vec3::new(0.01, 0.02, 10.0), Vec3::NEG_Z);
        let hit = scene.intersects_sketch_mesh(&ray, 0).unwrap();
        assert_eq!(hit.mesh, near);
        assert!(hit.position().z > 2.3);

        let hit = scene.intersects_sketch_path(&ray, 0).unwrap();
        assert_eq!(hit.mesh, near);

        // Excluding the only path of each mesh leaves nothing to hit
        assert!(scene.intersects_sketch_mesh(&ray, 1).is_none());
        assert!(scene.intersects_sketch_path(&ray, 1).is_none());
    }

    #[test]
    fn test_intersects_any_mesh() {
        let mut scene = Scene::with_config(small_config());
        scene.add_sketch_mesh(Vec3::ZERO, 0.5);
        scene.add_winged_mesh(
            &[
                Vec3::new(-1.0, -1.0, 3.0),
                Vec3::new(1.0, -1.0, 3.0),
                Vec3::new(0.0, 1.0, 3.0),
            ],
            &[[0, 1, 2]],
        );

        let ray = PrimRay::new(Vec3::new(0.01, 0.02, 10.0), Vec3::NEG_Z);
        let hit = scene.intersects(&ray).unwrap();
        assert!((hit.position().z - 3.0).abs() < 1e-5);

        let below = PrimRay::new(Vec3::new(0.01, 0.02, -10.0), Vec3::Z);
        let hit = scene.intersects(&below).unwrap();
        assert!(hit.position().z < -0.3);

        let miss = PrimRay::new(Vec3::new(5.0, 5.0, 10.0), Vec3::NEG_Z);
        assert!(scene.intersects(&miss).is_none());
    }

    #[test]
    fn test_undo_redo() {
        let mut scene = Scene::with_config(small_config());
        let id = scene.add_sketch_mesh(Vec3::ZERO, 0.5);
        assert!(!scene.undo());

        scene.snapshot_sketch_meshes();
        let p = Vec3::new(0.0, 0.0, 0.5);
        scene
            .sketch_mesh_mut(id)
            .unwrap()
            .add_sphere(true, p, p, 0.1, None);
        assert_eq!(scene.sketch_mesh(id).unwrap().paths().len(), 2);

        assert!(scene.undo());
        assert_eq!(scene.sketch_mesh(id).unwrap().paths().len(), 1);
        assert!(scene.can_redo());

        assert!(scene.redo());
        assert_eq!(scene.sketch_mesh(id).unwrap().paths().len(), 2);
        assert!(!scene.redo());

        // A new snapshot drops the redo branch
        assert!(scene.undo());
        scene.snapshot_sketch_meshes();
        assert!(!scene.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut scene = Scene::with_config(small_config());
        scene.set_max_undo_levels(3);
        for _ in 0..5 {
            scene.snapshot_sketch_meshes();
        }
        assert_eq!(scene.undo_count(), 3);
        scene.set_max_undo_levels(1);
        assert_eq!(scene.undo_count(), 1);
    }

    #[test]
    fn test_mirror_winged_meshes() {
        let mut scene = Scene::new();
        let id = scene.add_winged_mesh(
            &[
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        );
        scene.mirror_winged_meshes(Dimension::X);

        let mesh = scene.winged_mesh(id).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.validate().is_ok());
        assert!(mesh.vertices().any(|v| v.position == Vec3::new(-2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_mirror_sketch_meshes() {
        let mut scene = Scene::with_config(small_config());
        let id = scene.add_sketch_mesh(Vec3::new(1.0, 0.0, 0.0), 0.3);
        scene.mirror_sketch_meshes(Dimension::X);

        let mesh = scene.sketch_mesh(id).unwrap();
        assert_eq!(mesh.paths().len(), 2);
        assert_eq!(
            mesh.paths()[1].centers(),
            vec![Vec3::new(-1.0, 0.0, 0.0)]
        );
    }
}
