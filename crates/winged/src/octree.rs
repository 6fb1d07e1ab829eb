//! Octree index over mesh faces.
//!
//! Faces are stored by bounding box at the deepest node that fully contains
//! them; faces straddling an octant boundary stay at the internal node. A
//! node splits lazily once it holds more than
//! [`OctreeConfig::max_items_per_node`] faces. Removal never merges nodes
//! back, so a tree that lost many faces may be sparse.
//!
//! Queries return candidate supersets: the caller runs exact tests on the
//! returned faces.

use std::collections::HashMap;

use glam::Vec3;
use tracing::{trace, warn};

use crate::intersection::{ray_aabb, sphere_aabb};
use crate::mesh::FaceId;
use crate::primitive::{Aabb, PrimRay, PrimSphere, PrimTriangle};

/// Maximum number of times the root may double to reach a far away face.
const MAX_ROOT_GROWTH: usize = 32;

/// Configuration for octree construction.
#[derive(Debug, Clone)]
pub struct OctreeConfig {
    /// Maximum depth of the octree.
    pub max_depth: u32,
    /// Maximum items per node before splitting.
    pub max_items_per_node: usize,
    /// Minimum node size (prevents infinite subdivision).
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_items_per_node: 16,
            min_node_size: 0.01,
        }
    }
}

/// An item stored in the octree: face ID and padded bounding box.
#[derive(Debug, Clone, Copy)]
struct OctreeItem {
    face: FaceId,
    bounds: Aabb,
}

/// A node in the octree (either internal or leaf).
#[derive(Debug, Clone)]
enum OctreeNode {
    /// Leaf node containing items.
    Leaf { bounds: Aabb, items: Vec<OctreeItem> },
    /// Internal node with 8 lazily created children and the items that
    /// fit in none of them.
    Internal {
        bounds: Aabb,
        items: Vec<OctreeItem>,
        children: Box<[Option<OctreeNode>; 8]>,
    },
}

impl OctreeNode {
    fn leaf(bounds: Aabb) -> Self {
        OctreeNode::Leaf {
            bounds,
            items: Vec::new(),
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            OctreeNode::Leaf { bounds, .. } | OctreeNode::Internal { bounds, .. } => *bounds,
        }
    }
}

/// Spatial index from face bounding boxes to face IDs.
#[derive(Debug, Clone)]
pub struct Octree {
    root: OctreeNode,
    config: OctreeConfig,
    /// Bounds each face was inserted with, used to find it again on removal.
    locations: HashMap<FaceId, Aabb>,
}

impl Octree {
    /// Create an empty octree whose root is a cube around `center`.
    pub fn new(center: Vec3, width: f32) -> Self {
        Self::with_config(center, width, OctreeConfig::default())
    }

    /// Create an empty octree with custom configuration.
    pub fn with_config(center: Vec3, width: f32, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::leaf(Aabb::cube(center, width.max(config.min_node_size))),
            config,
            locations: HashMap::new(),
        }
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn root_bounds(&self) -> Aabb {
        self.root.bounds()
    }

    /// Number of faces in the octree.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, face: FaceId) -> bool {
        self.locations.contains_key(&face)
    }

    /// Remove all faces, keeping the current root bounds.
    pub fn clear(&mut self) {
        self.root = OctreeNode::leaf(self.root.bounds());
        self.locations.clear();
    }

    /// Bounding box stored for a face, padded so that flat or axis-aligned
    /// triangles are still hit by the box tests.
    fn item_bounds(triangle: &PrimTriangle) -> Aabb {
        let aabb = triangle.aabb();
        let pad = Vec3::splat(1e-5 + aabb.size().max_element() * 1e-4);
        Aabb::new(aabb.min - pad, aabb.max + pad)
    }

    /// Insert a face with the given geometry.
    ///
    /// Inserting a face that is already present replaces its entry.
    pub fn insert(&mut self, face: FaceId, triangle: &PrimTriangle) {
        if self.locations.contains_key(&face) {
            self.remove(face);
        }

        let item = OctreeItem {
            face,
            bounds: Self::item_bounds(triangle),
        };
        self.grow_to_contain(&item.bounds);
        self.locations.insert(face, item.bounds);

        let config = self.config.clone();
        Self::insert_into_node(&mut self.root, item, 0, &config);
    }

    /// Re-insert a face whose geometry changed.
    pub fn update(&mut self, face: FaceId, triangle: &PrimTriangle) {
        self.remove(face);
        self.insert(face, triangle);
    }

    /// Double the root toward `bounds` until it is contained.
    fn grow_to_contain(&mut self, bounds: &Aabb) {
        let mut steps = 0;
        while !self.root.bounds().contains_aabb(bounds) {
            if steps == MAX_ROOT_GROWTH {
                warn!(
                    "octree: face bounds {:?} out of reach of root {:?}",
                    bounds,
                    self.root.bounds()
                );
                return;
            }
            steps += 1;

            let old = self.root.bounds();
            let width = old.size();
            let target = bounds.center();
            let mut min = old.min;
            let mut max = old.max;
            for axis in 0..3 {
                if target[axis] < old.center()[axis] {
                    min[axis] -= width[axis];
                } else {
                    max[axis] += width[axis];
                }
            }
            let grown = Aabb::new(min, max);
            let octant = grown.octant_for_point(old.center());

            let old_root = std::mem::replace(&mut self.root, OctreeNode::leaf(grown));
            let mut children: Box<[Option<OctreeNode>; 8]> = Box::new(Default::default());
            children[octant] = Some(old_root);
            self.root = OctreeNode::Internal {
                bounds: grown,
                items: Vec::new(),
                children,
            };
            trace!("octree: grew root to {:?}", grown);
        }
    }

    fn insert_into_node(node: &mut OctreeNode, item: OctreeItem, depth: u32, config: &OctreeConfig) {
        match node {
            OctreeNode::Leaf { bounds, items } => {
                items.push(item);

                // Check if we need to split
                if items.len() > config.max_items_per_node
                    && depth < config.max_depth
                    && bounds.size().min_element() > config.min_node_size * 2.0
                {
                    // Convert to internal node
                    let old_items = std::mem::take(items);
                    let old_bounds = *bounds;

                    *node = OctreeNode::Internal {
                        bounds: old_bounds,
                        items: Vec::new(),
                        children: Box::new(Default::default()),
                    };

                    // Re-insert all items
                    for item in old_items {
                        Self::insert_into_node(node, item, depth, config);
                    }
                }
            }
            OctreeNode::Internal {
                bounds,
                items,
                children,
            } => match bounds.octant_containing(&item.bounds) {
                Some(octant) => {
                    let child = children[octant]
                        .get_or_insert_with(|| OctreeNode::leaf(bounds.octant_bounds(octant)));
                    Self::insert_into_node(child, item, depth + 1, config);
                }
                None => items.push(item),
            },
        }
    }

    /// Remove a face. Returns `false` if the face was not in the octree.
    pub fn remove(&mut self, face: FaceId) -> bool {
        let Some(bounds) = self.locations.remove(&face) else {
            return false;
        };

        if Self::remove_from_node(&mut self.root, face, &bounds) {
            return true;
        }

        // The directed descent can miss an entry whose node bounds drifted
        // through root growth; fall back to a full search.
        warn!("octree: directed removal of {:?} failed, searching all nodes", face);
        Self::remove_anywhere(&mut self.root, face)
    }

    fn remove_from_node(node: &mut OctreeNode, face: FaceId, item_bounds: &Aabb) -> bool {
        match node {
            OctreeNode::Leaf { items, .. } => Self::remove_item(items, face),
            OctreeNode::Internal {
                bounds,
                items,
                children,
            } => {
                if let Some(octant) = bounds.octant_containing(item_bounds) {
                    if let Some(child) = &mut children[octant] {
                        if Self::remove_from_node(child, face, item_bounds) {
                            return true;
                        }
                    }
                }
                Self::remove_item(items, face)
            }
        }
    }

    fn remove_anywhere(node: &mut OctreeNode, face: FaceId) -> bool {
        match node {
            OctreeNode::Leaf { items, .. } => Self::remove_item(items, face),
            OctreeNode::Internal {
                items, children, ..
            } => {
                Self::remove_item(items, face)
                    || children
                        .iter_mut()
                        .flatten()
                        .any(|child| Self::remove_anywhere(child, face))
            }
        }
    }

    fn remove_item(items: &mut Vec<OctreeItem>, face: FaceId) -> bool {
        if let Some(idx) = items.iter().position(|item| item.face == face) {
            items.swap_remove(idx);
            true
        } else {
            false
        }
    }

    /// Faces whose bounding boxes the ray passes through.
    pub fn intersects_ray(&self, ray: &PrimRay) -> Vec<FaceId> {
        let mut results = Vec::new();
        Self::query_ray_node(&self.root, ray, &mut results);
        results
    }

    fn query_ray_node(node: &OctreeNode, ray: &PrimRay, results: &mut Vec<FaceId>) {
        if ray_aabb(ray, &node.bounds()).is_none() {
            return;
        }

        let (items, children) = match node {
            OctreeNode::Leaf { items, .. } => (items, None),
            OctreeNode::Internal {
                items, children, ..
            } => (items, Some(children)),
        };

        results.extend(
            items
                .iter()
                .filter(|item| ray_aabb(ray, &item.bounds).is_some())
                .map(|item| item.face),
        );

        for child in children.into_iter().flat_map(|c| c.iter().flatten()) {
            Self::query_ray_node(child, ray, results);
        }
    }

    /// Faces whose bounding boxes overlap the sphere.
    pub fn intersects_sphere(&self, sphere: &PrimSphere) -> Vec<FaceId> {
        let mut results = Vec::new();
        if !sphere.is_degenerated() {
            Self::query_sphere_node(&self.root, sphere, &mut results);
        }
        results
    }

    fn query_sphere_node(node: &OctreeNode, sphere: &PrimSphere, results: &mut Vec<FaceId>) {
        if !sphere_aabb(sphere, &node.bounds()) {
            return;
        }

        let (items, children) = match node {
            OctreeNode::Leaf { items, .. } => (items, None),
            OctreeNode::Internal {
                items, children, ..
            } => (items, Some(children)),
        };

        results.extend(
            items
                .iter()
                .filter(|item| sphere_aabb(sphere, &item.bounds))
                .map(|item| item.face),
        );

        for child in children.into_iter().flat_map(|c| c.iter().flatten()) {
            Self::query_sphere_node(child, sphere, results);
        }
    }

    /// Number of nodes (leaves and internal) currently allocated.
    pub fn node_count(&self) -> usize {
        fn count(node: &OctreeNode) -> usize {
            match node {
                OctreeNode::Leaf { .. } => 1,
                OctreeNode::Internal { children, .. } => {
                    1 + children.iter().flatten().map(count).sum::<usize>()
                }
            }
        }
        count(&self.root)
    }

    /// Number of face entries reachable from the root.
    ///
    /// Equals [`Octree::len`] unless the tree is out of sync with its
    /// location map.
    pub fn stored_items(&self) -> usize {
        fn count(node: &OctreeNode) -> usize {
            match node {
                OctreeNode::Leaf { items, .. } => items.len(),
                OctreeNode::Internal {
                    items, children, ..
                } => items.len() + children.iter().flatten().map(count).sum::<usize>(),
            }
        }
        count(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_triangle(at: Vec3) -> PrimTriangle {
        PrimTriangle::new(at, at + Vec3::X * 0.1, at + Vec3::Y * 0.1)
    }

    #[test]
    fn test_octree_insert_and_query_sphere() {
        let mut octree = Octree::new(Vec3::splat(5.0), 10.0);

        octree.insert(FaceId(0), &small_triangle(Vec3::new(1.0, 1.0, 1.0)));
        octree.insert(FaceId(1), &small_triangle(Vec3::new(2.0, 2.0, 2.0)));
        octree.insert(FaceId(2), &small_triangle(Vec3::new(8.0, 8.0, 8.0)));

        assert_eq!(octree.len(), 3);

        let results = octree.intersects_sphere(&PrimSphere::new(Vec3::splat(1.5), 1.5));
        assert!(results.contains(&FaceId(0)));
        assert!(results.contains(&FaceId(1)));
        assert!(!results.contains(&FaceId(2)));
    }

    #[test]
    fn test_octree_ray_candidates() {
        let mut octree = Octree::new(Vec3::ZERO, 10.0);
        octree.insert(FaceId(0), &small_triangle(Vec3::new(0.0, 0.0, 2.0)));
        octree.insert(FaceId(1), &small_triangle(Vec3::new(3.0, 3.0, 2.0)));

        let ray = PrimRay::new(Vec3::new(0.01, 0.01, -4.0), Vec3::Z);
        let results = octree.intersects_ray(&ray);
        assert_eq!(results, vec![FaceId(0)]);
    }

    #[test]
    fn test_octree_splits_when_full() {
        let mut octree = Octree::new(Vec3::ZERO, 8.0);
        for i in 0..64 {
            let x = (i % 4) as f32 - 1.5;
            let y = ((i / 4) % 4) as f32 - 1.5;
            let z = (i / 16) as f32 - 1.5;
            octree.insert(FaceId(i), &small_triangle(Vec3::new(x, y, z)));
        }
        assert_eq!(octree.len(), 64);
        assert_eq!(octree.stored_items(), 64);
        assert!(octree.node_count() > 1);
    }

    #[test]
    fn test_octree_remove() {
        let mut octree = Octree::new(Vec3::splat(5.0), 10.0);
        octree.insert(FaceId(0), &small_triangle(Vec3::new(1.0, 1.0, 1.0)));
        octree.insert(FaceId(1), &small_triangle(Vec3::new(2.0, 2.0, 2.0)));

        assert!(octree.remove(FaceId(0)));
        assert!(!octree.remove(FaceId(0)));
        assert_eq!(octree.len(), 1);

        let results = octree.intersects_sphere(&PrimSphere::new(Vec3::splat(1.5), 2.0));
        assert!(!results.contains(&FaceId(0)));
        assert!(results.contains(&FaceId(1)));
    }

    #[test]
    fn test_removed_faces_never_returned() {
        let mut octree = Octree::new(Vec3::ZERO, 4.0);
        for i in 0..100 {
            let t = i as f32 * 0.03 - 1.5;
            octree.insert(FaceId(i), &small_triangle(Vec3::new(t, t * 0.5, -t)));
        }
        for i in (0..100).step_by(2) {
            assert!(octree.remove(FaceId(i)));
        }

        let everything = PrimSphere::new(Vec3::ZERO, 100.0);
        let results = octree.intersects_sphere(&everything);
        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|f| f.0 % 2 == 1));
        assert_eq!(octree.stored_items(), 50);
    }

    #[test]
    fn test_root_grows_to_far_faces() {
        let mut octree = Octree::new(Vec3::ZERO, 1.0);
        octree.insert(FaceId(7), &small_triangle(Vec3::new(20.0, -30.0, 5.0)));
        assert!(octree.root_bounds().contains_point(Vec3::new(20.0, -30.0, 5.0)));

        let ray = PrimRay::new(Vec3::new(20.01, -29.99, 0.0), Vec3::Z);
        assert_eq!(octree.intersects_ray(&ray), vec![FaceId(7)]);

        assert!(octree.remove(FaceId(7)));
        assert!(octree.is_empty());
    }

    #[test]
    fn test_query_outside_root_is_empty() {
        let mut octree = Octree::new(Vec3::ZERO, 2.0);
        octree.insert(FaceId(0), &small_triangle(Vec3::ZERO));
        let ray = PrimRay::new(Vec3::new(50.0, 50.0, 50.0), Vec3::X);
        assert!(octree.intersects_ray(&ray).is_empty());
        let sphere = PrimSphere::new(Vec3::splat(50.0), 1.0);
        assert!(octree.intersects_sphere(&sphere).is_empty());
    }
}
