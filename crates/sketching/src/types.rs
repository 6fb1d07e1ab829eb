//! Core types for sketch meshes.

use serde::{Deserialize, Serialize};
use winged::OctreeConfig;

/// Identifier of a sketch mesh within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SketchMeshId(pub u32);

/// Identifier of a path within its sketch mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(pub u32);

/// How `smooth_path` treats the spheres inside the influence region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothEffect {
    /// Leave the path untouched
    None,
    /// Move spheres toward the centroid of their neighbours
    #[default]
    Embed,
    /// Like `Embed`, and relax radii toward the neighbour mean
    EmbedAndAdjust,
    /// Pull spheres toward the center of the influence sphere
    Pinch,
}

impl SmoothEffect {
    /// Stable integer code, used when the effect is persisted.
    pub fn to_index(self) -> i32 {
        match self {
            SmoothEffect::None => 0,
            SmoothEffect::Embed => 1,
            SmoothEffect::EmbedAndAdjust => 2,
            SmoothEffect::Pinch => 3,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(SmoothEffect::None),
            1 => Some(SmoothEffect::Embed),
            2 => Some(SmoothEffect::EmbedAndAdjust),
            3 => Some(SmoothEffect::Pinch),
            _ => None,
        }
    }
}

/// Configuration for sketch mesh construction and smoothing.
///
/// Values are configurable and should not be treated as magic numbers.
#[derive(Debug, Clone)]
pub struct SketchConfig {
    /// Icosphere subdivision level of each sphere shell (default: 2, 320 faces)
    pub shell_subdivisions: u32,
    /// Maximum gap between consecutive spheres, as a fraction of the radius (default: 0.5).
    /// Larger gaps are filled with interpolated spheres.
    pub step_factor: f32,
    /// Relaxation weight of `Embed` and `EmbedAndAdjust` at the influence center (default: 0.5)
    pub smooth_strength: f32,
    /// Fraction of the distance to the influence center covered per `Pinch` pass (default: 0.25)
    pub pinch_strength: f32,
    /// Octree configuration of the derived winged mesh
    pub octree: OctreeConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            shell_subdivisions: 2,
            step_factor: 0.5,
            smooth_strength: 0.5,
            pinch_strength: 0.25,
            octree: OctreeConfig::default(),
        }
    }
}
