//! Sketch meshes for Trellis.
//!
//! A sketch mesh is a set of paths, each an ordered run of spheres laid down
//! by a stroke. Every sphere contributes a *shell* (a tessellated icosphere)
//! to the mesh's [`winged::WingedMesh`]; the rendered surface is the union
//! of all shells.
//!
//! # Architecture
//!
//! - **Types**: ids, smoothing effects and [`SketchConfig`]
//! - **Shell**: the unit icosphere template shells are stamped from
//! - **Path**: sphere sequences with their shell geometry
//! - **Mesh**: [`SketchMesh`], owning paths and the derived winged mesh,
//!   with the `add_sphere` and `smooth_path` edits
//! - **Intersection**: ray queries against the derived mesh or raw spheres
//!
//! Edits only touch the shells of the spheres they change: new spheres are
//! tessellated with `add_triangle`, moved spheres are snapped in place with
//! `realign_faces`. Nothing is rebuilt from scratch.

pub mod intersection;
pub mod mesh;
pub mod path;
pub mod shell;
mod smooth;
pub mod types;

pub use intersection::{SketchMeshIntersection, SketchPathIntersection};
pub use mesh::SketchMesh;
pub use path::{PathSphere, SketchPath};
pub use shell::{Shell, ShellTemplate};
pub use types::{PathId, SketchConfig, SketchMeshId, SmoothEffect};
