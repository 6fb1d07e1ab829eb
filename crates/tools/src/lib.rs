//! Interactive editing for Trellis
//!
//! Ties the geometry crates to user input:
//! - [`Scene`]: the sketch and winged meshes being edited, with undo history
//! - [`Camera`]: turns pixel positions into picking rays
//! - [`Tool`]: reacts to pointing and wheel events inside a [`ToolContext`]
//! - [`ToolSketchSpheres`]: draws sphere paths on sketch meshes and smooths them

pub mod camera;
pub mod input;
pub mod scene;
pub mod tool;

pub use camera::{Camera, PerspectiveCamera};
pub use input::{Modifiers, MouseButton, PointingEvent, WheelEvent, WheelOrientation};
pub use scene::Scene;
pub use tool::sketch_spheres::ToolSketchSpheres;
pub use tool::{Cursor, Tool, ToolContext, ToolResponse};
