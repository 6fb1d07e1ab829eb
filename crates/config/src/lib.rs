//! Configuration for Trellis
//!
//! Two flat key/value stores backed by JSON files:
//! - [`Config`]: read-mostly settings with typed lookup and defaults
//!   (colors, step widths), keyed by slash separated paths such as
//!   `editor/tool/sketchSpheres/stepWidthFactor`
//! - [`Cache`]: last used tool parameters, written by tools while they run
//!   and saved so they survive across sessions

mod cache;
mod color;
mod config;
mod error;

pub use cache::{Cache, ScopedCache};
pub use color::Color;
pub use config::Config;
pub use error::ConfigError;

/// Default cursor color of the sketch-spheres tool
pub const DEFAULT_CURSOR_COLOR: Color = Color::rgb(1.0, 0.85, 0.35);

/// Default minimum stroke distance between spheres, relative to the radius
pub const DEFAULT_STEP_WIDTH_FACTOR: f32 = 0.3;
