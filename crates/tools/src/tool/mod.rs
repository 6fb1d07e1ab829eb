//! Tool capability trait and the context tools run in.

pub mod sketch_spheres;

use glam::{IVec2, Vec3};
use trellis_config::{Cache, Color, Config};
use winged::{Dimension, PrimRay};

use crate::camera::Camera;
use crate::input::{PointingEvent, WheelEvent};
use crate::scene::Scene;

/// What the host should do after a tool handled an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolResponse {
    #[default]
    None,
    Redraw,
    Terminate,
}

/// Sphere cursor drawn at the tool's current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub enabled: bool,
    pub position: Vec3,
    pub radius: f32,
    pub color: Color,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Vec3::ZERO,
            radius: 1.0,
            color: Color::default(),
        }
    }
}

impl Cursor {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Everything a tool may read or change while handling an event.
pub struct ToolContext<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a dyn Camera,
    pub config: &'a Config,
    pub cache: &'a mut Cache,
    /// Mirror plane of symmetric editing, if enabled
    pub mirror: Option<Dimension>,
}

impl ToolContext<'_> {
    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    pub fn ray(&self, pixel: IVec2) -> PrimRay {
        self.camera.ray(pixel)
    }
}

/// An interactive editing tool.
///
/// Hosts call [`Tool::initialize`] once, then forward input events. Every
/// handler reports whether the viewport needs redrawing.
pub trait Tool {
    /// Cache prefix and display name
    fn name(&self) -> &'static str;

    fn initialize(&mut self, ctx: &mut ToolContext<'_>) -> ToolResponse {
        self.from_config(ctx.config);
        ToolResponse::None
    }

    /// Cursor to draw, if visible
    fn render(&self) -> Option<Cursor> {
        None
    }

    fn move_event(&mut self, _ctx: &mut ToolContext<'_>, _event: &PointingEvent) -> ToolResponse {
        ToolResponse::None
    }

    fn press_event(&mut self, _ctx: &mut ToolContext<'_>, _event: &PointingEvent) -> ToolResponse {
        ToolResponse::None
    }

    fn release_event(
        &mut self,
        _ctx: &mut ToolContext<'_>,
        _event: &PointingEvent,
    ) -> ToolResponse {
        ToolResponse::None
    }

    fn wheel_event(&mut self, _ctx: &mut ToolContext<'_>, _event: &WheelEvent) -> ToolResponse {
        ToolResponse::None
    }

    /// Update the cursor without any button held
    fn cursor_update(&mut self, _ctx: &mut ToolContext<'_>, _pixel: IVec2) -> ToolResponse {
        ToolResponse::None
    }

    /// Re-read configuration values, e.g. after the config file changed
    #[allow(clippy::wrong_self_convention)]
    fn from_config(&mut self, _config: &Config) {}
}
