//! Sketch tool: drag to lay spheres along a path, shift-drag to smooth.
//!
//! A press on a sketch mesh snapshots the scene and starts a new path at the
//! hit point. Dragging appends spheres wherever the ray hits the mesh again;
//! when the stroke leaves the mesh it continues on a plane through the last
//! position, facing the camera's primary axis.

use glam::{IVec2, Vec3};
use serde::Serialize;
use sketching::{SketchMeshId, SketchMeshIntersection, SketchPathIntersection, SmoothEffect};
use tracing::{debug, warn};
use trellis_config::{Cache, Config, DEFAULT_CURSOR_COLOR, DEFAULT_STEP_WIDTH_FACTOR};
use winged::intersection::ray_plane;
use winged::{PrimPlane, PrimRay, PrimSphere};

use super::{Cursor, Tool, ToolContext, ToolResponse};
use crate::input::{PointingEvent, WheelEvent, WheelOrientation};

const NAME: &str = "sketchSpheres";
const CURSOR_COLOR_KEY: &str = "editor/tool/sketchSpheres/cursorColor";
const STEP_WIDTH_FACTOR_KEY: &str = "editor/tool/sketchSpheres/stepWidthFactor";

pub const DEFAULT_RADIUS: f32 = 0.1;
pub const DEFAULT_HEIGHT: f32 = 0.2;
pub const RADIUS_STEP: f32 = 0.1;

pub struct ToolSketchSpheres {
    cursor: Cursor,
    radius: f32,
    radius_step: f32,
    /// How far spheres stick out of the surface, relative to their diameter
    height: f32,
    smooth_effect: SmoothEffect,
    step_width_factor: f32,
    previous_position: Vec3,
    /// Mesh of the stroke in progress
    mesh: Option<SketchMeshId>,
}

impl ToolSketchSpheres {
    /// Tool with the parameters last stored in `cache`.
    pub fn new(cache: &mut Cache) -> Self {
        let cache = cache.scope(NAME);
        let radius = cache.get_or("radius", DEFAULT_RADIUS);
        let smooth_effect = cache.get_or("smoothEffect", SmoothEffect::Embed.to_index());

        Self {
            cursor: Cursor {
                radius,
                ..Cursor::default()
            },
            radius,
            radius_step: RADIUS_STEP,
            height: cache.get_or("height", DEFAULT_HEIGHT),
            smooth_effect: SmoothEffect::from_index(smooth_effect).unwrap_or_default(),
            step_width_factor: DEFAULT_STEP_WIDTH_FACTOR,
            previous_position: Vec3::ZERO,
            mesh: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, cache: &mut Cache, radius: f32) {
        self.radius = radius;
        self.cursor.radius = radius;
        persist(cache, "radius", radius);
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, cache: &mut Cache, height: f32) {
        self.height = height;
        persist(cache, "height", height);
    }

    pub fn smooth_effect(&self) -> SmoothEffect {
        self.smooth_effect
    }

    pub fn set_smooth_effect(&mut self, cache: &mut Cache, effect: SmoothEffect) {
        self.smooth_effect = effect;
        persist(cache, "smoothEffect", effect.to_index());
    }

    /// Make the scene's winged meshes symmetric across the mirror plane.
    pub fn sync_mirror(&mut self, ctx: &mut ToolContext<'_>) -> ToolResponse {
        match ctx.mirror {
            Some(dimension) => {
                ctx.scene.mirror_winged_meshes(dimension);
                ToolResponse::Redraw
            }
            None => ToolResponse::None,
        }
    }

    /// Center of a sphere placed at `hit`, sunk into the surface by `height`.
    fn new_sphere_position(&self, consider_height: bool, hit: &SketchMeshIntersection) -> Vec3 {
        if consider_height {
            hit.position() - hit.normal() * (self.radius * (1.0 - 2.0 * self.height))
        } else {
            hit.position()
        }
    }

    fn min_distance(&self, position: Vec3) -> bool {
        self.previous_position.distance(position) > self.radius * self.step_width_factor
    }

    fn begin_stroke(&mut self, ctx: &mut ToolContext<'_>, mesh: SketchMeshId, position: Vec3) {
        self.cursor.enable();
        self.cursor.position = position;
        ctx.scene.snapshot_sketch_meshes();
        self.mesh = Some(mesh);
        self.previous_position = position;
    }

    fn smooth(&self, ctx: &mut ToolContext<'_>, hit: &SketchPathIntersection) {
        let influence = PrimSphere::new(hit.position(), self.radius);
        if let Some(sketch) = ctx.scene.sketch_mesh_mut(hit.mesh) {
            sketch.smooth_path(hit.path, &influence, 1, self.smooth_effect, ctx.mirror);
        }
    }

    /// Hit on the plane through the previous position, facing the camera.
    fn plane_hit(
        &self,
        ctx: &ToolContext<'_>,
        mesh: SketchMeshId,
        ray: &PrimRay,
    ) -> Option<SketchMeshIntersection> {
        let plane = PrimPlane::new(
            self.previous_position,
            ctx.camera.primary_dimension().vector(),
        );
        let t = ray_plane(ray, &plane)?;
        Some(SketchMeshIntersection::new(
            mesh,
            t,
            ray.point_at(t),
            plane.normal(),
        ))
    }
}

fn persist<T: Serialize>(cache: &mut Cache, key: &str, value: T) {
    if let Err(e) = cache.scope(NAME).set(key, value) {
        warn!("Failed to cache {NAME}/{key}: {e}");
    }
}

impl Tool for ToolSketchSpheres {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self, ctx: &mut ToolContext<'_>) -> ToolResponse {
        self.from_config(ctx.config);
        self.cursor.disable();
        self.cursor.radius = self.radius;
        ToolResponse::Redraw
    }

    fn render(&self) -> Option<Cursor> {
        self.cursor.enabled.then_some(self.cursor)
    }

    fn move_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointingEvent) -> ToolResponse {
        if !event.primary {
            return self.cursor_update(ctx, event.position);
        }
        let ray = ctx.ray(event.position);

        if event.modifiers.is_shift_only() {
            if let Some(hit) = ctx.scene.intersects_sketch_path(&ray, 0) {
                self.cursor.enable();
                self.cursor.position = hit.position();

                if self.min_distance(hit.position()) {
                    self.previous_position = hit.position();
                    self.mesh = Some(hit.mesh);
                    self.smooth(ctx, &hit);
                }
            }
        } else if let Some(mesh) = self.mesh {
            // Skip the path being drawn (and its mirror partner)
            let excluded = if ctx.has_mirror() { 2 } else { 1 };
            let (hit, consider_height) = match ctx.scene.intersects_sketch_mesh(&ray, excluded) {
                Some(hit) => (Some(hit), true),
                None => (self.plane_hit(ctx, mesh, &ray), false),
            };

            if let Some(hit) = hit
                && self.min_distance(hit.position())
            {
                self.previous_position = hit.position();
                let position = self.new_sphere_position(consider_height, &hit);
                if let Some(sketch) = ctx.scene.sketch_mesh_mut(mesh) {
                    sketch.add_sphere(false, hit.position(), position, self.radius, ctx.mirror);
                }
            }
        }
        ToolResponse::Redraw
    }

    fn press_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointingEvent) -> ToolResponse {
        if !event.primary {
            return ToolResponse::None;
        }
        let ray = ctx.ray(event.position);

        if event.modifiers.is_shift_only() {
            if let Some(hit) = ctx.scene.intersects_sketch_path(&ray, 0) {
                self.begin_stroke(ctx, hit.mesh, hit.position());
                self.smooth(ctx, &hit);
            }
        } else if let Some(hit) = ctx.scene.intersects_sketch_mesh(&ray, 0) {
            self.begin_stroke(ctx, hit.mesh, hit.position());
            let position = self.new_sphere_position(true, &hit);
            if let Some(sketch) = ctx.scene.sketch_mesh_mut(hit.mesh) {
                sketch.add_sphere(true, hit.position(), position, self.radius, ctx.mirror);
            }
            debug!(mesh = ?hit.mesh, "Started sketch stroke");
        } else {
            self.cursor.disable();
        }
        ToolResponse::Redraw
    }

    fn release_event(&mut self, _ctx: &mut ToolContext<'_>, _event: &PointingEvent) -> ToolResponse {
        self.mesh = None;
        ToolResponse::None
    }

    fn wheel_event(&mut self, ctx: &mut ToolContext<'_>, event: &WheelEvent) -> ToolResponse {
        if event.orientation == WheelOrientation::Vertical && event.modifiers.is_shift_only() {
            if event.delta > 0 {
                self.set_radius(ctx.cache, self.radius + self.radius_step);
            } else if event.delta < 0 {
                let smaller = self.radius - self.radius_step;
                // Never shrink to a degenerate radius
                if smaller > self.radius_step * 0.5 {
                    self.set_radius(ctx.cache, smaller);
                }
            }
        }
        ToolResponse::Redraw
    }

    fn cursor_update(&mut self, ctx: &mut ToolContext<'_>, pixel: IVec2) -> ToolResponse {
        let ray = ctx.ray(pixel);
        match ctx.scene.intersects_sketch_mesh(&ray, 0) {
            Some(hit) => {
                self.cursor.enable();
                self.cursor.position = hit.position();
            }
            None => self.cursor.disable(),
        }
        ToolResponse::Redraw
    }

    fn from_config(&mut self, config: &Config) {
        self.cursor.color = config.get_or(CURSOR_COLOR_KEY, DEFAULT_CURSOR_COLOR);
        self.step_width_factor = config.get_or(STEP_WIDTH_FACTOR_KEY, DEFAULT_STEP_WIDTH_FACTOR);
    }
}
