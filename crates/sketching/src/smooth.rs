//! Path smoothing.

use std::collections::BTreeSet;

use glam::Vec3;
use tracing::trace;
use winged::intersection::sphere_sphere;
use winged::{Dimension, PrimSphere};

use crate::mesh::SketchMesh;
use crate::path::mirror_sphere;
use crate::types::{PathId, SmoothEffect};

/// Hermite falloff: 1 at the influence center, 0 at its border.
fn falloff(distance: f32, radius: f32) -> f32 {
    let x = (distance / radius).clamp(0.0, 1.0);
    1.0 - x * x * (3.0 - 2.0 * x)
}

impl SketchMesh {
    /// Smooth the spheres of `path` inside `influence`.
    ///
    /// Each of the `iterations` passes re-selects the spheres whose centers
    /// lie inside the influence sphere, computes all new spheres from the
    /// previous pass and then applies them. Shells of moved spheres are
    /// realigned afterwards. With `mirror`, the partner path is smoothed
    /// with the mirrored influence sphere.
    pub fn smooth_path(
        &mut self,
        path: PathId,
        influence: &PrimSphere,
        iterations: u32,
        effect: SmoothEffect,
        mirror: Option<Dimension>,
    ) {
        if effect == SmoothEffect::None || influence.is_degenerated() {
            return;
        }
        self.smooth_single(path, influence, iterations, effect);

        let partner = self.path(path).and_then(|p| p.mirror());
        if let (Some(dimension), Some(partner)) = (mirror, partner) {
            self.smooth_single(partner, &mirror_sphere(influence, dimension), iterations, effect);
        }
    }

    fn smooth_single(
        &mut self,
        path: PathId,
        influence: &PrimSphere,
        iterations: u32,
        effect: SmoothEffect,
    ) {
        let Some(index) = self.path_index(path) else {
            panic!("path {path:?} does not belong to sketch mesh {:?}", self.id());
        };
        if !self.paths[index].spheres().any(|s| sphere_sphere(s, influence)) {
            return;
        }
        let strength = self.config().smooth_strength;
        let pinch = self.config().pinch_strength;

        let mut changed = BTreeSet::new();
        for _ in 0..iterations {
            let spheres: Vec<PrimSphere> = self.paths[index].spheres().copied().collect();
            let last = spheres.len().saturating_sub(1);
            let mut updates = Vec::new();

            for i in self.paths[index].indices_within(influence) {
                let current = spheres[i];
                let updated = match effect {
                    SmoothEffect::None => continue,
                    SmoothEffect::Pinch => PrimSphere::new(
                        current.center + (influence.center - current.center) * pinch,
                        current.radius,
                    ),
                    SmoothEffect::Embed | SmoothEffect::EmbedAndAdjust => {
                        // Path ends have a single neighbour and stay put
                        if i == 0 || i == last {
                            continue;
                        }
                        let (prev, next) = (spheres[i - 1], spheres[i + 1]);
                        let weight = strength
                            * falloff(current.center.distance(influence.center), influence.radius);
                        let centroid: Vec3 = (prev.center + current.center + next.center) / 3.0;
                        let radius = if effect == SmoothEffect::EmbedAndAdjust {
                            let mean = (prev.radius + next.radius) * 0.5;
                            current.radius + (mean - current.radius) * weight
                        } else {
                            current.radius
                        };
                        PrimSphere::new(current.center + (centroid - current.center) * weight, radius)
                    }
                };
                updates.push((i, updated));
            }

            if updates.is_empty() {
                break;
            }
            for (i, sphere) in updates {
                self.paths[index].spheres[i].sphere = sphere;
                changed.insert(i);
            }
        }

        for &i in &changed {
            let entry = &self.paths[index].spheres[i];
            self.template.realign(&mut self.mesh, &entry.shell, &entry.sphere);
        }
        trace!(?path, ?effect, moved = changed.len(), "Smoothed sketch path");
    }
}
