//! Pointer-proximity scale animation for placed foliage instances.
//!
//! Each tick one world-space ray is cast from the camera through the pointer.
//! Instances near that ray grow toward a multiple of their placed scale and
//! release petal bursts; the rest retract toward zero scale.

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::Rng;
use std::collections::HashMap;

use crate::placement::InteractiveInstance;
use crate::scene::SceneGraph;
use crate::traits::{ParticleEmitter, PointerRaySource};

pub const DEFAULT_INTERACTION_RADIUS: f32 = 2.5;
/// Growth multiplier at the edge of the interaction radius
pub const MIN_GROWTH: f32 = 5.5;
/// Extra growth gained as the distance approaches zero
pub const GROWTH_RANGE: f32 = 5.5;
/// Simulated seconds between bursts from the same instance
pub const EMISSION_COOLDOWN: f32 = 0.3;
pub const BURST_SIZE: (usize, usize) = (5, 11);
/// Burst origin offset above the instance, as a fraction of its current scale
pub const EMISSION_LIFT: f32 = 0.1;
/// Per-axis bound of the random rotation applied to every instance each active tick
pub const JITTER_ANGLE: f32 = 0.002;

/// Growth multiplier for an instance `distance` away from the pointer ray:
/// `MIN_GROWTH` at the radius, `MIN_GROWTH + GROWTH_RANGE` on the ray
pub fn growth_factor(distance: f32, radius: f32) -> f32 {
    MIN_GROWTH + (1.0 - distance / radius) * GROWTH_RANGE
}

/// Per-tick inputs supplied by the host
pub struct FrameContext<'a> {
    pub delta: f32,
    pub elapsed: f32,
    /// Pointer in NDC, `None` while the pointer is idle
    pub pointer: Option<Vec2>,
    pub camera: Option<&'a dyn PointerRaySource>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimatorStats {
    /// Instances inside the interaction radius this tick
    pub excited: usize,
    pub bursts: usize,
    pub particles_emitted: usize,
}

#[derive(Debug)]
pub struct ProximityAnimator {
    instances: Vec<InteractiveInstance>,
    radius: f32,
    last_emission: HashMap<usize, f32>,
}

impl ProximityAnimator {
    pub fn new(radius: f32) -> Self {
        debug_assert!(radius > 0.0, "interaction radius must be positive");
        Self {
            instances: Vec::new(),
            radius,
            last_emission: HashMap::new(),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Takes effect on the next tick. `radius` must be positive.
    pub fn set_radius(&mut self, radius: f32) {
        debug_assert!(radius > 0.0, "interaction radius must be positive");
        self.radius = radius;
    }

    pub fn instances(&self) -> &[InteractiveInstance] {
        &self.instances
    }

    pub fn set_instances(&mut self, instances: Vec<InteractiveInstance>) {
        self.instances = instances;
        self.last_emission.clear();
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.last_emission.clear();
    }

    /// Time of the last burst from instance `index`
    pub fn last_emission(&self, index: usize) -> Option<f32> {
        self.last_emission.get(&index).copied()
    }

    /// Advance every instance one frame and write the resulting scales into `graph`
    pub fn tick<E, R>(
        &mut self,
        graph: &mut SceneGraph,
        ctx: &FrameContext<'_>,
        emitter: &mut E,
        rng: &mut R,
    ) -> AnimatorStats
    where
        E: ParticleEmitter + ?Sized,
        R: Rng + ?Sized,
    {
        let mut stats = AnimatorStats::default();
        if self.instances.is_empty() {
            return stats;
        }

        let ray = match (ctx.pointer, ctx.camera) {
            (Some(ndc), Some(camera)) => Some(camera.pointer_ray(ndc)),
            _ => None,
        };

        for (index, instance) in self.instances.iter_mut().enumerate() {
            if let Some(ray) = &ray {
                let jitter = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen_range(-JITTER_ANGLE..JITTER_ANGLE),
                    rng.gen_range(-JITTER_ANGLE..JITTER_ANGLE),
                    rng.gen_range(-JITTER_ANGLE..JITTER_ANGLE),
                );
                let node = graph.node_mut(instance.node);
                node.rotation = (node.rotation * jitter).normalize();

                let position = graph.world_position(instance.node);
                let distance = ray.distance_to_point(position);

                if distance < self.radius {
                    stats.excited += 1;
                    let growth = growth_factor(distance, self.radius);
                    instance.target_scale = instance.original_scale * growth;

                    let ready = self
                        .last_emission
                        .get(&index)
                        .map_or(true, |&last| ctx.elapsed - last > EMISSION_COOLDOWN);
                    if ready {
                        let origin = position + Vec3::Y * instance.current_scale.y * EMISSION_LIFT;
                        let count = rng.gen_range(BURST_SIZE.0..=BURST_SIZE.1);
                        stats.particles_emitted += emitter.emit(origin, count);
                        stats.bursts += 1;
                        self.last_emission.insert(index, ctx.elapsed);
                    }
                } else {
                    instance.target_scale = Vec3::ZERO;
                }
            }

            instance.current_scale = instance
                .current_scale
                .lerp(instance.target_scale, instance.lerp_speed);
            graph.node_mut(instance.node).scale = instance.current_scale;
        }

        if stats.bursts > 0 {
            log::trace!(
                "{} instances excited, {} bursts, {} petals",
                stats.excited,
                stats.bursts,
                stats.particles_emitted
            );
        }
        stats
    }
}

impl Default for ProximityAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_INTERACTION_RADIUS)
    }
}
