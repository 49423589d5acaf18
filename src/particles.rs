//! Fixed-capacity petal particle pool.
//!
//! Slots are allocated once and recycled in place: an inactive slot is free and
//! renders at zero scale. All slots share one instanced transform buffer that
//! is only flagged for upload when a slot actually changed.

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_PI_6;

use crate::math::random;
use crate::scene::MeshId;
use crate::traits::ParticleEmitter;
use crate::types::InstanceRaw;

pub const PETAL_CAPACITY: usize = 100;

/// Half-angle of the launch cone around world-up (60° cone)
pub const LAUNCH_HALF_ANGLE: f32 = FRAC_PI_6;
pub const LAUNCH_SPEED: (f32, f32) = (0.5, 0.8);
pub const PETAL_SCALE: (f32, f32) = (0.05, 0.10);
pub const PETAL_LIFETIME: (f32, f32) = (2.0, 5.0);
/// Half-extent of the spawn jitter cube
pub const SPAWN_JITTER: f32 = 0.05;
pub const MAX_SPIN: f32 = 2.0;

/// Downward acceleration at the end of life; scaled by life progress
pub const GRAVITY: f32 = 0.6;
/// Life progress after which spiral drift kicks in
pub const SPIRAL_START: f32 = 0.3;
pub const SPIRAL_STRENGTH: f32 = 0.4;
/// Fraction of speed lost by the end of life
pub const DRAG: f32 = 0.6;
pub const WIND_JITTER: f32 = 0.01;
/// Seconds over which a petal shrinks away before expiring
pub const FADE_DURATION: f32 = 0.5;

pub const PETAL_COLOR: [f32; 4] = [1.0, 0.72, 0.82, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub rotation_speed: Vec3,
    pub scale: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub active: bool,
    pub initial_phase: f32,
}

impl Particle {
    pub const fn inactive() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            rotation_speed: Vec3::ZERO,
            scale: 0.0,
            lifetime: 0.0,
            max_lifetime: 0.0,
            active: false,
            initial_phase: 0.0,
        }
    }

    /// 0 at spawn, 1 at expiry
    pub fn progress(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            1.0
        } else {
            1.0 - self.lifetime / self.max_lifetime
        }
    }

    /// Scale used for drawing: zero when inactive, shrinking over the final fade window
    pub fn render_scale(&self) -> f32 {
        if !self.active {
            0.0
        } else if self.lifetime < FADE_DURATION {
            self.scale * (self.lifetime / FADE_DURATION)
        } else {
            self.scale
        }
    }

    /// Integrate one step of motion for a live petal in pool slot `slot`.
    ///
    /// Gravity ramps in with life progress, spiral drift starts after
    /// [`SPIRAL_START`], and the position step shrinks by up to [`DRAG`].
    /// `wind` is added to the velocity after the position step. Lifetime is
    /// not touched here.
    pub fn advance(&mut self, slot: usize, delta: f32, wind: Vec3) {
        let progress = self.progress();
        self.velocity.y -= GRAVITY * progress * delta;

        if progress > SPIRAL_START {
            let age = self.max_lifetime - self.lifetime;
            let angle = age * spiral_frequency(slot) + self.initial_phase;
            self.velocity.x += angle.cos() * SPIRAL_STRENGTH * delta;
            self.velocity.z += angle.sin() * SPIRAL_STRENGTH * delta;
        }

        let slowing = 1.0 - progress * DRAG;
        self.position += self.velocity * delta * slowing;
        self.velocity += wind;
        self.rotation += self.rotation_speed * delta;
    }

    fn transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.render_scale()),
            rotation,
            self.position,
        )
    }
}

/// Spiral drift frequency for a slot, unique to every slot in the pool
pub fn spiral_frequency(slot: usize) -> f32 {
    0.8 + slot as f32 * 0.015
}

#[derive(Debug)]
pub struct PetalPool {
    particles: Vec<Particle>,
    transforms: Vec<InstanceRaw>,
    dirty: bool,
    mesh: Option<MeshId>,
    rng: StdRng,
}

impl PetalPool {
    /// Allocate all [`PETAL_CAPACITY`] slots up front. `mesh` is the petal geometry, if any.
    pub fn new(mesh: Option<MeshId>, seed: u64) -> Self {
        Self {
            particles: vec![Particle::inactive(); PETAL_CAPACITY],
            transforms: vec![InstanceRaw::hidden(PETAL_COLOR); PETAL_CAPACITY],
            dirty: true,
            mesh,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Instanced transforms for every slot, inactive ones at zero scale
    pub fn transforms(&self) -> &[InstanceRaw] {
        &self.transforms
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the upload flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Activate up to `count` free slots around `position`. Returns how many were activated.
    pub fn emit(&mut self, position: Vec3, count: usize) -> usize {
        let mut emitted = 0;

        for slot in 0..self.particles.len() {
            if emitted == count {
                break;
            }
            if self.particles[slot].active {
                continue;
            }

            let rng = &mut self.rng;
            let lifetime = rng.gen_range(PETAL_LIFETIME.0..PETAL_LIFETIME.1);
            let speed = rng.gen_range(LAUNCH_SPEED.0..LAUNCH_SPEED.1);

            let particle = Particle {
                position: position + random::jitter(rng, SPAWN_JITTER),
                velocity: random::cone_around_up(rng, LAUNCH_HALF_ANGLE) * speed,
                rotation: random::euler_angles(rng),
                rotation_speed: random::jitter(rng, MAX_SPIN),
                scale: rng.gen_range(PETAL_SCALE.0..PETAL_SCALE.1),
                lifetime,
                max_lifetime: lifetime,
                active: true,
                initial_phase: rng.gen_range(0.0..std::f32::consts::TAU),
            };

            self.particles[slot] = particle;
            self.transforms[slot] = InstanceRaw::new(particle.transform(), PETAL_COLOR);
            emitted += 1;
        }

        if emitted > 0 {
            self.dirty = true;
        }
        if emitted < count {
            log::trace!("petal pool exhausted: emitted {} of {}", emitted, count);
        }
        emitted
    }

    /// Advance every active slot by `delta` seconds. Returns the number of active slots afterwards.
    pub fn tick(&mut self, delta: f32) -> usize {
        let mut changed = false;
        let mut active = 0;

        for slot in 0..self.particles.len() {
            if !self.particles[slot].active {
                continue;
            }
            changed = true;

            let wind = random::jitter(&mut self.rng, WIND_JITTER);
            let p = &mut self.particles[slot];

            p.lifetime -= delta;
            if p.lifetime <= 0.0 {
                p.lifetime = 0.0;
                p.active = false;
                self.transforms[slot] = InstanceRaw::hidden(PETAL_COLOR);
                continue;
            }

            p.advance(slot, delta, wind);
            self.transforms[slot] = InstanceRaw::new(p.transform(), PETAL_COLOR);
            active += 1;
        }

        if changed {
            self.dirty = true;
        }
        active
    }
}

impl ParticleEmitter for PetalPool {
    fn emit(&mut self, position: Vec3, count: usize) -> usize {
        PetalPool::emit(self, position, count)
    }
}
