use glam::Vec3;

/// Sink for particle bursts triggered by interaction
pub trait ParticleEmitter {
    /// Emit up to `count` particles around `position`, returning how many were emitted
    fn emit(&mut self, position: Vec3, count: usize) -> usize;
}
