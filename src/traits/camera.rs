use glam::Vec2;

use crate::math::Ray;

/// Anything that can turn a pointer position into a world-space ray
pub trait PointerRaySource {
    /// Ray through `ndc`, where both axes span `[-1, 1]` and +Y is up
    fn pointer_ray(&self, ndc: Vec2) -> Ray;
}
