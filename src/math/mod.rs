mod aabb;
pub mod random;
mod ray;

pub use aabb::AABB;
pub use ray::Ray;
