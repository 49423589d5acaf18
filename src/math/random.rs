use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Uniform vector in the axis-aligned cube `[-half, half)^3`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
    )
}

/// Unit direction inside a cone of half-angle `half_angle` around +Y.
/// Polar angle is sampled uniformly over the cone's solid angle.
pub fn cone_around_up<R: Rng + ?Sized>(rng: &mut R, half_angle: f32) -> Vec3 {
    let azimuth = rng.gen_range(0.0..TAU);
    let cos_theta = 1.0 - rng.gen::<f32>() * (1.0 - half_angle.cos());
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    Vec3::new(sin_theta * azimuth.cos(), cos_theta, sin_theta * azimuth.sin())
}

/// Euler angles with each component uniform in `[0, 2π)`
pub fn euler_angles<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU))
}
