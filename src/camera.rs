use glam::{Mat4, Vec2, Vec3};
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::math::{Ray, AABB};
use crate::traits::PointerRaySource;

pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const ORBIT_SPEED: f32 = 0.03;
pub const ZOOM_SPEED: f32 = 0.03;
const MAX_PITCH: f32 = 1.45;
const MIN_DISTANCE: f32 = 0.1;

#[derive(Default, Debug, Clone, Copy)]
pub struct OrbitState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

impl OrbitState {
    const fn to_direction(&self, positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    const fn velocity(&self) -> (f32, f32, f32) {
        (
            self.to_direction(self.right, self.left),
            self.to_direction(self.up, self.down),
            self.to_direction(self.zoom_out, self.zoom_in),
        )
    }
}

/// Perspective camera orbiting a target point
#[derive(Debug, Clone)]
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub orbit: OrbitState,
}

impl Camera {
    pub fn new(width: u32, height: u32, fov_y: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.35,
            fov_y,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            orbit: OrbitState::default(),
        };
        camera.resize(width, height);
        camera
    }

    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Recompute the aspect ratio; zero-sized viewports are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Aim at the centre of `bounds` and back off until it fits the view
    pub fn frame_bounds(&mut self, bounds: &AABB) {
        if bounds.is_empty() {
            return;
        }

        let radius = (bounds.diagonal() * 0.5).max(MIN_DISTANCE);
        self.target = bounds.center();
        self.distance = radius / (self.fov_y * 0.5).tan() * 1.2;
        self.near = (self.distance / 1000.0).max(0.01);
        self.far = self.distance * 10.0 + radius;
    }

    pub fn update(&mut self) {
        let (yaw_dir, pitch_dir, zoom_dir) = self.orbit.velocity();

        self.yaw += yaw_dir * ORBIT_SPEED;
        self.pitch = (self.pitch + pitch_dir * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1.0 + zoom_dir * ZOOM_SPEED)).max(MIN_DISTANCE);
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) {
        let is_pressed = event.state.is_pressed();
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match keycode {
                KeyCode::KeyA => self.orbit.left = is_pressed,
                KeyCode::KeyD => self.orbit.right = is_pressed,
                KeyCode::KeyW => self.orbit.up = is_pressed,
                KeyCode::KeyS => self.orbit.down = is_pressed,
                KeyCode::KeyQ => self.orbit.zoom_in = is_pressed,
                KeyCode::KeyE => self.orbit.zoom_out = is_pressed,
                _ => {}
            }
        }
    }
}

impl PointerRaySource for Camera {
    fn pointer_ray(&self, ndc: Vec2) -> Ray {
        let origin = self.position();
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(ndc.extend(0.5));
        Ray::new(origin, through - origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_ray_hits_target() {
        let camera = Camera::new(800, 600, DEFAULT_FOV_Y);
        let ray = camera.pointer_ray(Vec2::ZERO);

        assert!(ray.distance_to_point(camera.target) < 1e-3);
    }

    #[test]
    fn test_offset_ray_misses_target() {
        let camera = Camera::new(800, 600, DEFAULT_FOV_Y);
        let ray = camera.pointer_ray(Vec2::new(0.8, 0.0));

        assert!(ray.distance_to_point(camera.target) > 1.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::new(800, 600, DEFAULT_FOV_Y);
        camera.resize(1000, 500);
        assert_eq!(camera.aspect, 2.0);

        camera.resize(0, 500);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_frame_bounds_targets_centre() {
        let mut camera = Camera::new(800, 600, DEFAULT_FOV_Y);
        camera.frame_bounds(&AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 4.0)));

        assert_eq!(camera.target, Vec3::new(2.0, 1.0, 2.0));
        assert!(camera.position().distance(camera.target) > 3.0);
    }
}
