use glam::Vec3;

/// Half-line starting at `origin` travelling along unit `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized here so callers may pass any non-zero vector
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Closest point on the ray to `point`, clamped to the origin for points behind it
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction);
        if t < 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Perpendicular distance from `point` to the ray
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.closest_point(point).distance(point)
    }
}
