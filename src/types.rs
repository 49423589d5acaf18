use glam::{Mat4, Vec3};

/// Camera and lighting uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub _pad1: f32,
    pub light_direction: [f32; 3],
    pub _pad2: f32,
    pub light_color: [f32; 3],
    pub _pad3: f32,
    pub ambient: [f32; 3],
    pub _pad4: f32,
}

/// Mesh vertex for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Per-instance transform and colour for GPU instanced draws
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    /// Zero-scale instance; rasterizes to nothing
    pub fn hidden(color: [f32; 4]) -> Self {
        Self::new(Mat4::from_scale(Vec3::ZERO), color)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Largest axis scale encoded in the model matrix
    pub fn max_scale(&self) -> f32 {
        let m = self.matrix();
        m.x_axis
            .truncate()
            .length()
            .max(m.y_axis.truncate().length())
            .max(m.z_axis.truncate().length())
    }
}
