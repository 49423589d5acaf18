//! Area-weighted surface sampling over a scene subtree.
//!
//! Every mesh leaf under the requested root is flattened into world-space
//! [`TriangleRecord`]s, then points are drawn with probability proportional
//! to triangle area and placed uniformly inside the chosen triangle.

use glam::{Mat4, Vec3};
use rand::Rng;
use std::collections::HashMap;

use crate::scene::{Mesh, MeshStore, NodeId, SceneGraph};

/// Meshes with more vertices than this are subsampled
pub const SUBSAMPLE_VERTEX_THRESHOLD: usize = 10_000;
/// Only every n-th triangle of a subsampled mesh is kept
pub const SUBSAMPLE_STRIDE: usize = 3;

/// Sampled surface location with interpolated unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// World-space triangle with per-vertex normals and its area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    pub vertices: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub area: f64,
}

impl TriangleRecord {
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        let e1 = (vertices[1] - vertices[0]).as_dvec3();
        let e2 = (vertices[2] - vertices[0]).as_dvec3();
        let area = 0.5 * e1.cross(e2).length();

        Self {
            vertices,
            normals,
            area,
        }
    }

    /// Interpolate position and normal by barycentric `weights`
    pub fn point_at(&self, weights: [f32; 3]) -> SurfacePoint {
        let [w1, w2, w3] = weights;
        let position = self.vertices[0] * w1 + self.vertices[1] * w2 + self.vertices[2] * w3;
        let normal = self.normals[0] * w1 + self.normals[1] * w2 + self.normals[2] * w3;

        SurfacePoint {
            position,
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
        }
    }
}

/// Fold two uniform numbers in `[0, 1)` into barycentric weights that are
/// uniformly distributed over the triangle
pub fn barycentric(r1: f32, r2: f32) -> [f32; 3] {
    let (r1, r2) = if r1 + r2 >= 1.0 {
        (1.0 - r1, 1.0 - r2)
    } else {
        (r1, r2)
    };
    [r1, r2, (1.0 - r1 - r2).max(0.0)]
}

/// Triangles plus a running area total for weighted selection
#[derive(Debug, Clone, Default)]
pub struct TriangleSet {
    triangles: Vec<TriangleRecord>,
    cumulative: Vec<f64>,
    total_area: f64,
}

impl TriangleSet {
    pub fn from_triangles(triangles: Vec<TriangleRecord>) -> Self {
        let mut total_area = 0.0;
        let cumulative = triangles
            .iter()
            .map(|t| {
                total_area += t.area;
                total_area
            })
            .collect();

        Self {
            triangles,
            cumulative,
            total_area,
        }
    }

    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Index of the first triangle whose running area exceeds `draw`.
    /// `draw` must lie in `[0, total_area)`; zero-area triangles are never returned.
    pub fn pick(&self, draw: f64) -> usize {
        let index = self.cumulative.partition_point(|&sum| sum <= draw);
        index.min(self.triangles.len().saturating_sub(1))
    }

    /// Draw `count` area-weighted points. Empty when there is no area to sample.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<SurfacePoint> {
        if self.triangles.is_empty() || self.total_area <= 0.0 {
            return Vec::new();
        }

        (0..count)
            .map(|_| {
                let draw = rng.gen_range(0.0..self.total_area);
                let triangle = &self.triangles[self.pick(draw)];
                triangle.point_at(barycentric(rng.gen(), rng.gen()))
            })
            .collect()
    }
}

/// Geometry sampler with a per-leaf triangle cache.
///
/// Cache entries are keyed by node identity and hold world-space triangles, so
/// moving a cached leaf requires [`SurfaceSampler::invalidate`].
#[derive(Debug, Default)]
pub struct SurfaceSampler {
    cache: HashMap<NodeId, Vec<TriangleRecord>>,
}

impl SurfaceSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather the world-space triangles of every mesh leaf under `root`
    pub fn collect(&mut self, graph: &SceneGraph, meshes: &MeshStore, root: NodeId) -> TriangleSet {
        let mut triangles = Vec::new();

        for id in graph.descendants(root) {
            let Some(mesh_id) = graph.node(id).mesh else {
                continue;
            };
            let Some(mesh) = meshes.get(mesh_id) else {
                continue;
            };

            let cached = self
                .cache
                .entry(id)
                .or_insert_with(|| leaf_triangles(mesh, &graph.world_matrix(id)));
            triangles.extend_from_slice(cached);
        }

        TriangleSet::from_triangles(triangles)
    }

    /// Up to `count` area-weighted surface points from the subtree at `root`
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        graph: &SceneGraph,
        meshes: &MeshStore,
        root: NodeId,
        count: usize,
        rng: &mut R,
    ) -> Vec<SurfacePoint> {
        let set = self.collect(graph, meshes, root);
        log::debug!(
            "sampling {} points from {} triangles (total area {:.4})",
            count,
            set.len(),
            set.total_area()
        );
        set.sample(count, rng)
    }

    pub fn cached_leaves(&self) -> usize {
        self.cache.len()
    }

    pub fn invalidate(&mut self, leaf: NodeId) {
        self.cache.remove(&leaf);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// World-space triangles for one mesh leaf, subsampled for very dense meshes
fn leaf_triangles(mesh: &Mesh, world: &Mat4) -> Vec<TriangleRecord> {
    let normal_matrix = SceneGraph::normal_matrix(world);
    let stride = if mesh.vertex_count() > SUBSAMPLE_VERTEX_THRESHOLD {
        SUBSAMPLE_STRIDE
    } else {
        1
    };

    mesh.indices
        .chunks_exact(3)
        .step_by(stride)
        .filter_map(|tri| {
            let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if idx.iter().any(|&i| i >= mesh.positions.len()) {
                return None;
            }

            let vertices = idx.map(|i| world.transform_point3(mesh.positions[i]));
            let normals = idx.map(|i| {
                (normal_matrix * mesh.normals[i])
                    .try_normalize()
                    .unwrap_or(Vec3::Y)
            });
            Some(TriangleRecord::new(vertices, normals))
        })
        .collect()
}
