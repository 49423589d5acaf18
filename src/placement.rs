use glam::{Quat, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

use crate::error::PlacementWarning;
use crate::sampling::{SurfacePoint, SurfaceSampler};
use crate::scene::{MeshStore, NodeId, SceneGraph};

/// Minimum dot product between a surface normal and world-up for placement
pub const UP_FACING_THRESHOLD: f32 = 0.4;
/// Random spin about the surface normal, `[0, SPIN_RANGE)`
pub const SPIN_RANGE: f32 = FRAC_PI_2;
/// Random tilt about a tangent axis, `[-TILT_RANGE, TILT_RANGE)`
pub const TILT_RANGE: f32 = 0.15;
/// Per-instance scale jitter applied to the base scale
pub const SCALE_JITTER: (f32, f32) = (0.8, 1.2);
/// Per-instance interpolation fraction
pub const LERP_SPEED: (f32, f32) = (0.05, 0.06);

/// Two groups of foliage templates; each clone picks a group 50/50, then a member uniformly
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantPalette {
    pub a: Vec<NodeId>,
    pub b: Vec<NodeId>,
}

impl VariantPalette {
    pub fn new(a: Vec<NodeId>, b: Vec<NodeId>) -> Self {
        Self { a, b }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.a.iter().chain(self.b.iter()).copied()
    }

    /// Pick a template. A missing group hands its half to the other one.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<NodeId> {
        let group = match (self.a.is_empty(), self.b.is_empty()) {
            (true, true) => return None,
            (false, true) => &self.a,
            (true, false) => &self.b,
            (false, false) => {
                if rng.gen_bool(0.5) {
                    &self.a
                } else {
                    &self.b
                }
            }
        };
        group.choose(rng).copied()
    }
}

/// One placed foliage clone and its scale animation state
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveInstance {
    pub node: NodeId,
    pub original_scale: Vec3,
    pub current_scale: Vec3,
    pub target_scale: Vec3,
    pub lerp_speed: f32,
}

impl InteractiveInstance {
    pub fn new(node: NodeId, scale: Vec3, lerp_speed: f32) -> Self {
        Self {
            node,
            original_scale: scale,
            current_scale: scale,
            target_scale: scale,
            lerp_speed,
        }
    }
}

/// Scatters foliage clones over the upward-facing surface of a target subtree
#[derive(Debug, Clone, Copy)]
pub struct InstancePlacer {
    pub count: usize,
    pub base_scale: f32,
}

impl InstancePlacer {
    pub fn new(count: usize, base_scale: f32) -> Self {
        Self { count, base_scale }
    }

    /// Choose up to `count` points, preferring upward-facing ones.
    ///
    /// When too few points face up the whole sampled set is used instead, so the
    /// result has `min(count, points.len())` entries.
    pub fn select_points<R: Rng + ?Sized>(
        &self,
        points: &[SurfacePoint],
        rng: &mut R,
    ) -> Vec<SurfacePoint> {
        let upward: Vec<SurfacePoint> = points
            .iter()
            .copied()
            .filter(|p| p.normal.dot(Vec3::Y) >= UP_FACING_THRESHOLD)
            .collect();

        let pool = if upward.len() >= self.count {
            &upward[..]
        } else {
            log::debug!(
                "only {} of {} sampled points face up, using unfiltered set",
                upward.len(),
                points.len()
            );
            points
        };

        pool.choose_multiple(rng, self.count).copied().collect()
    }

    /// Align local up with `normal`, then spin about it and tilt slightly
    pub fn orientation<R: Rng + ?Sized>(normal: Vec3, rng: &mut R) -> Quat {
        let align = Quat::from_rotation_arc(Vec3::Y, normal);
        let spin = Quat::from_axis_angle(normal, rng.gen_range(0.0..SPIN_RANGE));
        let tilt_axis = normal.any_orthonormal_vector();
        let tilt = Quat::from_axis_angle(tilt_axis, rng.gen_range(-TILT_RANGE..TILT_RANGE));

        (tilt * spin * align).normalize()
    }

    /// Clone palette templates onto sampled points of `target`, parenting them to `container`
    #[allow(clippy::too_many_arguments)]
    pub fn place<R: Rng + ?Sized>(
        &self,
        graph: &mut SceneGraph,
        meshes: &MeshStore,
        sampler: &mut SurfaceSampler,
        target: NodeId,
        palette: &VariantPalette,
        container: NodeId,
        rng: &mut R,
    ) -> Result<Vec<InteractiveInstance>, PlacementWarning> {
        if palette.is_empty() {
            return Err(PlacementWarning::NoVariants {
                patterns: Vec::new(),
            });
        }
        if self.count == 0 {
            return Ok(Vec::new());
        }

        let points = sampler.sample(graph, meshes, target, self.count * 2, rng);
        if points.is_empty() {
            return Err(PlacementWarning::NoSurfacePoints {
                name: graph.node(target).name.clone(),
            });
        }

        let selected = self.select_points(&points, rng);
        let mut instances = Vec::with_capacity(selected.len());

        for point in selected {
            let Some(template) = palette.choose(rng) else {
                break;
            };

            let clone = graph.clone_subtree(template, container);
            let jitter = rng.gen_range(SCALE_JITTER.0..SCALE_JITTER.1);
            let scale = Vec3::splat(self.base_scale * jitter);

            let node = graph.node_mut(clone);
            node.translation = point.position;
            node.rotation = Self::orientation(point.normal, rng);
            node.scale = scale;
            node.visible = true;

            instances.push(InteractiveInstance::new(
                clone,
                scale,
                rng.gen_range(LERP_SPEED.0..=LERP_SPEED.1),
            ));
        }

        log::info!(
            "placed {} instances on {:?} ({} points sampled)",
            instances.len(),
            graph.node(target).name,
            points.len()
        );
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn point(normal: Vec3) -> SurfacePoint {
        SurfacePoint {
            position: Vec3::ZERO,
            normal: normal.normalize(),
        }
    }

    #[test]
    fn test_orientation_aligns_up_with_normal() {
        let mut rng = StdRng::seed_from_u64(3);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        for _ in 0..50 {
            let up = InstancePlacer::orientation(normal, &mut rng) * Vec3::Y;
            // tilt is the only deviation from the normal
            assert!(up.angle_between(normal) <= TILT_RANGE + 1e-4);
        }
    }

    #[test]
    fn test_select_prefers_upward_points() {
        let mut rng = StdRng::seed_from_u64(11);
        let placer = InstancePlacer::new(3, 1.0);
        let mut points = vec![point(Vec3::Y); 4];
        points.extend(vec![point(Vec3::NEG_Y); 4]);

        let selected = placer.select_points(&points, &mut rng);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|p| p.normal == Vec3::Y));
    }

    #[test]
    fn test_select_falls_back_to_unfiltered() {
        let mut rng = StdRng::seed_from_u64(11);
        let placer = InstancePlacer::new(4, 1.0);
        let mut points = vec![point(Vec3::Y); 1];
        points.extend(vec![point(Vec3::X); 7]);

        let selected = placer.select_points(&points, &mut rng);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_palette_choose_uses_both_groups() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), crate::scene::Node::new("a"));
        let b = graph.add(graph.root(), crate::scene::Node::new("b"));
        let palette = VariantPalette::new(vec![a], vec![b]);
        let mut rng = StdRng::seed_from_u64(5);

        let picks: Vec<NodeId> = (0..200).filter_map(|_| palette.choose(&mut rng)).collect();
        let a_count = picks.iter().filter(|&&id| id == a).count();
        assert!(a_count > 60 && a_count < 140, "a picked {} times", a_count);
    }

    #[test]
    fn test_empty_palette_chooses_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(VariantPalette::default().choose(&mut rng), None);
    }
}
