use glam::{Quat, Vec2, Vec3};
use petal_field::interaction::{
    growth_factor, FrameContext, ProximityAnimator, BURST_SIZE, EMISSION_COOLDOWN, EMISSION_LIFT,
};
use petal_field::math::Ray;
use petal_field::placement::InteractiveInstance;
use petal_field::scene::{Node, NodeId, SceneGraph};
use petal_field::traits::{ParticleEmitter, PointerRaySource};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Camera stand-in that always casts the same ray straight down the -Z axis
struct FixedRay(Ray);

impl PointerRaySource for FixedRay {
    fn pointer_ray(&self, _ndc: Vec2) -> Ray {
        self.0
    }
}

#[derive(Default)]
struct RecordingEmitter {
    bursts: Vec<(Vec3, usize)>,
}

impl ParticleEmitter for RecordingEmitter {
    fn emit(&mut self, position: Vec3, count: usize) -> usize {
        self.bursts.push((position, count));
        count
    }
}

fn down_z() -> FixedRay {
    FixedRay(Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z))
}

/// One instance per position, each with scale 1 and lerp speed 0.5
fn setup(positions: &[Vec3]) -> (SceneGraph, ProximityAnimator) {
    let mut graph = SceneGraph::new();
    let instances = positions
        .iter()
        .map(|&p| {
            let node = graph.add(
                graph.root(),
                Node::new("flower").with_transform(p, Quat::IDENTITY, Vec3::ONE),
            );
            InteractiveInstance::new(node, Vec3::ONE, 0.5)
        })
        .collect();

    let mut animator = ProximityAnimator::new(2.5);
    animator.set_instances(instances);
    (graph, animator)
}

fn active<'a>(camera: &'a FixedRay, elapsed: f32) -> FrameContext<'a> {
    FrameContext {
        delta: 0.016,
        elapsed,
        pointer: Some(Vec2::ZERO),
        camera: Some(camera),
    }
}

fn idle(elapsed: f32) -> FrameContext<'static> {
    FrameContext {
        delta: 0.016,
        elapsed,
        pointer: None,
        camera: None,
    }
}

fn node_of(animator: &ProximityAnimator, index: usize) -> NodeId {
    animator.instances()[index].node
}

#[cfg(test)]
mod proximity_tests {
    use super::*;

    // ============================================================================
    // Scale law
    // ============================================================================

    #[test]
    fn test_growth_factor_spans_five_and_a_half_to_eleven() {
        assert_eq!(growth_factor(0.0, 2.5), 11.0);
        assert_eq!(growth_factor(2.5, 2.5), 5.5);
        assert!(growth_factor(1.0, 2.5) > growth_factor(2.0, 2.5));
    }

    #[test]
    fn test_instance_on_ray_targets_eleven_times_original() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::ZERO]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(1);

        let stats = animator.tick(&mut graph, &active(&camera, 1.0), &mut emitter, &mut rng);

        assert_eq!(stats.excited, 1);
        assert!((animator.instances()[0].target_scale - Vec3::splat(11.0)).length() < 1e-4);
        // one lerp step of 0.5 from 1 toward 11
        assert!((animator.instances()[0].current_scale - Vec3::splat(6.0)).length() < 1e-4);
        assert_eq!(graph.node(node_of(&animator, 0)).scale, animator.instances()[0].current_scale);
    }

    #[test]
    fn test_instance_at_radius_is_not_excited() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::new(2.5, 0.0, 0.0)]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(2);

        let stats = animator.tick(&mut graph, &active(&camera, 1.0), &mut emitter, &mut rng);

        assert_eq!(stats.excited, 0);
        assert_eq!(animator.instances()[0].target_scale, Vec3::ZERO);
        assert!(emitter.bursts.is_empty());
    }

    #[test]
    fn test_leaving_range_retracts_to_zero_not_original() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::new(10.0, 0.0, 0.0)]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(3);

        for frame in 0..60 {
            let ctx = active(&camera, frame as f32 * 0.016);
            animator.tick(&mut graph, &ctx, &mut emitter, &mut rng);
        }

        let instance = &animator.instances()[0];
        assert_eq!(instance.target_scale, Vec3::ZERO);
        assert!(instance.current_scale.length() < 1e-6);
        assert!(instance.current_scale.length() < instance.original_scale.length());
    }

    #[test]
    fn test_radius_change_applies_next_tick() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::new(3.0, 0.0, 0.0)]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(4);

        let stats = animator.tick(&mut graph, &active(&camera, 0.0), &mut emitter, &mut rng);
        assert_eq!(stats.excited, 0);

        animator.set_radius(4.0);
        let stats = animator.tick(&mut graph, &active(&camera, 1.0), &mut emitter, &mut rng);
        assert_eq!(stats.excited, 1);
        let expected = growth_factor(3.0, 4.0);
        assert!((animator.instances()[0].target_scale.x - expected).abs() < 1e-4);
    }

    // ============================================================================
    // Idle pointer
    // ============================================================================

    #[test]
    fn test_idle_pointer_skips_proximity_but_keeps_easing() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::ZERO]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(5);

        animator.tick(&mut graph, &active(&camera, 0.0), &mut emitter, &mut rng);
        let rotation = graph.node(node_of(&animator, 0)).rotation;
        let before = animator.instances()[0].current_scale;
        let bursts = emitter.bursts.len();

        let stats = animator.tick(&mut graph, &idle(1.0), &mut emitter, &mut rng);

        assert_eq!(stats.excited, 0);
        assert_eq!(emitter.bursts.len(), bursts);
        // target untouched, current keeps converging toward it
        assert!((animator.instances()[0].target_scale.x - 11.0).abs() < 1e-4);
        assert!(animator.instances()[0].current_scale.x > before.x);
        assert_eq!(graph.node(node_of(&animator, 0)).rotation, rotation);
    }

    #[test]
    fn test_missing_camera_is_not_an_error() {
        let (mut graph, mut animator) = setup(&[Vec3::ZERO]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(6);
        let ctx = FrameContext {
            delta: 0.016,
            elapsed: 0.0,
            pointer: Some(Vec2::ZERO),
            camera: None,
        };

        let stats = animator.tick(&mut graph, &ctx, &mut emitter, &mut rng);
        assert_eq!(stats.excited, 0);
        assert_eq!(animator.instances()[0].current_scale, Vec3::ONE);
    }

    #[test]
    fn test_empty_instance_set_is_skipped() {
        let camera = down_z();
        let mut graph = SceneGraph::new();
        let mut animator = ProximityAnimator::default();
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(7);

        let stats = animator.tick(&mut graph, &active(&camera, 0.0), &mut emitter, &mut rng);
        assert_eq!(stats, Default::default());
    }

    // ============================================================================
    // Emission
    // ============================================================================

    #[test]
    fn test_burst_size_and_origin() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::new(0.5, 0.0, 0.0)]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(8);

        animator.tick(&mut graph, &active(&camera, 0.0), &mut emitter, &mut rng);

        assert_eq!(emitter.bursts.len(), 1);
        let (origin, count) = emitter.bursts[0];
        assert!(count >= BURST_SIZE.0 && count <= BURST_SIZE.1);
        // lift uses the scale before this tick's lerp
        let expected = Vec3::new(0.5, 0.0, 0.0) + Vec3::Y * EMISSION_LIFT;
        assert!((origin - expected).length() < 1e-4, "origin {:?}", origin);
    }

    #[test]
    fn test_emission_is_rate_limited_per_instance() {
        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]);
        let mut emitter = RecordingEmitter::default();
        let mut rng = StdRng::seed_from_u64(9);

        let stats = animator.tick(&mut graph, &active(&camera, 0.0), &mut emitter, &mut rng);
        assert_eq!(stats.bursts, 2);
        assert_eq!(animator.last_emission(0), Some(0.0));

        let too_soon = active(&camera, EMISSION_COOLDOWN - 0.1);
        let stats = animator.tick(&mut graph, &too_soon, &mut emitter, &mut rng);
        assert_eq!(stats.bursts, 0);

        let cooled_down = active(&camera, EMISSION_COOLDOWN + 0.01);
        let stats = animator.tick(&mut graph, &cooled_down, &mut emitter, &mut rng);
        assert_eq!(stats.bursts, 2);
        assert_eq!(emitter.bursts.len(), 4);
    }

    #[test]
    fn test_particles_emitted_reports_what_the_pool_accepted() {
        struct FullPool;
        impl ParticleEmitter for FullPool {
            fn emit(&mut self, _position: Vec3, _count: usize) -> usize {
                0
            }
        }

        let camera = down_z();
        let (mut graph, mut animator) = setup(&[Vec3::ZERO]);
        let mut rng = StdRng::seed_from_u64(10);

        let stats = animator.tick(&mut graph, &active(&camera, 0.0), &mut FullPool, &mut rng);
        assert_eq!(stats.bursts, 1);
        assert_eq!(stats.particles_emitted, 0);
    }
}
