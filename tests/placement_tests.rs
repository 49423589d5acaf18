use glam::Vec3;
use petal_field::placement::{InstancePlacer, VariantPalette, LERP_SPEED, SCALE_JITTER, TILT_RANGE};
use petal_field::sampling::SurfaceSampler;
use petal_field::scene::{Mesh, MeshStore, Node, NodeId, SceneGraph};
use petal_field::PlacementWarning;
use rand::rngs::StdRng;
use rand::SeedableRng;

struct Fixture {
    graph: SceneGraph,
    meshes: MeshStore,
    target: NodeId,
    palette: VariantPalette,
    container: NodeId,
}

fn quad(name: &str, corners: [Vec3; 4]) -> Mesh {
    Mesh::new(name, corners.to_vec(), None, Some(vec![0, 1, 2, 0, 2, 3]), [1.0; 4])
}

/// Target quad plus one template in each palette group
fn fixture(target_mesh: Mesh) -> Fixture {
    let mut graph = SceneGraph::new();
    let mut meshes = MeshStore::new();

    let model = graph.add(graph.root(), Node::new("model"));
    let target_id = meshes.insert(target_mesh);
    let target = graph.add(model, Node::new("Ground").with_mesh(target_id));

    let petal = meshes.insert(Mesh::new(
        "petal",
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        None,
        None,
        [1.0, 0.5, 0.5, 1.0],
    ));
    let a = graph.add(model, Node::new("FlowerA").with_mesh(petal));
    let b = graph.add(model, Node::new("FlowerB").with_mesh(petal));
    let container = graph.add(graph.root(), Node::new("Instances"));

    Fixture {
        graph,
        meshes,
        target,
        palette: VariantPalette::new(vec![a], vec![b]),
        container,
    }
}

fn flat_ground() -> Mesh {
    quad(
        "ground",
        [
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, -5.0),
        ],
    )
}

fn vertical_wall() -> Mesh {
    quad(
        "wall",
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 5.0, 5.0),
            Vec3::new(0.0, 0.0, 5.0),
        ],
    )
}

#[cfg(test)]
mod placement_tests {
    use super::*;

    // ============================================================================
    // Instance count
    // ============================================================================

    #[test]
    fn test_places_exactly_count_on_upward_surface() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(10);

        let instances = InstancePlacer::new(40, 0.02)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        assert_eq!(instances.len(), 40);
        assert_eq!(f.graph.node(f.container).children().len(), 40);
    }

    #[test]
    fn test_zero_count_places_nothing_without_warning() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(18);

        let instances = InstancePlacer::new(0, 0.02).place(
            &mut f.graph,
            &f.meshes,
            &mut sampler,
            f.target,
            &f.palette,
            f.container,
            &mut rng,
        );

        assert_eq!(instances, Ok(Vec::new()));
        assert!(f.graph.node(f.container).children().is_empty());
    }

    #[test]
    fn test_too_few_upward_points_falls_back_without_failing() {
        let mut f = fixture(vertical_wall());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(11);

        let instances = InstancePlacer::new(25, 0.02)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        assert_eq!(instances.len(), 25);
    }

    // ============================================================================
    // Instance state and transforms
    // ============================================================================

    #[test]
    fn test_instances_start_at_rest() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(12);
        let base = 0.02;

        let instances = InstancePlacer::new(30, base)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        for inst in &instances {
            assert_eq!(inst.original_scale, inst.current_scale);
            assert_eq!(inst.original_scale, inst.target_scale);
            assert!(inst.lerp_speed >= LERP_SPEED.0 && inst.lerp_speed <= LERP_SPEED.1);

            let s = inst.original_scale;
            assert!(s.x == s.y && s.y == s.z, "scale must be uniform: {:?}", s);
            assert!(s.x >= base * SCALE_JITTER.0 - 1e-6 && s.x <= base * SCALE_JITTER.1 + 1e-6);

            let node = f.graph.node(inst.node);
            assert_eq!(node.scale, s);
            assert!(node.visible);
            assert_eq!(node.parent(), Some(f.container));
        }
    }

    #[test]
    fn test_instances_stand_on_the_surface_facing_up() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(13);

        let instances = InstancePlacer::new(30, 0.02)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        for inst in &instances {
            let node = f.graph.node(inst.node);
            assert!(node.translation.y.abs() < 1e-5);
            assert!(node.translation.x.abs() <= 5.0 + 1e-5);
            assert!(node.translation.z.abs() <= 5.0 + 1e-5);

            let up = node.rotation * Vec3::Y;
            assert!(up.angle_between(Vec3::Y) <= TILT_RANGE + 1e-3, "tilted too far: {:?}", up);
        }
    }

    #[test]
    fn test_clones_share_template_geometry() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(14);
        let template_mesh = f.graph.node(f.palette.a[0]).mesh;
        let mesh_count = f.meshes.live_count();

        let instances = InstancePlacer::new(10, 0.02)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        assert_eq!(f.meshes.live_count(), mesh_count);
        assert!(instances.iter().all(|i| f.graph.node(i.node).mesh == template_mesh));
    }

    #[test]
    fn test_both_palette_groups_are_used() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(15);

        let instances = InstancePlacer::new(100, 0.02)
            .place(
                &mut f.graph,
                &f.meshes,
                &mut sampler,
                f.target,
                &f.palette,
                f.container,
                &mut rng,
            )
            .unwrap();

        let from_a = instances
            .iter()
            .filter(|i| f.graph.node(i.node).name == "FlowerA")
            .count();
        assert!(from_a > 25 && from_a < 75, "{} of 100 clones from group A", from_a);
    }

    // ============================================================================
    // Warnings
    // ============================================================================

    #[test]
    fn test_empty_palette_is_a_warning() {
        let mut f = fixture(flat_ground());
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(16);

        let result = InstancePlacer::new(10, 0.02).place(
            &mut f.graph,
            &f.meshes,
            &mut sampler,
            f.target,
            &VariantPalette::default(),
            f.container,
            &mut rng,
        );

        assert!(matches!(result, Err(PlacementWarning::NoVariants { .. })));
        assert!(f.graph.node(f.container).children().is_empty());
    }

    #[test]
    fn test_target_without_geometry_is_a_warning() {
        let mut f = fixture(flat_ground());
        let bare = f.graph.add(f.graph.root(), Node::new("Bare"));
        let mut sampler = SurfaceSampler::new();
        let mut rng = StdRng::seed_from_u64(17);

        let result = InstancePlacer::new(10, 0.02)
            .place(&mut f.graph, &f.meshes, &mut sampler, bare, &f.palette, f.container, &mut rng);

        assert_eq!(
            result,
            Err(PlacementWarning::NoSurfacePoints {
                name: "Bare".to_string()
            })
        );
    }
}
