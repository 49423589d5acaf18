use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use petal_field::interaction::{FrameContext, ProximityAnimator};
use petal_field::math::Ray;
use petal_field::particles::PetalPool;
use petal_field::placement::InteractiveInstance;
use petal_field::sampling::{SurfaceSampler, TriangleRecord, TriangleSet};
use petal_field::scene::{Mesh, MeshStore, Node, SceneGraph};
use petal_field::traits::PointerRaySource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Flat grid of `cells * cells * 2` triangles on the XZ plane
fn grid_mesh(cells: usize) -> Mesh {
    let mut positions = Vec::with_capacity(cells * cells * 6);
    for i in 0..cells {
        for j in 0..cells {
            let (x, z) = (i as f32, j as f32);
            positions.extend([
                Vec3::new(x, 0.0, z),
                Vec3::new(x, 0.0, z + 1.0),
                Vec3::new(x + 1.0, 0.0, z),
                Vec3::new(x + 1.0, 0.0, z),
                Vec3::new(x, 0.0, z + 1.0),
                Vec3::new(x + 1.0, 0.0, z + 1.0),
            ]);
        }
    }
    Mesh::new("grid", positions, None, None, [1.0; 4])
}

fn random_triangles(count: usize, seed: u64) -> TriangleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut corner = || Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 10.0;
    let triangles = (0..count)
        .map(|_| TriangleRecord::new([corner(), corner(), corner()], [Vec3::Y; 3]))
        .collect();
    TriangleSet::from_triangles(triangles)
}

/// Benchmark: Area-weighted draws from a prepared triangle set
fn bench_triangle_set_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangle_set");

    for count in [100, 1_000, 10_000].iter() {
        let set = random_triangles(*count, 1);
        let mut rng = StdRng::seed_from_u64(2);

        group.bench_with_input(BenchmarkId::new("sample_300", count), count, |b, _| {
            b.iter(|| black_box(set.sample(black_box(300), &mut rng)))
        });
    }

    group.finish();
}

/// Benchmark: Collecting world-space triangles from a scene subtree, cold and cached
fn bench_subtree_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_sampler");

    for cells in [16, 64].iter() {
        let mut graph = SceneGraph::new();
        let mut meshes = MeshStore::new();
        let mesh = meshes.insert(grid_mesh(*cells));
        let root = graph.add(graph.root(), Node::new("ground"));
        for k in 0..4 {
            let offset = Vec3::new(k as f32 * *cells as f32, 0.0, 0.0);
            graph.add(
                root,
                Node::new(format!("tile{}", k))
                    .with_mesh(mesh)
                    .with_transform(offset, glam::Quat::IDENTITY, Vec3::ONE),
            );
        }

        group.bench_with_input(BenchmarkId::new("cold", cells), cells, |b, _| {
            b.iter(|| {
                let mut sampler = SurfaceSampler::new();
                black_box(sampler.collect(&graph, &meshes, root))
            })
        });

        let mut warm = SurfaceSampler::new();
        warm.collect(&graph, &meshes, root);
        group.bench_with_input(BenchmarkId::new("cached", cells), cells, |b, _| {
            b.iter(|| black_box(warm.collect(&graph, &meshes, root)))
        });
    }

    group.finish();
}

struct StraightDown;

impl PointerRaySource for StraightDown {
    fn pointer_ray(&self, _ndc: glam::Vec2) -> Ray {
        Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y)
    }
}

/// Benchmark: One animation frame over 300 instances with the pointer active
fn bench_proximity_frame(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let mut graph = SceneGraph::new();
    let instances = (0..300)
        .map(|_| {
            let position = Vec3::new(rng.gen_range(-5.0..5.0), 0.0, rng.gen_range(-5.0..5.0));
            let node = graph.add(
                graph.root(),
                Node::new("flower").with_transform(
                    position,
                    glam::Quat::IDENTITY,
                    Vec3::splat(0.02),
                ),
            );
            InteractiveInstance::new(node, Vec3::splat(0.02), rng.gen_range(0.05..0.15))
        })
        .collect();

    let mut animator = ProximityAnimator::new(2.5);
    animator.set_instances(instances);
    let mut pool = PetalPool::new(None, 4);
    let camera = StraightDown;
    let mut elapsed = 0.0;

    c.bench_function("proximity_frame_300", |b| {
        b.iter(|| {
            elapsed += 0.016;
            let ctx = FrameContext {
                delta: 0.016,
                elapsed,
                pointer: Some(glam::Vec2::ZERO),
                camera: Some(&camera),
            };
            let stats = animator.tick(&mut graph, &ctx, &mut pool, &mut rng);
            pool.tick(0.016);
            black_box(stats)
        })
    });
}

criterion_group!(
    benches,
    bench_triangle_set_sampling,
    bench_subtree_collection,
    bench_proximity_frame
);
criterion_main!(benches);
