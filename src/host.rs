//! Scene orchestration: model loading, placement, per-frame animation and teardown.
//!
//! [`SceneHost`] owns every piece of scene state. The windowing layer feeds it
//! events and frame deltas and reads back a draw list; nothing here touches the GPU.

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use winit::event::WindowEvent;

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::core::PointerTracker;
use crate::error::{LoadError, PlacementWarning};
use crate::interaction::{FrameContext, ProximityAnimator};
use crate::loaders::{self, PendingLoad};
use crate::math::AABB;
use crate::particles::PetalPool;
use crate::placement::{InstancePlacer, InteractiveInstance, VariantPalette};
use crate::sampling::SurfaceSampler;
use crate::scene::{LoadedModel, MeshId, MeshStore, Node, NodeId, SceneGraph};
use crate::types::{InstanceRaw, SceneUniform};

pub const TARGET_TAG: &str = "target";
pub const PALETTE_A_TAG: &str = "palette_a";
pub const PALETTE_B_TAG: &str = "palette_b";

type ProgressCallback = Box<dyn FnMut(f32)>;

/// One ambient term plus one directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    /// Unit vector pointing from the scene towards the light
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.6,
            direction: Vec3::new(5.0, 10.0, 7.5).normalize(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub instances: usize,
    pub excited: usize,
    pub bursts: usize,
    pub particles_emitted: usize,
    pub active_particles: usize,
}

/// A visible mesh node, ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub mesh: MeshId,
    pub world: Mat4,
    pub color: [f32; 4],
}

pub struct SceneHost {
    config: SceneConfig,
    graph: SceneGraph,
    meshes: MeshStore,
    sampler: SurfaceSampler,
    animator: ProximityAnimator,
    petals: PetalPool,
    camera: Camera,
    pointer: PointerTracker,
    lighting: Lighting,
    rng: StdRng,
    elapsed: f32,
    model_root: Option<NodeId>,
    container: Option<NodeId>,
    pending: Option<PendingLoad>,
    progress_callback: Option<ProgressCallback>,
    last_progress: f32,
    last_warning: Option<PlacementWarning>,
    disposed: bool,
}

impl SceneHost {
    pub fn new(config: SceneConfig, width: u32, height: u32) -> Self {
        let seed = config.resolve_seed();
        log::debug!("scene seed {}", seed);

        Self {
            graph: SceneGraph::new(),
            meshes: MeshStore::new(),
            sampler: SurfaceSampler::new(),
            animator: ProximityAnimator::new(config.interaction_radius),
            petals: PetalPool::new(None, seed.wrapping_add(1)),
            camera: Camera::new(width, height, config.fov_y()),
            pointer: PointerTracker::new(width, height),
            lighting: Lighting::default(),
            rng: StdRng::seed_from_u64(seed),
            elapsed: 0.0,
            model_root: None,
            container: None,
            pending: None,
            progress_callback: None,
            last_progress: 0.0,
            last_warning: None,
            disposed: false,
            config,
        }
    }

    /// Receives load progress in percent, never decreasing within one load
    pub fn on_load_progress(&mut self, callback: impl FnMut(f32) + 'static) {
        self.progress_callback = Some(Box::new(callback));
    }

    /// Start loading `path` in the background.
    /// Collect the result with [`poll_load`](Self::poll_load).
    ///
    /// Only one load may be in flight. A second request while one is pending is
    /// rejected with [`LoadError::LoadInProgress`] and leaves the first untouched.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.check_can_load()?;
        self.last_progress = 0.0;
        self.pending = Some(PendingLoad::spawn(path.as_ref())?);
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Forward progress and, once the background load resolves, install the model.
    /// Returns `None` while nothing has resolved this frame.
    pub fn poll_load(&mut self) -> Option<Result<NodeId, LoadError>> {
        let pending = self.pending.as_mut()?;
        for percent in pending.drain_progress() {
            report_progress(&mut self.progress_callback, &mut self.last_progress, percent);
        }

        let result = pending.poll()?;
        self.pending = None;

        Some(match result {
            Ok(model) => self.install_model(model),
            Err(err) => {
                log::error!("model load failed: {}", err);
                Err(err)
            }
        })
    }

    /// Load and install `path` on the calling thread
    pub fn load_model_blocking(&mut self, path: impl AsRef<Path>) -> Result<NodeId, LoadError> {
        self.check_can_load()?;
        self.last_progress = 0.0;

        let callback = &mut self.progress_callback;
        let last = &mut self.last_progress;
        let model = loaders::load_model(path, &mut |percent| {
            report_progress(callback, last, percent)
        })?;

        self.install_model(model)
    }

    fn check_can_load(&self) -> Result<(), LoadError> {
        if self.disposed {
            return Err(LoadError::Disposed);
        }
        if self.pending.is_some() {
            return Err(LoadError::LoadInProgress);
        }
        Ok(())
    }

    /// Attach a decoded model, tag its parts, scatter foliage and frame the camera.
    ///
    /// Placement problems are logged and kept in [`last_warning`](Self::last_warning);
    /// the model itself is always installed. Fails with [`LoadError::Disposed`] after teardown.
    pub fn install_model(&mut self, model: LoadedModel) -> Result<NodeId, LoadError> {
        if self.disposed {
            log::warn!("refusing to install a model into a disposed scene");
            return Err(LoadError::Disposed);
        }

        if let Some(previous) = self.model_root.take() {
            log::info!("replacing previously loaded model");
            self.graph.node_mut(previous).visible = false;
            if let Some(container) = self.container.take() {
                self.graph.node_mut(container).visible = false;
            }
            self.animator.clear();
            self.sampler.clear();
        }

        let scene_root = self.graph.root();
        let root = model.install(&mut self.graph, &mut self.meshes, scene_root);
        let container = self.graph.add(scene_root, Node::new("Instances"));
        self.model_root = Some(root);
        self.container = Some(container);

        self.tag_parts(root);
        let palette = VariantPalette::new(
            self.graph.tagged(PALETTE_A_TAG).to_vec(),
            self.graph.tagged(PALETTE_B_TAG).to_vec(),
        );

        match self.populate(&palette, container) {
            Ok(instances) => {
                self.last_warning = None;
                self.animator.set_instances(instances);
            }
            Err(warning) => {
                log::warn!("foliage placement skipped: {}", warning);
                self.last_warning = Some(warning);
                self.animator.clear();
            }
        }

        let petal_seed = self.config.resolve_seed().wrapping_add(1);
        self.petals = PetalPool::new(self.petal_mesh(&palette), petal_seed);

        for template in palette.all() {
            self.graph.node_mut(template).visible = false;
        }

        let bounds = self.visible_bounds(root);
        self.camera.frame_bounds(&bounds);

        log::info!(
            "scene ready: {} instances, {} meshes",
            self.animator.instances().len(),
            self.meshes.live_count()
        );
        Ok(root)
    }

    fn tag_parts(&mut self, root: NodeId) {
        for tag in [TARGET_TAG, PALETTE_A_TAG, PALETTE_B_TAG] {
            self.graph.clear_tag(tag);
        }

        if let Some(target) = self.graph.find_by_name(root, &self.config.target) {
            self.graph.add_tag(TARGET_TAG, target);
        }

        let groups = [
            (PALETTE_A_TAG, &self.config.palette_a),
            (PALETTE_B_TAG, &self.config.palette_b),
        ];
        for (tag, patterns) in groups {
            for pattern in patterns {
                for id in self.graph.find_all_by_name(root, pattern) {
                    self.graph.add_tag(tag, id);
                }
            }
        }
    }

    fn populate(
        &mut self,
        palette: &VariantPalette,
        container: NodeId,
    ) -> Result<Vec<InteractiveInstance>, PlacementWarning> {
        let target = self
            .graph
            .tagged(TARGET_TAG)
            .first()
            .copied()
            .ok_or_else(|| PlacementWarning::TargetNotFound {
                name: self.config.target.clone(),
            })?;

        if palette.is_empty() {
            return Err(PlacementWarning::NoVariants {
                patterns: self
                    .config
                    .palette_a
                    .iter()
                    .chain(&self.config.palette_b)
                    .cloned()
                    .collect(),
            });
        }

        InstancePlacer::new(self.config.instance_count, self.config.base_scale).place(
            &mut self.graph,
            &self.meshes,
            &mut self.sampler,
            target,
            palette,
            container,
            &mut self.rng,
        )
    }

    /// Petal geometry: the first mesh of a random variant, scaled up
    fn petal_mesh(&mut self, palette: &VariantPalette) -> Option<MeshId> {
        let variant = palette.choose(&mut self.rng)?;
        let source = self
            .graph
            .descendants(variant)
            .into_iter()
            .find_map(|id| self.graph.node(id).mesh)?;
        self.meshes.clone_scaled(source, self.config.petal_geometry_scale)
    }

    fn visible_bounds(&self, root: NodeId) -> AABB {
        let mut bounds = AABB::empty();
        for id in self.graph.descendants(root) {
            if !self.graph.is_visible(id) {
                continue;
            }
            let Some(mesh) = self.graph.node(id).mesh.and_then(|m| self.meshes.get(m)) else {
                continue;
            };
            let world = self.graph.world_matrix(id);
            for &p in &mesh.positions {
                bounds.extend(world.transform_point3(p));
            }
        }
        bounds
    }

    /// Applies from the next frame. `radius` must be positive.
    pub fn set_interaction_radius(&mut self, radius: f32) {
        self.config.interaction_radius = radius;
        self.animator.set_radius(radius);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        self.pointer.set_viewport(width, height);
    }

    /// Pointer position in window pixels. Returns false if throttled or disposed.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        self.pointer.on_cursor_moved(x, y, self.elapsed)
    }

    /// Route a window event to the camera and pointer. Returns true if it was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        if self.disposed {
            return false;
        }
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
                true
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.camera.process_keyboard(event);
                true
            }
            _ => self.pointer.process_event(event, self.elapsed),
        }
    }

    /// Advance the scene by `delta` seconds
    pub fn update(&mut self, delta: f32) -> FrameStats {
        if self.disposed {
            return FrameStats::default();
        }

        self.elapsed += delta;
        self.camera.update();

        let ctx = FrameContext {
            delta,
            elapsed: self.elapsed,
            pointer: self.pointer.active_ndc(self.elapsed),
            camera: Some(&self.camera),
        };
        let animated = self
            .animator
            .tick(&mut self.graph, &ctx, &mut self.petals, &mut self.rng);
        let active_particles = self.petals.tick(delta);

        FrameStats {
            instances: self.animator.instances().len(),
            excited: animated.excited,
            bursts: animated.bursts,
            particles_emitted: animated.particles_emitted,
            active_particles,
        }
    }

    pub fn draw_list(&self) -> Vec<DrawItem> {
        if self.disposed {
            return Vec::new();
        }

        self.graph
            .descendants(self.graph.root())
            .into_iter()
            .filter_map(|id| {
                let mesh = self.graph.node(id).mesh?;
                let color = self.meshes.get(mesh)?.color;
                if !self.graph.is_visible(id) {
                    return None;
                }
                Some(DrawItem {
                    node: id,
                    mesh,
                    world: self.graph.world_matrix(id),
                    color,
                })
            })
            .collect()
    }

    /// Petal mesh and the instanced transforms of every pool slot
    pub fn petal_batch(&self) -> Option<(MeshId, &[InstanceRaw])> {
        if self.disposed {
            return None;
        }
        let mesh = self.petals.mesh()?;
        self.meshes.get(mesh)?;
        Some((mesh, self.petals.transforms()))
    }

    /// Petal transforms if they changed since the last call
    pub fn take_petal_upload(&mut self) -> Option<&[InstanceRaw]> {
        if self.disposed || !self.petals.take_dirty() {
            return None;
        }
        Some(self.petals.transforms())
    }

    pub fn uniform(&self) -> SceneUniform {
        let light = &self.lighting;
        SceneUniform {
            view_proj: self.camera.view_projection().to_cols_array_2d(),
            eye: self.camera.position().to_array(),
            _pad1: 0.0,
            light_direction: light.direction.to_array(),
            _pad2: 0.0,
            light_color: (light.color * light.intensity).to_array(),
            _pad3: 0.0,
            ambient: (light.ambient_color * light.ambient_intensity).to_array(),
            _pad4: 0.0,
        }
    }

    /// Tear everything down. Safe to call repeatedly, and before any load finished.
    /// Returns the number of meshes released by this call.
    pub fn dispose(&mut self) -> usize {
        if self.disposed {
            log::debug!("dispose called on an already disposed scene");
            return 0;
        }
        self.disposed = true;

        if let Some(pending) = self.pending.take() {
            log::info!("abandoning in-flight load of {:?}", pending.path());
        }
        self.progress_callback = None;
        self.pointer.detach();
        self.animator.clear();
        self.sampler.clear();
        self.petals = PetalPool::new(None, 0);

        let released = self.meshes.release_all();
        log::info!("scene disposed, released {} meshes", released);
        released
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn meshes(&self) -> &MeshStore {
        &self.meshes
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn petals(&self) -> &PetalPool {
        &self.petals
    }

    pub fn instances(&self) -> &[InteractiveInstance] {
        self.animator.instances()
    }

    pub fn interaction_radius(&self) -> f32 {
        self.animator.radius()
    }

    pub fn model_root(&self) -> Option<NodeId> {
        self.model_root
    }

    pub fn last_warning(&self) -> Option<&PlacementWarning> {
        self.last_warning.as_ref()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

fn report_progress(callback: &mut Option<ProgressCallback>, last: &mut f32, percent: f32) {
    let percent = percent.clamp(0.0, 100.0).max(*last);
    *last = percent;
    if let Some(callback) = callback {
        callback(percent);
    }
}
