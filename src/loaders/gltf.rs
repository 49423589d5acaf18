use glam::{Quat, Vec3};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;
use crate::scene::{LoadedModel, Mesh, ModelNode};

type Result<T> = std::result::Result<T, LoadError>;

/// Bytes read between progress reports
const READ_CHUNK: usize = 64 * 1024;

/// Loads a glTF or GLB file into a detached [`LoadedModel`].
///
/// `progress` receives monotonically non-decreasing percentages while the file
/// is read. It does not necessarily see 100 before decoding finishes.
pub fn load_model(path: impl AsRef<Path>, progress: &mut dyn FnMut(f32)) -> Result<LoadedModel> {
    let path = path.as_ref();
    log::info!("Loading model: {:?}", path);

    let bytes = read_with_progress(path, progress)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let model = load_model_from_slice(&bytes, Some(base), path)?;

    log::info!(
        "Model loaded: {} meshes, {} triangles",
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

/// Decodes an in-memory glTF/GLB asset. External buffers resolve against `base`.
pub fn load_model_from_slice(
    bytes: &[u8],
    base: Option<&Path>,
    path: &Path,
) -> Result<LoadedModel> {
    let decode_err = |source| LoadError::Gltf {
        path: path.to_path_buf(),
        source,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(decode_err)?;
    let buffers = gltf::import_buffers(&document, base, blob).map_err(decode_err)?;

    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let root_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    let mut builder = ModelBuilder {
        buffers: &buffers,
        meshes: Vec::new(),
        primitives: HashMap::new(),
    };

    let mut root = ModelNode::new(root_name);
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            root.children.push(builder.node(&node));
        }
    }

    if builder.meshes.is_empty() {
        return Err(LoadError::NoGeometry {
            path: path.to_path_buf(),
        });
    }

    Ok(LoadedModel {
        root,
        meshes: builder.meshes,
    })
}

fn read_with_progress(path: &Path, progress: &mut dyn FnMut(f32)) -> Result<Vec<u8>> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let total = file.metadata().map_err(io_err)?.len() as usize;
    let mut bytes = Vec::with_capacity(total);
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut reported = 0.0f32;

    loop {
        let read = file.read(&mut chunk).map_err(io_err)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);

        if total > 0 {
            let percent = (bytes.len() as f32 / total as f32 * 100.0).min(100.0);
            if percent > reported {
                reported = percent;
                progress(percent);
            }
        }
    }

    Ok(bytes)
}

struct ModelBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    meshes: Vec<Mesh>,
    /// (mesh index, primitive index) -> index into `meshes`, so instanced glTF meshes decode once
    primitives: HashMap<(usize, usize), Option<usize>>,
}

impl ModelBuilder<'_> {
    fn node(&mut self, node: &gltf::Node) -> ModelNode {
        let (translation, rotation, scale) = node.transform().decomposed();
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));

        let mut model_node = ModelNode::new(name.clone());
        model_node.translation = Vec3::from_array(translation);
        model_node.rotation = Quat::from_array(rotation);
        model_node.scale = Vec3::from_array(scale);

        if let Some(mesh) = node.mesh() {
            let decoded: Vec<usize> = mesh
                .primitives()
                .filter_map(|primitive| self.primitive(&mesh, &primitive))
                .collect();

            // Single-primitive meshes sit on the node itself; otherwise one child per primitive
            match decoded.as_slice() {
                [only] => model_node.mesh = Some(*only),
                many => {
                    for (i, &index) in many.iter().enumerate() {
                        let child_name = format!("{}_primitive{}", name, i);
                        model_node
                            .children
                            .push(ModelNode::new(child_name).with_mesh(index));
                    }
                }
            }
        }

        for child in node.children() {
            model_node.children.push(self.node(&child));
        }

        model_node
    }

    fn primitive(&mut self, mesh: &gltf::Mesh, primitive: &gltf::Primitive) -> Option<usize> {
        let key = (mesh.index(), primitive.index());
        if let Some(cached) = self.primitives.get(&key) {
            return *cached;
        }

        let decoded = self.decode_primitive(mesh, primitive);
        self.primitives.insert(key, decoded);
        decoded
    }

    fn decode_primitive(
        &mut self,
        mesh: &gltf::Mesh,
        primitive: &gltf::Primitive,
    ) -> Option<usize> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("skipping non-triangle primitive in mesh {:?}", mesh.name());
            return None;
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from_array).collect();
        if positions.len() < 3 {
            return None;
        }
        let normals = reader
            .read_normals()
            .map(|normals| normals.map(Vec3::from_array).collect());
        let indices = reader.read_indices().map(|indices| indices.into_u32().collect());
        let color = primitive.material().pbr_metallic_roughness().base_color_factor();

        let name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        self.meshes.push(Mesh::new(name, positions, normals, indices, color));
        Some(self.meshes.len() - 1)
    }
}
