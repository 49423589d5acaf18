use glam::Vec3;

/// Handle to a mesh owned by a [`MeshStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Indexed triangle mesh in the owning node's local space
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub color: [f32; 4],
}

impl Mesh {
    /// Build a mesh, deriving smooth normals and a sequential index list when absent
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Option<Vec<u32>>,
        color: [f32; 4],
    ) -> Self {
        let indices = indices.unwrap_or_else(|| {
            let whole = positions.len() - positions.len() % 3;
            (0..whole as u32).collect()
        });

        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => compute_vertex_normals(&positions, &indices),
        };

        Self {
            name: name.into(),
            positions,
            normals,
            indices,
            color,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Copy of this mesh with every position multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Mesh {
        Mesh {
            name: self.name.clone(),
            positions: self.positions.iter().map(|p| *p * factor).collect(),
            normals: self.normals.clone(),
            indices: self.indices.clone(),
            color: self.color,
        }
    }
}

/// Area-weighted vertex normals; vertices with no usable faces fall back to +Y
fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Owns mesh geometry and accounts for its release.
///
/// Slots are never reused, so a `MeshId` stays stable for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MeshStore {
    slots: Vec<Option<Mesh>>,
    released: usize,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: Mesh) -> MeshId {
        self.slots.push(Some(mesh));
        MeshId(self.slots.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Insert a scaled copy of an existing mesh
    pub fn clone_scaled(&mut self, id: MeshId, factor: f32) -> Option<MeshId> {
        let copy = self.get(id)?.scaled(factor);
        Some(self.insert(copy))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (MeshId(i), m)))
    }

    /// Number of meshes not yet released
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total number of meshes released over the store's lifetime
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Release every live mesh. Returns how many were released by this call;
    /// already-released meshes are never counted twice.
    pub fn release_all(&mut self) -> usize {
        let mut count = 0;
        for slot in &mut self.slots {
            if slot.take().is_some() {
                count += 1;
            }
        }
        self.released += count;
        count
    }
}
