//! Wavefront OBJ loading
//!
//! Reads geometry and material texture paths on the CPU. Uploading to the GPU
//! is done separately by the render engine.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::SceneError;
use crate::gfx::geometry::Vertex3D;

/// One mesh of a loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Absolute or model-relative path of the diffuse map
    pub diffuse_texture: Option<PathBuf>,
    pub specular_texture: Option<PathBuf>,
}

/// All meshes of an OBJ file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    /// Loads an OBJ file and its MTL materials
    ///
    /// Missing normals are computed from the triangles. A missing or broken
    /// MTL file is logged and the meshes load untextured.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| SceneError::ModelLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = materials.unwrap_or_else(|err| {
            warn!("No usable materials for {}: {}", path.display(), err);
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let texture_path = |name: &Option<String>| {
            name.as_ref()
                .filter(|name| !name.is_empty())
                .map(|name| base_dir.join(name))
        };

        let meshes: Vec<MeshData> = models
            .into_iter()
            .map(|model| {
                let material = model.mesh.material_id.and_then(|id| materials.get(id));
                MeshData {
                    diffuse_texture: material.and_then(|m| texture_path(&m.diffuse_texture)),
                    specular_texture: material.and_then(|m| texture_path(&m.specular_texture)),
                    vertices: build_vertices(&model.mesh),
                    indices: model.mesh.indices,
                    name: model.name,
                }
            })
            .collect();

        if meshes.is_empty() {
            return Err(SceneError::EmptyModel(path.to_path_buf()));
        }

        let data = Self { meshes };
        info!(
            "Loaded {}: {} meshes, {} vertices, {} textures",
            path.display(),
            data.meshes.len(),
            data.vertex_count(),
            data.texture_count()
        );
        Ok(data)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    pub fn texture_count(&self) -> usize {
        self.meshes
            .iter()
            .map(|mesh| {
                usize::from(mesh.diffuse_texture.is_some()) + usize::from(mesh.specular_texture.is_some())
            })
            .sum()
    }
}

fn build_vertices(mesh: &tobj::Mesh) -> Vec<Vertex3D> {
    let vertex_count = mesh.positions.len() / 3;
    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals.clone()
    } else {
        compute_normals(&mesh.positions, &mesh.indices)
    };
    let has_uvs = mesh.texcoords.len() == vertex_count * 2;

    (0..vertex_count)
        .map(|i| Vertex3D {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
            // OBJ puts v = 0 at the bottom of the image
            tex_coords: if has_uvs {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            },
        })
        .collect()
}

/// Area-weighted smooth vertex normals
///
/// Vertices that belong to no triangle (or only degenerate ones) get +Y.
pub fn compute_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0; positions.len()];
    let vertex = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let (v0, v1, v2) = (vertex(i0), vertex(i1), vertex(i2));

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for index in [i0, i1, i2] {
            for axis in 0..3 {
                normals[index * 3 + axis] += face_normal[axis];
            }
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > f32::EPSILON {
            normal.iter_mut().for_each(|n| *n /= length);
        } else {
            normal.copy_from_slice(&[0.0, 1.0, 0.0]);
        }
    }

    normals
}
