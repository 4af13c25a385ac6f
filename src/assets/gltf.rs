use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use glam::{Mat3, Mat4, Quat, Vec3};
use gltf::buffer::Source;
use gltf::mesh::Mode;
use gltf::Gltf;

use super::source::{sibling_path, AssetSource};
use super::AssetError;
use crate::config::AssetDescriptor;
use crate::model::{Mesh, Vertex};

/// Load a `.gltf`/`.glb` file and flatten every triangle primitive of its
/// scene into one world-space mesh. Node transforms are applied, then the
/// descriptor's scale and translation.
pub async fn load_model<S: AssetSource>(source: &S, desc: &AssetDescriptor) -> Result<Mesh, AssetError> {
    let bytes = source.read(&desc.path).await?;
    let gltf = Gltf::from_slice(&bytes).map_err(|source| AssetError::Gltf {
        path: desc.path.clone(),
        source,
    })?;
    let buffers = resolve_buffers(source, &desc.path, &gltf).await?;

    let root = Mat4::from_scale_rotation_translation(desc.scale, Quat::IDENTITY, desc.translation);
    let mut out = Mesh::empty();

    match gltf.document.default_scene().or_else(|| gltf.document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                flatten_node(&node, root, &buffers, desc, &mut out);
            }
        }
        None => {
            // No scene graph: take meshes as they are
            for mesh in gltf.document.meshes() {
                append_mesh(&mesh, root, &buffers, desc, &mut out);
            }
        }
    }

    if out.is_empty() {
        return Err(AssetError::NoGeometry(desc.path.clone()));
    }
    Ok(out)
}

async fn resolve_buffers<S: AssetSource>(source: &S, path: &str, gltf: &Gltf) -> Result<Vec<Vec<u8>>, AssetError> {
    let mut buffers = Vec::new();
    for buffer in gltf.document.buffers() {
        let data = match buffer.source() {
            Source::Bin => gltf.blob.clone().unwrap_or_default(),
            Source::Uri(uri) if uri.starts_with("data:") => {
                let (_, payload) = uri.split_once(";base64,").ok_or_else(|| AssetError::UnsupportedUri {
                    path: path.to_string(),
                    uri: uri.chars().take(48).collect(),
                })?;
                BASE64.decode(payload).map_err(|source| AssetError::Base64 {
                    path: path.to_string(),
                    source,
                })?
            }
            Source::Uri(uri) => source.read(&sibling_path(path, uri)).await?,
        };

        if data.len() < buffer.length() {
            return Err(AssetError::ShortBuffer { path: path.to_string(), index: buffer.index() });
        }
        buffers.push(data);
    }
    Ok(buffers)
}

fn flatten_node(node: &gltf::Node, parent: Mat4, buffers: &[Vec<u8>], desc: &AssetDescriptor, out: &mut Mesh) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        append_mesh(&mesh, world, buffers, desc, out);
    }
    for child in node.children() {
        flatten_node(&child, world, buffers, desc, out);
    }
}

fn append_mesh(mesh: &gltf::Mesh, world: Mat4, buffers: &[Vec<u8>], desc: &AssetDescriptor, out: &mut Mesh) {
    let linear = Mat3::from_mat4(world);
    let det = linear.determinant();
    let normal_matrix = if det.abs() > f32::EPSILON {
        linear.inverse().transpose()
    } else {
        Mat3::IDENTITY
    };

    for prim in mesh.primitives() {
        if prim.mode() != Mode::Triangles {
            tracing::debug!(model = %desc.name, mode = ?prim.mode(), "skipping non-triangle primitive");
            continue;
        }

        let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.as_slice()));
        let Some(positions) = reader.read_positions() else { continue };
        let positions: Vec<Vec3> = positions.map(|p| world.transform_point3(Vec3::from(p))).collect();
        let count = positions.len() as u32;

        let mut indices: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().collect(),
            None => (0..count).collect(),
        };
        if indices.iter().any(|&i| i >= count) {
            tracing::warn!(model = %desc.name, "primitive index out of range, skipped");
            continue;
        }
        indices.truncate(indices.len() - indices.len() % 3);
        if det < 0.0 {
            // Mirroring transform flips winding
            for tri in indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
                .collect(),
            None => face_normals(&positions, &indices),
        };

        let color = desc
            .color_override
            .unwrap_or_else(|| prim.material().pbr_metallic_roughness().base_color_factor());

        let vertices = positions
            .iter()
            .zip(normals.iter().chain(std::iter::repeat(&Vec3::Y)))
            .map(|(p, n)| Vertex { pos: p.to_array(), normal: n.to_array(), color })
            .collect();

        out.append(Mesh { vertices, indices });
    }
}

/// Smooth normals from adjacent face normals, for primitives that ship without any
fn face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { Vec3::Y } else { n }
        })
        .collect()
}
