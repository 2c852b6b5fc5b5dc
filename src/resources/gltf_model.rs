//! glTF model loading.
//!
//! The first root node of the default scene becomes the entity: its local
//! transform is decomposed into the entity's position, rotation and scale.
//! Everything below it is flattened into that node's space, so the model's
//! vertex data already contains the transforms of all descendant nodes.

use anyhow::{Context as _, Result, anyhow, bail};
use cgmath::{
    EuclideanSpace, Euler, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Quaternion, SquareMatrix,
    Transform, Vector3,
};
use wgpu::util::DeviceExt;

use crate::{
    assets::LoadedModel,
    data_structures::{
        entity::Entity,
        model::{self, ModelVertex},
        texture::Texture,
    },
    pipelines::basic::diffuse_layout,
    resources::texture::{load_binary, load_texture},
};

/// CPU-side geometry of one glTF primitive, already in the root node's space.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into the document's materials, if the primitive names one.
    pub material: Option<usize>,
}

/// Pull the first root node of the default scene out of a decoded document.
///
/// Fails if the payload has no scene, the scene has no nodes, or the node
/// (including its descendants) carries no triangle geometry.
pub fn extract_first_node(
    document: &::gltf::Document,
    buffers: &[Vec<u8>],
) -> Result<(Entity, Vec<MeshData>)> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| anyhow!("payload contains no scene"))?;
    let node = scene
        .nodes()
        .next()
        .ok_or_else(|| anyhow!("scene {} has no nodes", scene.index()))?;

    let entity = node_entity(&node);
    let mut meshes = Vec::new();
    collect_meshes(&node, Matrix4::identity(), buffers, &mut meshes)?;
    if meshes.is_empty() {
        bail!(
            "node {} ({}) has no meshes",
            node.index(),
            node.name().unwrap_or("unnamed")
        );
    }
    Ok((entity, meshes))
}

fn node_entity(node: &::gltf::Node) -> Entity {
    let (translation, [x, y, z, w], scale) = node.transform().decomposed();
    Entity {
        position: translation.into(),
        rotation: Euler::from(Quaternion::new(w, x, y, z)),
        scale: scale.into(),
        material: None,
        parent_relative: true,
    }
}

fn collect_meshes(
    node: &::gltf::Node,
    transform: Matrix4<f32>,
    buffers: &[Vec<u8>],
    out: &mut Vec<MeshData>,
) -> Result<()> {
    if let Some(mesh) = node.mesh() {
        let normal_matrix = normal_matrix(&transform);
        for primitive in mesh.primitives() {
            if primitive.mode() != ::gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping non-triangle primitive {} of mesh {}",
                    primitive.index(),
                    mesh.index()
                );
                continue;
            }
            let name = format!("{}#{}", mesh.name().unwrap_or("mesh"), primitive.index());
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| anyhow!("{name} has no positions"))?
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                bail!("{name} references vertex {bad} of {}", positions.len());
            }
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().collect())
                .filter(|tc: &Vec<[f32; 2]>| tc.len() == positions.len())
                .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .filter(|n: &Vec<[f32; 3]>| n.len() == positions.len())
                .unwrap_or_else(|| compute_normals(&positions, &indices));

            let vertices = positions
                .iter()
                .zip(tex_coords)
                .zip(normals)
                .map(|((position, tex_coords), normal)| {
                    let position = transform.transform_point(Point3::from(*position));
                    let normal = normal_matrix * Vector3::from(normal);
                    ModelVertex {
                        position: position.to_vec().into(),
                        tex_coords,
                        normal: safe_normalize(normal).into(),
                    }
                })
                .collect();

            out.push(MeshData {
                name,
                vertices,
                indices,
                material: primitive.material().index(),
            });
        }
    }
    for child in node.children() {
        let child_transform = transform * Matrix4::from(child.transform().matrix());
        collect_meshes(&child, child_transform, buffers, out)?;
    }
    Ok(())
}

fn normal_matrix(transform: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(
        transform.x.truncate(),
        transform.y.truncate(),
        transform.z.truncate(),
    );
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

fn safe_normalize(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON {
        v.normalize()
    } else {
        Vector3::unit_y()
    }
}

/// Area-weighted vertex normals for meshes exported without them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let pa = Vector3::from(positions[a]);
        let pb = Vector3::from(positions[b]);
        let pc = Vector3::from(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.into_iter().map(|n| safe_normalize(n).into()).collect()
}

fn sibling(base_dir: &str, uri: &str) -> String {
    if base_dir.is_empty() {
        uri.to_string()
    } else {
        format!("{base_dir}/{uri}")
    }
}

/// Load a `.gltf` or `.glb` from the asset root and upload it.
pub async fn load_model_gltf(
    root: &str,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<LoadedModel<model::Model>> {
    let bytes = load_binary(root, file_name).await?;
    let gltf = ::gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("{file_name} is not a valid glTF payload"))?;
    let base_dir = file_name.rsplit_once('/').map_or("", |(dir, _)| dir);

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            ::gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| anyhow!("{file_name} references a missing binary chunk"))?;
                buffer_data.push(blob.to_vec());
            }
            ::gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("{file_name}: embedded data URIs are not supported");
            }
            ::gltf::buffer::Source::Uri(uri) => {
                buffer_data.push(load_binary(root, &sibling(base_dir, uri)).await?);
            }
        }
    }

    let (entity, meshes) = extract_first_node(&gltf.document, &buffer_data)
        .with_context(|| format!("could not extract a model from {file_name}"))?;

    let layout = diffuse_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let name = material.name().unwrap_or(file_name);
        let texture = match pbr.base_color_texture() {
            None => None,
            Some(info) => match info.texture().source().source() {
                ::gltf::image::Source::View { view, mime_type } => {
                    let start = view.offset();
                    let end = start + view.length();
                    buffer_data
                        .get(view.buffer().index())
                        .and_then(|data| data.get(start..end))
                        .ok_or_else(|| anyhow!("image view of {name} is out of bounds"))
                        .and_then(|bytes| {
                            Texture::from_bytes(
                                device,
                                queue,
                                bytes,
                                name,
                                mime_type.split('/').next_back(),
                                false,
                            )
                        })
                        .map_err(|e| log::error!("base colour of {name}: {e:#}"))
                        .ok()
                }
                ::gltf::image::Source::Uri { uri, mime_type } => load_texture(
                    root,
                    &sibling(base_dir, uri),
                    false,
                    device,
                    queue,
                    mime_type.and_then(|mt| mt.split('/').next_back()),
                )
                .await
                .map_err(|e| log::error!("base colour of {name}: {e:#}"))
                .ok(),
            },
        };
        let texture = texture.unwrap_or_else(|| {
            Texture::create_solid(factor_to_rgba(pbr.base_color_factor()), false, device, queue, name)
        });
        materials.push(model::Material::new(device, name, texture, &layout));
    }
    let default_material = materials.len();
    materials.push(model::Material::new(
        device,
        "default",
        Texture::create_solid([255; 4], false, device, queue, "default"),
        &layout,
    ));

    let meshes: Vec<model::Mesh> = meshes
        .into_iter()
        .map(|data| {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", data.name)),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", data.name)),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            model::Mesh {
                name: data.name,
                vertex_buffer,
                index_buffer,
                num_elements: data.indices.len() as u32,
                material: data.material.unwrap_or(default_material),
            }
        })
        .collect();

    log::info!(
        "loaded {file_name}: {} meshes, {} materials",
        meshes.len(),
        materials.len()
    );
    Ok(LoadedModel {
        entity,
        model: model::Model { meshes, materials },
    })
}

fn factor_to_rgba(factor: [f32; 4]) -> [u8; 4] {
    factor.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}
