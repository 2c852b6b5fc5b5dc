//! Transformable scene participants.
//!
//! An [`Entity`] carries position, orientation and scale plus an optional CPU
//! material. Its world matrix is packed into an [`EntityRaw`] and streamed to
//! the GPU as per-instance vertex data.

use cgmath::{Euler, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Material state that the render loop and the parameter bindings may mutate.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Distance each vertex is pushed along its normal per unit of displacement map.
    pub displacement_scale: f32,
    pub flat_shading: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            displacement_scale: 0.0,
            flat_shading: true,
        }
    }
}

/// A positioned, oriented participant of the scene.
///
/// `rotation` holds XYZ Euler angles: the rotation matrix is `Rx * Ry * Rz`.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
    pub material: Option<Material>,
    /// Set for entities whose transform is relative to a parent node of their source asset.
    pub parent_relative: bool,
}

impl Entity {
    /// Create an entity with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
            material: None,
            parent_relative: false,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_x(self.rotation.x)
            * Matrix3::from_angle_y(self.rotation.y)
            * Matrix3::from_angle_z(self.rotation.z)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> EntityRaw {
        let world_matrix = self.to_matrix();
        let handedness = world_matrix.determinant().signum();
        EntityRaw {
            model: world_matrix.into(),
            normal: self.rotation_matrix().into(),
            handedness,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Entity {
    fn from(position: Vector3<f32>) -> Self {
        Entity {
            position,
            ..Default::default()
        }
    }
}

/**
 * The raw entity is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
}

/**
 * Stride layout: the world matrix as four vec4s, the normal matrix as three
 * vec3s and the handedness sign. Locations 5..=12 are shared by every pipeline.
 */
impl model::Vertex for EntityRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<EntityRaw>() as wgpu::BufferAddress,
            // One entry per drawn entity, not per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}
