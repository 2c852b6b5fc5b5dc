//! The displaced sphere: geometry, material bindings and pipeline.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    entity::{Entity, EntityRaw},
    model::{ModelVertex, Vertex},
    sphere::SphereGeometry,
    texture::{self, Texture},
};

use super::basic::mk_render_pipeline;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    _pad: [f32; 2],
}

impl SurfaceUniform {
    pub fn new(displacement_scale: f32) -> Self {
        Self {
            displacement_scale,
            displacement_bias: 0.0,
            _pad: [0.0; 2],
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            texture_entry(0),
            sampler_entry(1),
            texture_entry(2),
            sampler_entry(3),
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("planet_bind_group_layout"),
    })
}

pub fn mk_planet_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    planet_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Planet Pipeline Layout"),
        bind_group_layouts: &[
            planet_layout,
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Planet Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("planet.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        Some(wgpu::Face::Back),
        &[ModelVertex::desc(), EntityRaw::desc()],
        shader,
    )
}

/// Everything needed to draw the sphere in one call.
#[derive(Debug)]
pub struct Planet {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub instance_buffer: wgpu::Buffer,
    pub surface: SurfaceUniform,
    pub surface_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub pipeline: wgpu::RenderPipeline,
}

impl Planet {
    /// `displacement_map` is sampled linearly (red channel), `color_map` as sRGB.
    pub fn new(
        device: &wgpu::Device,
        geometry: &SphereGeometry,
        displacement_map: &Texture,
        color_map: &Texture,
        displacement_scale: f32,
        pipeline: wgpu::RenderPipeline,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Planet Vertex Buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Planet Index Buffer"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Planet Instance Buffer"),
            contents: bytemuck::cast_slice(&[Entity::new().to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let surface = SurfaceUniform::new(displacement_scale);
        let surface_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Planet Surface Buffer"),
            contents: bytemuck::cast_slice(&[surface]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let displacement_sampler = displacement_map
            .sampler
            .clone()
            .unwrap_or_else(|| texture::create_default_sampler(device));
        let color_sampler = color_map
            .sampler
            .clone()
            .unwrap_or_else(|| texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&displacement_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&displacement_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&color_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&color_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: surface_buffer.as_entire_binding(),
                },
            ],
            label: Some("planet_bind_group"),
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
            instance_buffer,
            surface,
            surface_buffer,
            bind_group,
            pipeline,
        }
    }

    /// Upload the sphere's transform and, if it changed, its displacement scale.
    pub fn write(&mut self, queue: &wgpu::Queue, sphere: &Entity) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[sphere.to_raw()]),
        );
        let scale = sphere
            .material
            .as_ref()
            .map(|m| m.displacement_scale)
            .unwrap_or(0.0);
        if scale != self.surface.displacement_scale {
            self.surface.displacement_scale = scale;
            queue.write_buffer(&self.surface_buffer, 0, bytemuck::cast_slice(&[self.surface]));
        }
    }

    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_bind_group(1, camera_bind_group, &[]);
        render_pass.set_bind_group(2, light_bind_group, &[]);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}
