use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::{config::LightConfig, data_structures::entity::Entity};

/// A single directional light shining from the light entity towards the origin.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    // xyz: unit vector pointing towards the light, w unused
    direction: [f32; 4],
    // rgb: colour × intensity, w: ambient term
    color: [f32; 4],
}

impl LightUniform {
    pub fn new(config: &LightConfig, light: &Entity) -> Self {
        let mut uniform = Self {
            direction: [0.0, 0.0, 1.0, 0.0],
            color: [
                config.color[0] * config.intensity,
                config.color[1] * config.intensity,
                config.color[2] * config.intensity,
                config.ambient,
            ],
        };
        uniform.update_direction(light);
        uniform
    }

    pub fn update_direction(&mut self, light: &Entity) {
        let towards_light: Vector3<f32> = light.position;
        // A light sitting on its target has no direction, keep the previous one
        if towards_light.magnitude2() > f32::EPSILON {
            self.direction = towards_light.normalize().extend(0.0).into();
        }
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, light: &Entity) {
        self.uniform.update_direction(light);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_from_origin_to_light() {
        let light = Entity::from(Vector3::new(0.0, 0.0, 28.0));
        let uniform = LightUniform::new(&LightConfig::default(), &light);
        assert_eq!(uniform.direction, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn colour_is_scaled_by_intensity() {
        let config = LightConfig {
            color: [1.0, 0.5, 0.0],
            intensity: 0.5,
            ambient: 0.1,
            ..Default::default()
        };
        let uniform = LightUniform::new(&config, &Entity::from(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(uniform.color, [0.5, 0.25, 0.0, 0.1]);
    }

    #[test]
    fn light_at_origin_keeps_previous_direction() {
        let mut uniform =
            LightUniform::new(&LightConfig::default(), &Entity::from(Vector3::new(0.0, 3.0, 0.0)));
        uniform.update_direction(&Entity::new());
        assert_eq!(uniform.direction, [0.0, 1.0, 0.0, 0.0]);
    }
}
