//! The Output Surface: where a frame of the scene ends up.
//!
//! The render loop only talks to [`OutputSurface`]. The GPU [`Context`]
//! implements it by uploading the scene's transforms and drawing every
//! renderable entity in one pass; tests implement it with a recorder.
//!
//! # Key types
//!
//! - [`OutputSurface`] is the seam between the loop and the renderer
//! - [`Instanced`] is a loaded model together with the instance buffer that
//!   carries its entity's transform

use std::iter;

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        entity::Entity,
        model::{DrawModel, Model},
        scene_graph::{EntityId, SceneGraph},
        texture::Texture,
    },
    viewport::Viewport,
};

pub trait OutputSurface {
    /// GPU-side data of a loaded model.
    type Model;

    /// Make a loaded model drawable under `id`. The model is drawn with the
    /// transform of the scene entity of the same id, whenever that entity exists.
    fn attach(&mut self, id: EntityId, model: Self::Model);

    /// Match the render target and projection to the viewport.
    fn resize(&mut self, viewport: &Viewport);

    /// Draw the scene as it is now and present it.
    fn render(&mut self, scene: &SceneGraph) -> Result<(), wgpu::SurfaceError>;
}

/// A model plus its single-entry instance buffer.
#[derive(Debug)]
pub struct Instanced {
    pub model: Model,
    pub instance: wgpu::Buffer,
}

impl Instanced {
    pub fn new(device: &wgpu::Device, model: Model) -> Self {
        let instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[Entity::new().to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self { model, instance }
    }

    pub fn write(&self, queue: &wgpu::Queue, entity: &Entity) {
        queue.write_buffer(&self.instance, 0, bytemuck::cast_slice(&[entity.to_raw()]));
    }
}

impl OutputSurface for Context {
    type Model = Model;

    fn attach(&mut self, id: EntityId, model: Model) {
        let instanced = Instanced::new(&self.device, model);
        if self.models.insert(id, instanced).is_some() {
            log::warn!("replaced the model attached to {id}");
        }
    }

    fn resize(&mut self, viewport: &Viewport) {
        let target = viewport.target_size();
        self.config.width = target.width;
        self.config.height = target.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
        self.camera.projection.set_aspect(viewport.aspect());
        self.is_surface_configured = true;
        log::debug!(
            "surface configured to {}x{} (aspect {:.3})",
            target.width,
            target.height,
            viewport.aspect()
        );
    }

    fn render(&mut self, scene: &SceneGraph) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        if let Some(camera) = scene.get(EntityId::Camera) {
            self.camera.write(&self.queue, camera);
        }
        if let Some(light) = scene.get(EntityId::Light) {
            self.light.write(&self.queue, light);
        }
        let planet_visible = match scene.get(EntityId::Sphere) {
            Some(sphere) => {
                self.planet.write(&self.queue, sphere);
                true
            }
            None => false,
        };
        for (id, instanced) in &self.models {
            if let Some(entity) = scene.get(*id) {
                instanced.write(&self.queue, entity);
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if planet_visible {
                self.planet.draw(
                    &mut render_pass,
                    &self.camera.bind_group,
                    &self.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.model_pipeline);
            for (id, instanced) in &self.models {
                // Attached but not (or no longer) in the scene
                if !scene.contains(*id) {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    &instanced.model,
                    0..1,
                    &self.camera.bind_group,
                    &self.light.bind_group,
                );
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
