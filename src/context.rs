use std::{collections::HashMap, sync::Arc};

use anyhow::{Context as _, anyhow};
use cgmath::{Deg, Vector3};
use winit::window::Window;

use crate::{
    camera::{CameraResources, Projection},
    config::SceneConfig,
    data_structures::{entity::Entity, scene_graph::EntityId, sphere::SphereGeometry, texture},
    pipelines::{
        basic::{diffuse_layout, mk_model_pipeline},
        light::{LightResources, LightUniform},
        planet::{self, Planet},
    },
    render::Instanced,
    resources::load_texture_or_solid,
};

/// Window, device and every GPU resource the scene is drawn with.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub(crate) is_surface_configured: bool,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub planet: Planet,
    pub model_pipeline: wgpu::RenderPipeline,
    pub models: HashMap<EntityId, Instanced>,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, scene_config: &SceneConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("could not open the GPU device")?;

        log::info!("Surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface texture
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let projection = Projection::new(
            config.width as f32 / config.height as f32,
            Deg(scene_config.fovy_degrees),
            scene_config.znear,
            scene_config.zfar,
        );
        let camera = CameraResources::new(&device, projection);

        let light_entity = Entity::from(Vector3::from(scene_config.light.position));
        let light = LightResources::new(
            &device,
            LightUniform::new(&scene_config.light, &light_entity),
        );

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        log::info!("Planet");
        let assets = &scene_config.assets;
        // black displacement is flat, white albedo is neutral
        let displacement_map = load_texture_or_solid(
            &assets.root,
            &assets.displacement_map,
            true,
            [0, 0, 0, 255],
            &device,
            &queue,
        )
        .await;
        let color_map = load_texture_or_solid(
            &assets.root,
            &assets.color_map,
            false,
            [255, 255, 255, 255],
            &device,
            &queue,
        )
        .await;
        let planet_layout = planet::mk_bind_group_layout(&device);
        let planet_pipeline = planet::mk_planet_pipeline(
            &device,
            &config,
            &planet_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let geometry = SphereGeometry::new(
            scene_config.sphere_radius,
            scene_config.sphere_width_segments,
            scene_config.sphere_height_segments,
        );
        let planet = Planet::new(
            &device,
            &geometry,
            &displacement_map,
            &color_map,
            scene_config.parameters.displacement_scale,
            planet_pipeline,
            &planet_layout,
        );

        let model_pipeline = mk_model_pipeline(
            &device,
            &config,
            &diffuse_layout(&device),
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );

        Ok(Self {
            window,
            depth_texture,
            is_surface_configured: false,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            planet,
            model_pipeline,
            models: HashMap::new(),
            clear_colour: scene_config.clear_colour,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}
