//! Host integration and application event loop.
//!
//! This module wires the scene into winit: it creates the window (or binds
//! the page's canvas), builds the GPU context, issues the bird load, and then
//! drives the [`RenderLoop`] from the host's redraw signal.
//!
//! # User-facing types
//!
//! - [`run`] / [`run_with`] start the application and block until it exits
//! - [`ControlHandle`] lets code outside the loop write parameters
//!
//! # Lifecycle Flow
//!
//! 1. `resumed`: create the window and context, build the scene, start the load
//! 2. First configure: size the surface from the viewport, arm the loop
//! 3. Every `RedrawRequested`: one tick, then request the next redraw
//! 4. Between redraws: resize, keyboard and parameter events are applied
//!    synchronously, so every tick sees a settled scene

use std::sync::Arc;

use anyhow::anyhow;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    assets::{AssetBinding, AssetSender, LoadedModel, PendingAsset},
    bindings::{build_scene, register_parameters},
    config::SceneConfig,
    context::Context,
    controls::ControlPanel,
    data_structures::{
        model::Model,
        scene_graph::{EntityId, SceneGraph},
    },
    driver::{Clock, RenderLoop},
    params::ParameterStore,
    render::OutputSurface,
    resources::load_model_gltf,
    viewport::Viewport,
};

/// Events delivered to the loop thread through the [`EventLoopProxy`].
pub enum FlowEvent {
    /// The asynchronously built application state (web only).
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    SetParameter {
        name: String,
        value: f32,
    },
    Exit,
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::SetParameter { name, value } => f
                .debug_struct("SetParameter")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

/// Cloneable handle for writing parameters from outside the event loop.
///
/// Writes are queued as user events and applied on the loop thread between
/// two ticks.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    proxy: EventLoopProxy<FlowEvent>,
}

impl ControlHandle {
    pub fn set(&self, name: &str, value: f32) -> anyhow::Result<()> {
        self.proxy
            .send_event(FlowEvent::SetParameter {
                name: name.to_string(),
                value,
            })
            .map_err(|_| anyhow!("event loop is closed, {name} was not set"))
    }

    pub fn exit(&self) -> anyhow::Result<()> {
        self.proxy
            .send_event(FlowEvent::Exit)
            .map_err(|_| anyhow!("event loop is already closed"))
    }
}

/// Everything that exists once the context is up.
pub struct AppState {
    ctx: Context,
    scene: SceneGraph,
    params: ParameterStore,
    driver: RenderLoop<Clock, Model>,
    viewport: Viewport,
    controls: ControlPanel,
}

impl AppState {
    fn new(
        ctx: Context,
        config: &SceneConfig,
    ) -> anyhow::Result<(Self, AssetSender<LoadedModel<Model>>)> {
        let mut params = ParameterStore::new();
        register_parameters(&mut params, config)?;
        let scene = build_scene(&params, config);

        let (sender, pending) = PendingAsset::channel(&config.assets.bird_model);
        let driver = RenderLoop::new(Clock::new(), AssetBinding::new(EntityId::Bird, pending));

        let viewport = Viewport::with_max_pixel_ratio(
            ctx.window.inner_size(),
            ctx.window.scale_factor(),
            config.max_pixel_ratio,
        );

        Ok((
            Self {
                ctx,
                scene,
                params,
                driver,
                viewport,
                controls: ControlPanel::default(),
            },
            sender,
        ))
    }

    /// Configure the surface for the first time and arm the loop.
    fn on_ready(&mut self) {
        self.ctx.resize(&self.viewport);
        self.driver.start();
        self.ctx.window.request_redraw();
    }

    fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        if self.viewport.resize(physical, scale_factor) {
            self.ctx.resize(&self.viewport);
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) {
        if let Err(e) = self.params.set(name, value, &mut self.scene) {
            log::error!("{e:#}");
        }
    }

    fn redraw(&mut self) {
        match self
            .driver
            .tick(&mut self.scene, &self.params, &mut self.ctx)
        {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.ctx.resize(&self.viewport);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
        self.ctx.window.request_redraw();
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<FlowEvent>,
    // Taken by the first `resumed`
    config: Option<SceneConfig>,
    state: Option<AppState>,
    // Parameter writes that arrived before the state existed
    queued: Vec<(String, f32)>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
            queued: Vec::new(),
        })
    }

    fn install(&mut self, mut state: AppState) {
        for (name, value) in self.queued.drain(..) {
            state.set_parameter(&name, value);
        }
        state.on_ready();
        self.state = Some(state);
    }

    /// Issue the bird load on the runtime; the result arrives over `sender`.
    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_bird_load(
        &self,
        sender: AssetSender<LoadedModel<Model>>,
        ctx: &Context,
        config: &SceneConfig,
    ) {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let root = config.assets.root.clone();
        let path = config.assets.bird_model.clone();
        log::info!("loading {path}");
        self.async_runtime.spawn(async move {
            let result = load_model_gltf(&root, &path, &device, &queue).await;
            sender.send(result);
        });
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("planet");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(&config.canvas_id))
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => log::error!("no canvas with id {}", config.canvas_id),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let init = async {
                let ctx = Context::new(window, &config).await?;
                AppState::new(ctx, &config)
            };
            match self.async_runtime.block_on(init) {
                Ok((state, sender)) => {
                    self.spawn_bird_load(sender, &state.ctx, &config);
                    self.install(state);
                }
                Err(e) => {
                    log::error!("App initialization failed: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let init = async {
                    let ctx = Context::new(window, &config).await?;
                    AppState::new(ctx, &config)
                };
                match init.await {
                    Ok((state, sender)) => {
                        let device = state.ctx.device.clone();
                        let queue = state.ctx.queue.clone();
                        let root = config.assets.root.clone();
                        let path = config.assets.bird_model.clone();
                        log::info!("loading {path}");
                        wasm_bindgen_futures::spawn_local(async move {
                            sender.send(load_model_gltf(&root, &path, &device, &queue).await);
                        });
                        if proxy.send_event(FlowEvent::Initialized(Box::new(state))).is_err() {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(state) => {
                // This is the message from our wasm `spawn_local`
                self.install(*state);
            }
            FlowEvent::SetParameter { name, value } => match &mut self.state {
                Some(state) => state.set_parameter(&name, value),
                None => self.queued.push((name, value)),
            },
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size, scale_factor);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(change) = state.controls.handle_key(code, &state.params) {
                    log::info!("{} -> {}", change.name, change.value);
                    state.set_parameter(change.name, change.value);
                }
            }
            WindowEvent::RedrawRequested => state.redraw(),
            _ => {}
        }
    }
}

/// Run the scene with `config` until the window is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    run_with(config, |_| {})
}

/// Like [`run`], handing `on_start` a [`ControlHandle`] before the loop starts.
pub fn run_with(config: SceneConfig, on_start: impl FnOnce(ControlHandle)) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // Fails only if a logger is already installed
        let _ = console_log::init_with_level(log::Level::Info);
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    on_start(ControlHandle {
        proxy: event_loop.create_proxy(),
    });

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
