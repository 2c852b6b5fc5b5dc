#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use planet_flow::{
    assets::{AssetBinding, AssetSender, LoadedModel, PendingAsset},
    bindings::{build_scene, register_parameters},
    config::SceneConfig,
    data_structures::{
        entity::Entity,
        scene_graph::{EntityId, SceneGraph},
    },
    driver::{RenderLoop, TimeSource},
    params::ParameterStore,
    render::OutputSurface,
    viewport::Viewport,
};
use winit::dpi::PhysicalSize;

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub(crate) struct ManualClock(Rc<Cell<f32>>);

impl ManualClock {
    pub(crate) fn set(&self, seconds: f32) {
        self.0.set(seconds);
    }

    pub(crate) fn advance(&self, seconds: f32) {
        self.0.set(self.0.get() + seconds);
    }
}

impl TimeSource for ManualClock {
    fn elapsed(&self) -> f32 {
        self.0.get()
    }
}

/// Output surface that remembers what it was asked to do instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) frames: Vec<Vec<(EntityId, Entity)>>,
    pub(crate) attached: Vec<EntityId>,
    pub(crate) aspect: Option<f32>,
    pub(crate) target: Option<PhysicalSize<u32>>,
    pub(crate) resizes: usize,
    // Returned (once) by the next render
    pub(crate) fail_next: Option<wgpu::SurfaceError>,
}

impl RecordingSurface {
    pub(crate) fn last_frame(&self) -> &[(EntityId, Entity)] {
        self.frames.last().map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn entity_in_last_frame(&self, id: EntityId) -> Option<&Entity> {
        self.last_frame()
            .iter()
            .find(|(frame_id, _)| *frame_id == id)
            .map(|(_, entity)| entity)
    }
}

impl OutputSurface for RecordingSurface {
    type Model = ();

    fn attach(&mut self, id: EntityId, _model: ()) {
        self.attached.push(id);
    }

    fn resize(&mut self, viewport: &Viewport) {
        self.aspect = Some(viewport.aspect());
        self.target = Some(viewport.target_size());
        self.resizes += 1;
    }

    fn render(&mut self, scene: &SceneGraph) -> Result<(), wgpu::SurfaceError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.frames.push(
            scene
                .iter()
                .map(|(id, entity)| (id, entity.clone()))
                .collect(),
        );
        Ok(())
    }
}

/// Parameters and scene exactly as the application assembles them.
pub(crate) fn setup() -> (ParameterStore, SceneGraph) {
    let config = SceneConfig::default();
    let mut params = ParameterStore::new();
    register_parameters(&mut params, &config).expect("default parameters register");
    let scene = build_scene(&params, &config);
    (params, scene)
}

/// A started loop whose bird load is still pending.
pub(crate) fn started_loop(
    clock: &ManualClock,
) -> (RenderLoop<ManualClock, ()>, AssetSender<LoadedModel<()>>) {
    let (sender, pending) = PendingAsset::channel("bird");
    let mut driver = RenderLoop::new(clock.clone(), AssetBinding::new(EntityId::Bird, pending));
    assert!(driver.start());
    (driver, sender)
}

pub(crate) fn bird_model() -> LoadedModel<()> {
    LoadedModel {
        entity: Entity {
            parent_relative: true,
            ..Entity::new()
        },
        model: (),
    }
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
