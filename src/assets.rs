//! Asynchronous asset binding.
//!
//! A load runs off the render loop and reports back over a one-shot channel.
//! The loop polls the receiving end, a [`PendingAsset`], once at the start of
//! every tick; the poll never blocks. [`AssetBinding`] turns a resolved model
//! into a scene entity and hands its GPU data to the Output Surface.

use std::f32::consts::PI;

use anyhow::{Result, anyhow};
use futures::channel::oneshot;

use crate::{
    data_structures::{entity::Entity, scene_graph::{EntityId, SceneGraph}},
    params::{BIRD_HEIGHT, BIRD_PITCH, ParameterStore},
    render::OutputSurface,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetState {
    Loading,
    Resolved,
    Failed,
}

/// Sending half of a pending load. Dropping it without sending fails the load.
pub struct AssetSender<T> {
    sender: oneshot::Sender<Result<T>>,
}

impl<T> AssetSender<T> {
    pub fn send(self, result: Result<T>) {
        // The receiver is gone only if the whole scene was torn down.
        if self.sender.send(result).is_err() {
            log::debug!("asset completed after its receiver was dropped");
        }
    }
}

pub struct PendingAsset<T> {
    label: String,
    state: AssetState,
    receiver: Option<oneshot::Receiver<Result<T>>>,
}

impl<T> PendingAsset<T> {
    pub fn channel(label: &str) -> (AssetSender<T>, PendingAsset<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            AssetSender { sender },
            PendingAsset {
                label: label.to_string(),
                state: AssetState::Loading,
                receiver: Some(receiver),
            },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Non-blocking check for completion.
    ///
    /// Returns the outcome exactly once, on the call that observes it; every
    /// other call returns `None`.
    pub fn poll(&mut self) -> Option<Result<T>> {
        let receiver = self.receiver.as_mut()?;
        let outcome = match receiver.try_recv() {
            Ok(None) => return None,
            Ok(Some(result)) => result,
            Err(oneshot::Canceled) => Err(anyhow!("loader for {} was dropped", self.label)),
        };
        self.receiver = None;
        self.state = match outcome {
            Ok(_) => AssetState::Resolved,
            Err(_) => AssetState::Failed,
        };
        Some(outcome)
    }
}

/// A decoded model: the entity extracted from its payload plus the data the
/// Output Surface needs to draw it.
pub struct LoadedModel<M> {
    pub entity: Entity,
    pub model: M,
}

/// Attaches one loaded model under a fixed identity.
pub struct AssetBinding<M> {
    id: EntityId,
    pending: PendingAsset<LoadedModel<M>>,
}

impl<M> AssetBinding<M> {
    pub fn new(id: EntityId, pending: PendingAsset<LoadedModel<M>>) -> Self {
        Self { id, pending }
    }

    pub fn state(&self) -> AssetState {
        self.pending.state()
    }

    /// Poll the load and, if it just resolved, attach it.
    ///
    /// Returns whether the entity was attached by this call.
    pub fn poll<S>(&mut self, scene: &mut SceneGraph, params: &ParameterStore, surface: &mut S) -> bool
    where
        S: OutputSurface<Model = M>,
    {
        match self.pending.poll() {
            None => false,
            Some(Ok(LoadedModel { mut entity, model })) => {
                place_initially(&mut entity, params);
                log::info!(
                    "{} ({}) attached at z = {}",
                    self.id,
                    self.pending.label(),
                    entity.position.z
                );
                surface.attach(self.id, model);
                scene.insert(self.id, entity);
                true
            }
            Some(Err(e)) => {
                log::error!(
                    "{} ({}) failed to load, continuing without it: {:#}",
                    self.id,
                    self.pending.label(),
                    e
                );
                false
            }
        }
    }
}

/// Fixed initial placement from the current bird parameters.
fn place_initially(entity: &mut Entity, params: &ParameterStore) {
    if let Some(height) = params.get(BIRD_HEIGHT) {
        entity.position.z = height;
    }
    if let Some(pitch) = params.get(BIRD_PITCH) {
        entity.rotation.x = cgmath::Rad(PI * pitch);
    }
}
