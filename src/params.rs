//! The parameter store.
//!
//! Named scalar values with on-change reactions. A write stores the new value
//! first and then runs every reaction registered for that name, in
//! registration order, before returning. Reactions receive the scene graph
//! explicitly, so they can only touch scene state while a write is being
//! applied, never during a tick.

use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::data_structures::scene_graph::SceneGraph;

pub const DISPLACEMENT_SCALE: &str = "displacement_scale";
pub const BIRD_HEIGHT: &str = "bird_height";
pub const BIRD_PITCH: &str = "bird_pitch";
pub const CAMERA_DISTANCE: &str = "camera_distance";

pub type Reaction = Box<dyn FnMut(f32, &mut SceneGraph)>;

struct Parameter {
    value: f32,
    reactions: Vec<Reaction>,
}

#[derive(Default)]
pub struct ParameterStore {
    parameters: HashMap<String, Parameter>,
    // registration order, for listing
    names: Vec<String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `name` with `initial`. Registering an existing name resets its
    /// value and keeps its reactions.
    pub fn register(&mut self, name: &str, initial: f32) {
        match self.parameters.get_mut(name) {
            Some(parameter) => parameter.value = initial,
            None => {
                self.parameters.insert(
                    name.to_string(),
                    Parameter {
                        value: initial,
                        reactions: Vec::new(),
                    },
                );
                self.names.push(name.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.parameters.get(name).map(|parameter| parameter.value)
    }

    pub fn on_change(
        &mut self,
        name: &str,
        reaction: impl FnMut(f32, &mut SceneGraph) + 'static,
    ) -> Result<()> {
        let parameter = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| anyhow!("cannot bind reaction to unknown parameter `{name}`"))?;
        parameter.reactions.push(Box::new(reaction));
        Ok(())
    }

    /// Write `value` and run the reactions of `name` against `scene`.
    ///
    /// Any finite or non-finite value is accepted; out-of-range input only
    /// shows up as a visual artifact.
    pub fn set(&mut self, name: &str, value: f32, scene: &mut SceneGraph) -> Result<()> {
        let parameter = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| anyhow!("unknown parameter `{name}`"))?;
        parameter.value = value;
        log::debug!("parameter {name} = {value}");
        for reaction in parameter.reactions.iter_mut() {
            reaction(value, scene);
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in &self.names {
            if let Some(parameter) = self.parameters.get(name) {
                map.entry(name, &format_args!(
                    "{} ({} reactions)",
                    parameter.value,
                    parameter.reactions.len()
                ));
            }
        }
        map.finish()
    }
}
