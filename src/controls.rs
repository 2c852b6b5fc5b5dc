//! Keyboard control panel.
//!
//! Each parameter gets a pair of keys that nudge it up or down by a fixed
//! step. The panel only computes the new value; writing it goes through the
//! [`ParameterStore`] like every other mutation.

use winit::keyboard::KeyCode;

use crate::params::{BIRD_HEIGHT, BIRD_PITCH, CAMERA_DISTANCE, DISPLACEMENT_SCALE, ParameterStore};

#[derive(Clone, Debug, PartialEq)]
pub struct ControlBinding {
    pub parameter: &'static str,
    pub increase: KeyCode,
    pub decrease: KeyCode,
    pub step: f32,
}

/// A requested parameter write.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterChange {
    pub name: &'static str,
    pub value: f32,
}

#[derive(Clone, Debug)]
pub struct ControlPanel {
    bindings: Vec<ControlBinding>,
}

impl ControlPanel {
    pub fn new(bindings: Vec<ControlBinding>) -> Self {
        Self { bindings }
    }

    /// Q/A displacement, W/S bird height, E/D bird pitch, R/F camera distance.
    pub fn default_bindings() -> Self {
        Self::new(vec![
            ControlBinding {
                parameter: DISPLACEMENT_SCALE,
                increase: KeyCode::KeyQ,
                decrease: KeyCode::KeyA,
                step: 0.1,
            },
            ControlBinding {
                parameter: BIRD_HEIGHT,
                increase: KeyCode::KeyW,
                decrease: KeyCode::KeyS,
                step: 0.5,
            },
            ControlBinding {
                parameter: BIRD_PITCH,
                increase: KeyCode::KeyE,
                decrease: KeyCode::KeyD,
                step: 0.01,
            },
            ControlBinding {
                parameter: CAMERA_DISTANCE,
                increase: KeyCode::KeyR,
                decrease: KeyCode::KeyF,
                step: 0.5,
            },
        ])
    }

    pub fn bindings(&self) -> &[ControlBinding] {
        &self.bindings
    }

    /// The change a key press asks for, if the key is bound to a registered parameter.
    pub fn handle_key(&self, key: KeyCode, params: &ParameterStore) -> Option<ParameterChange> {
        self.bindings.iter().find_map(|binding| {
            let direction = if key == binding.increase {
                1.0
            } else if key == binding.decrease {
                -1.0
            } else {
                return None;
            };
            let current = params.get(binding.parameter)?;
            Some(ParameterChange {
                name: binding.parameter,
                value: current + direction * binding.step,
            })
        })
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::default_bindings()
    }
}
