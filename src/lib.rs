//! planet-flow
//!
//! A small real-time scene: a displaced, flat-shaded planet tumbling in front
//! of a fixed camera while a bird model, loaded in the background, circles
//! above it. Four parameters (displacement scale, bird height, bird pitch,
//! camera distance) can be tuned at runtime. Runs natively and in the browser.
//!
//! High-level modules
//! - `assets`: pending loads and the binding that attaches their result to the scene
//! - `bindings`: scene assembly and the parameter → entity reactions
//! - `camera`: projection, view matrix and camera uniforms
//! - `config`: defaults for parameters, assets, light and geometry
//! - `context`: window, device and GPU resources
//! - `controls`: keyboard control panel
//! - `data_structures`: entities, scene graph, sphere geometry, meshes and textures
//! - `driver`: the per-frame render loop state machine
//! - `flow`: winit integration and entry points
//! - `motion`: per-frame motion as pure functions of time
//! - `params`: the parameter store
//! - `pipelines`: planet, model and light pipelines
//! - `render`: the output surface trait and its GPU implementation
//! - `resources`: loading bytes, textures and glTF models
//! - `viewport`: logical size, aspect ratio and pixel-ratio capping
//!

pub mod assets;
pub mod bindings;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod driver;
pub mod flow;
pub mod motion;
pub mod params;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

pub use config::SceneConfig;
pub use flow::{ControlHandle, run, run_with};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use crate::{SceneConfig, flow::ControlHandle};

    thread_local! {
        static CONTROLS: RefCell<Option<ControlHandle>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        crate::flow::run_with(SceneConfig::default(), |handle| {
            CONTROLS.with(|controls| *controls.borrow_mut() = Some(handle));
        })
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
    }

    /// Write a parameter from the page, e.g. from a slider.
    #[wasm_bindgen]
    pub fn set_parameter(name: &str, value: f32) -> Result<(), JsValue> {
        CONTROLS.with(|controls| match controls.borrow().as_ref() {
            Some(handle) => handle
                .set(name, value)
                .map_err(|e| JsValue::from_str(&format!("{e:#}"))),
            None => Err(JsValue::from_str("scene is not running")),
        })
    }
}
