//! Render pipelines and the uniforms they bind.
//!
//! Bind group 0 is per material, 1 is the camera, 2 is the light.

pub mod basic;
pub mod light;
pub mod planet;
