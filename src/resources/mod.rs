//! Loading of external assets: raw bytes, images and glTF models.
//!
//! Paths are relative to an asset root. Natively the root is a directory,
//! on the web a path below the page origin fetched over HTTP.

pub mod gltf_model;
pub mod texture;

pub use gltf_model::load_model_gltf;
pub use texture::{load_binary, load_texture, load_texture_or_solid};
