//! Scene data: entities, the scene graph store, and GPU meshes/textures.
//!
//! - `entity` is a transformable scene participant and its GPU-packed form
//! - `scene_graph` is the store that owns all entities by identity
//! - `model` contains mesh and material definitions for loaded models
//! - `sphere` generates the planet's UV sphere
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod entity;
pub mod model;
pub mod scene_graph;
pub mod sphere;
pub mod texture;
