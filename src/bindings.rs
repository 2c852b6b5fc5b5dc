//! Scene assembly and the parameter → scene bindings.
//!
//! [`register_parameters`] seeds the store with the four tunables and wires
//! each one to the entity field it drives. [`build_scene`] creates the initial
//! entities from the current parameter values.

use std::f32::consts::PI;

use anyhow::Result;
use cgmath::Vector3;

use crate::{
    config::SceneConfig,
    data_structures::{
        entity::{Entity, Material},
        scene_graph::{EntityId, SceneGraph},
    },
    params::{BIRD_HEIGHT, BIRD_PITCH, CAMERA_DISTANCE, DISPLACEMENT_SCALE, ParameterStore},
};

pub fn register_parameters(params: &mut ParameterStore, config: &SceneConfig) -> Result<()> {
    let defaults = &config.parameters;
    params.register(DISPLACEMENT_SCALE, defaults.displacement_scale);
    params.register(BIRD_HEIGHT, defaults.bird_height);
    params.register(BIRD_PITCH, defaults.bird_pitch);
    params.register(CAMERA_DISTANCE, defaults.camera_distance);

    params.on_change(DISPLACEMENT_SCALE, |value, scene| {
        if let Some(material) = scene
            .get_mut(EntityId::Sphere)
            .and_then(|sphere| sphere.material.as_mut())
        {
            material.displacement_scale = value;
        }
    })?;
    params.on_change(BIRD_HEIGHT, |value, scene| {
        if let Some(bird) = scene.get_mut(EntityId::Bird) {
            bird.position.z = value;
        }
    })?;
    params.on_change(BIRD_PITCH, |value, scene| {
        if let Some(bird) = scene.get_mut(EntityId::Bird) {
            bird.rotation.x = cgmath::Rad(PI * value);
        }
    })?;
    params.on_change(CAMERA_DISTANCE, |value, scene| {
        if let Some(camera) = scene.get_mut(EntityId::Camera) {
            camera.position.z = value;
        }
    })?;
    Ok(())
}

/// The sphere, the light and the camera. The bird joins later, once its model
/// has loaded.
pub fn build_scene(params: &ParameterStore, config: &SceneConfig) -> SceneGraph {
    let mut scene = SceneGraph::new();

    let displacement_scale = params
        .get(DISPLACEMENT_SCALE)
        .unwrap_or(config.parameters.displacement_scale);
    scene.insert(
        EntityId::Sphere,
        Entity::new().with_material(Material {
            displacement_scale,
            flat_shading: true,
        }),
    );

    scene.insert(
        EntityId::Light,
        Entity::from(Vector3::from(config.light.position)),
    );

    let camera_distance = params
        .get(CAMERA_DISTANCE)
        .unwrap_or(config.parameters.camera_distance);
    scene.insert(
        EntityId::Camera,
        Entity::from(Vector3::new(0.0, 0.0, camera_distance)),
    );

    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ParameterStore, SceneGraph) {
        let config = SceneConfig::default();
        let mut params = ParameterStore::new();
        register_parameters(&mut params, &config).unwrap();
        let scene = build_scene(&params, &config);
        (params, scene)
    }

    #[test]
    fn scene_starts_without_bird() {
        let (params, scene) = setup();
        assert_eq!(params.len(), 4);
        assert!(scene.contains(EntityId::Sphere));
        assert!(scene.contains(EntityId::Light));
        assert!(scene.contains(EntityId::Camera));
        assert!(!scene.contains(EntityId::Bird));
    }

    #[test]
    fn initial_state_reflects_defaults() {
        let (_, scene) = setup();
        let sphere = scene.get(EntityId::Sphere).unwrap();
        assert_eq!(sphere.material.as_ref().unwrap().displacement_scale, -4.0);
        assert_eq!(scene.get(EntityId::Camera).unwrap().position.z, 31.0);
        assert_eq!(scene.get(EntityId::Light).unwrap().position.z, 28.0);
    }

    #[test]
    fn bird_parameters_without_bird_are_harmless() {
        let (mut params, mut scene) = setup();
        params.set(BIRD_HEIGHT, 30.0, &mut scene).unwrap();
        params.set(BIRD_PITCH, 0.5, &mut scene).unwrap();
        assert!(!scene.contains(EntityId::Bird));
        assert_eq!(params.get(BIRD_HEIGHT), Some(30.0));
    }

    #[test]
    fn bird_pitch_reaction_writes_rotation() {
        let (mut params, mut scene) = setup();
        scene.insert(EntityId::Bird, Entity::new());
        params.set(BIRD_PITCH, 0.5, &mut scene).unwrap();
        let bird = scene.get(EntityId::Bird).unwrap();
        assert!((bird.rotation.x.0 - PI * 0.5).abs() < 1e-6);
    }
}
