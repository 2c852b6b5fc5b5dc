use std::f32::consts::PI;

use planet_flow::{
    data_structures::scene_graph::EntityId,
    params::{BIRD_HEIGHT, BIRD_PITCH, CAMERA_DISTANCE, DISPLACEMENT_SCALE},
};

use crate::common::test_utils::{ManualClock, RecordingSurface, approx, bird_model, setup, started_loop};

mod common;

#[test]
fn displacement_change_reaches_the_sphere_before_the_next_frame() {
    let clock = ManualClock::default();
    let (mut driver, _sender) = started_loop(&clock);
    let (mut params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    params.set(DISPLACEMENT_SCALE, -2.0, &mut scene).unwrap();
    let material = scene.get(EntityId::Sphere).unwrap().material.clone().unwrap();
    assert_eq!(material.displacement_scale, -2.0);

    driver.tick(&mut scene, &params, &mut surface).unwrap();
    let sphere = surface.entity_in_last_frame(EntityId::Sphere).unwrap();
    assert_eq!(sphere.material.as_ref().unwrap().displacement_scale, -2.0);
}

#[test]
fn camera_distance_is_not_overwritten_by_ticks() {
    let clock = ManualClock::default();
    let (mut driver, _sender) = started_loop(&clock);
    let (mut params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    params.set(CAMERA_DISTANCE, 50.0, &mut scene).unwrap();
    for _ in 0..3 {
        clock.advance(0.5);
        driver.tick(&mut scene, &params, &mut surface).unwrap();
    }
    let camera = surface.entity_in_last_frame(EntityId::Camera).unwrap();
    assert_eq!(camera.position.z, 50.0);
}

#[test]
fn bird_attaches_with_the_height_current_at_resolution() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (mut params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    driver.tick(&mut scene, &params, &mut surface).unwrap();
    params.set(BIRD_HEIGHT, 40.0, &mut scene).unwrap();
    sender.send(Ok(bird_model()));

    for _ in 0..20 {
        clock.advance(0.37);
        driver.tick(&mut scene, &params, &mut surface).unwrap();
        let bird = surface.entity_in_last_frame(EntityId::Bird).unwrap();
        assert!((bird.position.z - 40.0).abs() <= 2.0 + 1e-4);
    }
}

#[test]
fn height_change_in_flight_moves_the_orbit_band() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (mut params, mut scene) = setup();
    let mut surface = RecordingSurface::default();
    sender.send(Ok(bird_model()));
    driver.tick(&mut scene, &params, &mut surface).unwrap();

    params.set(BIRD_HEIGHT, 10.0, &mut scene).unwrap();
    assert_eq!(scene.get(EntityId::Bird).unwrap().position.z, 10.0);

    clock.set(4.0);
    driver.tick(&mut scene, &params, &mut surface).unwrap();
    let bird = surface.entity_in_last_frame(EntityId::Bird).unwrap();
    assert!(approx(bird.position.z, 2.0 * 2.0f32.cos() + 10.0));
}

#[test]
fn pitch_bias_applies_immediately_and_combines_with_the_wobble() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (mut params, mut scene) = setup();
    let mut surface = RecordingSurface::default();
    sender.send(Ok(bird_model()));
    driver.tick(&mut scene, &params, &mut surface).unwrap();

    params.set(BIRD_PITCH, 0.1, &mut scene).unwrap();
    assert!(approx(scene.get(EntityId::Bird).unwrap().rotation.x.0, 0.1 * PI));

    clock.set(2.0);
    driver.tick(&mut scene, &params, &mut surface).unwrap();
    let bird = surface.entity_in_last_frame(EntityId::Bird).unwrap();
    assert!(approx(bird.rotation.x.0, 0.3f32.cos() + 0.1 * PI));
}

#[test]
fn unknown_parameter_is_rejected_without_side_effects() {
    let (mut params, mut scene) = setup();
    let before = scene.get(EntityId::Sphere).cloned();
    assert!(params.set("planet_colour", 1.0, &mut scene).is_err());
    assert_eq!(scene.get(EntityId::Sphere).cloned(), before);
    assert_eq!(params.get("planet_colour"), None);
}
