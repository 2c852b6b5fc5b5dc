use std::f32::consts::PI;

use anyhow::anyhow;
use planet_flow::{
    assets::AssetState,
    data_structures::scene_graph::EntityId,
    driver::LoopState,
};

use crate::common::test_utils::{ManualClock, RecordingSurface, approx, bird_model, setup, started_loop};

mod common;

#[test]
fn sphere_is_unrotated_at_start_and_bird_absent() {
    let clock = ManualClock::default();
    let (mut driver, _sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    driver.tick(&mut scene, &params, &mut surface).unwrap();

    let sphere = surface.entity_in_last_frame(EntityId::Sphere).unwrap();
    assert!(approx(sphere.rotation.x.0, 0.0));
    assert!(approx(sphere.rotation.z.0, 0.0));
    assert!(surface.entity_in_last_frame(EntityId::Bird).is_none());
    assert_eq!(driver.bird_state(), AssetState::Loading);
}

#[test]
fn bird_joins_on_the_tick_after_resolution() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    for _ in 0..3 {
        clock.advance(0.016);
        driver.tick(&mut scene, &params, &mut surface).unwrap();
        assert!(!scene.contains(EntityId::Bird));
    }

    sender.send(Ok(bird_model()));
    clock.advance(0.016);
    driver.tick(&mut scene, &params, &mut surface).unwrap();

    assert_eq!(surface.attached, vec![EntityId::Bird]);
    assert_eq!(driver.bird_state(), AssetState::Resolved);
    let bird = surface.entity_in_last_frame(EntityId::Bird).unwrap();
    assert!(bird.parent_relative);
    assert!((bird.position.z - 24.0).abs() <= 2.0 + 1e-4);
    assert_eq!(surface.frames.len(), 4);
}

#[test]
fn pose_at_ten_seconds() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface::default();
    sender.send(Ok(bird_model()));

    clock.set(10.0);
    driver.tick(&mut scene, &params, &mut surface).unwrap();

    let sphere = surface.entity_in_last_frame(EntityId::Sphere).unwrap();
    assert!(approx(sphere.rotation.x.0, 0.5));
    assert!(approx(sphere.rotation.z.0, 0.25));

    let bird = surface.entity_in_last_frame(EntityId::Bird).unwrap();
    assert!(approx(bird.position.x, 4.0 * 5.0f32.sin()));
    assert!(approx(bird.position.z, 2.0 * 5.0f32.cos() + 24.0));
    assert!(approx(bird.rotation.x.0, 1.5f32.cos() - 0.25 * PI));
    // 2·cos(5) > 0: moving towards +x
    assert!(approx(bird.rotation.y.0, -0.15 * PI));
}

#[test]
fn bird_pose_at_zero_seconds() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface::default();
    sender.send(Ok(bird_model()));

    driver.tick(&mut scene, &params, &mut surface).unwrap();

    let bird = scene.get(EntityId::Bird).unwrap();
    assert!(approx(bird.position.x, 0.0));
    assert!(approx(bird.position.z, 26.0));
    assert!(approx(bird.rotation.x.0, 1.0 - 0.25 * PI));
}

#[test]
fn failed_load_keeps_the_loop_running_without_bird() {
    let clock = ManualClock::default();
    let (mut driver, sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface::default();

    sender.send(Err(anyhow!("404 Not Found")));
    for _ in 0..5 {
        clock.advance(1.0);
        driver.tick(&mut scene, &params, &mut surface).unwrap();
    }

    assert_eq!(driver.bird_state(), AssetState::Failed);
    assert!(surface.attached.is_empty());
    assert!(!scene.contains(EntityId::Bird));
    assert_eq!(surface.frames.len(), 5);
    let sphere = surface.entity_in_last_frame(EntityId::Sphere).unwrap();
    assert!(approx(sphere.rotation.x.0, 0.25));
}

#[test]
fn identical_time_gives_identical_frames() {
    let clock_a = ManualClock::default();
    let clock_b = ManualClock::default();
    let (mut a, sender_a) = started_loop(&clock_a);
    let (mut b, sender_b) = started_loop(&clock_b);
    let (params_a, mut scene_a) = setup();
    let (params_b, mut scene_b) = setup();
    let mut surface_a = RecordingSurface::default();
    let mut surface_b = RecordingSurface::default();
    sender_a.send(Ok(bird_model()));
    sender_b.send(Ok(bird_model()));

    for t in [0.0, 0.5, 3.25, 17.0, 120.0] {
        clock_a.set(t);
        clock_b.set(t);
        a.tick(&mut scene_a, &params_a, &mut surface_a).unwrap();
        b.tick(&mut scene_b, &params_b, &mut surface_b).unwrap();
    }

    assert_eq!(surface_a.frames, surface_b.frames);
}

#[test]
fn surface_error_does_not_stop_the_loop() {
    let clock = ManualClock::default();
    let (mut driver, _sender) = started_loop(&clock);
    let (params, mut scene) = setup();
    let mut surface = RecordingSurface {
        fail_next: Some(wgpu::SurfaceError::Lost),
        ..Default::default()
    };

    let result = driver.tick(&mut scene, &params, &mut surface);
    assert!(matches!(result, Err(wgpu::SurfaceError::Lost)));
    assert_eq!(driver.state(), LoopState::Scheduled);

    driver.tick(&mut scene, &params, &mut surface).unwrap();
    assert_eq!(surface.frames.len(), 1);
    assert_eq!(driver.frames(), 2);
}
