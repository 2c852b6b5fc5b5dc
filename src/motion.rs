//! Per-frame motion, as pure functions of elapsed time and parameters.

use std::f32::consts::PI;

use cgmath::Rad;

use crate::data_structures::entity::Entity;

/// Angular rate of the sphere around x, in rad/s.
pub const SPHERE_RATE_X: f32 = 0.05;
/// Angular rate of the sphere around z, in rad/s.
pub const SPHERE_RATE_Z: f32 = 0.025;

/// Phase rate of the bird's orbit.
pub const ORBIT_RATE: f32 = 0.5;
/// Half-width of the orbit along x.
pub const ORBIT_RADIUS_X: f32 = 4.0;
/// Half-height of the orbit around the cruising height.
pub const ORBIT_RADIUS_Z: f32 = 2.0;
/// Rate of the pitch wobble.
pub const PITCH_RATE: f32 = 0.15;
/// Yaw magnitude, as a fraction of π, when the bird banks into a turn.
pub const YAW_FRACTION: f32 = 0.15;

/// Sphere rotation `(x, z)` at `elapsed` seconds: a slow, linear tumble.
pub fn sphere_rotation(elapsed: f32) -> (Rad<f32>, Rad<f32>) {
    (Rad(elapsed * SPHERE_RATE_X), Rad(elapsed * SPHERE_RATE_Z))
}

pub fn apply_sphere_motion(sphere: &mut Entity, elapsed: f32) {
    let (x, z) = sphere_rotation(elapsed);
    sphere.rotation.x = x;
    sphere.rotation.z = z;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdPose {
    pub x: f32,
    pub z: f32,
    pub pitch: Rad<f32>,
    pub yaw: Rad<f32>,
}

/// Horizontal velocity of the bird, the derivative of its x position.
pub fn bird_velocity_x(elapsed: f32) -> f32 {
    ORBIT_RADIUS_X * ORBIT_RATE * (elapsed * ORBIT_RATE).cos()
}

/// Yaw that faces the bird along its current horizontal direction of travel.
///
/// Moving towards +x yields `-0.15π`; moving towards -x, or at rest on a
/// turning point, yields `+0.15π`.
pub fn bird_yaw(velocity_x: f32) -> Rad<f32> {
    if velocity_x > 0.0 {
        Rad(-PI * YAW_FRACTION)
    } else {
        Rad(PI * YAW_FRACTION)
    }
}

pub fn bird_pose(elapsed: f32, cruising_height: f32, pitch_bias: f32) -> BirdPose {
    let phase = elapsed * ORBIT_RATE;
    BirdPose {
        x: phase.sin() * ORBIT_RADIUS_X,
        z: phase.cos() * ORBIT_RADIUS_Z + cruising_height,
        pitch: Rad((elapsed * PITCH_RATE).cos() + PI * pitch_bias),
        yaw: bird_yaw(bird_velocity_x(elapsed)),
    }
}

pub fn apply_bird_motion(bird: &mut Entity, elapsed: f32, cruising_height: f32, pitch_bias: f32) {
    let pose = bird_pose(elapsed, cruising_height, pitch_bias);
    bird.position.x = pose.x;
    bird.position.z = pose.z;
    bird.rotation.x = pose.pitch;
    bird.rotation.y = pose.yaw;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_starts_unrotated() {
        assert_eq!(sphere_rotation(0.0), (Rad(0.0), Rad(0.0)));
    }

    #[test]
    fn sphere_rotation_is_linear_in_time() {
        let (x, z) = sphere_rotation(10.0);
        assert!((x.0 - 0.5).abs() < 1e-6);
        assert!((z.0 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn orbit_stays_within_band() {
        for step in 0..2000 {
            let t = step as f32 * 0.05;
            let pose = bird_pose(t, 24.0, -0.25);
            assert!((pose.z - 24.0).abs() <= ORBIT_RADIUS_Z + 1e-4);
            assert!(pose.x.abs() <= ORBIT_RADIUS_X + 1e-4);
        }
    }

    #[test]
    fn yaw_follows_direction_of_travel() {
        // moving towards +x at t = 0
        assert_eq!(bird_pose(0.0, 24.0, 0.0).yaw, Rad(-PI * YAW_FRACTION));
        // half an orbit later it comes back towards -x
        let t = PI / ORBIT_RATE;
        assert!(bird_velocity_x(t) < 0.0);
        assert_eq!(bird_pose(t, 24.0, 0.0).yaw, Rad(PI * YAW_FRACTION));
    }

    #[test]
    fn pitch_combines_wobble_and_bias() {
        let pose = bird_pose(0.0, 24.0, -0.25);
        assert!((pose.pitch.0 - (1.0 - PI * 0.25)).abs() < 1e-6);
    }

    #[test]
    fn motion_is_deterministic() {
        let mut a = Entity::new();
        let mut b = Entity::new();
        for t in [0.0, 0.016, 1.5, 42.0] {
            apply_sphere_motion(&mut a, t);
            apply_bird_motion(&mut a, t, 24.0, -0.25);
            apply_sphere_motion(&mut b, t);
            apply_bird_motion(&mut b, t, 24.0, -0.25);
            assert_eq!(a, b);
        }
    }
}
