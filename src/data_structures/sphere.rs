//! UV sphere geometry for the planet.
//!
//! Latitude rings run from the north pole (`v = 0`) to the south pole
//! (`v = 1`). The seam column is duplicated so the colour and displacement
//! maps wrap without a discontinuity, and the pole rows emit a single
//! triangle per quad.

use std::f32::consts::PI;

use crate::data_structures::model::ModelVertex;

#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices =
            Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;
                let normal = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];
                vertices.push(ModelVertex {
                    position: normal.map(|n| n * radius),
                    tex_coords: [u, v],
                    normal,
                });
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn planet_resolution_has_expected_counts() {
        let sphere = SphereGeometry::new(20.0, 64, 32);
        assert_eq!(sphere.vertices.len(), 65 * 33);
        // every quad is two triangles except one per quad on each pole row
        assert_eq!(sphere.indices.len(), (64 * 32 * 2 - 2 * 64) * 3);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn vertices_lie_on_the_radius_with_outward_normals() {
        let sphere = SphereGeometry::new(20.0, 16, 8);
        for vertex in &sphere.vertices {
            let p = Vector3::from(vertex.position);
            let n = Vector3::from(vertex.normal);
            assert!((p.magnitude() - 20.0).abs() < 1e-3);
            assert!((p.normalize() - n).magnitude() < 1e-4);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_seen_from_outside() {
        let sphere = SphereGeometry::new(1.0, 12, 6);
        for tri in sphere.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| {
                Vector3::from(sphere.vertices[i as usize].position)
            });
            let face_normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(face_normal.dot(centre) > 0.0);
        }
    }

    #[test]
    fn degenerate_segment_counts_are_clamped() {
        let sphere = SphereGeometry::new(1.0, 0, 0);
        assert_eq!(sphere.vertices.len(), 4 * 3);
    }
}
