use planet_flow::{render::OutputSurface, viewport::Viewport};
use winit::dpi::PhysicalSize;

use crate::common::test_utils::RecordingSurface;

mod common;

#[test]
fn aspect_follows_the_last_resize() {
    let mut viewport = Viewport::new(PhysicalSize::new(800, 600), 1.0);
    let mut surface = RecordingSurface::default();
    surface.resize(&viewport);

    for (width, height) in [(1024, 768), (1920, 1080), (500, 1000)] {
        if viewport.resize(PhysicalSize::new(width, height), 1.0) {
            surface.resize(&viewport);
        }
    }

    assert_eq!(surface.aspect, Some(0.5));
    assert_eq!(surface.target, Some(PhysicalSize::new(500, 1000)));
    assert_eq!(surface.resizes, 4);
}

#[test]
fn dense_displays_are_capped_at_twice_the_logical_size() {
    let viewport = Viewport::new(PhysicalSize::new(3000, 1500), 3.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
    assert_eq!(viewport.target_size(), PhysicalSize::new(2000, 1000));
    assert_eq!(viewport.aspect(), 2.0);
}

#[test]
fn repeated_and_empty_resizes_change_nothing() {
    let mut viewport = Viewport::new(PhysicalSize::new(800, 600), 2.0);
    assert!(!viewport.resize(PhysicalSize::new(800, 600), 2.0));
    assert!(!viewport.resize(PhysicalSize::new(0, 600), 2.0));
    assert_eq!(viewport.target_size(), PhysicalSize::new(800, 600));
}
