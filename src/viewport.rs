//! Viewport sizing.
//!
//! The host reports physical pixels and a scale factor. The scene works with
//! the logical size for its aspect ratio and renders into a target whose pixel
//! density is capped at [`MAX_PIXEL_RATIO`], so very dense displays do not
//! multiply the fill cost.

use winit::dpi::{LogicalSize, PhysicalSize};

pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    size: LogicalSize<f64>,
    scale_factor: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(physical: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self::with_max_pixel_ratio(physical, scale_factor, MAX_PIXEL_RATIO)
    }

    pub fn with_max_pixel_ratio(
        physical: PhysicalSize<u32>,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let scale_factor = sanitize_scale(scale_factor);
        Self {
            size: physical.to_logical(scale_factor),
            scale_factor,
            max_pixel_ratio,
        }
    }

    /// Apply a host resize. Zero-area sizes (minimised windows) are ignored.
    ///
    /// Returns whether the viewport changed.
    pub fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) -> bool {
        if physical.width == 0 || physical.height == 0 {
            return false;
        }
        let scale_factor = sanitize_scale(scale_factor);
        let size: LogicalSize<f64> = physical.to_logical(scale_factor);
        let changed = size != self.size || scale_factor != self.scale_factor;
        self.size = size;
        self.scale_factor = scale_factor;
        changed
    }

    pub fn logical_size(&self) -> LogicalSize<f64> {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> f32 {
        if self.size.height <= 0.0 {
            return 1.0;
        }
        (self.size.width / self.size.height) as f32
    }

    /// Size of the render target in device pixels, never smaller than 1x1.
    pub fn target_size(&self) -> PhysicalSize<u32> {
        let size: PhysicalSize<u32> = self.size.to_physical(self.pixel_ratio());
        PhysicalSize::new(size.width.max(1), size.height.max(1))
    }
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        log::warn!("ignoring invalid scale factor {scale_factor}, using 1.0");
        1.0
    }
}
