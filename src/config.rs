//! Startup configuration for the planet scene.
//!
//! Everything here is read once when the scene is assembled. Live tuning
//! happens through the [`crate::params::ParameterStore`], which is seeded from
//! [`ParameterDefaults`].

/// Initial values of the four tunable parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDefaults {
    pub displacement_scale: f32,
    pub bird_height: f32,
    pub bird_pitch: f32,
    pub camera_distance: f32,
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self {
            displacement_scale: -4.0,
            bird_height: 24.0,
            bird_pitch: -0.25,
            camera_distance: 31.0,
        }
    }
}

/// Asset locations, relative to `root`.
///
/// Natively `root` is a directory next to the working directory, on the web it
/// is a path below the page origin.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPaths {
    pub root: String,
    pub displacement_map: String,
    pub color_map: String,
    pub bird_model: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            displacement_map: "textures/maps/bumpMap.jpeg".to_string(),
            color_map: "textures/maps/map.jpeg".to_string(),
            bird_model: "models/flying_bird/scene.gltf".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    // Not part of the physically lit term; keeps the night side from being pitch black.
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            // "lightgrey" (#d3d3d3) in linear space
            color: [0.651, 0.651, 0.651],
            intensity: 0.75,
            position: [0.0, 0.0, 28.0],
            ambient: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub parameters: ParameterDefaults,
    pub assets: AssetPaths,
    pub light: LightConfig,
    pub sphere_radius: f32,
    pub sphere_width_segments: u32,
    pub sphere_height_segments: u32,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub clear_colour: wgpu::Color,
    /// Upper bound for the device pixel ratio used to size the render target.
    pub max_pixel_ratio: f64,
    /// Id of the canvas element the web build draws into.
    pub canvas_id: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            parameters: ParameterDefaults::default(),
            assets: AssetPaths::default(),
            light: LightConfig::default(),
            sphere_radius: 20.0,
            sphere_width_segments: 64,
            sphere_height_segments: 32,
            fovy_degrees: 35.0,
            znear: 0.1,
            zfar: 100.0,
            clear_colour: wgpu::Color::BLACK,
            max_pixel_ratio: crate::viewport::MAX_PIXEL_RATIO,
            canvas_id: "canvas".to_string(),
        }
    }
}
