use glam::Vec3;

/// A model to load at startup and where to put it in the world
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub name: String,
    pub path: String,
    pub scale: Vec3,
    pub translation: Vec3,
    /// Replaces every material colour of the model when set
    pub color_override: Option<[f32; 4]>,
}

impl AssetDescriptor {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            scale: Vec3::ONE,
            translation: Vec3::ZERO,
            color_override: None,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color_override = Some(color);
        self
    }
}

/// All tunables of the walkthrough in one place
#[derive(Debug, Clone)]
pub struct WalkConfig {
    // Movement
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub max_pitch: f32,
    pub collision_distance: f32,
    pub ground_probe_distance: f32,

    // Rig
    pub camera_height: f32,
    pub floor_height: f32,
    pub start_position: Vec3,

    // Projection
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,

    // Lighting
    pub sun_dir: Vec3,
    pub sun_intensity: f32,
    pub ambient: f32,

    // Assets
    pub asset_root: String,
    pub models: Vec<AssetDescriptor>,
    pub overlay_image: Option<String>,
    pub overlay_seconds: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.03,
            mouse_sensitivity: 0.002,
            max_pitch: std::f32::consts::PI / 2.5,
            collision_distance: 0.2,
            ground_probe_distance: 0.5,

            camera_height: 0.0,
            floor_height: 0.0,
            start_position: Vec3::ZERO,

            fov_y: 75f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,

            sun_dir: Vec3::new(1.0, 2.0, 2.0).normalize(),
            sun_intensity: 1.0,
            ambient: 0.5,

            asset_root: String::new(),
            models: vec![
                AssetDescriptor::new("room", "models/room4.gltf").with_color([1.0, 1.0, 1.0, 1.0]),
                AssetDescriptor::new("borsche", "models/borsche.gltf")
                    .with_scale(0.01)
                    .with_translation(Vec3::new(0.0, -0.6, 0.0)),
            ],
            overlay_image: Some("overlay.png".to_string()),
            overlay_seconds: 3.0,
        }
    }
}

impl WalkConfig {
    /// Native defaults: assets resolve against `ROOMWALK_ASSET_ROOT` (or `assets`)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self {
            asset_root: std::env::var("ROOMWALK_ASSET_ROOT").unwrap_or_else(|_| "assets".to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_scene() {
        let config = WalkConfig::default();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].name, "room");
        assert_eq!(config.models[0].color_override, Some([1.0; 4]));
        assert_eq!(config.models[1].scale, Vec3::splat(0.01));
        assert_eq!(config.models[1].translation, Vec3::new(0.0, -0.6, 0.0));
        assert!((config.max_pitch - std::f32::consts::PI / 2.5).abs() < 1e-6);
        assert!((config.sun_dir.length() - 1.0).abs() < 1e-5);
    }
}
