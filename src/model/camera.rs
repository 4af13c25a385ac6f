use glam::{Mat4, Quat, Vec3};

use crate::config::WalkConfig;

/// First-person camera as a two-node hierarchy: a parent carrying position and
/// yaw, and a child camera carrying the height offset and pitch.
pub struct CameraRig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub height: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraRig {
    pub fn new(config: &WalkConfig, width: u32, height: u32) -> Self {
        let mut rig = Self {
            position: config.start_position,
            yaw: 0.0,
            pitch: 0.0,
            height: config.camera_height,
            fov_y: config.fov_y,
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        rig.set_viewport(width, height);
        rig
    }

    /// Camera position in world space
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.height, 0.0)
    }

    pub fn parent_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn orientation(&self) -> Quat {
        self.parent_rotation() * Quat::from_rotation_x(self.pitch)
    }

    /// Viewing direction; -Z at zero yaw and pitch
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Updates the aspect ratio. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn view(&self) -> Mat4 {
        let world = Mat4::from_translation(self.position)
            * Mat4::from_quat(self.parent_rotation())
            * Mat4::from_translation(Vec3::new(0.0, self.height, 0.0))
            * Mat4::from_rotation_x(self.pitch);
        world.inverse()
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}
