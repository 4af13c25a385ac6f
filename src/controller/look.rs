use crate::config::WalkConfig;
use crate::model::CameraRig;

/// Mouse look: yaw on the rig's parent, clamped pitch on the camera
#[derive(Debug, Clone)]
pub struct LookController {
    pub sensitivity: f32,
    pub max_pitch: f32,
}

impl LookController {
    pub fn new(config: &WalkConfig) -> Self {
        Self {
            sensitivity: config.mouse_sensitivity,
            max_pitch: config.max_pitch,
        }
    }

    /// Apply one relative mouse motion. Yaw is left unbounded.
    pub fn apply_look(&self, rig: &mut CameraRig, dx: f32, dy: f32) {
        rig.yaw -= dx * self.sensitivity;
        rig.pitch = (rig.pitch - dy * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (LookController, CameraRig) {
        let config = WalkConfig::default();
        (LookController::new(&config), CameraRig::new(&config, 800, 600))
    }

    #[test]
    fn moving_right_turns_right_and_up_looks_up() {
        let (look, mut rig) = setup();
        look.apply_look(&mut rig, 100.0, -50.0);
        assert!((rig.yaw + 0.2).abs() < 1e-6);
        assert!((rig.pitch - 0.1).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_clamped_for_any_motion_sequence() {
        let (look, mut rig) = setup();
        let limit = std::f32::consts::PI / 2.5;
        let motions = [
            (0.0, -1e6),
            (3.0, 250.0),
            (-7000.0, 1e5),
            (12.5, -333.3),
            (1e9, 0.0),
            (-4.0, -4000.0),
            (0.0, 1.0),
        ];
        for (dx, dy) in motions {
            look.apply_look(&mut rig, dx, dy);
            assert!(rig.pitch >= -limit && rig.pitch <= limit, "pitch {} escaped", rig.pitch);
        }
    }

    #[test]
    fn clamping_happens_per_event() {
        let (look, mut rig) = setup();
        look.apply_look(&mut rig, 0.0, -10_000.0);
        look.apply_look(&mut rig, 0.0, 10_000.0);
        // Net motion is zero, but each event clamps on its own
        assert!((rig.pitch + look.max_pitch).abs() < 1e-6);
    }

    #[test]
    fn yaw_is_unbounded() {
        let (look, mut rig) = setup();
        for _ in 0..100 {
            look.apply_look(&mut rig, -1000.0, 0.0);
        }
        assert!((rig.yaw - 200.0).abs() < 1e-2);
    }
}
