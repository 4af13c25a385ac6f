use glam::Vec3;

use crate::config::WalkConfig;
use crate::controller::input::{InputEvent, InputState};
use crate::controller::look::LookController;
use crate::controller::movement::MovementResolver;
use crate::model::{CameraRig, CollisionWorld};

/// Everything the walkthrough mutates, owned in one place and handed to the
/// frame loop and the event listeners
pub struct WalkState {
    pub rig: CameraRig,
    pub input: InputState,
    pub look: LookController,
    pub movement: MovementResolver,
    pub frame: u64,
}

impl WalkState {
    pub fn new(config: &WalkConfig, width: u32, height: u32) -> Self {
        Self {
            rig: CameraRig::new(config, width, height),
            input: InputState::new(),
            look: LookController::new(config),
            movement: MovementResolver::new(config),
            frame: 0,
        }
    }

    /// Route one platform event. Mouse look applies immediately, and only
    /// while the pointer is captured.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::MouseMove { dx, dy } => {
                if self.input.pointer_locked {
                    self.look.apply_look(&mut self.rig, *dx, *dy);
                }
            }
            InputEvent::PointerLockChanged { locked } => {
                tracing::debug!(locked, "pointer capture changed");
                self.input.process_event(event);
            }
            _ => self.input.process_event(event),
        }
    }

    /// One frame of movement against `world`. Returns the position delta.
    pub fn step<W: CollisionWorld + ?Sized>(&mut self, world: &W) -> Vec3 {
        self.frame += 1;
        self.movement.update(&mut self.rig, &self.input, world)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.rig.set_viewport(width, height)
    }
}
