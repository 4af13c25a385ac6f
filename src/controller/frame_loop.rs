use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::{self, LoadOutcome, LoadQueue, OverlayOutcome};
use crate::config::WalkConfig;
use crate::model::{Mesh, Scene};
use crate::ui::{self, Hud};
use super::input::InputEvent;
use super::walk_state::WalkState;

/// Per-frame state shared by the browser and native front ends: the walk
/// state, the scene being filled by background loads and the HUD.
pub struct FrameLoop {
    pub walk: Rc<RefCell<WalkState>>,
    pub scene: Scene,
    pub hud: Hud,
    model_loads: LoadQueue<LoadOutcome>,
    overlay_loads: LoadQueue<OverlayOutcome>,
}

impl FrameLoop {
    /// Set up the walk state and start every configured asset load
    pub fn new(config: &WalkConfig, width: u32, height: u32) -> Self {
        let model_loads = LoadQueue::new();
        let overlay_loads = LoadQueue::new();
        assets::spawn_model_loads(&model_loads, config);
        assets::spawn_overlay_load(&overlay_loads, config);

        Self {
            walk: Rc::new(RefCell::new(WalkState::new(config, width, height))),
            scene: Scene::new(config.models.len()),
            hud: Hud::new(config.overlay_seconds),
            model_loads,
            overlay_loads,
        }
    }

    pub fn handle_event(&self, event: &InputEvent) {
        self.walk.borrow_mut().handle_event(event);
    }

    pub fn resize(&self, width: u32, height: u32) -> bool {
        self.walk.borrow_mut().resize(width, height)
    }

    /// Move finished loads into the scene. `upload` sees each new mesh once.
    pub fn drain_loads(&mut self, egui_ctx: &egui::Context, mut upload: impl FnMut(&Mesh)) {
        for outcome in self.model_loads.drain() {
            if let Some(model) = self.scene.insert(outcome) {
                upload(&model.mesh);
            }
        }
        for outcome in self.overlay_loads.drain() {
            self.hud.overlay.set_image(egui_ctx, outcome);
        }
    }

    /// Advance one frame: movement against the scene, then HUD clocks.
    /// `now` is in seconds.
    pub fn step(&mut self, dt: f32, now: f64) {
        let delta = self.walk.borrow_mut().step(&self.scene);
        if delta != glam::Vec3::ZERO {
            tracing::trace!(?delta, "moved");
        }
        self.hud.tick(dt, now);
    }

    pub fn build_ui(&self, egui_ctx: &egui::Context, raw_input: egui::RawInput) -> egui::FullOutput {
        ui::build_ui(egui_ctx, raw_input, &self.walk.borrow(), &self.scene, &self.hud)
    }
}
