use egui::Context;

use crate::assets::OverlayOutcome;
use crate::controller::WalkState;
use crate::model::{Scene, SceneStatus};

const HINT: &str = "Click to look around, WASD to move";

/// Smoothed frames-per-second, refreshed once a second
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    pub fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }
}

/// Intro image shown for a fixed time after start. Falls back to a text hint
/// while the image is missing.
pub struct IntroOverlay {
    duration: f64,
    started: Option<f64>,
    texture: Option<egui::TextureHandle>,
    expired: bool,
}

impl IntroOverlay {
    pub fn new(seconds: f32) -> Self {
        Self {
            duration: seconds as f64,
            started: None,
            texture: None,
            expired: seconds <= 0.0,
        }
    }

    /// Advance the overlay clock. `now` is in seconds; the first call starts it.
    pub fn tick(&mut self, now: f64) {
        let started = *self.started.get_or_insert(now);
        if !self.expired && now - started >= self.duration {
            self.expired = true;
            if self.texture.take().is_some() {
                tracing::debug!("intro overlay expired, texture released");
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.expired
    }

    pub fn has_image(&self) -> bool {
        self.texture.is_some()
    }

    /// Accept the finished image load. Late or failed images leave the text hint.
    pub fn set_image(&mut self, ctx: &Context, outcome: OverlayOutcome) {
        match outcome {
            Ok(image) if !self.expired => {
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                self.texture = Some(ctx.load_texture("intro_overlay", color_image, egui::TextureOptions::LINEAR));
            }
            Ok(_) => tracing::debug!("overlay image arrived after expiry"),
            Err(e) => tracing::warn!(error = %e, "overlay image unavailable, showing text hint"),
        }
    }
}

pub struct Hud {
    pub fps: FpsCounter,
    pub overlay: IntroOverlay,
}

impl Hud {
    pub fn new(overlay_seconds: f32) -> Self {
        Self {
            fps: FpsCounter::default(),
            overlay: IntroOverlay::new(overlay_seconds),
        }
    }

    pub fn tick(&mut self, dt: f32, now: f64) {
        self.fps.tick(dt);
        self.overlay.tick(now);
    }
}

/// Build the complete UI and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    walk: &WalkState,
    scene: &Scene,
    hud: &Hud,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        if walk.input.pointer_locked {
            draw_crosshair(ctx);
        }
        draw_debug_window(ctx, walk, scene, hud.fps.fps);
        if hud.overlay.is_visible() {
            draw_overlay(ctx, &hud.overlay);
        }
    })
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment([center - egui::vec2(size, 0.0), center + egui::vec2(size, 0.0)], stroke);
    painter.line_segment([center - egui::vec2(0.0, size), center + egui::vec2(0.0, size)], stroke);
}

fn status_text(status: &SceneStatus) -> String {
    match status {
        SceneStatus::Loading { loaded, expected } => format!("Loading {loaded}/{expected}"),
        SceneStatus::Ready => "Ready".to_string(),
        SceneStatus::Degraded { failed } => format!("Degraded (missing: {})", failed.join(", ")),
    }
}

fn draw_debug_window(ctx: &Context, walk: &WalkState, scene: &Scene, fps: f32) {
    let rig = &walk.rig;
    let pos = rig.position;
    let facing = rig.forward();

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {fps:.0}  Frame: {}", walk.frame)).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(
                egui::RichText::new(format!("Yaw: {:.1} Pitch: {:.1}", rig.yaw.to_degrees(), rig.pitch.to_degrees()))
                    .small(),
            );
            ui.label(
                egui::RichText::new(format!("Facing: {:.2} {:.2} {:.2}", facing.x, facing.y, facing.z)).small(),
            );
            ui.label(egui::RichText::new(format!("Scene: {}", status_text(&scene.status()))).small());
            ui.label(egui::RichText::new(format!("Triangles: {}", scene.triangle_count())).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("Click - Capture mouse").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Esc - Release mouse").small());
        });
}

fn draw_overlay(ctx: &Context, overlay: &IntroOverlay) {
    egui::Area::new(egui::Id::new("intro_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| match &overlay.texture {
            Some(texture) => {
                // Never larger than 80% of the screen
                let screen = ctx.available_rect().size() * 0.8;
                let size = texture.size_vec2();
                let scale = (screen.x / size.x).min(screen.y / size.y).min(1.0);
                ui.image((texture.id(), size * scale));
            }
            None => {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(160))
                    .inner_margin(12.0)
                    .corner_radius(6.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(HINT).size(18.0).color(egui::Color32::WHITE));
                    });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetError;

    fn tiny_image() -> image::RgbaImage {
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn overlay_expires_after_its_duration() {
        let mut overlay = IntroOverlay::new(3.0);
        overlay.tick(10.0);
        assert!(overlay.is_visible());
        overlay.tick(12.9);
        assert!(overlay.is_visible());
        overlay.tick(13.0);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn overlay_texture_is_freed_on_expiry() {
        let ctx = Context::default();
        let mut overlay = IntroOverlay::new(3.0);
        overlay.tick(0.0);
        overlay.set_image(&ctx, Ok(tiny_image()));
        assert!(overlay.has_image());

        overlay.tick(3.5);
        assert!(!overlay.has_image());
    }

    #[test]
    fn missing_or_late_images_keep_text_hint() {
        let ctx = Context::default();
        let mut overlay = IntroOverlay::new(3.0);
        overlay.tick(0.0);
        overlay.set_image(&ctx, Err(AssetError::Fetch { path: "overlay.png".into(), reason: "404".into() }));
        assert!(overlay.is_visible());
        assert!(!overlay.has_image());

        overlay.tick(5.0);
        overlay.set_image(&ctx, Ok(tiny_image()));
        assert!(!overlay.has_image());
    }

    #[test]
    fn fps_refreshes_each_second() {
        let mut fps = FpsCounter::default();
        // One full window completes, the next is still open
        for _ in 0..90 {
            fps.tick(1.0 / 60.0);
        }
        assert!((fps.fps - 60.0).abs() < 0.5);
    }

    fn texts(shape: &egui::Shape, out: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(text) => out.push(text.galley.text().to_string()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| texts(s, out)),
            _ => {}
        }
    }

    #[test]
    fn debug_window_shows_frame_count() {
        let ctx = Context::default();
        let mut walk = WalkState::new(&crate::config::WalkConfig::default(), 800, 600);
        let scene = Scene::new(0);
        for _ in 0..3 {
            walk.step(&scene);
        }

        // New windows spend their first passes measuring and fading in
        let hud = Hud::new(0.0);
        let mut output = egui::FullOutput::default();
        for pass in 0..10 {
            let raw_input = egui::RawInput { time: Some(pass as f64 * 0.5), ..Default::default() };
            output = build_ui(&ctx, raw_input, &walk, &scene, &hud);
        }
        let mut lines = Vec::new();
        for clipped in &output.shapes {
            texts(&clipped.shape, &mut lines);
        }
        assert!(lines.iter().any(|l| l.contains("Frame: 3")), "{lines:?}");
        assert!(lines.iter().any(|l| l.starts_with("Facing:")), "{lines:?}");
    }

    #[test]
    fn status_lines() {
        assert_eq!(status_text(&SceneStatus::Loading { loaded: 1, expected: 2 }), "Loading 1/2");
        assert_eq!(
            status_text(&SceneStatus::Degraded { failed: vec!["room".into()] }),
            "Degraded (missing: room)"
        );
    }
}
