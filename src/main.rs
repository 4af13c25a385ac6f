use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::Key,
    window::{CursorGrabMode, Window},
};
use std::sync::Arc;
use std::time::Instant;

// Import from the library crate
use roomwalk::{
    logging,
    config::WalkConfig,
    controller::{FrameLoop, InputEvent, InputProcessor},
    view::{GpuContext, GpuError, RenderState},
};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    frame_loop: FrameLoop,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    input_processor: InputProcessor,
    pointer_captured: bool,

    // Frame timing
    start_time: Instant,
    last_frame_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>, config: &WalkConfig) -> Result<Self, GpuError> {
        let gpu = GpuContext::new_native(window.clone()).await?;

        let frame_loop = FrameLoop::new(config, gpu.config.width, gpu.config.height);
        let render_state = RenderState::new(&gpu, config, &frame_loop.walk.borrow().rig);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            render_state,
            frame_loop,
            egui_state,
            egui_ctx,
            input_processor: InputProcessor::default(),
            pointer_captured: false,
            start_time: now,
            last_frame_time: now,
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
        if egui_captured && !self.pointer_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                let Some(key) = key_name(logical_key) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => {
                        if self.input_processor.is_release_pointer(&key) {
                            self.set_pointer_captured(false);
                        }
                        self.frame_loop.handle_event(&InputEvent::KeyDown(key));
                    }
                    ElementState::Released => {
                        self.frame_loop.handle_event(&InputEvent::KeyUp(key));
                    }
                }
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                if !self.pointer_captured {
                    self.set_pointer_captured(true);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.set_pointer_captured(false);
                self.frame_loop.handle_event(&InputEvent::FocusLost);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.frame_loop.handle_event(&InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    /// Grab or release the cursor. Platforms without locking fall back to confining it.
    fn set_pointer_captured(&mut self, captured: bool) {
        if captured == self.pointer_captured {
            return;
        }
        if captured {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!(error = %e, "cursor grab unavailable");
                return;
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!(error = %e, "failed to release cursor");
        }
        self.window.set_cursor_visible(!captured);
        self.pointer_captured = captured;
        self.frame_loop.handle_event(&InputEvent::PointerLockChanged { locked: captured });
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.gpu.resize(new_size.width, new_size.height) {
            self.render_state.resize(&self.gpu.device, new_size.width, new_size.height);
            self.frame_loop.resize(new_size.width, new_size.height);
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.frame_loop.handle_event(&InputEvent::MouseMove { dx: dx as f32, dy: dy as f32 });
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32().min(0.1);
        self.last_frame_time = now;
        let elapsed = (now - self.start_time).as_secs_f64();

        let device = self.gpu.device.clone();
        self.frame_loop
            .drain_loads(&self.egui_ctx, |mesh| self.render_state.add_mesh(&device, mesh));
        self.frame_loop.step(dt, elapsed);
        self.render_state.update_camera(&self.gpu.queue, &self.frame_loop.walk.borrow().rig);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = self.frame_loop.build_ui(&self.egui_ctx, raw_input);
        let platform_output = std::mem::take(&mut full_output.platform_output);
        self.egui_state.handle_platform_output(&self.window, platform_output);

        let dpr = self.window.scale_factor() as f32;
        self.render_state.set_ui(&self.egui_ctx, full_output, dpr);
        self.render_state.draw_frame(&self.gpu)
    }
}

/// Key identifier in the browser's `KeyboardEvent.key` style, lower-cased
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_lowercase()),
        Key::Named(named) => Some(format!("{named:?}").to_lowercase()),
        _ => None,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = WalkConfig::from_env();
    tracing::info!(asset_root = %config.asset_root, models = config.models.len(), "starting roomwalk");

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("roomwalk")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, &config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => match app.frame() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("out of GPU memory, exiting");
                                elwt.exit();
                            }
                            Err(e) => tracing::error!(error = ?e, "frame failed"),
                        },
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("roomwalk failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NamedKey;

    #[test]
    fn key_names_match_browser_style() {
        assert_eq!(key_name(&Key::Character("W".into())).as_deref(), Some("w"));
        assert_eq!(key_name(&Key::Named(NamedKey::Escape)).as_deref(), Some("escape"));
        assert_eq!(key_name(&Key::Named(NamedKey::ArrowUp)).as_deref(), Some("arrowup"));
    }
}
