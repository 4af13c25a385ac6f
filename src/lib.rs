// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod ui;
pub mod assets;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

    use crate::config::WalkConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_move_to_input};
    use crate::controller::{FrameLoop, InputEvent, InputProcessor, WalkState};
    use crate::logging;
    use crate::view::{GpuContext, RenderState};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        logging::init();
        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let (width, height) = viewport_size(&window);
        let (document, canvas) = init_canvas(&window, width, height)?;
        setup_app(window, document, canvas).await
    }

    /// Main application setup for WASM
    async fn setup_app(window: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        // Paths resolve against the page
        let config = WalkConfig::default();

        let mut gpu = GpuContext::new(&canvas, canvas.width(), canvas.height())
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let mut frame_loop = FrameLoop::new(&config, gpu.config.width, gpu.config.height);
        let mut render_state = RenderState::new(&gpu, &config, &frame_loop.walk.borrow().rig);
        let egui_ctx = egui::Context::default();

        setup_input_listeners(&document, &window, &canvas, frame_loop.walk.clone())?;

        let performance = window.performance().ok_or(js_error("no performance on window"))?;
        let mut last_time = performance.now() / 1000.0;

        tracing::info!(width = gpu.config.width, height = gpu.config.height, "roomwalk started");

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), move || {
            let now = performance.now() / 1000.0;
            let dt = (now - last_time).clamp(0.0, 0.1) as f32;
            last_time = now;

            handle_resize(&window, &canvas, &mut gpu, &mut render_state, &frame_loop);

            let device = gpu.device.clone();
            frame_loop.drain_loads(&egui_ctx, |mesh| render_state.add_mesh(&device, mesh));
            frame_loop.step(dt, now);
            render_state.update_camera(&gpu.queue, &frame_loop.walk.borrow().rig);

            // egui works in CSS pixels, the surface in device pixels
            let dpr = window.device_pixel_ratio() as f32;
            let raw_input = egui::RawInput {
                time: Some(now),
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(render_state.width as f32 / dpr, render_state.height as f32 / dpr),
                )),
                ..Default::default()
            };
            egui_ctx.set_pixels_per_point(dpr);
            let full_output = frame_loop.build_ui(&egui_ctx, raw_input);
            render_state.set_ui(&egui_ctx, full_output, dpr);

            if let Err(e) = render_state.draw_frame(&gpu) {
                tracing::error!(error = ?e, "frame failed");
            }
        });
        f.start();

        Ok(())
    }

    /// Window inner size in device pixels
    fn viewport_size(window: &Window) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let css = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let w = css(window.inner_width()) * dpr;
        let h = css(window.inner_height()) * dpr;
        (w.round() as u32, h.round() as u32)
    }

    fn size_canvas(canvas: &HtmlCanvasElement, window: &Window, width: u32, height: u32) -> Result<(), JsValue> {
        let dpr = window.device_pixel_ratio();
        canvas.set_width(width);
        canvas.set_height(height);
        canvas.set_attribute(
            "style",
            &format!(
                "display: block; width: {}px; height: {}px",
                width as f64 / dpr,
                height as f64 / dpr
            ),
        )
    }

    /// Follow the window size; skipped while it is zero (hidden tab, minimised)
    fn handle_resize(
        window: &Window,
        canvas: &HtmlCanvasElement,
        gpu: &mut GpuContext,
        render_state: &mut RenderState,
        frame_loop: &FrameLoop,
    ) {
        let max = gpu.device.limits().max_texture_dimension_2d;
        let (w, h) = viewport_size(window);
        let (w, h) = (w.min(max), h.min(max));
        if w == 0 || h == 0 || (w, h) == (render_state.width, render_state.height) {
            return;
        }

        if let Err(e) = size_canvas(canvas, window, w, h) {
            tracing::warn!(error = ?e, "failed to style canvas");
        }
        if gpu.resize(w, h) {
            render_state.resize(&gpu.device, w, h);
            frame_loop.resize(w, h);
            tracing::debug!(width = w, height = h, "viewport resized");
        }
    }

    /// Setup all input event listeners with platform-agnostic abstractions
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        walk: Rc<RefCell<WalkState>>,
    ) -> Result<(), JsValue> {
        let input_processor = InputProcessor::default();

        // Keyboard down
        {
            let walk = walk.clone();
            let input_processor = input_processor.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if input_processor.is_movement_key(&e.key()) {
                    e.prevent_default();
                }
                walk.borrow_mut().handle_event(&keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let walk = walk.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                walk.borrow_mut().handle_event(&keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - clear all keys
        {
            let walk = walk.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                walk.borrow_mut().handle_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - clear all keys
        {
            let walk = walk.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                walk.borrow_mut()
                    .handle_event(&InputEvent::VisibilityChanged { visible: !doc.hidden() });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        // Pointer lock change
        {
            let walk = walk.clone();
            let doc = document.clone();
            let plc = Closure::wrap(Box::new(move |_e: Event| {
                let locked = doc.pointer_lock_element().is_some();
                walk.borrow_mut().handle_event(&InputEvent::PointerLockChanged { locked });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
            plc.forget();
        }

        // Canvas click to enter pointer lock
        {
            let canvas_click = canvas.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                canvas_click.request_pointer_lock();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        // Mouse move, ignored by the walk state until the pointer is locked
        {
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                walk.borrow_mut().handle_event(&mouse_move_to_input(&e));
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        Ok(())
    }

    fn init_canvas(window: &Window, width: u32, height: u32) -> Result<(Document, HtmlCanvasElement), JsValue> {
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        body.set_attribute("style", "margin: 0; overflow: hidden")?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        size_canvas(&canvas_el, window, width.max(1), height.max(1))?;
        body.append_child(&canvas_el)?;
        Ok((document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!(error = ?e, "requestAnimationFrame failed, frame loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame failed to start");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
