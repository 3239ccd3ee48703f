use anyhow::Result;
use splinepond::config::Options;
use splinepond::coord_sys::{NdcPos2D, ScreenPos2D};
use splinepond::render::vulkan::Renderer;
use splinepond::render::{self, StatusDisplay};
use splinepond::sketch::{InputEvent, Sketch};
use utils::color::Color;
use utils::input::{InputHandler, Inputs, PointerGesture};
use utils::timer::{FrameClock, FrameCounter};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::Window,
};

mod keymap;
mod status;

use keymap::Action;
use status::TitleStatus;

struct App {
    options: Options,
    window: Option<Window>,
    renderer: Option<Renderer>,
    sketch: Sketch,
    inputs: Inputs,
    clock: FrameClock,
    frame_counter: FrameCounter,
    status: TitleStatus,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(options: Options) -> Self {
        Self {
            sketch: Sketch::new(&options),
            status: TitleStatus::new(&options.window_title),
            options,
            window: None,
            renderer: None,
            inputs: Inputs::new(),
            clock: FrameClock::new(),
            frame_counter: FrameCounter::new(),
            error: None,
        }
    }

    /// One tick: advance the sketch, refresh the status, draw the frame
    fn redraw(&mut self) -> Result<()> {
        let Some(window) = self.window.as_ref() else {
            return Ok(());
        };

        // Create a renderer on the first request
        let Some(renderer) = self.renderer.as_mut() else {
            let renderer = Renderer::new(window, Color::from(self.options.clear_color))?;
            self.renderer = Some(renderer);
            self.clock.reset();
            return Ok(());
        };

        let elapsed = self.clock.tick();
        self.sketch.tick(elapsed);

        let mode = self.sketch.mode();
        self.status
            .show_status(mode.segments_per_piece, mode.speed);
        if let Some(title) = self.status.take_pending() {
            window.set_title(&title);
        }

        render::submit(renderer, &self.sketch.frame());
        renderer.draw_request(window)?;

        if self.frame_counter.count() {
            log::debug!("{} fps", self.frame_counter.frames_per_sec());
        }

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_inner_size(PhysicalSize::new(
                self.options.window_width,
                self.options.window_height,
            ))
            .with_title(&self.options.window_title);

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(window),
            Err(err) => {
                self.error = Some(err.into());
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Request Redraw
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.error.is_some() {
            event_loop.exit();
            return;
        }

        if self.window.is_some() {
            self.handle_inputs(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close was requested, stopping...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    log::error!("Frame failed: {err:#}");
                    self.error = Some(err);
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                log::debug!(
                    "Window resized: (w: {}, h: {})",
                    new_size.width,
                    new_size.height
                );

                if let Some(renderer) = self.renderer.as_mut() {
                    if let Err(err) = renderer.recreate_swapchain(new_size) {
                        self.error = Some(err);
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                let press = self.inputs.key_press().and_then(keymap::on_press);
                if press == Some(Action::Exit) {
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }
}

impl InputHandler for App {
    fn handle_inputs(&mut self, event: &WindowEvent) {
        self.inputs.read(event);

        if let Some(Action::Sketch(event)) = self.inputs.key_press().and_then(keymap::on_press) {
            self.sketch.handle(event);
        }

        let Some(window) = self.window.as_ref() else {
            return;
        };

        let Some(gesture) = self.inputs.lmb_gesture() else {
            return;
        };

        let (pos, to_event): (_, fn(glam::Vec2) -> InputEvent) = match gesture {
            PointerGesture::Pressed(pos) => (pos, InputEvent::PointerPressed),
            PointerGesture::Dragged(pos) => (pos, InputEvent::PointerDragged),
        };

        // Convert mouse screen coordinates to normalized device coordinates
        let screen_pos = ScreenPos2D::new(pos.x, pos.y);
        if let Some(ndc_pos) = NdcPos2D::from_screen_pos(&window.inner_size(), screen_pos) {
            self.sketch.handle(to_event(ndc_pos.to_vec2()));
        }
    }
}

pub fn run(options: Options) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;

    if let Some(renderer) = app.renderer.as_ref() {
        renderer.wait_device_idle()?;
    }

    if let Some(error) = app.error {
        return Err(error);
    }

    Ok(())
}
