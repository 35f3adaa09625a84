use std::sync::Arc;
use std::time::Instant;

use glam::UVec2;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{CursorGrabMode, Window};

use kitchen_rush::audio::{AudioEngine, RodioAudio, TracingAudio};
use kitchen_rush::controller::input::native;
use kitchen_rush::view::{GpuContext, SceneRenderer};
use kitchen_rush::{logging, SceneGraph, Session, StartupError, Tuning};

struct App {
    window: Arc<Window>,
    renderer: SceneRenderer,
    session: Session,
    pointer_captured: bool,
    last_frame_time: Instant,
}

impl App {
    fn size(&self) -> UVec2 {
        let size = self.window.inner_size();
        UVec2::new(size.width, size.height)
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        if self.renderer.on_window_event(event) {
            return true;
        }
        match native::from_window_event(event) {
            Some(input) => {
                let size = self.size();
                let handled = self.session.handle_event(&input, size);
                self.sync_pointer();
                handled
            }
            None => false,
        }
    }

    /// Grab or release the cursor to follow the session's look mode.
    fn sync_pointer(&mut self) {
        let captured = self.session.pointer_captured();
        if captured == self.pointer_captured {
            return;
        }
        self.pointer_captured = captured;
        if captured {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!(error = %e, "cursor grab unavailable");
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!(error = %e, "cursor release failed");
        }
        self.window.set_cursor_visible(!captured);
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.session.update(dt);
        let size = self.size();
        self.session.draw(size, &mut self.renderer);
    }
}

fn run() -> Result<(), StartupError> {
    let tuning = Tuning::from_env()?;
    let scene = SceneGraph::from_env()?;
    let audio: Box<dyn AudioEngine> = match RodioAudio::new() {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            tracing::warn!(error = %e, "audio disabled, logging sound requests instead");
            Box::new(TracingAudio::new())
        }
    };
    let session = Session::new(scene, tuning, audio)?;

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Kitchen Rush")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let gpu = pollster::block_on(GpuContext::new_native(window.clone()))?;
    let renderer = SceneRenderer::new(gpu, window.clone());

    let mut app = App {
        window,
        renderer,
        session,
        pointer_captured: false,
        last_frame_time: Instant::now(),
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => app.renderer.resize(size.width, size.height),
                    WindowEvent::RedrawRequested => app.frame(),
                    _ => {}
                }
            }
        }
        Event::DeviceEvent { ref event, .. } => {
            if let Some(input) = native::from_device_event(event) {
                let size = app.size();
                app.session.handle_event(&input, size);
            }
        }
        Event::AboutToWait => app.window.request_redraw(),
        _ => {}
    })?;

    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "kitchen_rush failed to start");
        std::process::exit(1);
    }
}
