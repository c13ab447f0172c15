//! # Backdrop demo
//!
//! Runs the Game of Life backdrop in a plain window, playing the role of
//! the host page: it forwards resize and pointer events to the facade while
//! the animation runs and drives the start/stop lifecycle.
//!
//! Controls: move the mouse to seed gliders, drag to spray explosions,
//! space toggles the backdrop, escape (or closing the window) fades out and
//! exits once the fade completes.
//!
//! Run with: `cargo run --example backdrop`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use life_backdrop::{Config, LifeBackdrop};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

struct DemoApp {
    window: Option<Arc<Window>>,
    backdrop: Option<LifeBackdrop>,
    exit_when_faded: Arc<AtomicBool>,
}

impl DemoApp {
    fn new() -> Self {
        Self {
            window: None,
            backdrop: None,
            exit_when_faded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fade out, then let `about_to_wait` exit the loop once the engine
    /// reports completion. Fires immediately if nothing is running.
    fn request_exit(&mut self) {
        let Some(backdrop) = self.backdrop.as_mut() else {
            self.exit_when_faded.store(true, Ordering::SeqCst);
            return;
        };
        let flag = Arc::clone(&self.exit_when_faded);
        backdrop.stop(Some(Box::new(move || flag.store(true, Ordering::SeqCst))));
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("life-backdrop")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window = Arc::new(window);

            let mut backdrop = LifeBackdrop::new(window.clone(), Config::default());
            let PhysicalSize { width, height } = window.inner_size();
            backdrop.start(width, height);

            self.backdrop = Some(backdrop);
            self.window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.request_exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => self.request_exit(),
                    PhysicalKey::Code(KeyCode::Space) => {
                        let (Some(backdrop), Some(window)) =
                            (self.backdrop.as_mut(), self.window.as_ref())
                        else {
                            return;
                        };
                        if backdrop.is_running() {
                            backdrop.stop(None);
                        } else {
                            let PhysicalSize { width, height } = window.inner_size();
                            backdrop.start(width, height);
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(backdrop) = self.backdrop.as_ref() {
                    backdrop.resized(width, height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(backdrop) = self.backdrop.as_ref() {
                    backdrop.pointer_moved(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(backdrop) = self.backdrop.as_ref() {
                    match state {
                        ElementState::Pressed => backdrop.pointer_down(),
                        ElementState::Released => backdrop.pointer_up(),
                    }
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_when_faded.load(Ordering::SeqCst) {
            event_loop.exit();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
