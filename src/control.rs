// src/control.rs
//! Host-side control facade.
//!
//! [`LifeBackdrop`] is the only handle the host needs: it lazily spawns the
//! engine thread on the first `start`, transfers the drawing surface into it
//! exactly once, and forwards lifecycle and pointer events over the command
//! channel. It holds no simulation state of its own — just the channel, a
//! shared running flag, and the pending stop callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::config::Config;
use crate::engine::Engine;
use crate::protocol::{Command, Notice, SurfaceSource};

/// One-shot completion callback for [`LifeBackdrop::stop`].
pub type StopCallback = Box<dyn FnOnce() + Send + 'static>;

pub struct LifeBackdrop {
    config: Config,
    /// Consumed on the first `start`; the surface cannot be transferred twice.
    source: Option<Box<dyn SurfaceSource>>,
    commands: Option<Sender<Command>>,
    running: Arc<AtomicBool>,
    pending: Arc<Mutex<Option<StopCallback>>>,
}

impl LifeBackdrop {
    pub fn new(source: impl SurfaceSource + 'static, config: Config) -> Self {
        Self {
            config,
            source: Some(Box::new(source)),
            commands: None,
            running: Arc::new(AtomicBool::new(false)),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Start (or restart) the animation. Idempotent: a no-op while running,
    /// including while a fade-out is still in flight.
    ///
    /// The first call spawns the engine thread, moves the drawing surface
    /// into it, and sends `Init`; later calls send `Start` with the current
    /// surface dimensions.
    ///
    /// If GPU bring-up fails inside the engine, the failure is logged, the
    /// running flag clears again, and any pending stop callback fires; the
    /// backdrop then stays inert for the rest of its life.
    pub fn start(&mut self, width: u32, height: u32) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Start { width, height });
            return;
        }

        let (command_tx, command_rx) = mpsc::channel();
        let (notice_tx, notice_rx) = mpsc::channel();

        let engine = Engine::new(self.config);
        thread::Builder::new()
            .name("life-backdrop".into())
            .spawn(move || engine.run(command_rx, notice_tx))
            .expect("failed to spawn backdrop engine thread");

        let running = Arc::clone(&self.running);
        let pending = Arc::clone(&self.pending);
        thread::Builder::new()
            .name("life-backdrop-notices".into())
            .spawn(move || {
                while let Ok(notice) = notice_rx.recv() {
                    handle_notice(notice, &running, &pending);
                }
            })
            .expect("failed to spawn backdrop notice thread");

        if let Some(source) = self.source.take() {
            debug!("transferring surface to backdrop engine");
            let _ = command_tx.send(Command::Init { source, width, height });
        }
        self.commands = Some(command_tx);
    }

    /// Request a fade-out. If the backdrop is not running the callback is
    /// invoked synchronously and nothing else happens. Otherwise the
    /// callback fires once the fade-out completes; calling `stop` again
    /// before that replaces the pending callback (last writer wins) without
    /// restarting the fade.
    pub fn stop(&mut self, on_complete: Option<StopCallback>) {
        if !self.running.load(Ordering::SeqCst) {
            if let Some(callback) = on_complete {
                callback();
            }
            return;
        }

        if let Ok(mut slot) = self.pending.lock() {
            *slot = on_complete;
        }
        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Stop);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Forward a new surface size. Reinitializes the grid destructively.
    pub fn resized(&self, width: u32, height: u32) {
        self.send_if_running(Command::Resize { width, height });
    }

    pub fn pointer_moved(&self, x: f32, y: f32) {
        self.send_if_running(Command::PointerMove { x, y });
    }

    pub fn pointer_down(&self) {
        self.send_if_running(Command::PointerDown);
    }

    pub fn pointer_up(&self) {
        self.send_if_running(Command::PointerUp);
    }

    // Input and resize forwarding is active only while running, the moral
    // equivalent of registering listeners on start and removing them on stop.
    fn send_if_running(&self, command: Command) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        if let Some(commands) = &self.commands {
            let _ = commands.send(command);
        }
    }
}

/// React to one engine notice. Every notice settles the backdrop into the
/// stopped state and releases any pending stop callback; a completed
/// fade-out leaves the backdrop restartable, a failed init does not.
fn handle_notice(notice: Notice, running: &AtomicBool, pending: &Mutex<Option<StopCallback>>) {
    match notice {
        Notice::FadeOutComplete | Notice::InitFailed => {
            running.store(false, Ordering::SeqCst);
            let callback = pending.lock().ok().and_then(|mut slot| slot.take());
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// A surface source for facades that are never started.
    struct NeverSurface;

    impl SurfaceSource for NeverSurface {
        fn into_surface_target(self: Box<Self>) -> wgpu::SurfaceTarget<'static> {
            unreachable!("test facade must not reach the GPU")
        }
    }

    #[test]
    fn stop_before_start_invokes_callback_synchronously() {
        let mut backdrop = LifeBackdrop::new(NeverSurface, Config::default());
        assert!(!backdrop.is_running());

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        backdrop.stop(Some(Box::new(move || flag.store(true, Ordering::SeqCst))));

        assert!(fired.load(Ordering::SeqCst));
        assert!(!backdrop.is_running());
    }

    #[test]
    fn repeated_stop_while_stopped_fires_every_callback() {
        let mut backdrop = LifeBackdrop::new(NeverSurface, Config::default());
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            backdrop.stop(Some(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })));
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn init_failure_clears_running_and_fires_pending_stop() {
        let running = AtomicBool::new(true);
        let pending: Mutex<Option<StopCallback>> = Mutex::new(None);
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        *pending.lock().unwrap() = Some(Box::new(move || flag.store(true, Ordering::SeqCst)));

        handle_notice(Notice::InitFailed, &running, &pending);

        assert!(!running.load(Ordering::SeqCst));
        assert!(fired.load(Ordering::SeqCst));
        assert!(pending.lock().unwrap().is_none());
    }

    #[test]
    fn fade_out_notice_without_pending_callback_just_stops() {
        let running = AtomicBool::new(true);
        let pending: Mutex<Option<StopCallback>> = Mutex::new(None);

        handle_notice(Notice::FadeOutComplete, &running, &pending);

        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn input_is_dropped_while_stopped() {
        let backdrop = LifeBackdrop::new(NeverSurface, Config::default());
        // No engine exists; these must be silent no-ops
        backdrop.pointer_moved(10.0, 20.0);
        backdrop.pointer_down();
        backdrop.pointer_up();
        backdrop.resized(640, 480);
        assert!(!backdrop.is_running());
    }
}
