// src/engine/mod.rs
//! The simulation engine: owns all grid and GPU state on its own thread and
//! runs the frame loop that ties injection, computation, and rendering
//! together.
//!
//! The loop runs a fixed-timestep simulation (one automaton generation per
//! tick interval) decoupled from the render rate: every frame paints, only
//! due frames step. Commands from the host are drained between frames; while
//! no run is active the thread blocks on the command channel and costs
//! nothing.

pub mod fade;
pub mod grid;
pub mod inject;

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Instant;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::gfx::GpuContext;
use crate::protocol::{Command, Notice};

use fade::{Fade, FadeTick};
use grid::{GridSize, PingPong};
use inject::Spawn;

/// Last known pointer position in surface pixels, plus button state.
/// `(-1, -1)` means no input has arrived since the run began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
}

impl PointerState {
    pub fn cleared() -> Self {
        Self { x: -1.0, y: -1.0, down: false }
    }

    pub fn has_position(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }
}

/// All simulation state, owned by the engine thread.
pub struct Engine {
    config: Config,
    gpu: Option<GpuContext>,
    grid: GridSize,
    buffers: PingPong,
    pointer: PointerState,
    fade: Fade,
    running: bool,
    rng: StdRng,
    last_tick: Instant,
    last_glider: Instant,
    last_drag: Instant,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let now = Instant::now();
        Self {
            config,
            gpu: None,
            grid: GridSize { width: 1, height: 1 },
            buffers: PingPong::default(),
            pointer: PointerState::cleared(),
            fade: Fade::new(),
            running: false,
            rng,
            last_tick: now,
            last_glider: now,
            last_drag: now,
        }
    }

    /// Thread main. Consumes commands until the host drops the channel.
    ///
    /// While running, commands are drained without blocking and one frame is
    /// produced per `frame_interval`. While stopped, the thread parks on the
    /// channel.
    pub fn run(mut self, commands: Receiver<Command>, notices: Sender<Notice>) {
        loop {
            if !self.running {
                match commands.recv() {
                    Ok(command) => self.handle(command, &notices),
                    Err(_) => break,
                }
                continue;
            }

            loop {
                match commands.try_recv() {
                    Ok(command) => self.handle(command, &notices),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            let frame_started = Instant::now();
            if !self.frame(frame_started) {
                // The fade-out reached zero: the only natural exit of a run.
                self.running = false;
                info!("backdrop halted after fade-out");
                if notices.send(Notice::FadeOutComplete).is_err() {
                    break;
                }
                continue;
            }

            let spent = frame_started.elapsed();
            if spent < self.config.frame_interval {
                thread::sleep(self.config.frame_interval - spent);
            }
        }
    }

    fn handle(&mut self, command: Command, notices: &Sender<Notice>) {
        match command {
            Command::Init { source, width, height } => {
                let target = source.into_surface_target();
                match pollster::block_on(GpuContext::new(target, width, height, &self.config)) {
                    Ok(gpu) => {
                        self.gpu = Some(gpu);
                        self.restart(width, height);
                    }
                    Err(err) => {
                        error!("backdrop GPU init failed, engine stays stopped: {err}");
                        let _ = notices.send(Notice::InitFailed);
                    }
                }
            }
            Command::Start { width, height } => {
                // Without a completed Init there is nothing to restart
                if self.gpu.is_some() {
                    self.restart(width, height);
                }
            }
            Command::Stop => {
                if self.running {
                    self.fade.begin_out(Instant::now());
                }
            }
            Command::Resize { width, height } => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(width, height);
                }
                if self.running {
                    // Destructive by design; the fade phase is untouched
                    self.reseed(width, height);
                }
            }
            Command::PointerMove { x, y } => {
                self.pointer.x = x;
                self.pointer.y = y;
            }
            Command::PointerDown => self.pointer.down = true,
            Command::PointerUp => self.pointer.down = false,
        }
    }

    /// Begin (or begin again) a run: fresh grid, fade-in from transparent,
    /// pointer back to the sentinel.
    fn restart(&mut self, width: u32, height: u32) {
        let now = Instant::now();
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(width, height);
        }
        self.reseed(width, height);
        self.pointer = PointerState::cleared();
        self.fade.begin_in(now);
        self.last_tick = now;
        self.last_glider = now;
        self.last_drag = now;
        self.running = true;
        info!(
            "backdrop running at {width}x{height} ({}x{} cells)",
            self.grid.width, self.grid.height
        );
    }

    fn reseed(&mut self, surface_width: u32, surface_height: u32) {
        self.grid = GridSize::from_surface(surface_width, surface_height, self.config.cell_size);
        self.buffers.reset();
        let cells = grid::seed_cells(self.grid, self.config.initial_density, &mut self.rng);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.rebuild_grid(self.grid, &cells);
        }
    }

    /// One animation frame. Returns `false` when the fade-out completed and
    /// the run must halt.
    fn frame(&mut self, now: Instant) -> bool {
        match self.fade.advance(now, self.config.fade_duration) {
            FadeTick::Finished => return false,
            FadeTick::Steady | FadeTick::Fading => {}
        }

        self.update_spawns(now);

        if now.duration_since(self.last_tick) > self.config.tick_interval {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.step(self.buffers.current());
                self.buffers.swap();
            }
            self.last_tick = now;
        }

        if let Some(gpu) = self.gpu.as_mut() {
            if let Err(err) = gpu.paint(self.buffers.current(), self.fade.opacity()) {
                warn!("backdrop frame dropped: {err}");
            }
        }
        true
    }

    fn update_spawns(&mut self, now: Instant) {
        let due = inject::due_spawn(
            &self.pointer,
            now,
            self.last_glider,
            self.last_drag,
            self.config.glider_spawn_interval,
            self.config.drag_spawn_interval,
        );
        let Some(kind) = due else { return };

        let (cx, cy) =
            inject::cell_under_pointer(self.pointer.x, self.pointer.y, self.config.cell_size, self.grid);
        let patch = match kind {
            Spawn::Explosion => {
                self.last_drag = now;
                inject::explosion_patch(cx, cy, self.config.explosion_radius, self.grid, &mut self.rng)
            }
            Spawn::Glider => {
                self.last_glider = now;
                inject::glider_patch(cx, cy, self.grid, &mut self.rng)
            }
        };

        if let Some(gpu) = self.gpu.as_mut() {
            gpu.write_patch(self.buffers.current(), &patch);
        }
    }
}
