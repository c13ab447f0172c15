// src/config.rs
//
// This file is the control panel: every behavioral dial of the backdrop
// lives here. The defaults reproduce the tuning the animation shipped with.

use std::time::Duration;

/// Tuning for the backdrop simulation, injection, and fade behavior.
///
/// Construct with [`Config::default`] and override fields as needed. The
/// same value is shared by the facade and the engine thread, so it is
/// `Copy` and fixed for the lifetime of a [`crate::LifeBackdrop`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Edge length of one cell in surface pixels.
    pub cell_size: u32,
    /// Width of the gap drawn between cells, in surface pixels.
    pub cell_gap: u32,
    /// Fixed simulation timestep. One automaton generation per interval,
    /// independent of render framerate.
    pub tick_interval: Duration,
    /// Probability that a cell starts alive after (re)seeding.
    pub initial_density: f32,
    /// Minimum time between glider spawns while the pointer hovers.
    pub glider_spawn_interval: Duration,
    /// Minimum time between explosion spawns while the pointer drags.
    pub drag_spawn_interval: Duration,
    /// Radius of the explosion disc, in cells.
    pub explosion_radius: u32,
    /// Duration of a full fade-in or fade-out.
    pub fade_duration: Duration,
    /// Target frame budget for the engine loop.
    pub frame_interval: Duration,
    /// Seed for grid seeding and pattern choice. `None` seeds from the OS,
    /// `Some` makes every run reproducible (used by the tests).
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: 6,
            cell_gap: 1,
            tick_interval: Duration::from_millis(50),
            initial_density: 0.2,
            glider_spawn_interval: Duration::from_millis(1000),
            drag_spawn_interval: Duration::from_millis(100),
            explosion_radius: 6,
            fade_duration: Duration::from_millis(300),
            frame_interval: Duration::from_millis(16),
            seed: None,
        }
    }
}
