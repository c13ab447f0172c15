//! # Graphics Module
//!
//! Everything that touches wgpu lives here: surface and device acquisition,
//! the ping-pong cell-state textures, and the two render pipelines — the
//! step pass that advances the automaton into the off-screen target and the
//! paint pass that draws the current state to the window surface.

pub mod context;
pub mod shaders;
pub mod uniforms;

pub use context::GpuContext;
