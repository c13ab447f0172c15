// src/lib.rs
//! Life Backdrop
//!
//! An ambient, pointer-reactive Game of Life animation intended to run behind
//! other content. The simulation lives on its own engine thread, owns all GPU
//! state through wgpu, and is driven from the host thread through a small
//! typed message protocol. Appearance and disappearance are smooth fades; the
//! host is notified once a fade-out has fully completed.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod gfx;
pub mod protocol;

// Re-export the host-facing surface for convenience
pub use config::Config;
pub use control::LifeBackdrop;
pub use error::BackdropError;
