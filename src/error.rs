// src/error.rs

use thiserror::Error;

/// Failures raised while bringing up or driving the GPU side of the backdrop.
///
/// All of these are fatal preconditions for the engine: there is no software
/// fallback. The engine logs them and stays stopped; the facade API itself
/// never fails.
#[derive(Debug, Error)]
pub enum BackdropError {
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire surface frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}
