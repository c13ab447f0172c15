// src/protocol.rs
//! Message protocol between the host-side facade and the engine thread.
//!
//! Two `std::sync::mpsc` channels, one per direction, each with a single
//! consumer. Delivery is FIFO and asynchronous; there is no request/response
//! correlation. A command may be consumed at any point between simulation
//! ticks — pointer state is eventually consistent by design.

use std::fmt;

/// Ownership transfer of the drawing surface into the engine thread.
///
/// Implemented for `Arc<winit::window::Window>` (the practical case) and
/// consumed exactly once, on [`Command::Init`]. The host side keeps no way
/// to render to the surface afterwards.
pub trait SurfaceSource: Send {
    fn into_surface_target(self: Box<Self>) -> wgpu::SurfaceTarget<'static>;
}

impl SurfaceSource for std::sync::Arc<winit::window::Window> {
    fn into_surface_target(self: Box<Self>) -> wgpu::SurfaceTarget<'static> {
        (*self).into()
    }
}

/// Commands flowing host → engine.
pub enum Command {
    /// First-time setup: take ownership of the drawing surface and start.
    Init {
        source: Box<dyn SurfaceSource>,
        width: u32,
        height: u32,
    },
    /// Restart after a completed fade-out, without re-transferring the
    /// surface. Ignored if no `Init` ever succeeded.
    Start { width: u32, height: u32 },
    /// Begin the fade-out. The engine keeps rendering until it completes.
    Stop,
    /// Reinitialize the grid at new surface dimensions. Destructive: the
    /// current cell contents are discarded. Leaves the fade phase alone.
    Resize { width: u32, height: u32 },
    /// Latest pointer position in surface pixel coordinates.
    PointerMove { x: f32, y: f32 },
    PointerDown,
    PointerUp,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Init { width, height, .. } => f
                .debug_struct("Init")
                .field("width", width)
                .field("height", height)
                .finish_non_exhaustive(),
            Command::Start { width, height } => f
                .debug_struct("Start")
                .field("width", width)
                .field("height", height)
                .finish(),
            Command::Stop => write!(f, "Stop"),
            Command::Resize { width, height } => f
                .debug_struct("Resize")
                .field("width", width)
                .field("height", height)
                .finish(),
            Command::PointerMove { x, y } => f
                .debug_struct("PointerMove")
                .field("x", x)
                .field("y", y)
                .finish(),
            Command::PointerDown => write!(f, "PointerDown"),
            Command::PointerUp => write!(f, "PointerUp"),
        }
    }
}

/// Notices flowing engine → host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The fade-out reached zero opacity and the run halted. Terminal for
    /// the current run; delivered at most once per `Stop`.
    FadeOutComplete,
    /// GPU bring-up failed after `Init`. Terminal for the whole backdrop:
    /// the engine thread stays parked and later `Start` commands are
    /// ignored.
    InitFailed,
}
