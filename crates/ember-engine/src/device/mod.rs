//! GPU device and window surface.
//!
//! [`Gpu`] is the windowed rendering context. [`request_headless`] creates the
//! same device without a surface, for tests and offline rendering.

mod gpu;
mod headless;
mod init;
mod surface;

pub use gpu::Gpu;
pub use headless::request_headless;
pub use init::GpuInit;
pub use surface::{SurfaceFrame, SurfaceRecovery};
