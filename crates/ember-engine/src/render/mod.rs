//! GPU rendering subsystem.
//!
//! - [`ShaderProgram`]: a linked WGSL vertex/fragment pair with a by-name
//!   uniform-location cache.
//! - [`FrameCompositor`]: renders the scene into an [`OffscreenTarget`] and
//!   blits it to the visible surface.
//!
//! Convention:
//! - Sizes are physical pixels ([`SurfaceSize`]).
//! - GPU state is never implicit: components receive a [`RenderCtx`] and
//!   record into a [`RenderTarget`] or a `wgpu::RenderPass` passed to them.

mod compositor;
mod ctx;
mod program;
pub mod readback;
mod size;
mod source;
mod target;

pub use compositor::{CompositorConfig, CompositorState, FrameCompositor, FrameUniforms};
pub use ctx::{RenderCtx, RenderTarget};
pub use program::{ProgramBindGroup, ProgramTargets, ShaderProgram, ShaderStage, UniformLocation};
pub use size::SurfaceSize;
pub use source::{ShaderSet, ShaderSource};
pub use target::{FramebufferStatus, OffscreenTarget, DEPTH_FORMAT};
