//! Ember engine crate.
//!
//! This crate owns the platform + GPU runtime pieces and the two render
//! components built on them: [`render::ShaderProgram`] and
//! [`render::FrameCompositor`].

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
pub mod render;

mod error;

pub use error::{Error, Result};
