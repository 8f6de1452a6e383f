//! Single-window event loop driving a [`crate::core::App`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
