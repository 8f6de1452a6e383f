//! Color model shared by the render components.

pub mod color;

pub use color::Color;
