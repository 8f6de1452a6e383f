//! Time subsystem.
//!
//! One `FrameClock` per render loop; call `tick()` once per presented frame to
//! obtain the `FrameTime` passed to the per-frame update.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
