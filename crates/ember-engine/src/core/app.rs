use winit::event::WindowEvent;

use crate::render::{RenderCtx, SurfaceSize};

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`crate::window::Runtime`].
///
/// Call order: `on_init` once, then any number of `on_resize` / `on_frame`,
/// all on the event-loop thread.
pub trait App {
    /// Called once the window and its GPU context exist, before the first frame.
    ///
    /// An error stops the runtime before any frame is drawn.
    fn on_init(&mut self, ctx: &RenderCtx<'_>, size: SurfaceSize) -> anyhow::Result<()> {
        let _ = (ctx, size);
        Ok(())
    }

    /// Called after the surface has been reconfigured to `size` (physical pixels).
    fn on_resize(&mut self, ctx: &RenderCtx<'_>, size: SurfaceSize) {
        let _ = (ctx, size);
    }

    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per display refresh.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
