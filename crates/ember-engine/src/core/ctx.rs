use winit::window::Window;

use crate::device::{Gpu, SurfaceRecovery};
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;

use super::app::AppControl;

/// What `core::App::on_frame` gets to work with.
///
/// `'a` is the callback invocation; `'w` is the window borrow held by the
/// surface inside [`Gpu`].
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        self.gpu.render_ctx()
    }

    /// Acquires a swapchain image, lets `draw` record into it, then presents.
    ///
    /// A frame that cannot be acquired is dropped. Only an out-of-memory
    /// surface ends the loop.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.acquire() {
            Ok(frame) => frame,
            Err(SurfaceRecovery::Fatal) => {
                log::error!("surface out of memory; stopping");
                return AppControl::Exit;
            }
            Err(_) => return AppControl::Continue,
        };

        let size = frame.size();
        let ctx = self.gpu.render_ctx();
        draw(&ctx, &mut RenderTarget::new(&mut frame.encoder, &frame.view, size));

        self.window.pre_present_notify();
        self.gpu.present(frame);

        AppControl::Continue
    }
}
