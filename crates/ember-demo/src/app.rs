use anyhow::Context;

use ember_engine::core::{App, AppControl, FrameCtx};
use ember_engine::render::{CompositorConfig, FrameCompositor, RenderCtx, ShaderSet, SurfaceSize};

/// Scene-to-texture-to-screen demo.
///
/// Programs are compiled in `on_init`, once the GPU context exists.
pub struct Demo {
    shaders: ShaderSet,
    config: CompositorConfig,
    compositor: Option<FrameCompositor>,
}

impl Demo {
    pub fn new(shaders: ShaderSet, config: CompositorConfig) -> Self {
        Self {
            shaders,
            config,
            compositor: None,
        }
    }
}

impl App for Demo {
    fn on_init(&mut self, ctx: &RenderCtx<'_>, size: SurfaceSize) -> anyhow::Result<()> {
        let compositor = FrameCompositor::new(ctx, &self.shaders, size, self.config.clone())
            .context("failed to build the frame compositor")?;
        log::info!("compositor ready at {size}");
        self.compositor = Some(compositor);
        Ok(())
    }

    fn on_resize(&mut self, ctx: &RenderCtx<'_>, size: SurfaceSize) {
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.resize(ctx, size);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(compositor) = self.compositor.as_ref() else {
            return AppControl::Continue;
        };

        compositor.update(&ctx.render_ctx(), &ctx.time);
        ctx.render(|_, target| compositor.render(target))
    }
}
