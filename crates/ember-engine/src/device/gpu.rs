use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::{RenderCtx, SurfaceSize};

use super::surface::{SurfaceFrame, SurfaceRecovery, Swapchain};
use super::GpuInit;

/// The rendering context of one window.
///
/// Owns the device and queue every render component draws with, and the
/// swapchain frames are presented to. The surface borrows the window for `'w`.
pub struct Gpu<'w> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    swapchain: Swapchain<'w>,
}

impl<'w> Gpu<'w> {
    /// Creates the context for `window`.
    ///
    /// Fails when the window has no drawable area or no adapter can present
    /// to it.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = SurfaceSize::from(window.inner_size());
        anyhow::ensure!(!size.is_empty(), "window has no drawable area ({size})");

        let instance = init.instance();
        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;
        let adapter = init.adapter(&instance, Some(&surface)).await?;
        let (device, queue) = init.device(&adapter, "ember device").await?;
        let swapchain = Swapchain::configure(surface, &adapter, &device, &init, size)?;

        Ok(Self {
            device,
            queue,
            swapchain,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.swapchain.format()
    }

    /// Drawable size in physical pixels. May be zero while minimized.
    pub fn size(&self) -> SurfaceSize {
        self.swapchain.size()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, self.swapchain.format())
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.swapchain.resize(&self.device, size);
    }

    /// Acquires the next swapchain image, recovering from a lost or outdated
    /// surface when possible.
    pub fn acquire(&self) -> std::result::Result<SurfaceFrame, SurfaceRecovery> {
        self.swapchain.acquire(&self.device)
    }

    /// Submits everything recorded into `frame` and presents it.
    pub fn present(&self, frame: SurfaceFrame) {
        let SurfaceFrame { texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }
}
