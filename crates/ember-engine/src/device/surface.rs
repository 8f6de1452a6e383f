use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::render::SurfaceSize;

use super::GpuInit;

/// What happened to a frame whose surface texture could not be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceRecovery {
    /// The surface was reconfigured; the next frame should succeed.
    Reconfigured,
    /// Transient failure; this frame is dropped.
    Skipped,
    /// The device ran out of memory. Rendering cannot continue.
    Fatal,
}

/// One acquired swapchain image and the encoder recording into it.
///
/// Holding this blocks acquisition of the next image; hand it back to
/// [`super::Gpu::present`] promptly.
pub struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl SurfaceFrame {
    /// Size of the acquired image, which may lag behind the window size.
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::from(self.texture.texture.size())
    }
}

/// Window surface plus its live configuration.
pub(crate) struct Swapchain<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
}

impl<'w> Swapchain<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        init: &GpuInit,
        size: SurfaceSize,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = choose_format(&caps, init.prefer_srgb).context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!("surface configured: {format:?} {size}");

        Ok(Self { surface, config, size })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Records `size` and reconfigures. A zero-sized surface cannot be
    /// configured, so that case waits for the next non-zero resize.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = SurfaceSize::from(size);
        if self.size.is_empty() {
            return;
        }

        self.config.width = self.size.width;
        self.config.height = self.size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(
        &self,
        device: &wgpu::Device,
    ) -> std::result::Result<SurfaceFrame, SurfaceRecovery> {
        let texture = self
            .surface
            .get_current_texture()
            .map_err(|err| self.recover(device, err))?;

        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ember frame encoder"),
        });

        Ok(SurfaceFrame { texture, view, encoder })
    }

    fn recover(&self, device: &wgpu::Device, err: wgpu::SurfaceError) -> SurfaceRecovery {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if !self.size.is_empty() {
                    self.surface.configure(device, &self.config);
                }
                log::debug!("surface {err:?}; reconfigured");
                SurfaceRecovery::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
                log::debug!("surface {err:?}; frame skipped");
                SurfaceRecovery::Skipped
            }
        }
    }
}

fn choose_format(caps: &wgpu::SurfaceCapabilities, prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let matching = caps.formats.iter().copied().find(|f| f.is_srgb() == prefer_srgb);
    matching.or_else(|| caps.formats.first().copied())
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
