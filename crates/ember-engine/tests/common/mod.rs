#![allow(dead_code)]

use ember_engine::device::{request_headless, GpuInit};
use ember_engine::render::{RenderCtx, ShaderSet};

/// Format standing in for the swapchain in headless runs.
pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct Headless {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Headless {
    /// Returns `None` (and says so) on machines without any adapter.
    pub fn new() -> Option<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        match request_headless(&GpuInit::default()) {
            Ok((device, queue)) => Some(Self { device, queue }),
            Err(err) => {
                eprintln!("skipping: no GPU adapter ({err:#})");
                None
            }
        }
    }

    pub fn ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, FORMAT)
    }
}

pub fn shipped_shaders() -> ShaderSet {
    ShaderSet::load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../../shaders"))
        .expect("shipped shaders should load")
}

/// A texture playing the role of the surface frame.
pub fn visible_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test visible target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

pub fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}
