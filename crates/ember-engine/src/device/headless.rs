use anyhow::Result;

use super::GpuInit;

/// Creates a device and queue with no surface attached.
///
/// Used by tests and offline tooling that render into textures and read them
/// back. Fails when the machine exposes no adapter at all.
pub fn request_headless(init: &GpuInit) -> Result<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = init.instance();
        let adapter = init.adapter(&instance, None).await?;
        init.device(&adapter, "ember headless device").await
    })
}
