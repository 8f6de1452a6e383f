//! Copies textures back to CPU memory.

use anyhow::{Context, Result};

/// Reads a 4-byte-per-texel 2D texture into tightly packed rows.
///
/// The texture needs `COPY_SRC`. Blocks until the GPU has finished the copy.
pub fn read_texture(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Result<Vec<u8>> {
    let size = texture.size();
    let format = texture.format();

    let texel_size = format
        .block_copy_size(None)
        .with_context(|| format!("{format:?} cannot be copied as a whole"))?;
    anyhow::ensure!(texel_size == 4, "{format:?} is not a 4-byte-per-texel format");

    let unpadded_row = size.width * texel_size;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_row = unpadded_row.div_ceil(align) * align;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("ember readback buffer"),
        size: u64::from(padded_row) * u64::from(size.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("ember readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(size.height),
            },
        },
        wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        sender.send(result).ok();
    });

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .context("device poll failed during readback")?;

    receiver
        .recv()
        .context("readback map callback never ran")?
        .context("failed to map readback buffer")?;

    let mut pixels = Vec::with_capacity((unpadded_row * size.height) as usize);
    {
        let mapped = slice.get_mapped_range();
        for row in mapped.chunks(padded_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_row as usize]);
        }
    }
    buffer.unmap();

    Ok(pixels)
}
