mod common;

use common::{pixel, shipped_shaders, visible_texture, Headless};
use ember_engine::paint::Color;
use ember_engine::render::readback::read_texture;
use ember_engine::render::{
    CompositorConfig, CompositorState, FrameCompositor, FramebufferStatus, RenderTarget, ShaderSource,
    SurfaceSize,
};
use ember_engine::time::FrameTime;

fn render_once(gpu: &Headless, compositor: &FrameCompositor, visible: &wgpu::Texture) {
    let view = visible.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test frame") });

    {
        let mut target = RenderTarget::new(&mut encoder, &view, SurfaceSize::from(visible.size()));
        compositor.render(&mut target);
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
}

#[test]
fn resize_allocates_complete_target_at_requested_size() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();

    let mut compositor = FrameCompositor::new(
        &ctx,
        &shipped_shaders(),
        SurfaceSize::new(320, 240),
        CompositorConfig::default(),
    )
    .unwrap();

    let status = compositor.resize(&ctx, SurfaceSize::new(800, 600));
    assert_eq!(status, FramebufferStatus::Complete);
    assert_eq!(compositor.state(), CompositorState::Sized);

    let target = compositor.target();
    assert_eq!(target.size(), SurfaceSize::new(800, 600));
    assert!(target.status().is_complete());
    assert_eq!(target.format(), common::FORMAT);

    let color = target.color_texture().unwrap();
    let depth = target.depth_texture().unwrap();
    assert_eq!(SurfaceSize::from(color.size()), SurfaceSize::new(800, 600));
    assert_eq!(SurfaceSize::from(depth.size()), SurfaceSize::new(800, 600));
}

#[test]
fn blit_reproduces_offscreen_image() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();
    let (width, height) = (800, 600);

    let compositor = FrameCompositor::new(
        &ctx,
        &shipped_shaders(),
        SurfaceSize::new(width, height),
        CompositorConfig::default(),
    )
    .unwrap();

    let visible = visible_texture(&gpu.device, width, height);
    render_once(&gpu, &compositor, &visible);

    let offscreen = read_texture(
        &gpu.device,
        &gpu.queue,
        compositor.target().color_texture().unwrap(),
    )
    .unwrap();
    let shown = read_texture(&gpu.device, &gpu.queue, &visible).unwrap();

    assert_eq!(offscreen.len(), shown.len());
    let max_diff = offscreen
        .iter()
        .zip(&shown)
        .map(|(a, b)| a.abs_diff(*b))
        .max()
        .unwrap_or(0);
    assert!(max_diff <= 1, "blit differs from offscreen by {max_diff}");

    // Background is the offscreen clear color.
    assert_eq!(pixel(&shown, width, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&shown, width, width - 1, height - 1), [255, 0, 0, 255]);

    // The triangle covers the center.
    let center = pixel(&shown, width, width / 2, height / 2);
    assert_ne!(center, [255, 0, 0, 255]);
    assert_eq!(center[3], 255);
}

#[test]
fn zero_sized_resize_is_reported_and_skips_scene() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();

    let mut compositor = FrameCompositor::new(
        &ctx,
        &shipped_shaders(),
        SurfaceSize::new(64, 64),
        CompositorConfig::default(),
    )
    .unwrap();

    let status = compositor.resize(&ctx, SurfaceSize::new(0, 600));
    assert_eq!(status, FramebufferStatus::ZeroSized);
    assert_eq!(compositor.target().size(), SurfaceSize::new(0, 600));
    assert!(compositor.target().color_texture().is_none());

    // The visible pass still clears; nothing is blitted over it.
    let visible = visible_texture(&gpu.device, 16, 16);
    render_once(&gpu, &compositor, &visible);
    let shown = read_texture(&gpu.device, &gpu.queue, &visible).unwrap();
    assert!(shown.chunks(4).all(|px| px == [0, 0, 0, 255]));

    // A later valid size recovers.
    let status = compositor.resize(&ctx, SurfaceSize::new(64, 64));
    assert!(status.is_complete());
}

#[test]
fn oversized_resize_exceeds_device_limit() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();

    let mut compositor = FrameCompositor::new(
        &ctx,
        &shipped_shaders(),
        SurfaceSize::new(64, 64),
        CompositorConfig::default(),
    )
    .unwrap();

    let max = gpu.device.limits().max_texture_dimension_2d;
    let status = compositor.resize(&ctx, SurfaceSize::new(max + 1, 16));
    assert!(matches!(status, FramebufferStatus::ExceedsLimit { max: m, .. } if m == max));
    assert!(compositor.target().views().is_none());
}

#[test]
fn custom_clear_color_reaches_the_screen() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();

    let config = CompositorConfig {
        clear_color: Color::from_premul(0.0, 0.0, 1.0, 1.0),
        ..CompositorConfig::default()
    };
    let compositor =
        FrameCompositor::new(&ctx, &shipped_shaders(), SurfaceSize::new(32, 32), config).unwrap();

    let visible = visible_texture(&gpu.device, 32, 32);
    render_once(&gpu, &compositor, &visible);
    let shown = read_texture(&gpu.device, &gpu.queue, &visible).unwrap();
    assert_eq!(pixel(&shown, 32, 0, 0), [0, 0, 255, 255]);
}

#[test]
fn destroy_releases_everything() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();

    let compositor = FrameCompositor::new(
        &ctx,
        &shipped_shaders(),
        SurfaceSize::new(8, 8),
        CompositorConfig::default(),
    )
    .unwrap();
    compositor.destroy();

    gpu.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .unwrap();
}

#[test]
fn frame_uniforms_reach_the_scene_shader() {
    let Some(gpu) = Headless::new() else { return };
    let ctx = gpu.ctx();
    let (width, height) = (60, 20);

    let mut shaders = shipped_shaders();
    shaders.scene = ShaderSource::new(
        shaders.scene.vertex.clone(),
        r#"
struct FrameUniforms {
    time: f32,
    frame_index: u32,
    resolution: vec2<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniforms;

@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    let res = frame.resolution / 100.0;
    return vec4<f32>(res.x, res.y, f32(frame.frame_index) / 255.0, 1.0);
}
"#,
    );

    let compositor = FrameCompositor::new(
        &ctx,
        &shaders,
        SurfaceSize::new(width, height),
        CompositorConfig::default(),
    )
    .unwrap();
    assert!(compositor.scene().uniform_location("frame").is_some());

    let time = FrameTime {
        dt: 1.0 / 60.0,
        elapsed: 1.0,
        now: std::time::Instant::now(),
        frame_index: 7,
    };
    compositor.update(&ctx, &time);

    let visible = visible_texture(&gpu.device, width, height);
    render_once(&gpu, &compositor, &visible);
    let shown = read_texture(&gpu.device, &gpu.queue, &visible).unwrap();

    // 60 / 100 and 20 / 100 of full scale, frame index in blue.
    let center = pixel(&shown, width, width / 2, height / 2);
    let expected = [153u8, 51, 7, 255];
    for (got, want) in center.iter().zip(expected) {
        assert!(got.abs_diff(want) <= 1, "center {center:?}, expected {expected:?}");
    }

    // Outside the triangle the offscreen clear color remains.
    assert_eq!(pixel(&shown, width, 0, 0), [255, 0, 0, 255]);
}
