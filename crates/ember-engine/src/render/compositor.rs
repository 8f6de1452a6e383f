use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::time::FrameTime;
use crate::Result;

use super::{
    FramebufferStatus, OffscreenTarget, ProgramBindGroup, ProgramTargets, RenderCtx, RenderTarget,
    ShaderProgram, ShaderSet, SurfaceSize, DEPTH_FORMAT,
};

/// Blit fragment resource holding the offscreen color texture.
pub const SOURCE_TEXTURE: &str = "source_texture";
/// Blit fragment resource holding the linear sampler.
pub const SOURCE_SAMPLER: &str = "source_sampler";
/// Optional scene resource receiving [`FrameUniforms`] every frame.
pub const FRAME_UNIFORM: &str = "frame";

/// Compositor configuration.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Clear color of the offscreen scene pass.
    pub clear_color: Color,

    /// Clear color of the visible pass. Only visible where the blit does not
    /// draw, i.e. while the offscreen target is incomplete.
    pub surface_clear_color: Color,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::RED,
            surface_clear_color: Color::BLACK,
        }
    }
}

/// Per-frame values written to a scene shader that declares
/// `var<uniform> frame: FrameUniforms`.
///
/// WGSL layout: `struct FrameUniforms { time: f32, frame_index: u32, resolution: vec2<f32> }`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub time: f32,
    pub frame_index: u32,
    pub resolution: [f32; 2],
}

/// Resize bookkeeping. `Resizing` only lasts for the duration of
/// [`FrameCompositor::resize`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompositorState {
    Sized,
    Resizing,
}

/// Renders the scene into an offscreen target, then copies it to the surface.
///
/// Frame sequence (fixed):
/// 1. offscreen pass: viewport = target size, clear color + depth
/// 2. scene program, 3 procedurally generated vertices
/// 3. visible pass: viewport = surface size, clear color
/// 4. blit program sampling the offscreen color, one full-screen triangle
///
/// While the target is incomplete, steps 1, 2 and 4 are skipped.
pub struct FrameCompositor {
    config: CompositorConfig,
    state: CompositorState,

    scene: ShaderProgram,
    blit: ShaderProgram,
    sampler: wgpu::Sampler,

    target: OffscreenTarget,
    blit_groups: Vec<ProgramBindGroup>,

    frame_ubo: Option<wgpu::Buffer>,
    scene_groups: Vec<ProgramBindGroup>,
}

impl FrameCompositor {
    /// Compiles both programs and allocates the target at `size`.
    ///
    /// The offscreen color format is `ctx.surface_format`, so the blit copies
    /// texels without a format conversion.
    pub fn new(
        ctx: &RenderCtx<'_>,
        shaders: &ShaderSet,
        size: SurfaceSize,
        config: CompositorConfig,
    ) -> Result<Self> {
        let format = ctx.surface_format;

        let scene = ShaderProgram::create(
            ctx.device,
            "ember scene",
            &shaders.scene.vertex,
            &shaders.scene.fragment,
            ProgramTargets::color(format).with_depth(DEPTH_FORMAT),
        )?;
        let blit = ShaderProgram::create(
            ctx.device,
            "ember blit",
            &shaders.blit.vertex,
            &shaders.blit.fragment,
            ProgramTargets::color(format),
        )?;

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember blit sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let (frame_ubo, scene_groups) = match scene.uniform_location(FRAME_UNIFORM) {
            Some(_) => {
                let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("ember frame ubo"),
                    size: std::mem::size_of::<FrameUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let groups = scene.bind_groups(
                    ctx.device,
                    "ember scene bind group",
                    [(FRAME_UNIFORM, ubo.as_entire_binding())],
                );
                (Some(ubo), groups)
            }
            None => (None, Vec::new()),
        };

        let mut compositor = Self {
            config,
            state: CompositorState::Sized,
            scene,
            blit,
            sampler,
            target: OffscreenTarget::new(format),
            blit_groups: Vec::new(),
            frame_ubo,
            scene_groups,
        };
        compositor.resize(ctx, size);

        Ok(compositor)
    }

    /// Reallocates the offscreen target to `size` and rebinds it for the blit.
    ///
    /// An incomplete target is logged and returned; rendering carries on.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>, size: SurfaceSize) -> FramebufferStatus {
        self.state = CompositorState::Resizing;
        log::debug!("offscreen target {} -> {size}", self.target.size());

        let status = self.target.reallocate(ctx.device, size);

        self.blit_groups = match self.target.color_view() {
            Some(view) => self.blit.bind_groups(
                ctx.device,
                "ember blit bind group",
                [
                    (SOURCE_TEXTURE, wgpu::BindingResource::TextureView(view)),
                    (SOURCE_SAMPLER, wgpu::BindingResource::Sampler(&self.sampler)),
                ],
            ),
            None => Vec::new(),
        };

        if !status.is_complete() {
            log::warn!("offscreen framebuffer incomplete at {size}: {status}");
        }

        self.state = CompositorState::Sized;
        status
    }

    /// Per-frame update. Writes [`FrameUniforms`] when the scene declares them.
    pub fn update(&self, ctx: &RenderCtx<'_>, time: &FrameTime) {
        let Some(ubo) = self.frame_ubo.as_ref() else { return };

        let size = self.target.size();
        let uniforms = FrameUniforms {
            time: time.elapsed,
            frame_index: time.frame_index as u32,
            resolution: [size.width as f32, size.height as f32],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Records the scene pass and the blit pass into `target.encoder`.
    pub fn render(&self, target: &mut RenderTarget<'_>) {
        debug_assert_eq!(self.state, CompositorState::Sized);

        let offscreen = self.target.views();

        if let Some((color_view, depth_view)) = offscreen {
            let size = self.target.size();
            let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            set_full_viewport(&mut pass, size);
            self.scene.bind_with(&mut pass, &self.scene_groups);
            pass.draw(0..3, 0..1);
        }

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.surface_clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if offscreen.is_some() {
            set_full_viewport(&mut pass, target.size);
            self.blit.bind_with(&mut pass, &self.blit_groups);
            pass.draw(0..3, 0..1);
        }
    }

    pub fn state(&self) -> CompositorState {
        self.state
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    pub fn scene(&self) -> &ShaderProgram {
        &self.scene
    }

    pub fn blit(&self) -> &ShaderProgram {
        &self.blit
    }

    /// Releases both programs and the target.
    pub fn destroy(self) {
        self.scene.destroy();
        self.blit.destroy();
    }
}

fn set_full_viewport(pass: &mut wgpu::RenderPass<'_>, size: SurfaceSize) {
    if size.is_empty() {
        return;
    }
    pass.set_viewport(0.0, 0.0, size.width as f32, size.height as f32, 0.0, 1.0);
}
