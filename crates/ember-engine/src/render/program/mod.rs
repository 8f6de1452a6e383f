//! Linked vertex/fragment programs.

mod link;
mod uniforms;

use std::collections::BTreeMap;
use std::fmt;

use crate::Result;

pub use link::ShaderStage;
pub use uniforms::UniformLocation;

use link::LinkedStages;
use uniforms::UniformCache;

/// Attachment formats a program renders into.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramTargets {
    pub color_format: wgpu::TextureFormat,

    /// Enables depth testing (`Less`, writes on) against this format.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl ProgramTargets {
    pub const fn color(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            depth_format: None,
        }
    }

    pub const fn with_depth(mut self, depth_format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(depth_format);
        self
    }
}

/// A bind group built for one `@group` index of a program.
#[derive(Debug)]
pub struct ProgramBindGroup {
    pub group: u32,
    pub bind_group: wgpu::BindGroup,
}

/// A compiled and linked WGSL vertex/fragment pair.
///
/// The pipeline layout is derived from the shaders, so resources the shaders
/// never touch are absent from it. [`ShaderProgram::uniform_location`] reports
/// exactly those resources as not found.
///
/// Draws use no vertex buffers; vertex stages generate positions from
/// `@builtin(vertex_index)`.
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    interface: LinkedStages,
    uniforms: UniformCache,
}

impl ShaderProgram {
    /// Compiles both stages, links them and creates the render pipeline.
    ///
    /// Fails with [`crate::Error::ShaderCompile`] or
    /// [`crate::Error::ProgramLink`] carrying the compiler diagnostic.
    pub fn create(
        device: &wgpu::Device,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
        targets: ProgramTargets,
    ) -> Result<Self> {
        let vertex = link::VertexSource::parse(vertex_source)?;
        let fragment = link::FragmentSource::parse(fragment_source)?;
        let interface = link::link(vertex, fragment)?;

        // No GPU object exists before this point.
        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex")),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment")),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: None,

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(interface.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(interface.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: targets.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: targets.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::info!(
            "program `{label}` linked ({} -> {})",
            interface.vertex_entry(),
            interface.fragment_entry()
        );

        Ok(Self {
            label: label.to_owned(),
            pipeline,
            interface,
            uniforms: UniformCache::default(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Makes this program the active pipeline of `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
    }

    /// Makes this program active and binds `groups` at their indices.
    pub fn bind_with(&self, pass: &mut wgpu::RenderPass<'_>, groups: &[ProgramBindGroup]) {
        self.bind(pass);
        for group in groups {
            pass.set_bind_group(group.group, &group.bind_group, &[]);
        }
    }

    /// Returns the location of the named resource, or `None` when the program
    /// has no live resource of that name.
    ///
    /// The first call per name resolves against the shader modules; every
    /// later call is answered from the cache.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get_or_resolve(name, |name| {
            let location = self.interface.resolve_uniform(name);
            log::debug!("program `{}`: uniform `{name}` -> {location:?}", self.label);
            location
        })
    }

    /// Number of names resolved so far, hits and misses alike.
    pub fn cached_uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Returns the shader-derived layout of bind group `group`.
    ///
    /// `group` must be the group of a live resource (see
    /// [`ShaderProgram::uniform_location`]).
    pub fn bind_group_layout(&self, group: u32) -> wgpu::BindGroupLayout {
        self.pipeline.get_bind_group_layout(group)
    }

    /// Builds one bind group per `@group` from `(name, resource)` pairs.
    ///
    /// Names that do not resolve are skipped, so callers may offer resources a
    /// given shader does not use.
    pub fn bind_groups<'n, 'r, I>(&self, device: &wgpu::Device, label: &str, resources: I) -> Vec<ProgramBindGroup>
    where
        I: IntoIterator<Item = (&'n str, wgpu::BindingResource<'r>)>,
    {
        let mut by_group: BTreeMap<u32, Vec<wgpu::BindGroupEntry<'r>>> = BTreeMap::new();

        for (name, resource) in resources {
            let Some(location) = self.uniform_location(name) else {
                log::debug!("program `{}`: skipping unused resource `{name}`", self.label);
                continue;
            };
            by_group.entry(location.group).or_default().push(wgpu::BindGroupEntry {
                binding: location.binding,
                resource,
            });
        }

        by_group
            .into_iter()
            .map(|(group, entries)| ProgramBindGroup {
                group,
                bind_group: device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &self.bind_group_layout(group),
                    entries: &entries,
                }),
            })
            .collect()
    }

    /// Releases the pipeline. Dropping the program has the same effect.
    pub fn destroy(self) {
        log::debug!("program `{}` destroyed", self.label);
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("label", &self.label)
            .field("vertex_entry", &self.interface.vertex_entry())
            .field("fragment_entry", &self.interface.fragment_entry())
            .field("cached_uniforms", &self.uniforms.len())
            .finish_non_exhaustive()
    }
}
