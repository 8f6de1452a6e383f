use std::fmt;

use super::SurfaceSize;

/// Depth attachment format of the offscreen target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Completeness of the offscreen target after the last reallocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramebufferStatus {
    /// Both attachments exist at the requested size.
    Complete,
    /// The requested size has a zero side; no storage was allocated.
    ZeroSized,
    /// A side exceeds the device's 2D texture limit; no storage was allocated.
    ExceedsLimit { requested: SurfaceSize, max: u32 },
    /// An attachment is missing or does not have the requested size.
    AttachmentMismatch {
        expected: SurfaceSize,
        color: Option<SurfaceSize>,
        depth: Option<SurfaceSize>,
    },
}

impl FramebufferStatus {
    /// Evaluates completeness for a target requested at `requested`.
    pub fn check(
        requested: SurfaceSize,
        max_dimension: u32,
        color: Option<SurfaceSize>,
        depth: Option<SurfaceSize>,
    ) -> Self {
        if requested.is_empty() {
            return Self::ZeroSized;
        }
        if requested.max_dimension() > max_dimension {
            return Self::ExceedsLimit {
                requested,
                max: max_dimension,
            };
        }
        if color != Some(requested) || depth != Some(requested) {
            return Self::AttachmentMismatch {
                expected: requested,
                color,
                depth,
            };
        }
        Self::Complete
    }

    #[inline]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::ZeroSized => f.write_str("zero-sized"),
            Self::ExceedsLimit { requested, max } => {
                write!(f, "{requested} exceeds the device limit of {max} pixels per side")
            }
            Self::AttachmentMismatch {
                expected,
                color,
                depth,
            } => write!(
                f,
                "attachments do not match {expected} (color: {color:?}, depth: {depth:?})"
            ),
        }
    }
}

struct Attachments {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Attachments {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: SurfaceSize) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ember offscreen color"),
            size: size.to_extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ember offscreen depth"),
            size: size.to_extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
        }
    }
}

/// Offscreen color + depth pair the scene pass renders into.
///
/// Invariant: outside of [`OffscreenTarget::reallocate`], both attachments
/// have exactly [`OffscreenTarget::size`], or neither exists and the status
/// says why.
pub struct OffscreenTarget {
    format: wgpu::TextureFormat,
    size: SurfaceSize,
    attachments: Option<Attachments>,
    status: FramebufferStatus,
}

impl OffscreenTarget {
    /// Creates an unallocated target; call [`OffscreenTarget::reallocate`] before use.
    pub fn new(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            size: SurfaceSize::default(),
            attachments: None,
            status: FramebufferStatus::ZeroSized,
        }
    }

    /// Replaces both attachments with storage of `size` and re-checks completeness.
    pub fn reallocate(&mut self, device: &wgpu::Device, size: SurfaceSize) -> FramebufferStatus {
        // Old storage goes first so peak memory is one target, not two.
        self.attachments = None;
        self.size = size;

        let max_dimension = device.limits().max_texture_dimension_2d;
        if !size.is_empty() && size.max_dimension() <= max_dimension {
            self.attachments = Some(Attachments::new(device, self.format, size));
        }

        self.status = FramebufferStatus::check(
            size,
            max_dimension,
            self.color_texture().map(|t| t.size().into()),
            self.depth_texture().map(|t| t.size().into()),
        );
        self.status
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Size requested by the last reallocation.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn status(&self) -> FramebufferStatus {
        self.status
    }

    pub fn color_texture(&self) -> Option<&wgpu::Texture> {
        self.attachments.as_ref().map(|a| &a.color)
    }

    pub fn depth_texture(&self) -> Option<&wgpu::Texture> {
        self.attachments.as_ref().map(|a| &a.depth)
    }

    pub fn color_view(&self) -> Option<&wgpu::TextureView> {
        self.attachments.as_ref().map(|a| &a.color_view)
    }

    /// Color and depth views, present only while the target is complete.
    pub fn views(&self) -> Option<(&wgpu::TextureView, &wgpu::TextureView)> {
        if !self.status.is_complete() {
            return None;
        }
        self.attachments
            .as_ref()
            .map(|a| (&a.color_view, &a.depth_view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 8192;

    fn s(w: u32, h: u32) -> SurfaceSize {
        SurfaceSize::new(w, h)
    }

    #[test]
    fn matching_attachments_are_complete() {
        let size = s(800, 600);
        let status = FramebufferStatus::check(size, MAX, Some(size), Some(size));
        assert_eq!(status, FramebufferStatus::Complete);
        assert!(status.is_complete());
    }

    #[test]
    fn zero_side_is_zero_sized() {
        assert_eq!(
            FramebufferStatus::check(s(0, 600), MAX, None, None),
            FramebufferStatus::ZeroSized
        );
        assert_eq!(
            FramebufferStatus::check(s(800, 0), MAX, None, None),
            FramebufferStatus::ZeroSized
        );
    }

    #[test]
    fn oversized_side_exceeds_limit() {
        let requested = s(MAX + 1, 16);
        assert_eq!(
            FramebufferStatus::check(requested, MAX, None, None),
            FramebufferStatus::ExceedsLimit { requested, max: MAX }
        );
    }

    #[test]
    fn limit_is_inclusive() {
        let size = s(MAX, MAX);
        assert!(FramebufferStatus::check(size, MAX, Some(size), Some(size)).is_complete());
    }

    #[test]
    fn stale_depth_attachment_is_a_mismatch() {
        let status = FramebufferStatus::check(s(800, 600), MAX, Some(s(800, 600)), Some(s(640, 480)));
        assert!(matches!(status, FramebufferStatus::AttachmentMismatch { .. }));
    }

    #[test]
    fn missing_attachment_is_a_mismatch() {
        let status = FramebufferStatus::check(s(800, 600), MAX, Some(s(800, 600)), None);
        assert!(!status.is_complete());
    }

    #[test]
    fn status_display_names_the_problem() {
        let status = FramebufferStatus::ExceedsLimit {
            requested: s(9000, 10),
            max: MAX,
        };
        assert_eq!(
            status.to_string(),
            "9000x10 exceeds the device limit of 8192 pixels per side"
        );
    }

    #[test]
    fn new_target_is_unallocated() {
        let target = OffscreenTarget::new(wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(target.size(), SurfaceSize::default());
        assert_eq!(target.status(), FramebufferStatus::ZeroSized);
        assert!(target.views().is_none());
    }
}
