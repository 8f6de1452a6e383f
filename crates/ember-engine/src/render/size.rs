use winit::dpi::PhysicalSize;

/// Pixel dimensions of a surface or texture.
///
/// Always physical pixels. Window sizes reported by `winit` already include the
/// display scale factor, and the offscreen target uses them unchanged.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the larger of the two dimensions.
    #[inline]
    pub fn max_dimension(self) -> u32 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn to_extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl From<PhysicalSize<u32>> for SurfaceSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<wgpu::Extent3d> for SurfaceSize {
    fn from(extent: wgpu::Extent3d) -> Self {
        Self::new(extent.width, extent.height)
    }
}

impl std::fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_either_side_is_zero() {
        assert!(SurfaceSize::new(0, 600).is_empty());
        assert!(SurfaceSize::new(800, 0).is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }

    #[test]
    fn physical_size_converts_without_scaling() {
        let size: SurfaceSize = PhysicalSize::new(1600u32, 1200u32).into();
        assert_eq!(size, SurfaceSize::new(1600, 1200));
    }

    #[test]
    fn extent_round_trip_keeps_dimensions() {
        let size = SurfaceSize::new(800, 600);
        assert_eq!(SurfaceSize::from(size.to_extent()), size);
        assert_eq!(size.to_extent().depth_or_array_layers, 1);
    }

    #[test]
    fn displays_as_width_by_height() {
        assert_eq!(SurfaceSize::new(800, 600).to_string(), "800x600");
    }
}
