/// Pixel memory layout of a decoded PICT.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Single byte per pixel, an index into a 256-entry RGBA palette.
    Indexed8,
    /// 4 channels, 8-bit RGBX (opaque; 4th byte is always 255).
    Rgbx8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
}

impl PixelLayout {
    /// Pick the output layout for a PixMap of the given depth and component count.
    ///
    /// Anything deeper than 8 bits per pixel becomes 32-bit RGB(A);
    /// everything else stays palette-indexed.
    pub fn for_pixmap(pixel_size: u16, component_count: u16) -> Self {
        if pixel_size > 8 {
            if component_count == 4 {
                Self::Rgba8
            } else {
                Self::Rgbx8
            }
        } else {
            Self::Indexed8
        }
    }

    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Indexed8 => 1,
            Self::Rgbx8 | Self::Rgba8 => 4,
        }
    }

    /// Bits per pixel, as reported by [`crate::ImageSink::bits_per_pixel`].
    pub fn bits_per_pixel(&self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    /// Whether pixels are palette indices.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed8)
    }

    /// Whether this layout has the same memory representation as `other`.
    ///
    /// `Rgba8` and `Rgbx8` are compatible (same 4-byte R,G,B,X/A layout).
    pub fn is_memory_compatible(&self, other: PixelLayout) -> bool {
        if *self == other {
            return true;
        }
        matches!(
            (*self, other),
            (Self::Rgba8, Self::Rgbx8) | (Self::Rgbx8, Self::Rgba8)
        )
    }
}

/// Typed pixel that a [`crate::DecodeOutput`] can be viewed as.
#[cfg(feature = "rgb")]
pub trait DecodePixel: Copy + 'static {
    /// The layout this pixel type corresponds to.
    fn layout() -> PixelLayout;
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::RGBA8 {
    fn layout() -> PixelLayout {
        PixelLayout::Rgba8
    }
}
