use crate::error::PictError;
use crate::pixel::PixelLayout;

/// Default Macintosh screen resolution.
pub const MAC_DEFAULT_DPI: u16 = 72;

/// Image resolution in dots per inch (integer part of QuickDraw's 16.16 fixed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub horizontal: u16,
    pub vertical: u16,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            horizontal: MAC_DEFAULT_DPI,
            vertical: MAC_DEFAULT_DPI,
        }
    }
}

impl Resolution {
    /// Build from two 16.16 fixed-point values.
    pub fn from_fixed(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal: (horizontal >> 16) as u16,
            vertical: (vertical >> 16) as u16,
        }
    }
}

/// Which raster-bearing opcode ended the header phase.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PictKind {
    /// 1 bit per pixel `BitsRect`/`BitsRgn` without PixMap metadata.
    Bitmap,
    /// Indexed or 16/32-bit `PackBitsRect`/`PackBitsRgn` PixMap.
    PixMap,
    /// `DirectBitsRect`/`DirectBitsRgn`.
    DirectBits,
    /// QuickTime-wrapped JPEG (opcode `0x8200`).
    Jpeg,
}

/// Header-only description of a PICT file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Layout that a full decode will produce.
    pub layout: PixelLayout,
    /// Source bits per pixel (1, 2, 4, 8, 16, 32; 24 for JPEG).
    pub bits_per_pixel: u16,
    /// PICT version, 1 or 2.
    pub version: u8,
    pub kind: PictKind,
    pub resolution: Resolution,
}

impl ImageInfo {
    /// Probe a PICT file's header without decoding pixels.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PictError> {
        crate::DecodeRequest::new(data).probe()
    }
}
