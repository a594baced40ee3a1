//! # zenpict
//!
//! Raster decoder for Macintosh PICT (QuickDraw picture) files.
//!
//! A PICT is a recorded stream of QuickDraw drawing opcodes. This crate walks
//! that stream, skips every vector opcode, and decodes the first raster it
//! finds into an 8-bit image.
//!
//! ## Supported Rasters
//!
//! - **BitsRect / BitsRgn**: 1-bit bitmaps (version 1 and 2 pictures)
//! - **PackBitsRect / PackBitsRgn**: indexed 1, 2, 4 and 8-bit pixmaps with
//!   their color table, 16-bit RGB555 and 32-bit planar pixmaps
//! - **DirectBitsRect / DirectBitsRgn**: 16 and 32-bit direct color
//! - **Compressed QuickTime** (`0x8200`): embedded baseline JPEG, via
//!   `zune-jpeg` with the `jpeg` feature
//!
//! Indexed rasters decode to [`PixelLayout::Indexed8`] plus a 256-entry
//! palette; deeper rasters decode to [`PixelLayout::Rgbx8`] or
//! [`PixelLayout::Rgba8`].
//!
//! ## Non-Goals
//!
//! - Rendering vector opcodes (lines, polygons, text, patterns)
//! - Encoding PICT
//! - QuickTime codecs other than JPEG
//! - Color management
//!
//! ## Usage
//!
//! ```no_run
//! use zenpict::{DecodeRequest, ImageInfo};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your PICT bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?} v{}", info.width, info.height, info.kind, info.version);
//!
//! let decoded = DecodeRequest::new(data).decode(Unstoppable)?;
//! let rgba = decoded.to_rgba8();
//! # Ok::<(), zenpict::PictError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[macro_use]
mod log;

mod cursor;
mod decode;
mod error;
mod info;
mod limits;
mod pixel;
mod sink;

pub mod pict;

// Re-exports
pub use cursor::{ByteCursor, SliceCursor};
pub use decode::{DecodeOutput, DecodeRequest};
pub use enough::{Stop, Unstoppable};
pub use error::PictError;
pub use info::{ImageInfo, MAC_DEFAULT_DPI, PictKind, Resolution};
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::DecodePixel;
pub use pixel::PixelLayout;
pub use pict::{JpegDecoder, JpegInfo, PictDecoder};
#[cfg(feature = "jpeg")]
pub use pict::ZuneJpegDecoder;
pub use sink::{ImageBuffer, ImageSink, PaletteEntry};

/// Decode the first raster of a PICT file.
///
/// Shorthand for `DecodeRequest::new(data).decode(stop)`.
pub fn decode_pict(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, PictError> {
    DecodeRequest::new(data).decode(stop)
}

/// Read dimensions and pixel format without decoding pixels.
pub fn probe_pict(data: &[u8]) -> Result<ImageInfo, PictError> {
    ImageInfo::from_bytes(data)
}
