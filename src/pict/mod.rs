//! Macintosh PICT (QuickDraw picture) decoding.
//!
//! Only the first raster in a picture is extracted; vector opcodes are
//! skipped.

mod decoder;
mod geometry;
mod jpeg;
mod opcode;
mod unpack;

use alloc::boxed::Box;

use enough::Stop;

use crate::cursor::SliceCursor;
use crate::decode::DecodeOutput;
use crate::error::PictError;
use crate::info::ImageInfo;
use crate::limits::Limits;
use crate::sink::ImageBuffer;

pub use decoder::PictDecoder;
pub use geometry::{ColorTable, PixMapHeader, Rect};
pub use jpeg::{JpegDecoder, JpegInfo};
#[cfg(feature = "jpeg")]
pub use jpeg::ZuneJpegDecoder;

/// Header phase only.
pub(crate) fn probe_with(
    data: &[u8],
    jpeg: Option<Box<dyn JpegDecoder>>,
) -> Result<ImageInfo, PictError> {
    let decoder = PictDecoder::open(SliceCursor::new(data), jpeg)?;
    Ok(decoder.info().clone())
}

/// Decode the first raster of `data` into an owned buffer.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    jpeg: Option<Box<dyn JpegDecoder>>,
    stop: &dyn Stop,
) -> Result<DecodeOutput, PictError> {
    stop.check()?;
    let decoder = PictDecoder::open(SliceCursor::new(data), jpeg)?;
    let info = decoder.info();
    ldebug!(
        "decoding {:?} raster {}x{}, {} bpp",
        info.kind,
        info.width,
        info.height,
        info.bits_per_pixel
    );

    let mut buffer = match limits {
        Some(limits) => {
            limits.check(info.width, info.height)?;
            ImageBuffer::with_limits(limits)
        }
        None => ImageBuffer::new(),
    };
    decoder.read_image(&mut buffer, stop)?;
    buffer.into_output()
}
