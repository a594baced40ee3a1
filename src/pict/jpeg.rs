//! Embedded JPEG support for QuickTime-compressed pictures (opcode `0x8200`).
//!
//! The interpreter locates the `FF D8 FF` start-of-image marker and hands
//! the cursor to a [`JpegDecoder`]; everything past the marker belongs to
//! the sub-decoder.

#[cfg(feature = "jpeg")]
use alloc::vec::Vec;

use enough::Stop;

use crate::cursor::ByteCursor;
use crate::error::PictError;
use crate::info::Resolution;
use crate::sink::ImageSink;

/// Image geometry reported by [`JpegDecoder::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
}

/// Decoder for JPEG streams wrapped in a PICT.
pub trait JpegDecoder {
    /// Parse the JPEG header. `cursor` is positioned at the SOI marker.
    fn open(&mut self, cursor: &mut dyn ByteCursor) -> Result<JpegInfo, PictError>;

    /// Decode the image opened by [`JpegDecoder::open`] into `sink`.
    fn decode_into(
        &mut self,
        sink: &mut dyn ImageSink,
        resolution: Resolution,
        stop: &dyn Stop,
    ) -> Result<(), PictError>;
}

/// [`JpegDecoder`] backed by `zune-jpeg`, producing opaque RGBX.
#[cfg(feature = "jpeg")]
#[derive(Debug, Default)]
pub struct ZuneJpegDecoder {
    data: Vec<u8>,
    info: Option<JpegInfo>,
}

#[cfg(feature = "jpeg")]
impl ZuneJpegDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn options() -> zune_jpeg::zune_core::options::DecoderOptions {
        zune_jpeg::zune_core::options::DecoderOptions::default()
            .set_max_width(u16::MAX as usize)
            .set_max_height(u16::MAX as usize)
    }
}

#[cfg(feature = "jpeg")]
fn jpeg_error(e: impl core::fmt::Debug) -> PictError {
    PictError::InvalidData(alloc::format!("embedded JPEG: {e:?}"))
}

#[cfg(feature = "jpeg")]
impl JpegDecoder for ZuneJpegDecoder {
    fn open(&mut self, cursor: &mut dyn ByteCursor) -> Result<JpegInfo, PictError> {
        let remaining = cursor.remaining();
        self.data = cursor.read_exact(remaining)?.to_vec();

        let (width, height) = {
            let reader = std::io::Cursor::new(self.data.as_slice());
            let mut decoder = zune_jpeg::JpegDecoder::new_with_options(reader, Self::options());
            decoder.decode_headers().map_err(jpeg_error)?;
            decoder
                .dimensions()
                .ok_or_else(|| PictError::InvalidData("embedded JPEG has no frame header".into()))?
        };

        let info = JpegInfo {
            width: width as u32,
            height: height as u32,
        };
        ldebug!("embedded JPEG: {}x{}", info.width, info.height);
        self.info = Some(info);
        Ok(info)
    }

    fn decode_into(
        &mut self,
        sink: &mut dyn ImageSink,
        resolution: Resolution,
        stop: &dyn Stop,
    ) -> Result<(), PictError> {
        use zune_jpeg::zune_core::colorspace::ColorSpace;

        let info = self
            .info
            .ok_or_else(|| PictError::InvalidData("JPEG decoder was not opened".into()))?;
        stop.check()?;

        let reader = std::io::Cursor::new(self.data.as_slice());
        let mut decoder = zune_jpeg::JpegDecoder::new_with_options(reader, Self::options());
        decoder.decode_headers().map_err(jpeg_error)?;
        decoder.set_options(Self::options().jpeg_set_out_colorspace(ColorSpace::RGBA));
        let pixels = decoder.decode().map_err(jpeg_error)?;

        sink.set_dimensions(
            info.width,
            info.height,
            resolution,
            crate::PixelLayout::Rgbx8,
        )?;
        let row_len = info.width as usize * 4;
        if row_len == 0 {
            return Ok(());
        }
        for (row_idx, src) in pixels.chunks_exact(row_len).take(info.height as usize).enumerate() {
            if row_idx % 16 == 0 {
                stop.check()?;
            }
            let row = sink.row_mut(row_idx)?;
            let actual = row.len();
            row.get_mut(..row_len)
                .ok_or(PictError::BufferTooSmall {
                    needed: row_len,
                    actual,
                })?
                .copy_from_slice(src);
        }
        Ok(())
    }
}
