//! PICT opcode interpreter.
//!
//! Decoding runs in two phases. [`PictDecoder::open`] validates the header
//! and walks opcodes until the first raster-bearing one, leaving the cursor
//! at its pixel payload. [`PictDecoder::read_image`] then consumes the
//! decoder and unpacks that single raster into an [`ImageSink`].

use alloc::boxed::Box;

use enough::Stop;

use super::geometry::{ColorTable, PixMapHeader, Rect};
use super::jpeg::{JpegDecoder, JpegInfo};
use super::opcode::{self, OpData};
use super::unpack::{self, ROW_BYTES_FLAG, RowLayout};
use crate::cursor::ByteCursor;
use crate::error::PictError;
use crate::info::{ImageInfo, PictKind, Resolution};
use crate::pixel::PixelLayout;
use crate::sink::ImageSink;

/// Size of the legacy application header preceding the picture.
const PREAMBLE_LEN: usize = 512;

/// Longest run of zero bytes tolerated before the version marker.
const MAX_HEADER_PADDING: usize = 512;

/// Version opcode (`0x0011`) in both picture versions.
const VERSION_MARKER: u8 = 0x11;

const OP_HEADER: u16 = 0x0C00;
const OP_COMPRESSED_QUICKTIME: u16 = 0x8200;

/// Start-of-image marker that opens an embedded JPEG stream.
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

// ── Session state ───────────────────────────────────────────────────

/// 1-bit bitmap captured by a BitsRect/BitsRgn opcode.
#[derive(Clone, Copy, Debug)]
struct BitmapMeta {
    bounds: Rect,
    width: u32,
    height: u32,
    row_bytes: u16,
    region: bool,
}

/// PixMap captured by a PackBits or DirectBits opcode.
#[derive(Clone, Copy, Debug)]
struct PixMapMeta {
    pixmap: PixMapHeader,
    width: u32,
    height: u32,
    /// Zero for DirectBits, whose rowBytes field is unreliable.
    row_bytes: u16,
    region: bool,
}

/// What the terminal opcode left the cursor in front of.
#[derive(Clone, Copy, Debug)]
enum PictureKind {
    None,
    Bitmap(BitmapMeta),
    PixMap(PixMapMeta),
    DirectBits(PixMapMeta),
    EmbeddedJpeg(JpegInfo),
}

#[derive(Clone, Copy, Debug)]
struct DecodeSession {
    version: u8,
    kind: PictureKind,
    /// Resolution from the `0x0C00` header opcode.
    header_resolution: Option<Resolution>,
}

impl DecodeSession {
    /// Resolution for rasters without their own PixMap record.
    fn resolution(&self) -> Resolution {
        self.header_resolution.unwrap_or_default()
    }
}

// ── Decoder ─────────────────────────────────────────────────────────

/// Streaming PICT decoder over any [`ByteCursor`].
///
/// ```no_run
/// use zenpict::{ImageBuffer, PictDecoder, SliceCursor, Unstoppable};
///
/// let data: &[u8] = &[]; // your PICT bytes
/// let decoder = PictDecoder::open(SliceCursor::new(data), None)?;
/// println!("{:?}", decoder.info());
/// let mut buffer = ImageBuffer::new();
/// decoder.read_image(&mut buffer, &Unstoppable)?;
/// let image = buffer.into_output()?;
/// # Ok::<(), zenpict::PictError>(())
/// ```
pub struct PictDecoder<C: ByteCursor> {
    cursor: C,
    session: DecodeSession,
    info: ImageInfo,
    jpeg: Option<Box<dyn JpegDecoder>>,
}

impl<C: ByteCursor> PictDecoder<C> {
    /// Parse the header and opcodes up to the first raster.
    ///
    /// `cursor` must be at the start of the file, 512-byte preamble included.
    /// Without a `jpeg` decoder, QuickTime-compressed pictures fail with
    /// [`PictError::FormatNotSupported`].
    pub fn open(cursor: C, jpeg: Option<Box<dyn JpegDecoder>>) -> Result<Self, PictError> {
        let mut decoder = Self {
            cursor,
            session: DecodeSession {
                version: 0,
                kind: PictureKind::None,
                header_resolution: None,
            },
            info: ImageInfo {
                width: 0,
                height: 0,
                layout: PixelLayout::Indexed8,
                bits_per_pixel: 0,
                version: 0,
                kind: PictKind::Bitmap,
                resolution: Resolution::default(),
            },
            jpeg,
        };
        decoder.cursor.skip(PREAMBLE_LEN)?;
        decoder.session.version = decoder.read_header()?;
        decoder.session.kind = decoder.interpret_opcodes()?;
        decoder.info = decoder.describe();
        Ok(decoder)
    }

    /// Header information of the raster found by [`PictDecoder::open`].
    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    /// Decode the raster into `sink`. The decoder is spent afterwards.
    pub fn read_image(
        mut self,
        sink: &mut dyn ImageSink,
        stop: &dyn Stop,
    ) -> Result<(), PictError> {
        stop.check()?;
        let kind = core::mem::replace(&mut self.session.kind, PictureKind::None);
        match kind {
            PictureKind::None => Err(PictError::InvalidData("no raster opcode was found".into())),
            PictureKind::Bitmap(meta) => self.decode_bitmap(meta, sink, stop),
            PictureKind::PixMap(meta) => self.decode_pixmap(meta, sink, stop),
            PictureKind::DirectBits(meta) => self.decode_direct_bits(meta, sink, stop),
            PictureKind::EmbeddedJpeg(_) => {
                let resolution = self.session.resolution();
                let jpeg = self.jpeg.as_mut().ok_or_else(jpeg_unavailable)?;
                jpeg.decode_into(sink, resolution, stop)
            }
        }
    }

    // ── Header phase ────────────────────────────────────────────────

    /// Picture size, frame, zero padding, then the version opcode.
    fn read_header(&mut self) -> Result<u8, PictError> {
        let _pic_size = self.cursor.read_u16_be()?;
        let frame = Rect::read(&mut self.cursor)?;
        ltrace!(
            "picture frame ({}, {}, {}, {})",
            frame.top,
            frame.left,
            frame.bottom,
            frame.right
        );

        let mut padding = 0;
        let marker = loop {
            let b = self
                .cursor
                .read_u8()
                .map_err(|_| PictError::WrongSignature("version number missing".into()))?;
            if b != 0 {
                break b;
            }
            padding += 1;
            if padding > MAX_HEADER_PADDING {
                return Err(PictError::WrongSignature("version number missing".into()));
            }
        };
        if marker != VERSION_MARKER {
            return Err(PictError::WrongSignature(alloc::format!(
                "expected version opcode 0x11, found {marker:#04x}"
            )));
        }

        let version = match self.cursor.read_u8() {
            Ok(1) => 1,
            Ok(2) => {
                if self.cursor.read_u8().ok() != Some(0xFF) {
                    return Err(PictError::WrongSignature("illegal version number".into()));
                }
                2
            }
            _ => return Err(PictError::WrongSignature("illegal version number".into())),
        };
        ldebug!("PICT version {} found", version);
        Ok(version)
    }

    /// Version 2 opcodes are word-aligned words; version 1 opcodes are bytes.
    fn read_opcode(&mut self) -> Result<u16, PictError> {
        if self.session.version == 2 {
            self.cursor.align_to_even()?;
            self.cursor.read_u16_be()
        } else {
            Ok(u16::from(self.cursor.read_u8()?))
        }
    }

    /// Run opcodes until one carries raster data.
    fn interpret_opcodes(&mut self) -> Result<PictureKind, PictError> {
        loop {
            let opcode = self.read_opcode()?;
            match opcode {
                0x00FF | 0xFFFF => {
                    ltrace!("opcode {:#06x}: end of picture", opcode);
                    return Err(PictError::FormatNotSupported(
                        "picture contains only vector data".into(),
                    ));
                }
                0x0000..=0x00A1 => {
                    if let Some(kind) = self.table_opcode(opcode)? {
                        return Ok(kind);
                    }
                }
                OP_HEADER => {
                    ltrace!("opcode {:#06x}: header", opcode);
                    self.header_op()?;
                }
                OP_COMPRESSED_QUICKTIME => {
                    ltrace!("opcode {:#06x}: compressed QuickTime", opcode);
                    return self.jpeg_op();
                }
                0x00A2..=0x00AF => {
                    ltrace!("opcode {:#06x}: reserved", opcode);
                    let len = self.cursor.read_u16_be()?;
                    self.cursor.skip(usize::from(len))?;
                }
                0x00B0..=0x00CF | 0x8000..=0x80FF => {
                    ltrace!("opcode {:#06x}: reserved, no data", opcode);
                }
                // The lower bound is decimal 8100, not 0x8100.
                0x00D0..=0x00FE | 8100.. => {
                    ltrace!("opcode {:#06x}: reserved", opcode);
                    let len = self.cursor.read_u32_be()?;
                    self.cursor.skip(len as usize)?;
                }
                0x0100..=0x7FFF => {
                    lwarn!("opcode {:#06x}: reserved, skip length guessed", opcode);
                    self.cursor.skip(usize::from((opcode >> 7) & 0xFF))?;
                }
            }
        }
    }

    /// Opcodes below `0xA2`. Returns the picture kind for terminal opcodes.
    fn table_opcode(&mut self, opcode: u16) -> Result<Option<PictureKind>, PictError> {
        let info = opcode::lookup(opcode).ok_or_else(|| unknown_opcode(opcode))?;
        ltrace!("opcode {:#06x}: {}", opcode, info.name);

        match opcode {
            0x01 => self.clip()?,
            0x12..=0x14 => self.pix_pat()?,
            0x70..=0x77 => self.skip_poly_or_region()?,
            0x90 | 0x98 => return self.bits_rect(false).map(Some),
            0x91 | 0x99 => return self.bits_rect(true).map(Some),
            0x9A => return self.direct_bits(false).map(Some),
            0x9B => return self.direct_bits(true).map(Some),
            0xA1 => self.long_comment()?,
            _ => match info.data {
                OpData::Fixed(n) => self.cursor.skip(usize::from(n))?,
                OpData::WordLen => {
                    let len = self.cursor.read_u16_be()?;
                    self.cursor.skip(usize::from(len))?;
                }
                OpData::SelfSized => self.skip_poly_or_region()?,
                OpData::Text(prefix) => {
                    self.cursor.skip(usize::from(prefix))?;
                    let count = self.cursor.read_u8()?;
                    self.cursor.skip(usize::from(count))?;
                }
                OpData::Special => return Err(unknown_opcode(opcode)),
            },
        }
        Ok(None)
    }

    /// A clip region; a 10-byte region is just its bounding rectangle.
    fn clip(&mut self) -> Result<(), PictError> {
        let len = self.cursor.read_u16_be()?;
        if len == 10 {
            let _clip = Rect::read(&mut self.cursor)?;
        } else {
            self.cursor.skip(self_sized_payload(len)?)?;
        }
        Ok(())
    }

    fn pix_pat(&mut self) -> Result<(), PictError> {
        let pat_type = self.cursor.read_u16_be()?;
        match pat_type {
            // Dither pattern: old-style pattern plus an RGB color.
            2 => self.cursor.skip(13),
            1 => {
                self.cursor.skip(8)?;
                let row_bytes = self.cursor.read_u16_be()?;
                let pixmap = PixMapHeader::read(&mut self.cursor)?;
                let _colors = ColorTable::read(&mut self.cursor)?;
                let (width, height) = pixmap.bounds.dimensions()?;
                let layout = RowLayout::new(width, height, row_bytes);
                unpack::skip_bits(&mut self.cursor, layout, pixmap.pixel_size)
            }
            _ => Err(PictError::FormatUnknown(alloc::format!(
                "unknown pattern type {pat_type}"
            ))),
        }
    }

    fn skip_poly_or_region(&mut self) -> Result<(), PictError> {
        let len = self.cursor.read_u16_be()?;
        self.cursor.skip(self_sized_payload(len)?)
    }

    fn long_comment(&mut self) -> Result<(), PictError> {
        let _kind = self.cursor.read_u16_be()?;
        let len = self.cursor.read_u16_be()?;
        if len > 0 {
            self.cursor.skip(usize::from(len))?;
        }
        Ok(())
    }

    /// Extended version 2 header: version, resolution, source rect, reserved.
    fn header_op(&mut self) -> Result<(), PictError> {
        let _version = self.cursor.read_u16_be()?;
        let h_res = self.cursor.read_u32_be()?;
        let v_res = self.cursor.read_u32_be()?;
        let _src = Rect::read(&mut self.cursor)?;
        let _reserved = self.cursor.read_u16_be()?;
        let resolution = Resolution::from_fixed(h_res, v_res);
        ltrace!(
            "header resolution {}x{}",
            resolution.horizontal,
            resolution.vertical
        );
        self.session.header_resolution = Some(resolution);
        Ok(())
    }

    /// BitsRect / BitsRgn and their PackBits variants.
    fn bits_rect(&mut self, region: bool) -> Result<PictureKind, PictError> {
        let row_bytes = self.cursor.read_u16_be()?;
        if row_bytes & ROW_BYTES_FLAG != 0 {
            let pixmap = PixMapHeader::read(&mut self.cursor)?;
            let (width, height) = pixmap.bounds.dimensions()?;
            ldebug!(
                "pixmap raster: {}x{}, {} bpp, rowBytes {}",
                width,
                height,
                pixmap.pixel_size,
                row_bytes & !ROW_BYTES_FLAG
            );
            Ok(PictureKind::PixMap(PixMapMeta {
                pixmap,
                width,
                height,
                row_bytes,
                region,
            }))
        } else {
            let bounds = Rect::read(&mut self.cursor)?;
            let _src = Rect::read(&mut self.cursor)?;
            let _dst = Rect::read(&mut self.cursor)?;
            let (width, height) = bounds.dimensions()?;
            ldebug!(
                "bitmap raster: {}x{}, rowBytes {}",
                width,
                height,
                row_bytes
            );
            Ok(PictureKind::Bitmap(BitmapMeta {
                bounds,
                width,
                height,
                row_bytes,
                region,
            }))
        }
    }

    /// DirectBitsRect / DirectBitsRgn.
    fn direct_bits(&mut self, region: bool) -> Result<PictureKind, PictError> {
        // Fake length and fake EOF.
        self.cursor.skip(4)?;
        let _row_bytes = self.cursor.read_u16_be()?;
        let pixmap = PixMapHeader::read(&mut self.cursor)?;
        let _src = Rect::read(&mut self.cursor)?;
        let _dst = Rect::read(&mut self.cursor)?;
        let _mode = self.cursor.read_u16_be()?;
        let (width, height) = pixmap.bounds.dimensions()?;
        ldebug!(
            "direct bits raster: {}x{}, {} bpp, {} components",
            width,
            height,
            pixmap.pixel_size,
            pixmap.cmp_count
        );
        Ok(PictureKind::DirectBits(PixMapMeta {
            pixmap,
            width,
            height,
            row_bytes: 0,
            region,
        }))
    }

    /// Find the JPEG stream inside a compressed QuickTime opcode.
    fn jpeg_op(&mut self) -> Result<PictureKind, PictError> {
        let op_len = self.cursor.read_i32_be()?;
        let mut scanned: i64 = 0;
        let mut found = false;
        while scanned < i64::from(op_len) && self.cursor.remaining() >= JPEG_SOI.len() {
            if self.cursor.peek(JPEG_SOI.len())? == JPEG_SOI {
                found = true;
                break;
            }
            self.cursor.read_u8()?;
            scanned += 1;
        }
        if !found {
            return Err(PictError::FormatNotSupported(
                "unrecognized QuickTime data".into(),
            ));
        }
        ldebug!("embedded JPEG at offset {}", self.cursor.position());

        let jpeg = self.jpeg.as_mut().ok_or_else(jpeg_unavailable)?;
        let info = jpeg.open(&mut self.cursor)?;
        Ok(PictureKind::EmbeddedJpeg(info))
    }

    fn describe(&self) -> ImageInfo {
        let version = self.session.version;
        let (width, height, layout, bits_per_pixel, kind, resolution) = match self.session.kind {
            PictureKind::Bitmap(meta) => (
                meta.width,
                meta.height,
                PixelLayout::Indexed8,
                1,
                PictKind::Bitmap,
                self.session.resolution(),
            ),
            PictureKind::PixMap(meta) | PictureKind::DirectBits(meta) => (
                meta.width,
                meta.height,
                PixelLayout::for_pixmap(meta.pixmap.pixel_size, meta.pixmap.cmp_count),
                meta.pixmap.pixel_size,
                if matches!(self.session.kind, PictureKind::DirectBits(_)) {
                    PictKind::DirectBits
                } else {
                    PictKind::PixMap
                },
                meta.pixmap.resolution(),
            ),
            PictureKind::EmbeddedJpeg(info) => (
                info.width,
                info.height,
                PixelLayout::Rgbx8,
                24,
                PictKind::Jpeg,
                self.session.resolution(),
            ),
            PictureKind::None => (
                0,
                0,
                PixelLayout::Indexed8,
                0,
                PictKind::Bitmap,
                Resolution::default(),
            ),
        };
        ImageInfo {
            width,
            height,
            layout,
            bits_per_pixel,
            version,
            kind,
            resolution,
        }
    }

    // ── Raster phase ────────────────────────────────────────────────

    fn decode_bitmap(
        &mut self,
        meta: BitmapMeta,
        sink: &mut dyn ImageSink,
        stop: &dyn Stop,
    ) -> Result<(), PictError> {
        let _mode = self.cursor.read_u16_be()?;
        if meta.region {
            self.skip_poly_or_region()?;
        }
        ltrace!(
            "bitmap bounds ({}, {}, {}, {})",
            meta.bounds.top,
            meta.bounds.left,
            meta.bounds.bottom,
            meta.bounds.right
        );

        sink.set_dimensions(
            meta.width,
            meta.height,
            self.session.resolution(),
            PixelLayout::Indexed8,
        )?;
        sink.set_palette_entry(0, 0, 0, 0, 255);
        sink.set_palette_entry(1, 255, 255, 255, 255);
        let layout = RowLayout::new(meta.width, meta.height, meta.row_bytes);
        unpack::unpack_generic(&mut self.cursor, sink, layout, 1, stop)
    }

    fn decode_pixmap(
        &mut self,
        meta: PixMapMeta,
        sink: &mut dyn ImageSink,
        stop: &dyn Stop,
    ) -> Result<(), PictError> {
        let pixmap = &meta.pixmap;
        sink.set_dimensions(
            meta.width,
            meta.height,
            pixmap.resolution(),
            PixelLayout::for_pixmap(pixmap.pixel_size, pixmap.cmp_count),
        )?;

        let colors = ColorTable::read(&mut self.cursor)?;
        if sink.bits_per_pixel() == 8 {
            sink.set_palette(colors.entries());
        }

        let _src = Rect::read(&mut self.cursor)?;
        let _dst = Rect::read(&mut self.cursor)?;
        let _mode = self.cursor.read_u16_be()?;
        if meta.region {
            self.skip_poly_or_region()?;
        }

        let layout = RowLayout::new(meta.width, meta.height, meta.row_bytes);
        unpack_pixmap(&mut self.cursor, sink, layout, pixmap, stop)
    }

    fn decode_direct_bits(
        &mut self,
        meta: PixMapMeta,
        sink: &mut dyn ImageSink,
        stop: &dyn Stop,
    ) -> Result<(), PictError> {
        let pixmap = &meta.pixmap;
        sink.set_dimensions(
            meta.width,
            meta.height,
            pixmap.resolution(),
            PixelLayout::for_pixmap(pixmap.pixel_size, pixmap.cmp_count),
        )?;
        if meta.region {
            self.skip_poly_or_region()?;
        }

        let layout = RowLayout::new(meta.width, meta.height, meta.row_bytes);
        unpack_pixmap(&mut self.cursor, sink, layout, pixmap, stop)
    }
}

/// Pick the unpacker for a PixMap's depth.
fn unpack_pixmap<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    sink: &mut dyn ImageSink,
    layout: RowLayout,
    pixmap: &PixMapHeader,
    stop: &dyn Stop,
) -> Result<(), PictError> {
    match pixmap.pixel_size {
        32 => unpack::unpack_32bits(cursor, sink, layout, pixmap.cmp_count, stop),
        8 => unpack::unpack_8bits(cursor, sink, layout, stop),
        depth => unpack::unpack_generic(cursor, sink, layout, depth, stop),
    }
}

/// Payload length of a record whose size word counts itself.
fn self_sized_payload(len: u16) -> Result<usize, PictError> {
    usize::from(len)
        .checked_sub(2)
        .ok_or_else(|| PictError::InvalidData(alloc::format!("record size {len} is too small")))
}

fn unknown_opcode(opcode: u16) -> PictError {
    PictError::FormatUnknown(alloc::format!("can't handle opcode {opcode:#06x}"))
}

fn jpeg_unavailable() -> PictError {
    PictError::FormatNotSupported("embedded JPEG support is not available".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SliceCursor;
    use crate::sink::ImageBuffer;
    use alloc::vec;
    use alloc::vec::Vec;
    use enough::Unstoppable;

    /// Preamble, size word, frame and the version 2 marker.
    fn v2_header() -> Vec<u8> {
        let mut v = vec![0u8; PREAMBLE_LEN];
        v.extend_from_slice(&0u16.to_be_bytes());
        v.extend_from_slice(&[0, 0, 0, 0, 0, 4, 0, 4]);
        v.extend_from_slice(&[0x00, 0x11, 0x02, 0xFF]);
        v
    }

    fn open(data: &[u8]) -> Result<PictDecoder<SliceCursor<'_>>, PictError> {
        PictDecoder::open(SliceCursor::new(data), None)
    }

    /// 1x1 1-bit BitsRect with a single raw row.
    fn push_bitmap_1x1(v: &mut Vec<u8>) {
        v.extend_from_slice(&0x0090u16.to_be_bytes());
        v.extend_from_slice(&1u16.to_be_bytes()); // rowBytes
        for _ in 0..3 {
            v.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 1]);
        }
        v.extend_from_slice(&0u16.to_be_bytes()); // mode
        v.push(0x80);
    }

    #[test]
    fn missing_version_marker() {
        let mut data = vec![0u8; PREAMBLE_LEN + 10];
        data.push(0x12);
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::WrongSignature(_)));
    }

    #[test]
    fn endless_padding_is_wrong_signature() {
        let data = vec![0u8; PREAMBLE_LEN + 10 + MAX_HEADER_PADDING + 4];
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::WrongSignature(_)));
    }

    #[test]
    fn version_2_requires_ff() {
        let mut data = v2_header();
        let n = data.len();
        data[n - 1] = 0xFE;
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::WrongSignature(_)));
    }

    #[test]
    fn unknown_version_byte() {
        let mut data = v2_header();
        let n = data.len();
        data[n - 2] = 3;
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::WrongSignature(_)));
    }

    #[test]
    fn end_of_picture_without_raster() {
        let mut data = v2_header();
        data.extend_from_slice(&0x00FFu16.to_be_bytes());
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::FormatNotSupported(_)));
    }

    #[test]
    fn version_1_bitmap() {
        let mut data = vec![0u8; PREAMBLE_LEN];
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 1]);
        data.extend_from_slice(&[0x11, 0x01]);
        data.push(0x00); // NOP
        data.push(0x90);
        data.extend_from_slice(&1u16.to_be_bytes());
        for _ in 0..3 {
            data.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 1]);
        }
        data.extend_from_slice(&0u16.to_be_bytes());
        data.push(0x80);

        let decoder = open(&data).unwrap();
        assert_eq!(decoder.info().version, 1);
        assert_eq!(decoder.info().kind, PictKind::Bitmap);
        let mut buf = ImageBuffer::new();
        decoder.read_image(&mut buf, &Unstoppable).unwrap();
        let out = buf.into_output().unwrap();
        assert_eq!(out.pixels(), &[1]);
        assert_eq!(out.to_rgba8(), vec![255, 255, 255, 255]);
    }

    #[test]
    fn reserved_skip_boundaries() {
        let mut data = v2_header();
        // 0x1FA3 (8099): skips (0x1FA3 >> 7) & 0xFF = 63 bytes.
        data.extend_from_slice(&0x1FA3u16.to_be_bytes());
        data.extend_from_slice(&[0xEE; 63]);
        data.push(0); // realign
        // 0x1FA4 (8100): long length prefix.
        data.extend_from_slice(&0x1FA4u16.to_be_bytes());
        data.extend_from_slice(&3u32.to_be_bytes());
        data.extend_from_slice(&[0xEE; 3]);
        data.push(0);
        // 0x80A0: no payload.
        data.extend_from_slice(&0x80A0u16.to_be_bytes());
        // 0x00A5: word length prefix.
        data.extend_from_slice(&0x00A5u16.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0xEE; 2]);
        // 0x00D0: long length prefix.
        data.extend_from_slice(&0x00D0u16.to_be_bytes());
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&[0xEE; 4]);
        // 0x80FF: last of the payload-free range.
        data.extend_from_slice(&0x80FFu16.to_be_bytes());
        // 0x8100: long length prefix.
        data.extend_from_slice(&0x8100u16.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&[0xEE; 2]);
        push_bitmap_1x1(&mut data);

        let decoder = open(&data).unwrap();
        assert_eq!(decoder.info().kind, PictKind::Bitmap);
        assert_eq!((decoder.info().width, decoder.info().height), (1, 1));
    }

    #[test]
    fn fill_pix_pat_with_zero_row_bytes_is_skipped() {
        let mut data = v2_header();
        data.extend_from_slice(&0x0014u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes()); // pattern type
        data.extend_from_slice(&[0; 8]); // old-style pattern
        data.extend_from_slice(&0x8000u16.to_be_bytes()); // rowBytes
        for v in [0i16, 0, 2, 8] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data.extend_from_slice(&[0; 16]); // version .. vRes
        for v in [0u16, 8, 1, 8] {
            data.extend_from_slice(&v.to_be_bytes()); // pixelType .. cmpSize
        }
        data.extend_from_slice(&[0; 12]); // planeBytes, pmTable, pmReserved
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]); // seed, flags, one entry
        data.extend_from_slice(&[0; 8]);
        // Two packed 8-pixel rows: a literal then a repeat.
        data.extend_from_slice(&[3, 1, 0xAB, 0xCD]);
        data.extend_from_slice(&[2, 0xF9, 0x11]);
        data.push(0); // realign
        push_bitmap_1x1(&mut data);

        let decoder = open(&data).unwrap();
        assert_eq!(decoder.info().kind, PictKind::Bitmap);
        assert_eq!((decoder.info().width, decoder.info().height), (1, 1));
    }

    #[test]
    fn quicktime_data_ending_inside_scan_is_not_supported() {
        let mut data = v2_header();
        data.extend_from_slice(&0x8200u16.to_be_bytes());
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(&[0x11, 0xFF]);
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::FormatNotSupported(_)), "{err}");
    }

    #[test]
    fn text_and_comment_opcodes_are_skipped() {
        let mut data = v2_header();
        // LongText: point, count, text.
        data.extend_from_slice(&0x0028u16.to_be_bytes());
        data.extend_from_slice(&[0, 10, 0, 10, 3, b'a', b'b', b'c']);
        // LongComment: kind, length, payload.
        data.extend_from_slice(&0x00A1u16.to_be_bytes());
        data.extend_from_slice(&[0, 100, 0, 4, 1, 2, 3, 4]);
        // Clip with a rectangular region.
        data.extend_from_slice(&0x0001u16.to_be_bytes());
        data.extend_from_slice(&[0, 10, 0, 0, 0, 0, 0, 1, 0, 1]);
        push_bitmap_1x1(&mut data);

        assert!(open(&data).is_ok());
    }

    #[test]
    fn dither_pattern_is_skipped() {
        let mut data = v2_header();
        data.extend_from_slice(&0x0012u16.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0; 13]);
        data.push(0);
        push_bitmap_1x1(&mut data);
        assert!(open(&data).is_ok());
    }

    #[test]
    fn unknown_pattern_type() {
        let mut data = v2_header();
        data.extend_from_slice(&0x0013u16.to_be_bytes());
        data.extend_from_slice(&7u16.to_be_bytes());
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::FormatUnknown(_)));
    }

    #[test]
    fn header_opcode_sets_bitmap_resolution() {
        let mut data = v2_header();
        data.extend_from_slice(&OP_HEADER.to_be_bytes());
        data.extend_from_slice(&0xFFFEu16.to_be_bytes());
        data.extend_from_slice(&(300u32 << 16).to_be_bytes());
        data.extend_from_slice(&(150u32 << 16).to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 1]);
        data.extend_from_slice(&0u16.to_be_bytes());
        push_bitmap_1x1(&mut data);

        let decoder = open(&data).unwrap();
        assert_eq!(
            decoder.info().resolution,
            Resolution {
                horizontal: 300,
                vertical: 150
            }
        );
    }

    #[test]
    fn quicktime_without_jpeg_marker() {
        let mut data = v2_header();
        data.extend_from_slice(&OP_COMPRESSED_QUICKTIME.to_be_bytes());
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::FormatNotSupported(_)));
    }

    #[test]
    fn jpeg_without_decoder_is_not_supported() {
        let mut data = v2_header();
        data.extend_from_slice(&OP_COMPRESSED_QUICKTIME.to_be_bytes());
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0xFF, 0xD8, 0xFF, 0xE0, 0, 0]);
        let err = open(&data).err().unwrap();
        assert!(matches!(err, PictError::FormatNotSupported(_)));
    }

    struct FakeJpeg;

    impl JpegDecoder for FakeJpeg {
        fn open(&mut self, cursor: &mut dyn ByteCursor) -> Result<JpegInfo, PictError> {
            assert_eq!(cursor.peek(3)?, &JPEG_SOI);
            Ok(JpegInfo {
                width: 2,
                height: 1,
            })
        }

        fn decode_into(
            &mut self,
            sink: &mut dyn ImageSink,
            resolution: Resolution,
            _stop: &dyn Stop,
        ) -> Result<(), PictError> {
            sink.set_dimensions(2, 1, resolution, PixelLayout::Rgbx8)?;
            sink.row_mut(0)?.fill(7);
            Ok(())
        }
    }

    #[test]
    fn jpeg_is_handed_to_sub_decoder() {
        let mut data = v2_header();
        let marker_offset = data.len() + 2 + 4 + 2;
        data.extend_from_slice(&OP_COMPRESSED_QUICKTIME.to_be_bytes());
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0xFF, 0xD8, 0xFF, 0xE0, 0, 0]);

        let decoder =
            PictDecoder::open(SliceCursor::new(&data), Some(Box::new(FakeJpeg)))
                .unwrap();
        assert_eq!(decoder.info().kind, PictKind::Jpeg);
        assert_eq!(decoder.info().layout, PixelLayout::Rgbx8);
        assert_eq!(decoder.cursor.position(), marker_offset);

        let mut buf = ImageBuffer::new();
        decoder.read_image(&mut buf, &Unstoppable).unwrap();
        assert_eq!(buf.into_output().unwrap().pixels(), &[7; 8]);
    }

    #[test]
    fn region_bitmap_skips_region_before_pixels() {
        let mut data = v2_header();
        data.extend_from_slice(&0x0091u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes());
        for _ in 0..3 {
            data.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 1]);
        }
        data.extend_from_slice(&0u16.to_be_bytes()); // mode
        data.extend_from_slice(&[0, 4, 0xAA, 0xAA]); // region
        data.push(0x00);

        let decoder = open(&data).unwrap();
        let mut buf = ImageBuffer::new();
        decoder.read_image(&mut buf, &Unstoppable).unwrap();
        assert_eq!(buf.into_output().unwrap().pixels(), &[0]);
    }

    struct Cancelled;

    impl Stop for Cancelled {
        fn check(&self) -> Result<(), enough::StopReason> {
            Err(enough::StopReason::Cancelled)
        }
    }

    #[test]
    fn cancelled_before_rows() {
        let mut data = v2_header();
        push_bitmap_1x1(&mut data);
        let decoder = open(&data).unwrap();
        let mut buf = ImageBuffer::new();
        let err = decoder
            .read_image(&mut buf, &Cancelled)
            .err()
            .unwrap();
        assert!(matches!(err, PictError::Cancelled(_)));
    }
}
