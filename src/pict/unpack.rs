//! Raster unpackers for PICT pixel payloads.
//!
//! Every unpacker shares the same row framing:
//!
//! - rows whose (masked) rowBytes is below 8 are stored raw, with no length
//!   prefix and no run-length coding;
//! - otherwise each row starts with its packed length, a word when rowBytes
//!   exceeds 250 and a byte otherwise, followed by PackBits data.
//!
//! Scratch buffers are owned by the unpacker call and dropped on every exit.

use alloc::vec;

use enough::Stop;

use crate::cursor::ByteCursor;
use crate::error::PictError;
use crate::sink::ImageSink;

/// Rows narrower than this are stored uncompressed.
const MIN_PACKED_ROW: usize = 8;

/// Widest row that still uses a one-byte length prefix.
const MAX_BYTE_PREFIX_ROW: usize = 250;

/// The top bit of rowBytes flags a PixMap; it is never part of the length.
pub(crate) const ROW_BYTES_FLAG: u16 = 0x8000;

/// Size and stride of a packed raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RowLayout {
    pub width: usize,
    pub height: usize,
    /// Masked rowBytes. Zero means the natural stride for the depth.
    pub row_bytes: usize,
}

impl RowLayout {
    pub(crate) fn new(width: u32, height: u32, row_bytes: u16) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            row_bytes: usize::from(row_bytes & !ROW_BYTES_FLAG),
        }
    }

    /// Bytes per source row at `bits_per_pixel`.
    fn stride(&self, bits_per_pixel: usize) -> usize {
        if self.row_bytes != 0 {
            self.row_bytes
        } else {
            (self.width * bits_per_pixel).div_ceil(8)
        }
    }
}

// ── Row framing ─────────────────────────────────────────────────────

/// Expand one PackBits row from `src` into `dst`, returning the bytes written.
///
/// `unit` is the run element size: 1 byte, or 2 for 16-bit pixels.
/// A control byte of `0x80` is consumed without output.
pub(crate) fn unpack_bits(src: &[u8], unit: usize, dst: &mut [u8]) -> Result<usize, PictError> {
    let capacity = dst.len();
    let mut pos = 0;
    let mut out = 0;

    while pos < src.len() {
        let header = src[pos] as i8;
        pos += 1;

        match header {
            -128 => continue,

            0..=127 => {
                let len = (header as usize + 1) * unit;
                let literal = src
                    .get(pos..pos + len)
                    .ok_or_else(|| PictError::InvalidData("literal run past end of row".into()))?;
                let target = dst
                    .get_mut(out..out + len)
                    .ok_or_else(|| row_overrun(out + len, capacity))?;
                target.copy_from_slice(literal);
                pos += len;
                out += len;
            }

            -127..=-1 => {
                let count = (1 - header as isize) as usize;
                let value = src
                    .get(pos..pos + unit)
                    .ok_or_else(|| PictError::InvalidData("missing repeat value".into()))?;
                let len = count * unit;
                let target = dst
                    .get_mut(out..out + len)
                    .ok_or_else(|| row_overrun(out + len, capacity))?;
                for chunk in target.chunks_exact_mut(unit) {
                    chunk.copy_from_slice(value);
                }
                pos += unit;
                out += len;
            }
        }
    }

    Ok(out)
}

fn row_overrun(needed: usize, capacity: usize) -> PictError {
    PictError::InvalidData(alloc::format!(
        "packed run expands to {needed} bytes, row holds {capacity}"
    ))
}

/// Length of the next packed row.
fn read_row_prefix<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    row_bytes: usize,
) -> Result<usize, PictError> {
    if row_bytes > MAX_BYTE_PREFIX_ROW {
        Ok(usize::from(cursor.read_u16_be()?))
    } else {
        Ok(usize::from(cursor.read_u8()?))
    }
}

/// Read one framed row into `dst`, zero-filling whatever the row leaves unset.
///
/// `dst` must be at least `row_bytes` long.
fn read_row<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    row_bytes: usize,
    unit: usize,
    dst: &mut [u8],
) -> Result<(), PictError> {
    dst.fill(0);
    let capacity = row_bytes.min(dst.len());
    if row_bytes < MIN_PACKED_ROW {
        let raw = cursor.read_exact(row_bytes)?;
        dst[..capacity].copy_from_slice(&raw[..capacity]);
        return Ok(());
    }
    let packed_len = read_row_prefix(cursor, row_bytes)?;
    let packed = cursor.read_exact(packed_len)?;
    unpack_bits(packed, unit, &mut dst[..capacity])?;
    Ok(())
}

/// Output row `y`, cut to `len` bytes.
fn output_row<'s>(
    sink: &'s mut dyn ImageSink,
    y: usize,
    len: usize,
) -> Result<&'s mut [u8], PictError> {
    let row = sink.row_mut(y)?;
    let actual = row.len();
    row.get_mut(..len)
        .ok_or(PictError::BufferTooSmall { needed: len, actual })
}

// ── Unpackers ───────────────────────────────────────────────────────

/// Decode 1, 2, 4, 8 or 16 bit rows.
///
/// Depths up to 8 produce one palette index per output byte; 16-bit
/// pixels are 5-5-5 RGB and produce opaque RGBX.
pub(crate) fn unpack_generic<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    sink: &mut dyn ImageSink,
    layout: RowLayout,
    bits_per_pixel: u16,
    stop: &dyn Stop,
) -> Result<(), PictError> {
    let depth = usize::from(bits_per_pixel);
    let (unit, out_len) = match depth {
        1 | 2 | 4 | 8 => (1, layout.width),
        16 => (2, layout.width * 4),
        _ => {
            return Err(PictError::FormatUnknown(alloc::format!(
                "unsupported pixel depth {bits_per_pixel}"
            )));
        }
    };
    let stride = layout.stride(depth);
    let natural = (layout.width * depth).div_ceil(8);
    let mut scratch = vec![0u8; stride.max(natural)];
    ltrace!(
        "unpack {} bpp: {}x{}, stride {}",
        depth,
        layout.width,
        layout.height,
        stride
    );

    for row_idx in 0..layout.height {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        read_row(cursor, stride, unit, &mut scratch)?;
        let out = output_row(sink, row_idx, out_len)?;
        match depth {
            8 => out.copy_from_slice(&scratch[..out_len]),
            16 => expand_rgb555(&scratch, out),
            _ => expand_bits_to_index(depth, &scratch, out),
        }
    }
    Ok(())
}

/// Decode 8-bit indexed rows; decoded bytes are palette indices.
pub(crate) fn unpack_8bits<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    sink: &mut dyn ImageSink,
    layout: RowLayout,
    stop: &dyn Stop,
) -> Result<(), PictError> {
    let stride = layout.stride(8);
    let mut scratch = vec![0u8; stride.max(layout.width)];

    for row_idx in 0..layout.height {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        read_row(cursor, stride, 1, &mut scratch)?;
        let out = output_row(sink, row_idx, layout.width)?;
        out.copy_from_slice(&scratch[..layout.width]);
    }
    Ok(())
}

/// Decode 32-bit rows stored as one packed byte plane per component.
///
/// Three planes are R, G, B with alpha forced opaque; four planes are
/// A, R, G, B.
pub(crate) fn unpack_32bits<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    sink: &mut dyn ImageSink,
    layout: RowLayout,
    component_count: u16,
    stop: &dyn Stop,
) -> Result<(), PictError> {
    let planes = usize::from(component_count);
    if planes != 3 && planes != 4 {
        return Err(PictError::FormatUnknown(alloc::format!(
            "32-bit pixmap with {component_count} components"
        )));
    }
    let stride = layout.stride(32);
    let mut scratch = vec![0u8; stride.max(layout.width * planes)];

    for row_idx in 0..layout.height {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        read_row(cursor, stride, 1, &mut scratch)?;
        let out = output_row(sink, row_idx, layout.width * 4)?;
        interleave_planes(&scratch, layout.width, planes, out);
    }
    Ok(())
}

/// Consume a packed raster without decoding it.
///
/// A zero rowBytes falls back to the natural stride for `bits_per_pixel`.
pub(crate) fn skip_bits<C: ByteCursor + ?Sized>(
    cursor: &mut C,
    layout: RowLayout,
    bits_per_pixel: u16,
) -> Result<(), PictError> {
    let row_bytes = layout.stride(usize::from(bits_per_pixel));
    if row_bytes < MIN_PACKED_ROW {
        let total = row_bytes
            .checked_mul(layout.height)
            .ok_or(PictError::UnexpectedEof)?;
        return cursor.skip(total);
    }
    for _ in 0..layout.height {
        let len = read_row_prefix(cursor, row_bytes)?;
        cursor.skip(len)?;
    }
    Ok(())
}

// ── Pixel expansion ─────────────────────────────────────────────────

/// Spread 1, 2 or 4 bit indices, most significant bits first, one per byte.
///
/// A partial trailing input byte fills whatever output is left.
fn expand_bits_to_index(depth: usize, input: &[u8], out: &mut [u8]) {
    let per_byte = 8 / depth;
    let mask = (1u8 << depth) - 1;

    let mut in_iter = input.iter();
    let mut out_iter = out.chunks_exact_mut(per_byte);

    (&mut out_iter)
        .zip(&mut in_iter)
        .for_each(|(out_vals, in_val)| {
            for (pos, out_val) in out_vals.iter_mut().enumerate() {
                let shift = 8 - depth * (pos + 1);
                *out_val = (in_val >> shift) & mask;
            }
        });

    if let Some(in_val) = in_iter.next() {
        let remainder_iter = out_iter.into_remainder().iter_mut();
        remainder_iter.enumerate().for_each(|(pos, out_val)| {
            let shift = 8 - depth * (pos + 1);
            *out_val = (in_val >> shift) & mask;
        });
    }
}

/// Big-endian `xRRRRRGGGGGBBBBB` words to opaque RGBX.
fn expand_rgb555(input: &[u8], out: &mut [u8]) {
    for (px, word) in out.chunks_exact_mut(4).zip(input.chunks_exact(2)) {
        let v = u16::from_be_bytes([word[0], word[1]]);
        px[0] = ((v >> 10) & 0x1F) as u8 * 8;
        px[1] = ((v >> 5) & 0x1F) as u8 * 8;
        px[2] = (v & 0x1F) as u8 * 8;
        px[3] = 255;
    }
}

/// Reassemble a plane-major row (`planes` runs of `width` bytes) into RGBA.
fn interleave_planes(scratch: &[u8], width: usize, planes: usize, out: &mut [u8]) {
    for (j, px) in out.chunks_exact_mut(4).take(width).enumerate() {
        if planes == 4 {
            px[0] = scratch[width + j];
            px[1] = scratch[2 * width + j];
            px[2] = scratch[3 * width + j];
            px[3] = scratch[j];
        } else {
            px[0] = scratch[j];
            px[1] = scratch[width + j];
            px[2] = scratch[2 * width + j];
            px[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SliceCursor;
    use crate::info::Resolution;
    use crate::pixel::PixelLayout;
    use crate::sink::ImageBuffer;
    use alloc::vec::Vec;
    use enough::Unstoppable;

    fn sink(width: u32, height: u32, layout: PixelLayout) -> ImageBuffer {
        let mut buf = ImageBuffer::new();
        buf.set_dimensions(width, height, Resolution::default(), layout)
            .unwrap();
        buf
    }

    #[test]
    fn literal_and_repeat_runs() {
        let src = [2, 0x41, 0x42, 0x43, (-3i8) as u8, 0xAA];
        let mut dst = [0u8; 8];
        assert_eq!(unpack_bits(&src, 1, &mut dst).unwrap(), 7);
        assert_eq!(dst, [0x41, 0x42, 0x43, 0xAA, 0xAA, 0xAA, 0xAA, 0]);
    }

    #[test]
    fn control_0x80_emits_nothing() {
        let src = [0x80, 0, 0x11];
        let mut dst = [0u8; 2];
        assert_eq!(unpack_bits(&src, 1, &mut dst).unwrap(), 1);
        assert_eq!(dst, [0x11, 0]);
    }

    #[test]
    fn two_byte_units() {
        // One literal unit then a repeat of two units.
        let src = [0, 0x12, 0x34, 0xFF, 0xAB, 0xCD];
        let mut dst = [0u8; 6];
        assert_eq!(unpack_bits(&src, 2, &mut dst).unwrap(), 6);
        assert_eq!(dst, [0x12, 0x34, 0xAB, 0xCD, 0xAB, 0xCD]);
    }

    #[test]
    fn run_past_row_end_is_invalid() {
        let src = [(-5i8) as u8, 1];
        let mut dst = [0u8; 4];
        assert!(matches!(
            unpack_bits(&src, 1, &mut dst),
            Err(PictError::InvalidData(_))
        ));
    }

    #[test]
    fn truncated_literal_is_invalid() {
        let src = [3, 1, 2];
        let mut dst = [0u8; 8];
        assert!(unpack_bits(&src, 1, &mut dst).is_err());
    }

    #[test]
    fn runs_past_row_end_are_invalid() {
        let mut dst = [0u8; 4];
        let err = unpack_bits(&[4, 1, 2, 3, 4, 5], 1, &mut dst).unwrap_err();
        assert!(matches!(err, PictError::InvalidData(_)), "{err}");

        let mut dst = [0u8; 4];
        let err = unpack_bits(&[0xFC, 7], 1, &mut dst).unwrap_err();
        assert!(matches!(err, PictError::InvalidData(_)), "{err}");
    }

    #[test]
    fn narrow_rows_are_raw() {
        // rowBytes 7: no prefix, no RLE, even though 0x80 looks like a control byte.
        let data = [0x80, 1, 2, 3, 4, 5, 6, 0xEE];
        let mut cursor = SliceCursor::new(&data);
        let mut dst = [0u8; 7];
        read_row(&mut cursor, 7, 1, &mut dst).unwrap();
        assert_eq!(dst, [0x80, 1, 2, 3, 4, 5, 6]);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn byte_prefix_up_to_250() {
        let mut data = vec![2, (-127i8) as u8, 9];
        data.push(0x55);
        let mut cursor = SliceCursor::new(&data);
        let mut dst = vec![0u8; 250];
        read_row(&mut cursor, 250, 1, &mut dst).unwrap();
        assert!(dst[..128].iter().all(|&b| b == 9));
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn word_prefix_above_250() {
        let data = [0, 2, 0xFF, 7, 0x55];
        let mut cursor = SliceCursor::new(&data);
        let mut dst = vec![0u8; 251];
        read_row(&mut cursor, 251, 1, &mut dst).unwrap();
        assert_eq!(&dst[..3], &[7, 7, 0]);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn planar_rgb_reassembly() {
        // 2x1, rowBytes 8: one literal run of the three planes.
        let data = [7, 5, 10, 20, 30, 40, 50, 60];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(2, 1, PixelLayout::Rgbx8);
        let layout = RowLayout::new(2, 1, 0x8008);
        unpack_32bits(&mut cursor, &mut out, layout, 3, &Unstoppable).unwrap();
        let out = out.into_output().unwrap();
        assert_eq!(out.pixels(), &[10, 30, 50, 255, 20, 40, 60, 255]);
    }

    #[test]
    fn planar_argb_reassembly() {
        let data = [9, 7, 128, 255, 1, 2, 3, 4, 5, 6];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(2, 1, PixelLayout::Rgba8);
        let layout = RowLayout::new(2, 1, 8);
        unpack_32bits(&mut cursor, &mut out, layout, 4, &Unstoppable).unwrap();
        let out = out.into_output().unwrap();
        assert_eq!(out.pixels(), &[1, 3, 5, 128, 2, 4, 6, 255]);
    }

    #[test]
    fn planar_rejects_two_components() {
        let mut cursor = SliceCursor::new(&[]);
        let mut out = sink(1, 1, PixelLayout::Rgba8);
        let err = unpack_32bits(
            &mut cursor,
            &mut out,
            RowLayout::new(1, 1, 0),
            2,
            &Unstoppable,
        )
        .unwrap_err();
        assert!(matches!(err, PictError::FormatUnknown(_)));
    }

    #[test]
    fn one_bit_rows_expand_msb_first() {
        // 10 pixels, rowBytes 2 (raw).
        let data = [0b1010_0000, 0b0100_0000];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(10, 1, PixelLayout::Indexed8);
        unpack_generic(
            &mut cursor,
            &mut out,
            RowLayout::new(10, 1, 2),
            1,
            &Unstoppable,
        )
        .unwrap();
        let out = out.into_output().unwrap();
        assert_eq!(out.pixels(), &[1, 0, 1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn four_bit_partial_byte() {
        let data = [0x12, 0x30];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(3, 1, PixelLayout::Indexed8);
        unpack_generic(
            &mut cursor,
            &mut out,
            RowLayout::new(3, 1, 2),
            4,
            &Unstoppable,
        )
        .unwrap();
        assert_eq!(out.into_output().unwrap().pixels(), &[1, 2, 3]);
    }

    #[test]
    fn two_bit_indices() {
        let data = [0b11_10_01_00];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(4, 1, PixelLayout::Indexed8);
        unpack_generic(
            &mut cursor,
            &mut out,
            RowLayout::new(4, 1, 1),
            2,
            &Unstoppable,
        )
        .unwrap();
        assert_eq!(out.into_output().unwrap().pixels(), &[3, 2, 1, 0]);
    }

    #[test]
    fn rgb555_scales_channels() {
        // Four 16-bit pixels, rowBytes 8: one literal of 4 units.
        let pixels: [u16; 4] = [0x7C00, 0x03E0, 0x001F, 0x0421];
        let mut data = vec![9, 3];
        for p in pixels {
            data.extend_from_slice(&p.to_be_bytes());
        }
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(4, 1, PixelLayout::Rgbx8);
        unpack_generic(
            &mut cursor,
            &mut out,
            RowLayout::new(4, 1, 8),
            16,
            &Unstoppable,
        )
        .unwrap();
        assert_eq!(
            out.into_output().unwrap().pixels(),
            &[248, 0, 0, 255, 0, 248, 0, 255, 0, 0, 248, 255, 8, 8, 8, 255]
        );
    }

    #[test]
    fn generic_rejects_odd_depths() {
        let mut cursor = SliceCursor::new(&[]);
        let mut out = sink(1, 1, PixelLayout::Indexed8);
        let err = unpack_generic(
            &mut cursor,
            &mut out,
            RowLayout::new(1, 1, 1),
            3,
            &Unstoppable,
        )
        .unwrap_err();
        assert!(matches!(err, PictError::FormatUnknown(_)));
    }

    #[test]
    fn short_packed_rows_are_zero_padded() {
        // Width 10, rowBytes 10, but the packed row only yields 2 bytes.
        let data = [3, 1, 5, 6];
        let mut cursor = SliceCursor::new(&data);
        let mut out = sink(10, 1, PixelLayout::Indexed8);
        unpack_8bits(&mut cursor, &mut out, RowLayout::new(10, 1, 10), &Unstoppable).unwrap();
        let pixels: Vec<u8> = out.into_output().unwrap().into_pixels();
        assert_eq!(&pixels[..3], &[5, 6, 0]);
        assert!(pixels[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn skip_mirrors_framing() {
        let data = [2, 0, 0, 1, 0xAA, 0xFF];
        let mut cursor = SliceCursor::new(&data);
        skip_bits(&mut cursor, RowLayout::new(16, 2, 0x8010), 8).unwrap();
        assert_eq!(cursor.position(), 5);

        let raw = [0u8; 12];
        let mut cursor = SliceCursor::new(&raw);
        skip_bits(&mut cursor, RowLayout::new(4, 3, 4), 8).unwrap();
        assert_eq!(cursor.position(), 12);
    }

    #[test]
    fn skip_zero_row_bytes_uses_natural_stride() {
        // 8 pixels at 8 bpp: packed rows with one-byte prefixes.
        let data = [2, 0x07, 0x01, 2, 0xF9, 0x02, 0x99];
        let mut cursor = SliceCursor::new(&data);
        skip_bits(&mut cursor, RowLayout::new(8, 2, 0x8000), 8).unwrap();
        assert_eq!(cursor.position(), 6);

        // 4 pixels at 8 bpp: narrower than a packed row, stored raw.
        let raw = [0u8; 9];
        let mut cursor = SliceCursor::new(&raw);
        skip_bits(&mut cursor, RowLayout::new(4, 2, 0x8000), 8).unwrap();
        assert_eq!(cursor.position(), 8);
    }
}
