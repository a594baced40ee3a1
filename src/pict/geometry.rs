//! QuickDraw geometry and header records: `Rect`, `PixMap`, `ColorTable`.
//!
//! Readers here only advance the cursor; they carry no decoder state.

use crate::cursor::ByteCursor;
use crate::error::PictError;
use crate::info::Resolution;
use crate::sink::PaletteEntry;

/// QuickDraw rectangle. Field order on disk is top, left, bottom, right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    pub fn read<C: ByteCursor + ?Sized>(cursor: &mut C) -> Result<Self, PictError> {
        Ok(Self {
            top: cursor.read_i16_be()?,
            left: cursor.read_i16_be()?,
            bottom: cursor.read_i16_be()?,
            right: cursor.read_i16_be()?,
        })
    }

    pub fn width(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    pub fn height(&self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top)
    }

    /// Width and height as output dimensions; inverted rectangles are rejected.
    pub(crate) fn dimensions(&self) -> Result<(u32, u32), PictError> {
        let (w, h) = (self.width(), self.height());
        if w < 0 || h < 0 {
            return Err(PictError::InvalidData(alloc::format!(
                "inverted bounds rectangle ({}, {}, {}, {})",
                self.top,
                self.left,
                self.bottom,
                self.right
            )));
        }
        Ok((w as u32, h as u32))
    }
}

/// PixMap record following a rowBytes word with the high bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixMapHeader {
    pub bounds: Rect,
    pub version: u16,
    pub pack_type: u16,
    pub pack_size: u32,
    /// Horizontal resolution, 16.16 fixed.
    pub h_res: u32,
    /// Vertical resolution, 16.16 fixed.
    pub v_res: u32,
    pub pixel_type: u16,
    /// Bits per pixel: 1, 2, 4, 8, 16 or 32.
    pub pixel_size: u16,
    /// 3 for RGB, 4 for RGBA direct pixels; 1 for indexed.
    pub cmp_count: u16,
    pub cmp_size: u16,
    pub plane_bytes: u32,
    /// Handle of the associated color table (meaningless on disk).
    pub pm_table: u32,
}

impl PixMapHeader {
    /// Read bounds followed by the PixMap fields.
    pub fn read<C: ByteCursor + ?Sized>(cursor: &mut C) -> Result<Self, PictError> {
        let bounds = Rect::read(cursor)?;
        let header = Self {
            bounds,
            version: cursor.read_u16_be()?,
            pack_type: cursor.read_u16_be()?,
            pack_size: cursor.read_u32_be()?,
            h_res: cursor.read_u32_be()?,
            v_res: cursor.read_u32_be()?,
            pixel_type: cursor.read_u16_be()?,
            pixel_size: cursor.read_u16_be()?,
            cmp_count: cursor.read_u16_be()?,
            cmp_size: cursor.read_u16_be()?,
            plane_bytes: cursor.read_u32_be()?,
            pm_table: cursor.read_u32_be()?,
        };
        // pmReserved
        cursor.read_u32_be()?;

        ltrace!(
            "pixmap: bounds ({}, {}, {}, {}), version {:#x}, packType {}, packSize {}",
            bounds.top,
            bounds.left,
            bounds.bottom,
            bounds.right,
            header.version,
            header.pack_type,
            header.pack_size
        );
        ltrace!(
            "pixmap: {} bpp, cmpCount {}, cmpSize {}, planeBytes {}, res {}x{}",
            header.pixel_size,
            header.cmp_count,
            header.cmp_size,
            header.plane_bytes,
            header.h_res >> 16,
            header.v_res >> 16
        );
        Ok(header)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::from_fixed(self.h_res, self.v_res)
    }
}

/// Palette read from a QuickDraw `ColorTable` record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTable {
    entries: [PaletteEntry; 256],
    len: usize,
}

/// ctFlags bit marking a device color table, whose stored indices are junk.
const DEVICE_TABLE_FLAG: u16 = 0x8000;

impl ColorTable {
    pub fn read<C: ByteCursor + ?Sized>(cursor: &mut C) -> Result<Self, PictError> {
        let _seed = cursor.read_i32_be()?;
        let flags = cursor.read_u16_be()?;
        // Stored as count - 1; 0xFFFF wraps to an empty table.
        let count = cursor.read_u16_be()?.wrapping_add(1);
        let len = usize::from(count);
        if len > 256 {
            return Err(PictError::FormatUnknown(alloc::format!(
                "color table has {len} entries, at most 256 allowed"
            )));
        }
        let device = flags & DEVICE_TABLE_FLAG != 0;
        ldebug!("color table: {} entries, device = {}", len, device);

        let mut entries = [[0, 0, 0, 255]; 256];
        for i in 0..len {
            let stored = cursor.read_u16_be()?;
            let index = if device { i } else { usize::from(stored) };
            if index >= len {
                return Err(PictError::FormatUnknown(alloc::format!(
                    "color table index {index} out of range (table has {len} entries)"
                )));
            }
            // 16-bit QuickDraw channels; keep the high byte.
            let r = (cursor.read_u16_be()? >> 8) as u8;
            let g = (cursor.read_u16_be()? >> 8) as u8;
            let b = (cursor.read_u16_be()? >> 8) as u8;
            entries[index] = [r, g, b, 255];
        }
        Ok(Self { entries, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All 256 slots; those past [`ColorTable::len`] are opaque black.
    pub fn entries(&self) -> &[PaletteEntry; 256] {
        &self.entries
    }
}
