//! Destination for decoded pixels.
//!
//! The decoder never allocates the output image itself: it announces the
//! geometry through [`ImageSink::set_dimensions`], hands over the palette,
//! and then fills rows one at a time. [`ImageBuffer`] is the owned,
//! limit-checked implementation behind [`crate::DecodeRequest`].

use alloc::vec;
use alloc::vec::Vec;

use crate::decode::DecodeOutput;
use crate::error::PictError;
use crate::info::Resolution;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Palette entry as RGBA.
pub type PaletteEntry = [u8; 4];

/// Receiver of decoded raster data.
pub trait ImageSink {
    /// Announce the output geometry. Called once, before any row access.
    fn set_dimensions(
        &mut self,
        width: u32,
        height: u32,
        resolution: Resolution,
        layout: PixelLayout,
    ) -> Result<(), PictError>;

    fn set_palette_entry(&mut self, index: u8, r: u8, g: u8, b: u8, a: u8);

    /// Replace the whole 256-entry palette.
    fn set_palette(&mut self, palette: &[PaletteEntry; 256]);

    /// Bits per output pixel, or 0 before [`ImageSink::set_dimensions`].
    fn bits_per_pixel(&self) -> u32;

    /// Mutable access to output row `y` (`width * bytes_per_pixel` bytes).
    fn row_mut(&mut self, y: usize) -> Result<&mut [u8], PictError>;
}

/// Owned pixel buffer implementing [`ImageSink`].
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    layout: Option<PixelLayout>,
    resolution: Resolution,
    pixels: Vec<u8>,
    palette: [PaletteEntry; 256],
    limits: Option<Limits>,
}

impl Default for ImageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuffer {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            layout: None,
            resolution: Resolution::default(),
            pixels: Vec::new(),
            palette: [[0, 0, 0, 255]; 256],
            limits: None,
        }
    }

    /// Reject geometries exceeding `limits` before allocating.
    pub fn with_limits(limits: &Limits) -> Self {
        Self {
            limits: Some(limits.clone()),
            ..Self::new()
        }
    }

    pub fn palette(&self) -> &[PaletteEntry; 256] {
        &self.palette
    }

    /// Finish into a [`DecodeOutput`]. Fails if no geometry was ever set.
    pub fn into_output(self) -> Result<DecodeOutput, PictError> {
        let layout = self
            .layout
            .ok_or_else(|| PictError::InvalidData("no image was decoded".into()))?;
        let palette = layout.is_indexed().then(|| self.palette.to_vec());
        Ok(DecodeOutput::new(
            self.pixels,
            self.width,
            self.height,
            layout,
            palette,
            self.resolution,
        ))
    }

    fn row_len(&self) -> usize {
        self.width as usize * self.layout.map_or(0, |l| l.bytes_per_pixel())
    }
}

impl ImageSink for ImageBuffer {
    fn set_dimensions(
        &mut self,
        width: u32,
        height: u32,
        resolution: Resolution,
        layout: PixelLayout,
    ) -> Result<(), PictError> {
        if let Some(limits) = &self.limits {
            limits.check(width, height)?;
        }
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(layout.bytes_per_pixel()))
            .ok_or(PictError::DimensionsTooLarge { width, height })?;
        if let Some(limits) = &self.limits {
            limits.check_memory(size)?;
        }
        self.width = width;
        self.height = height;
        self.resolution = resolution;
        self.layout = Some(layout);
        self.pixels = vec![0u8; size];
        Ok(())
    }

    fn set_palette_entry(&mut self, index: u8, r: u8, g: u8, b: u8, a: u8) {
        self.palette[usize::from(index)] = [r, g, b, a];
    }

    fn set_palette(&mut self, palette: &[PaletteEntry; 256]) {
        self.palette = *palette;
    }

    fn bits_per_pixel(&self) -> u32 {
        self.layout.map_or(0, |l| l.bits_per_pixel())
    }

    fn row_mut(&mut self, y: usize) -> Result<&mut [u8], PictError> {
        let len = self.row_len();
        let start = y.checked_mul(len).ok_or(PictError::DimensionsTooLarge {
            width: self.width,
            height: self.height,
        })?;
        let end = start.saturating_add(len);
        let actual = self.pixels.len();
        self.pixels
            .get_mut(start..end)
            .ok_or(PictError::BufferTooSmall {
                needed: end,
                actual,
            })
    }
}
