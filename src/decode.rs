use alloc::boxed::Box;
use alloc::vec::Vec;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use enough::Stop;

use crate::error::PictError;
use crate::info::{ImageInfo, Resolution};
use crate::limits::Limits;
use crate::pict::JpegDecoder;
use crate::pixel::PixelLayout;
use crate::sink::PaletteEntry;

/// Decoded image output.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    palette: Option<Vec<PaletteEntry>>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub resolution: Resolution,
}

impl DecodeOutput {
    pub(crate) fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        layout: PixelLayout,
        palette: Option<Vec<PaletteEntry>>,
        resolution: Resolution,
    ) -> Self {
        Self {
            pixels,
            palette,
            width,
            height,
            layout,
            resolution,
        }
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The 256-entry RGBA palette, present for [`PixelLayout::Indexed8`].
    pub fn palette(&self) -> Option<&[PaletteEntry]> {
        self.palette.as_deref()
    }

    /// Expand to 8-bit RGBA, resolving palette indices when indexed.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match (&self.palette, self.layout) {
            (Some(palette), PixelLayout::Indexed8) => {
                let mut out = Vec::with_capacity(self.pixels.len() * 4);
                for &idx in &self.pixels {
                    out.extend_from_slice(&palette[usize::from(idx)]);
                }
                out
            }
            _ => self.pixels.clone(),
        }
    }

    /// Reinterpret pixel data as typed pixel slice.
    ///
    /// Returns [`PictError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::DecodePixel>(&self) -> Result<&[P], PictError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if !self.layout.is_memory_compatible(P::layout()) {
            return Err(PictError::LayoutMismatch {
                expected: P::layout(),
                actual: self.layout,
            });
        }
        Ok(self.pixels().as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// Returns [`PictError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::DecodePixel>(&self) -> Result<imgref::ImgRef<'_, P>, PictError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Convert to an [`imgref::ImgVec`] of typed pixels.
    ///
    /// Returns [`PictError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::DecodePixel>(&self) -> Result<imgref::ImgVec<P>, PictError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgVec::new(
            pixels.to_vec(),
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Builder for a PICT decode.
///
/// ```no_run
/// use zenpict::{DecodeRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[]; // your PICT bytes
/// let limits = Limits { max_pixels: Some(100_000_000), ..Default::default() };
/// let image = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// println!("{}x{} {:?}", image.width, image.height, image.layout);
/// # Ok::<(), zenpict::PictError>(())
/// ```
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    jpeg: Option<Box<dyn JpegDecoder>>,
}

impl<'a> DecodeRequest<'a> {
    /// New request over a complete PICT file, 512-byte preamble included.
    ///
    /// With the `jpeg` feature, embedded JPEG opcodes are decoded by
    /// [`crate::ZuneJpegDecoder`] unless replaced via
    /// [`DecodeRequest::with_jpeg_decoder`].
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            jpeg: default_jpeg_decoder(),
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Use `decoder` for QuickTime-wrapped JPEG data.
    pub fn with_jpeg_decoder(mut self, decoder: Box<dyn JpegDecoder>) -> Self {
        self.jpeg = Some(decoder);
        self
    }

    /// Disable embedded JPEG decoding; such files fail with
    /// [`PictError::FormatNotSupported`].
    pub fn without_jpeg(mut self) -> Self {
        self.jpeg = None;
        self
    }

    /// Run the header phase only.
    pub fn probe(self) -> Result<ImageInfo, PictError> {
        crate::pict::probe_with(self.data, self.jpeg)
    }

    /// Decode the first raster in the picture.
    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, PictError> {
        crate::pict::decode(self.data, self.limits, self.jpeg, &stop)
    }
}

#[cfg(feature = "jpeg")]
fn default_jpeg_decoder() -> Option<Box<dyn JpegDecoder>> {
    Some(Box::new(crate::pict::ZuneJpegDecoder::new()))
}

#[cfg(not(feature = "jpeg"))]
fn default_jpeg_decoder() -> Option<Box<dyn JpegDecoder>> {
    None
}
