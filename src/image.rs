#![forbid(unsafe_code)]

//! Provides the heap-allocated image type.
//!
//! An [`Image`] never changes once built. Every operation that "edits" an
//! image (pixel writes, colour model changes, transforms) gives back a new
//! image and leaves the old one alone.

use alloc::vec::Vec;

use crate::{max_sample, ColorType, Error, Pixel, Result, ValidationError};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// This is how the pixel buffer is laid out: rows top to bottom, pixels left
/// to right within each row.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// Runs an expression over the `Vec` inside a [`PixelBuffer`], whatever the
/// layout.
macro_rules! with_pixels {
  ($buf:expr, $v:ident => $body:expr) => {
    match $buf {
      $crate::PixelBuffer::Y($v) => $body,
      $crate::PixelBuffer::YA($v) => $body,
      $crate::PixelBuffer::RGB($v) => $body,
      $crate::PixelBuffer::RGBA($v) => $body,
    }
  };
}
pub(crate) use with_pixels;

/// Like [`with_pixels`], but the expression makes a new `Vec` of the same
/// layout, which is wrapped back up as a [`PixelBuffer`].
macro_rules! map_pixels {
  ($buf:expr, $v:ident => $body:expr) => {
    match $buf {
      $crate::PixelBuffer::Y($v) => $crate::PixelBuffer::Y($body),
      $crate::PixelBuffer::YA($v) => $crate::PixelBuffer::YA($body),
      $crate::PixelBuffer::RGB($v) => $crate::PixelBuffer::RGB($body),
      $crate::PixelBuffer::RGBA($v) => $crate::PixelBuffer::RGBA($body),
    }
  };
}
pub(crate) use map_pixels;

/// Every pixel of an image, row-major, in one of the four channel layouts.
///
/// Holding each layout as fixed size arrays means a pixel can't ever have the
/// wrong channel count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum PixelBuffer {
  /// Greyscale pixels
  Y(Vec<[u16; 1]>),
  /// Greyscale + Alpha pixels
  YA(Vec<[u16; 2]>),
  /// Red, Green, Blue pixels
  RGB(Vec<[u16; 3]>),
  /// Red, Green, Blue, Alpha pixels
  RGBA(Vec<[u16; 4]>),
}
impl PixelBuffer {
  /// The layout of the pixels.
  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> ColorType {
    match self {
      Self::Y(_) => ColorType::Y,
      Self::YA(_) => ColorType::YA,
      Self::RGB(_) => ColorType::RGB,
      Self::RGBA(_) => ColorType::RGBA,
    }
  }

  /// Number of pixels.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    with_pixels!(self, v => v.len())
  }

  /// If there's no pixels at all.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Gets the pixel at a linear index.
  #[inline]
  #[must_use]
  pub fn get(&self, i: usize) -> Option<Pixel> {
    with_pixels!(self, v => v.get(i).map(|p| Pixel::from(*p)))
  }

  /// All samples, flattened, in the same order as they'd go into a PNG.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[u16] {
    with_pixels!(self, v => bytemuck::cast_slice(v.as_slice()))
  }

  /// Groups a flat run of samples into pixels.
  ///
  /// `None` if the sample count isn't a multiple of the channel count.
  #[inline]
  #[must_use]
  pub fn from_samples(color_type: ColorType, samples: &[u16]) -> Option<Self> {
    Some(match color_type {
      ColorType::Y => Self::Y(bytemuck::try_cast_slice(samples).ok()?.to_vec()),
      ColorType::YA => Self::YA(bytemuck::try_cast_slice(samples).ok()?.to_vec()),
      ColorType::RGB => Self::RGB(bytemuck::try_cast_slice(samples).ok()?.to_vec()),
      ColorType::RGBA => Self::RGBA(bytemuck::try_cast_slice(samples).ok()?.to_vec()),
    })
  }

  /// Collects pixels into a buffer of the given layout.
  ///
  /// ## Failure
  /// * Any pixel has a different layout.
  pub fn from_pixels<'p, I>(color_type: ColorType, pixels: I) -> Result<Self, ValidationError>
  where
    I: IntoIterator<Item = &'p Pixel>,
  {
    fn gather<'p, const N: usize>(
      color_type: ColorType, pixels: impl Iterator<Item = &'p Pixel>,
    ) -> Result<Vec<[u16; N]>, ValidationError> {
      pixels
        .map(|p| {
          <[u16; N]>::try_from(p.samples()).map_err(|_| ValidationError::WrongPixelLayout {
            expected: color_type,
            found: p.color_type(),
          })
        })
        .collect()
    }
    let it = pixels.into_iter();
    Ok(match color_type {
      ColorType::Y => Self::Y(gather(color_type, it)?),
      ColorType::YA => Self::YA(gather(color_type, it)?),
      ColorType::RGB => Self::RGB(gather(color_type, it)?),
      ColorType::RGBA => Self::RGBA(gather(color_type, it)?),
    })
  }

  /// Checks that every sample fits in `bit_depth` bits.
  #[inline]
  pub fn check_samples(&self, bit_depth: u8) -> Result<(), ValidationError> {
    let max = max_sample(bit_depth);
    match self.samples().iter().find(|s| **s > max) {
      Some(sample) => Err(ValidationError::SampleTooLarge { sample: *sample, bit_depth }),
      None => Ok(()),
    }
  }
}

/// The shape of a fresh canvas from [`Image::new_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSettings {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// channel layout
  pub color_type: ColorType,
  /// bits per sample
  pub bit_depth: u8,
}
impl Default for ImageSettings {
  /// 1000x1000 8-bit RGB
  #[inline]
  fn default() -> Self {
    Self { width: 1000, height: 1000, color_type: ColorType::RGB, bit_depth: 8 }
  }
}

/// A direct-color raster image.
///
/// The fields are private so that an image is always consistent: the pixel
/// count is `width * height`, the bit depth is legal for the colour type, and
/// every sample fits the bit depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Image {
  width: u32,
  height: u32,
  bit_depth: u8,
  pixels: PixelBuffer,
}
impl Image {
  /// Builds an image from its parts, checking all the invariants.
  pub fn from_parts(
    width: u32, height: u32, bit_depth: u8, pixels: PixelBuffer,
  ) -> Result<Self, ValidationError> {
    let expected = pixel_count(width, height)?;
    pixels.color_type().check_bit_depth(bit_depth)?;
    if pixels.len() != expected {
      return Err(ValidationError::PixelCount { width, height, expected, found: pixels.len() });
    }
    pixels.check_samples(bit_depth)?;
    Ok(Self { width, height, bit_depth, pixels })
  }

  /// A new canvas, every pixel set to `background`.
  ///
  /// Without a background the canvas is black (and opaque, if there's alpha).
  ///
  /// ## Failure
  /// * Zero width or height, or an illegal bit depth.
  /// * A background with the wrong layout, or samples too big for the depth.
  pub fn new_image(settings: ImageSettings, background: Option<Pixel>) -> Result<Self> {
    let ImageSettings { width, height, color_type, bit_depth } = settings;
    color_type.check_bit_depth(bit_depth)?;
    let count = pixel_count(width, height)?;
    let background =
      background.unwrap_or_else(|| Pixel::opaque_black(color_type, bit_depth));
    if background.color_type() != color_type {
      return Err(
        ValidationError::WrongPixelLayout { expected: color_type, found: background.color_type() }
          .into(),
      );
    }
    check_pixel_fits(&background, bit_depth)?;
    let pixels = PixelBuffer::from_pixels(color_type, core::iter::repeat(&background).take(count))?;
    Ok(Self { width, height, bit_depth, pixels })
  }

  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// `(width, height)`
  #[inline]
  #[must_use]
  pub const fn shape(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  /// Bits per sample.
  #[inline]
  #[must_use]
  pub const fn bit_depth(&self) -> u8 {
    self.bit_depth
  }

  /// The channel layout.
  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> ColorType {
    self.pixels.color_type()
  }

  /// The pixel data.
  #[inline]
  #[must_use]
  pub const fn pixel_buffer(&self) -> &PixelBuffer {
    &self.pixels
  }

  /// Takes the pixel data out of the image.
  #[inline]
  #[must_use]
  pub fn into_pixel_buffer(self) -> PixelBuffer {
    self.pixels
  }

  /// A copy of every pixel, as rows from top to bottom.
  #[must_use]
  pub fn get_pixels(&self) -> Vec<Vec<Pixel>> {
    let width = self.width as usize;
    with_pixels!(&self.pixels, v => v
      .chunks_exact(width)
      .map(|row| row.iter().map(|p| Pixel::from(*p)).collect())
      .collect())
  }

  /// The pixel at `(x, y)`, with `(0, 0)` in the top left.
  ///
  /// ## Failure
  /// * The position is outside of the image.
  #[inline]
  pub fn get_pixel(&self, x: u32, y: u32) -> Result<Pixel> {
    let i = self.checked_index(x, y)?;
    self.pixels.get(i).ok_or_else(|| self.out_of_bounds(x, y))
  }

  /// A new image with the pixel at `(x, y)` changed.
  ///
  /// ## Failure
  /// * The position is outside of the image.
  /// * The pixel has the wrong layout, or samples too big for the bit depth.
  pub fn set_pixel(&self, x: u32, y: u32, pixel: Pixel) -> Result<Image> {
    let i = self.checked_index(x, y)?;
    self.check_pixel(&pixel)?;
    let mut out = self.clone();
    match (&mut out.pixels, pixel) {
      (PixelBuffer::Y(v), Pixel::Y(p)) => v[i] = p,
      (PixelBuffer::YA(v), Pixel::YA(p)) => v[i] = p,
      (PixelBuffer::RGB(v), Pixel::RGB(p)) => v[i] = p,
      (PixelBuffer::RGBA(v), Pixel::RGBA(p)) => v[i] = p,
      (buf, p) => {
        return Err(
          ValidationError::WrongPixelLayout { expected: buf.color_type(), found: p.color_type() }
            .into(),
        )
      }
    }
    Ok(out)
  }

  /// A new image of the same colour type and bit depth, built from `rows`.
  ///
  /// The new width and height come from the rows.
  ///
  /// ## Failure
  /// * There are no rows, or the first row is empty.
  /// * The rows aren't all the same length.
  /// * Any pixel has the wrong layout, or samples too big for the bit depth.
  pub fn replace_pixels(&self, rows: &[Vec<Pixel>]) -> Result<Image> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
      return Err(ValidationError::EmptyImage.into());
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
      return Err(ValidationError::RaggedRows { row, expected: width, found: r.len() }.into());
    }
    let too_many = || ValidationError::TooManyPixels {
      width: u32::try_from(width).unwrap_or(u32::MAX),
      height: u32::try_from(rows.len()).unwrap_or(u32::MAX),
    };
    let w = u32::try_from(width).map_err(|_| too_many())?;
    let h = u32::try_from(rows.len()).map_err(|_| too_many())?;
    let pixels = PixelBuffer::from_pixels(self.color_type(), rows.iter().flatten())?;
    Ok(Image::from_parts(w, h, self.bit_depth, pixels)?)
  }

  /// Same size and depth as `self`, but with other pixels.
  #[inline]
  pub(crate) fn with_buffer(&self, pixels: PixelBuffer) -> Result<Image, ValidationError> {
    Image::from_parts(self.width, self.height, self.bit_depth, pixels)
  }

  #[inline]
  fn checked_index(&self, x: u32, y: u32) -> Result<usize> {
    if x < self.width && y < self.height {
      Ok(xy_width_to_index(x, y, self.width))
    } else {
      Err(self.out_of_bounds(x, y))
    }
  }

  #[inline]
  fn out_of_bounds(&self, x: u32, y: u32) -> Error {
    Error::OutOfBounds { x, y, width: self.width, height: self.height }
  }

  fn check_pixel(&self, pixel: &Pixel) -> Result<(), ValidationError> {
    if pixel.color_type() != self.color_type() {
      return Err(ValidationError::WrongPixelLayout {
        expected: self.color_type(),
        found: pixel.color_type(),
      });
    }
    check_pixel_fits(pixel, self.bit_depth)
  }
}

/// `width * height`, refusing zero sizes and counts that overflow.
#[inline]
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize, ValidationError> {
  if width == 0 || height == 0 {
    return Err(ValidationError::ZeroDimension { width, height });
  }
  (width as usize)
    .checked_mul(height as usize)
    .filter(|count| count.checked_mul(8).is_some())
    .ok_or(ValidationError::TooManyPixels { width, height })
}

#[inline]
fn check_pixel_fits(pixel: &Pixel, bit_depth: u8) -> Result<(), ValidationError> {
  let max = max_sample(bit_depth);
  match pixel.samples().iter().find(|s| **s > max) {
    Some(sample) => Err(ValidationError::SampleTooLarge { sample: *sample, bit_depth }),
    None => Ok(()),
  }
}
