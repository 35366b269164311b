//! Changing an image between the four channel layouts.
//!
//! Each conversion only makes sense from some layouts. Asking for one on the
//! wrong layout (eg: greyscale of an image that's already greyscale) is a
//! [`StateError`](crate::StateError).

use crate::{max_sample, ColorType, Image, PixelBuffer, Result, StateError};

#[inline]
fn wrong_type(operation: &'static str, expected: &'static str, found: ColorType) -> StateError {
  StateError::IncompatibleColorType { operation, expected, found }
}

/// Unweighted mean of the colour channels, rounded down.
#[inline]
#[must_use]
const fn luma([r, g, b]: [u16; 3]) -> u16 {
  ((r as u32 + g as u32 + b as u32) / 3) as u16
}

impl Image {
  /// Greyscale from RGB or RGBA, keeping any alpha.
  ///
  /// Each grey value is `(r + g + b) / 3`, rounded down.
  pub fn to_grayscale(&self) -> Result<Image> {
    let pixels = match self.pixel_buffer() {
      PixelBuffer::RGB(v) => PixelBuffer::Y(v.iter().map(|p| [luma(*p)]).collect()),
      PixelBuffer::RGBA(v) => {
        PixelBuffer::YA(v.iter().map(|[r, g, b, a]| [luma([*r, *g, *b]), *a]).collect())
      }
      other => return Err(wrong_type("to_grayscale", "RGB or RGBA", other.color_type()).into()),
    };
    // RGB depths (8, 16) are always legal for greyscale
    Ok(self.with_buffer(pixels)?)
  }

  /// RGB or RGBA from greyscale, copying the grey into all three colours.
  ///
  /// Greyscale below 8 bits is first rescaled to 8 bits.
  pub fn to_truecolour(&self) -> Result<Image> {
    let src = self.at_least_8_bits()?;
    let pixels = match src.pixel_buffer() {
      PixelBuffer::Y(v) => PixelBuffer::RGB(v.iter().map(|[y]| [*y; 3]).collect()),
      PixelBuffer::YA(v) => PixelBuffer::RGBA(v.iter().map(|[y, a]| [*y, *y, *y, *a]).collect()),
      other => return Err(wrong_type("to_truecolour", "Y or YA", other.color_type()).into()),
    };
    Ok(src.with_buffer(pixels)?)
  }

  /// Adds a fully opaque alpha channel.
  ///
  /// Greyscale below 8 bits is first rescaled to 8 bits.
  pub fn add_alpha(&self) -> Result<Image> {
    let src = self.at_least_8_bits()?;
    let opaque = max_sample(src.bit_depth());
    let pixels = match src.pixel_buffer() {
      PixelBuffer::Y(v) => PixelBuffer::YA(v.iter().map(|[y]| [*y, opaque]).collect()),
      PixelBuffer::RGB(v) => {
        PixelBuffer::RGBA(v.iter().map(|[r, g, b]| [*r, *g, *b, opaque]).collect())
      }
      other => return Err(wrong_type("add_alpha", "Y or RGB", other.color_type()).into()),
    };
    Ok(src.with_buffer(pixels)?)
  }

  /// Drops the alpha channel. The alpha values are simply lost.
  pub fn remove_alpha(&self) -> Result<Image> {
    let pixels = match self.pixel_buffer() {
      PixelBuffer::YA(v) => PixelBuffer::Y(v.iter().map(|[y, _]| [*y]).collect()),
      PixelBuffer::RGBA(v) => PixelBuffer::RGB(v.iter().map(|[r, g, b, _]| [*r, *g, *b]).collect()),
      other => return Err(wrong_type("remove_alpha", "YA or RGBA", other.color_type()).into()),
    };
    Ok(self.with_buffer(pixels)?)
  }

  /// Sub-byte images (which are always greyscale) go up to 8 bits, since
  /// nothing with more channels can be that small.
  ///
  /// Images with the wrong layout pass through as-is so that the caller
  /// reports the layout problem.
  fn at_least_8_bits(&self) -> Result<Image> {
    if self.bit_depth() < 8 && self.color_type() == ColorType::Y {
      self.set_bit_depth(8)
    } else {
      Ok(self.clone())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Error, ImageSettings, Pixel};

  fn canvas(color_type: ColorType, bit_depth: u8, bg: Pixel) -> Image {
    Image::new_image(ImageSettings { width: 3, height: 2, color_type, bit_depth }, Some(bg))
      .unwrap()
  }

  #[test]
  fn test_grayscale_is_floor_average() {
    let img = canvas(ColorType::RGB, 8, Pixel::RGB([10, 20, 31]));
    let gray = img.to_grayscale().unwrap();
    assert_eq!(gray.color_type(), ColorType::Y);
    assert_eq!(gray.get_pixel(2, 1).unwrap(), Pixel::Y([20]));
    // the source is left alone
    assert_eq!(img.color_type(), ColorType::RGB);

    let img = canvas(ColorType::RGBA, 16, Pixel::RGBA([65535, 65535, 65534, 7]));
    let gray = img.to_grayscale().unwrap();
    assert_eq!(gray.bit_depth(), 16);
    assert_eq!(gray.get_pixel(0, 0).unwrap(), Pixel::YA([65534, 7]));
  }

  #[test]
  fn test_truecolour_and_back() {
    let img = canvas(ColorType::YA, 8, Pixel::YA([77, 200]));
    let rgb = img.to_truecolour().unwrap();
    assert_eq!(rgb.get_pixel(1, 1).unwrap(), Pixel::RGBA([77, 77, 77, 200]));
    let again = rgb.to_grayscale().unwrap().to_truecolour().unwrap();
    for row in again.get_pixels() {
      for p in row {
        let s = p.samples();
        assert!(s[0] == s[1] && s[1] == s[2]);
      }
    }
    assert_eq!(rgb.to_grayscale().unwrap(), img);
  }

  #[test]
  fn test_sub_byte_gray_gets_rescaled() {
    let img = canvas(ColorType::Y, 2, Pixel::Y([2]));
    let rgb = img.to_truecolour().unwrap();
    assert_eq!(rgb.bit_depth(), 8);
    assert_eq!(rgb.get_pixel(0, 0).unwrap(), Pixel::RGB([170, 170, 170]));
    let ya = img.add_alpha().unwrap();
    assert_eq!(ya.bit_depth(), 8);
    assert_eq!(ya.get_pixel(0, 0).unwrap(), Pixel::YA([170, 255]));
  }

  #[test]
  fn test_alpha_round_trip() {
    let img = canvas(ColorType::RGB, 16, Pixel::RGB([1, 2, 3]));
    let with = img.add_alpha().unwrap();
    assert_eq!(with.get_pixel(0, 0).unwrap(), Pixel::RGBA([1, 2, 3, 65535]));
    assert_eq!(with.remove_alpha().unwrap(), img);
  }

  #[test]
  fn test_wrong_layouts() {
    let gray = canvas(ColorType::Y, 8, Pixel::Y([1]));
    let rgba = canvas(ColorType::RGBA, 8, Pixel::RGBA([1, 2, 3, 4]));
    let state = |r: Result<Image>| matches!(r, Err(Error::State(_)));
    assert!(state(gray.to_grayscale()));
    assert!(state(gray.remove_alpha()));
    assert!(state(rgba.to_truecolour()));
    assert!(state(rgba.add_alpha()));
    assert!(matches!(
      gray.to_grayscale(),
      Err(Error::State(StateError::IncompatibleColorType { found: ColorType::Y, .. }))
    ));
  }
}
