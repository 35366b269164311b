//! Module for pixel formats.
//!
//! There's two main factors with a pixel format:
//! * **Channels:** gray (marked as "Y" in names) or red, green, and blue,
//!   either of which may also carry an alpha channel.
//! * **Bit Depth:** how many bits per channel. Every channel of a pixel uses
//!   the same depth.
//!
//! Samples are always held as `u16` values, so a 16-bit image keeps its full
//! precision. An 8-bit (or smaller) image simply never uses the high bits.
//!
//! When the bit depth and channel layout allows, multiple pixels can be packed
//! within a single byte. That only matters on the wire: see
//! [`png`](crate::png).

#![allow(clippy::upper_case_acronyms)]

use crate::ValidationError;

/// The direct colour layouts that PNG supports.
///
/// The discriminants are the PNG `IHDR` colour type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl ColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::YA => 2,
      Self::RGB => 3,
      Self::RGBA => 4,
    }
  }

  /// The channels that aren't alpha.
  #[inline]
  #[must_use]
  pub const fn color_channel_count(self) -> usize {
    match self {
      Self::Y | Self::YA => 1,
      Self::RGB | Self::RGBA => 3,
    }
  }

  /// If the last channel is alpha.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::YA | Self::RGBA)
  }

  /// The bit depths PNG allows with this colour type.
  #[inline]
  #[must_use]
  pub const fn allowed_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Y => &[1, 2, 4, 8, 16],
      Self::RGB | Self::YA | Self::RGBA => &[8, 16],
    }
  }

  /// Checks a bit depth against [`allowed_bit_depths`](Self::allowed_bit_depths).
  #[inline]
  pub fn check_bit_depth(self, bit_depth: u8) -> Result<(), ValidationError> {
    if self.allowed_bit_depths().contains(&bit_depth) {
      Ok(())
    } else {
      Err(ValidationError::BitDepth { bit_depth, color_type: self })
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = u8;
  /// Fails on palette images (3) and on unknown codes, giving the code back.
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => ColorType::Y,
      2 => ColorType::RGB,
      4 => ColorType::YA,
      6 => ColorType::RGBA,
      other => return Err(other),
    })
  }
}

/// The largest sample value that fits in `bit_depth` bits.
#[inline]
#[must_use]
pub const fn max_sample(bit_depth: u8) -> u16 {
  if bit_depth >= 16 {
    u16::MAX
  } else {
    (1_u16 << bit_depth) - 1
  }
}

/// One pixel, tagged with its channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pixel {
  /// `[y]`
  Y([u16; 1]),
  /// `[y, a]`
  YA([u16; 2]),
  /// `[r, g, b]`
  RGB([u16; 3]),
  /// `[r, g, b, a]`
  RGBA([u16; 4]),
}
impl Pixel {
  /// The layout of this pixel.
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

  /// All samples of the pixel, alpha last.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[u16] {
    match self {
      Self::Y(s) => s,
      Self::YA(s) => s,
      Self::RGB(s) => s,
      Self::RGBA(s) => s,
    }
  }

  /// Builds a pixel of the given layout from a slice of samples.
  ///
  /// Gives `None` when the slice length doesn't match the channel count.
  #[inline]
  #[must_use]
  pub fn from_samples(color_type: ColorType, samples: &[u16]) -> Option<Self> {
    Some(match color_type {
      ColorType::Y => Self::Y(samples.try_into().ok()?),
      ColorType::YA => Self::YA(samples.try_into().ok()?),
      ColorType::RGB => Self::RGB(samples.try_into().ok()?),
      ColorType::RGBA => Self::RGBA(samples.try_into().ok()?),
    })
  }

  /// The "neutral" background for a layout: black, fully opaque.
  #[inline]
  #[must_use]
  pub const fn opaque_black(color_type: ColorType, bit_depth: u8) -> Self {
    let a = max_sample(bit_depth);
    match color_type {
      ColorType::Y => Self::Y([0]),
      ColorType::YA => Self::YA([0, a]),
      ColorType::RGB => Self::RGB([0, 0, 0]),
      ColorType::RGBA => Self::RGBA([0, 0, 0, a]),
    }
  }
}
impl From<[u16; 1]> for Pixel {
  #[inline]
  fn from(s: [u16; 1]) -> Self {
    Self::Y(s)
  }
}
impl From<[u16; 2]> for Pixel {
  #[inline]
  fn from(s: [u16; 2]) -> Self {
    Self::YA(s)
  }
}
impl From<[u16; 3]> for Pixel {
  #[inline]
  fn from(s: [u16; 3]) -> Self {
    Self::RGB(s)
  }
}
impl From<[u16; 4]> for Pixel {
  #[inline]
  fn from(s: [u16; 4]) -> Self {
    Self::RGBA(s)
  }
}

#[test]
fn test_color_type_codes() {
  for code in 0..=u8::MAX {
    match ColorType::try_from(code) {
      Ok(ct) => assert_eq!(ct as u8, code),
      Err(back) => {
        assert_eq!(back, code);
        assert!(![0, 2, 4, 6].contains(&code));
      }
    }
  }
  assert_eq!(ColorType::try_from(3), Err(3));
}

#[test]
fn test_max_sample() {
  assert_eq!(max_sample(1), 1);
  assert_eq!(max_sample(2), 3);
  assert_eq!(max_sample(4), 15);
  assert_eq!(max_sample(8), 255);
  assert_eq!(max_sample(16), 65535);
}

#[test]
fn test_pixel_from_samples() {
  assert_eq!(Pixel::from_samples(ColorType::RGB, &[1, 2, 3]), Some(Pixel::RGB([1, 2, 3])));
  assert_eq!(Pixel::from_samples(ColorType::RGB, &[1, 2]), None);
  assert_eq!(Pixel::from([9_u16, 8]).samples(), &[9, 8]);
  assert_eq!(Pixel::opaque_black(ColorType::YA, 16), Pixel::YA([0, 65535]));
}
