use crate::{ColorType, FormatError};

/// Image Header
///
/// Compression method, filter method, and interlace method only have one legal
/// value each for the images this crate handles (all zero), so they aren't
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: ColorType,
}
impl IHDR {
  /// The largest legal width or height.
  pub const MAX_DIMENSION: u32 = (1 << 31) - 1;

  /// Makes a header, checking the dimensions and the depth/colour pairing.
  pub fn new(
    width: u32, height: u32, bit_depth: u8, color_type: ColorType,
  ) -> Result<Self, FormatError> {
    if width == 0 || height == 0 || width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
      return Err(FormatError::BadDimensions { width, height });
    }
    if !color_type.allowed_bit_depths().contains(&bit_depth) {
      return Err(FormatError::UnsupportedPixelFormat { bit_depth, color_type: color_type as u8 });
    }
    Ok(Self { width, height, bit_depth, color_type })
  }

  /// The 13 byte `IHDR` payload.
  #[inline]
  #[must_use]
  pub fn to_bytes(&self) -> [u8; 13] {
    let mut out = [0_u8; 13];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.bit_depth;
    out[9] = self.color_type as u8;
    // compression, filter, and interlace methods stay 0
    out
  }

  /// Bits used by one whole pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Samples in one scanline.
  #[inline]
  #[must_use]
  pub const fn samples_per_scanline(&self) -> usize {
    (self.width as usize) * self.color_type.channel_count()
  }

  /// Bytes of pixel data in one scanline, not counting the filter byte.
  ///
  /// When pixels are less than 8 bits it's possible to end up with a partial
  /// byte on the end, so we round up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self) -> usize {
    (self.bits_per_pixel() * (self.width as usize) + 7) / 8
  }

  /// Bytes of one scanline including the leading filter byte.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self) -> usize {
    1 + self.bytes_per_scanline()
  }

  /// The distance (in bytes) back to the "same" byte of the previous pixel.
  ///
  /// Filtering is per byte within a pixel when pixels are more than 1 byte
  /// each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn filter_stride(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Size of the whole decompressed (still filtered) image data.
  ///
  /// `None` if that doesn't fit in a `usize`.
  #[inline]
  #[must_use]
  pub fn decompressed_len(&self) -> Option<usize> {
    self
      .bits_per_pixel()
      .checked_mul(self.width as usize)
      .map(|bits| bits / 8 + usize::from(bits % 8 != 0) + 1)?
      .checked_mul(self.height as usize)
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = FormatError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
        let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
        if *compression_method != 0 {
          return Err(FormatError::CompressionMethod(*compression_method));
        }
        if *filter_method != 0 {
          return Err(FormatError::FilterMethod(*filter_method));
        }
        match interlace_method {
          0 => (),
          1 => return Err(FormatError::Interlaced),
          other => return Err(FormatError::InterlaceMethod(*other)),
        }
        let color_type = ColorType::try_from(*color_type).map_err(|color_type| {
          FormatError::UnsupportedPixelFormat { bit_depth: *bit_depth, color_type }
        })?;
        Self::new(width, height, *bit_depth, color_type)
      }
      _ => Err(FormatError::HeaderLength(value.len())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(bit_depth: u8, color_type: u8, interlace: u8) -> [u8; 13] {
    [0, 0, 0, 3, 0, 0, 0, 2, bit_depth, color_type, 0, 0, interlace]
  }

  #[test]
  fn test_legal_pairs() {
    let legal: &[(u8, &[u8])] =
      &[(0, &[1, 2, 4, 8, 16]), (2, &[8, 16]), (4, &[8, 16]), (6, &[8, 16])];
    for color_type in 0..=10_u8 {
      for bit_depth in 0..=32_u8 {
        let result = IHDR::try_from(&payload(bit_depth, color_type, 0)[..]);
        let expect_ok =
          legal.iter().any(|(ct, depths)| *ct == color_type && depths.contains(&bit_depth));
        assert_eq!(result.is_ok(), expect_ok, "ct {color_type} depth {bit_depth}");
        if !expect_ok {
          assert_eq!(
            result,
            Err(FormatError::UnsupportedPixelFormat { bit_depth, color_type })
          );
        }
      }
    }
  }

  #[test]
  fn test_header_rejections() {
    assert_eq!(IHDR::try_from(&payload(8, 2, 1)[..]), Err(FormatError::Interlaced));
    assert_eq!(IHDR::try_from(&payload(8, 2, 2)[..]), Err(FormatError::InterlaceMethod(2)));
    assert_eq!(IHDR::try_from(&payload(8, 2, 0)[..12]), Err(FormatError::HeaderLength(12)));
    let mut p = payload(8, 2, 0);
    p[10] = 1;
    assert_eq!(IHDR::try_from(&p[..]), Err(FormatError::CompressionMethod(1)));
    let mut p = payload(8, 2, 0);
    p[11] = 1;
    assert_eq!(IHDR::try_from(&p[..]), Err(FormatError::FilterMethod(1)));
    let mut p = payload(8, 2, 0);
    p[0..4].copy_from_slice(&[0; 4]);
    assert_eq!(IHDR::try_from(&p[..]), Err(FormatError::BadDimensions { width: 0, height: 2 }));
    let mut p = payload(8, 2, 0);
    p[4..8].copy_from_slice(&[0x80, 0, 0, 0]);
    assert!(matches!(IHDR::try_from(&p[..]), Err(FormatError::BadDimensions { .. })));
  }

  #[test]
  fn test_header_round_trip() {
    let ihdr = IHDR::new(640, 480, 16, ColorType::RGBA).unwrap();
    assert_eq!(IHDR::try_from(&ihdr.to_bytes()[..]), Ok(ihdr));
  }

  #[test]
  fn test_line_sizes() {
    let gray1 = IHDR::new(10, 3, 1, ColorType::Y).unwrap();
    assert_eq!(gray1.bytes_per_scanline(), 2);
    assert_eq!(gray1.filter_stride(), 1);
    assert_eq!(gray1.decompressed_len(), Some(9));
    let gray4 = IHDR::new(3, 1, 4, ColorType::Y).unwrap();
    assert_eq!(gray4.bytes_per_scanline(), 2);
    let rgb8 = IHDR::new(5, 2, 8, ColorType::RGB).unwrap();
    assert_eq!(rgb8.bytes_per_scanline(), 15);
    assert_eq!(rgb8.filter_stride(), 3);
    let rgba16 = IHDR::new(2, 2, 16, ColorType::RGBA).unwrap();
    assert_eq!(rgba16.bytes_per_filterline(), 17);
    assert_eq!(rgba16.filter_stride(), 8);
    let ya16 = IHDR::new(1, 1, 16, ColorType::YA).unwrap();
    assert_eq!(ya16.filter_stride(), 4);
  }
}
