//! The zlib layer under the `IDAT` data.
//!
//! PNG only cares that the scanline bytes make it through a zlib stream and
//! back, so the codec talks to any [`Compression`] value. With the
//! `miniz_oxide` feature the crate provides [`Zlib`].

use alloc::vec::Vec;

use crate::CompressionError;
#[cfg(feature = "miniz_oxide")]
use crate::ValidationError;

/// Compresses and decompresses zlib streams for the codec.
pub trait Compression {
  /// Turns raw bytes into a complete zlib stream.
  fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;

  /// Turns a zlib stream back into raw bytes, giving at most `limit` of them.
  ///
  /// A stream that would inflate past `limit` isn't an error: inflating just
  /// stops there and the first `limit` bytes come back.
  ///
  /// ## Failure
  /// * The stream is corrupt, cut short, or has a bad checksum.
  fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError>;
}
impl<C: Compression + ?Sized> Compression for &C {
  #[inline]
  fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    C::compress(self, data)
  }
  #[inline]
  fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    C::decompress(self, data, limit)
  }
}

/// A [`Compression`] using `miniz_oxide`.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zlib {
  level: u8,
}
#[cfg(feature = "miniz_oxide")]
impl Zlib {
  /// The highest level `miniz_oxide` accepts.
  pub const MAX_LEVEL: u8 = 10;

  /// Makes a compressor with the given level (`0` is "store only").
  #[inline]
  pub const fn new(level: u8) -> Result<Self, ValidationError> {
    if level > Self::MAX_LEVEL {
      Err(ValidationError::CompressionLevel(level))
    } else {
      Ok(Self { level })
    }
  }

  /// The compression level.
  #[inline]
  #[must_use]
  pub const fn level(&self) -> u8 {
    self.level
  }
}
#[cfg(feature = "miniz_oxide")]
impl Default for Zlib {
  #[inline]
  fn default() -> Self {
    Self { level: 6 }
  }
}
#[cfg(feature = "miniz_oxide")]
impl Compression for Zlib {
  #[inline]
  fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    Ok(miniz_oxide::deflate::compress_to_vec_zlib(data, self.level))
  }
  #[inline]
  fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
    match decompress_to_vec_zlib_with_limit(data, limit) {
      Ok(out) => Ok(out),
      // the output buffer is full, and that's all the caller wants
      Err(mut e) if e.status == TINFLStatus::HasMoreOutput => {
        e.output.truncate(limit);
        Ok(e.output)
      }
      Err(e) => Err(CompressionError::Malformed(alloc::format!("{:?}", e.status))),
    }
  }
}

#[cfg(all(test, feature = "miniz_oxide"))]
mod tests {
  use super::*;
  use alloc::vec;

  #[test]
  fn test_zlib_levels() {
    assert_eq!(Zlib::default().level(), 6);
    assert!(Zlib::new(0).is_ok());
    assert!(Zlib::new(10).is_ok());
    assert_eq!(Zlib::new(11), Err(ValidationError::CompressionLevel(11)));
  }

  #[test]
  fn test_zlib_round_trip() {
    let data: Vec<u8> = (0..5000_u32).map(|i| (i * 7 % 251) as u8).collect();
    for level in [0, 1, 6, 10] {
      let z = Zlib::new(level).unwrap();
      let packed = z.compress(&data).unwrap();
      // zlib streams start with a CMF byte for deflate
      assert_eq!(packed[0] & 0x0F, 8);
      assert_eq!(z.decompress(&packed, usize::MAX).unwrap(), data);
      assert_eq!(z.decompress(&packed, data.len()).unwrap(), data);
    }
  }

  #[test]
  fn test_zlib_rejects_garbage() {
    let z = Zlib::default();
    assert!(matches!(z.decompress(&[1, 2, 3, 4, 5], 100), Err(CompressionError::Malformed(_))));
    let mut packed = z.compress(b"hello hello hello").unwrap();
    packed.truncate(packed.len() - 3);
    assert!(z.decompress(&packed, 100).is_err());
  }

  #[test]
  fn test_zlib_stops_at_the_limit() {
    let z = Zlib::default();
    let packed = z.compress(&vec![0_u8; 1 << 20]).unwrap();
    assert!(packed.len() < 2000);
    let out = z.decompress(&packed, 10).unwrap();
    assert_eq!(out, vec![0_u8; 10]);
  }
}
