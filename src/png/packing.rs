//! Moving samples between `u16` values and packed scanline bytes.
//!
//! * Bit depths 1, 2, and 4 pack several samples per byte, leftmost sample in
//!   the high bits. The last byte of a line is padded with zero bits.
//! * Bit depth 8 is one byte per sample.
//! * Bit depth 16 is two big-endian bytes per sample.

use alloc::vec::Vec;

use super::IHDR;
use crate::{FormatError, Image, PixelBuffer};

/// Appends one line worth of `samples` to `out` at the given depth.
pub(crate) fn pack_samples(samples: &[u16], bit_depth: u8, out: &mut Vec<u8>) {
  match bit_depth {
    16 => samples.iter().for_each(|s| out.extend_from_slice(&s.to_be_bytes())),
    1 | 2 | 4 => {
      let depth = u32::from(bit_depth);
      let mask = (1_u16 << depth) - 1;
      let per_byte = (8 / depth) as usize;
      out.extend(samples.chunks(per_byte).map(|group| {
        let mut byte = 0_u8;
        let mut up_shift = 8 - depth;
        for s in group {
          byte |= ((s & mask) as u8) << up_shift;
          up_shift = up_shift.wrapping_sub(depth);
        }
        byte
      }));
    }
    // 8, the only other depth an `Image` can have
    _ => out.extend(samples.iter().map(|s| *s as u8)),
  }
}

/// Reads `count` samples at the given depth from the front of `line`.
pub(crate) fn unpack_samples(
  line: &[u8], bit_depth: u8, count: usize, out: &mut Vec<u16>,
) -> Result<(), FormatError> {
  let needed = (count * usize::from(bit_depth) + 7) / 8;
  if line.len() < needed {
    return Err(FormatError::ScanlineLength { expected: needed, actual: line.len() });
  }
  match bit_depth {
    16 => out.extend(line[..needed].chunks_exact(2).map(|b| u16::from_be_bytes([b[0], b[1]]))),
    8 => out.extend(line[..needed].iter().map(|b| u16::from(*b))),
    1 | 2 | 4 => {
      let depth = u32::from(bit_depth);
      let mask = (1_u8 << depth) - 1;
      let per_byte = (8 / depth) as usize;
      out.extend(
        line[..needed]
          .iter()
          .flat_map(|byte| {
            (0..per_byte as u32).map(move |i| u16::from((byte >> (8 - depth * (i + 1))) & mask))
          })
          // the padding bits at the end of the line aren't samples
          .take(count),
      );
    }
    other => {
      return Err(FormatError::UnsupportedPixelFormat { bit_depth: other, color_type: 0 })
    }
  }
  Ok(())
}

/// Packs every row of an image into plain (unfiltered) scanlines.
pub(crate) fn pack_scanlines(header: &IHDR, image: &Image) -> Vec<u8> {
  let per_line = header.samples_per_scanline();
  let mut out = Vec::with_capacity(header.bytes_per_scanline() * header.height as usize);
  for line in image.pixel_buffer().samples().chunks_exact(per_line) {
    pack_samples(line, header.bit_depth, &mut out);
  }
  out
}

/// Unpacks plain scanlines (as from
/// [`unfilter_scanlines`](super::unfilter_scanlines)) into pixels.
pub(crate) fn unpack_scanlines(header: &IHDR, scanlines: &[u8]) -> Result<PixelBuffer, FormatError> {
  let line_len = header.bytes_per_scanline();
  let per_line = header.samples_per_scanline();
  let expected = line_len * header.height as usize;
  if scanlines.len() != expected {
    return Err(FormatError::ScanlineLength { expected, actual: scanlines.len() });
  }
  let mut samples: Vec<u16> = Vec::with_capacity(per_line * header.height as usize);
  for line in scanlines.chunks_exact(line_len) {
    unpack_samples(line, header.bit_depth, per_line, &mut samples)?;
  }
  PixelBuffer::from_samples(header.color_type, &samples)
    .ok_or(FormatError::ScanlineLength { expected: per_line, actual: samples.len() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloc::vec;

  #[test]
  fn test_sub_byte_packing() {
    let mut out = Vec::new();
    pack_samples(&[1, 0, 1, 1, 0, 0, 0, 1, 1, 1], 1, &mut out);
    assert_eq!(out, [0b1011_0001, 0b1100_0000]);
    out.clear();
    pack_samples(&[3, 0, 2, 1, 2], 2, &mut out);
    assert_eq!(out, [0b11_00_10_01, 0b10_00_00_00]);
    out.clear();
    pack_samples(&[0xA, 0x5, 0xF], 4, &mut out);
    assert_eq!(out, [0xA5, 0xF0]);
  }

  #[test]
  fn test_sub_byte_unpacking() {
    let mut out = Vec::new();
    unpack_samples(&[0b1011_0001, 0b1100_0000], 1, 10, &mut out).unwrap();
    assert_eq!(out, [1, 0, 1, 1, 0, 0, 0, 1, 1, 1]);
    out.clear();
    unpack_samples(&[0b11_00_10_01, 0b10_11_11_11], 2, 5, &mut out).unwrap();
    // padding bits are dropped even when they aren't zero
    assert_eq!(out, [3, 0, 2, 1, 2]);
    out.clear();
    unpack_samples(&[0xA5, 0xF0], 4, 3, &mut out).unwrap();
    assert_eq!(out, [0xA, 0x5, 0xF]);
  }

  #[test]
  fn test_wide_samples() {
    let mut out = Vec::new();
    pack_samples(&[0x1234, 0xFFFF, 0], 16, &mut out);
    assert_eq!(out, [0x12, 0x34, 0xFF, 0xFF, 0, 0]);
    let mut back = Vec::new();
    unpack_samples(&out, 16, 3, &mut back).unwrap();
    assert_eq!(back, [0x1234, 0xFFFF, 0]);
    back.clear();
    unpack_samples(&[9, 8, 7], 8, 3, &mut back).unwrap();
    assert_eq!(back, [9, 8, 7]);
  }

  #[test]
  fn test_short_lines() {
    let mut out = vec![];
    assert_eq!(
      unpack_samples(&[0xFF], 4, 3, &mut out),
      Err(FormatError::ScanlineLength { expected: 2, actual: 1 })
    );
    assert_eq!(
      unpack_samples(&[0xFF; 5], 16, 3, &mut out),
      Err(FormatError::ScanlineLength { expected: 6, actual: 5 })
    );
  }
}
