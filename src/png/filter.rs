//! The five PNG scanline filters, in both directions.
//!
//! Pixels are referred to by their position relative to the byte `x` being
//! worked on:
//! ```text
//! c b
//! a x
//! ```
//! `a` is `stride` bytes back on the same line, `b` is the same byte on the
//! previous line, and `c` is `stride` bytes back on the previous line. Anything
//! off the left edge (or above the first line) counts as 0. All math wraps at
//! 256.

use alloc::vec::Vec;

use super::IHDR;
use crate::FormatError;

/// A scanline filter type, as stored in the first byte of each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// `x`
  #[default]
  None = 0,
  /// `x - a`
  Sub = 1,
  /// `x - b`
  Up = 2,
  /// `x - floor((a + b) / 2)`
  Average = 3,
  /// `x - paeth_predict(a, b, c)`
  Paeth = 4,
}
impl FilterType {
  /// All the filters, in the order the adaptive strategy tries them.
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = u8;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(other),
    })
  }
}

/// How the encoder picks a filter for each scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
  /// Use the same filter on every line.
  Fixed(FilterType),
  /// Try every filter on each line and keep the one whose output bytes, read
  /// as signed values, have the smallest sum of absolute values.
  MinSumAbs,
}
impl Default for FilterStrategy {
  /// No filtering at all.
  #[inline]
  fn default() -> Self {
    Self::Fixed(FilterType::None)
  }
}

/// Picks whichever of `a`, `b`, `c` is closest to `a + b - c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests decides ties, and must not be changed.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses a filter on one line, in place.
///
/// `prev` is the previous line *after* it was unfiltered. It's normally the
/// same length as `line`; any missing bytes are treated as 0, as they are for
/// the first line of an image.
pub fn unfilter_line(filter: FilterType, line: &mut [u8], prev: &[u8], stride: usize) {
  let b_at = |i: usize| prev.get(i).copied().unwrap_or(0);
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      for i in stride..line.len() {
        line[i] = line[i].wrapping_add(line[i - stride]);
      }
    }
    FilterType::Up => {
      line.iter_mut().enumerate().for_each(|(i, x)| *x = x.wrapping_add(b_at(i)));
    }
    FilterType::Average => {
      for i in 0..line.len() {
        let a = if i >= stride { line[i - stride] } else { 0 };
        let avg = ((u32::from(a) + u32::from(b_at(i))) / 2) as u8;
        line[i] = line[i].wrapping_add(avg);
      }
    }
    FilterType::Paeth => {
      for i in 0..line.len() {
        let (a, c) = if i >= stride { (line[i - stride], b_at(i - stride)) } else { (0, 0) };
        line[i] = line[i].wrapping_add(paeth_predict(a, b_at(i), c));
      }
    }
  }
}

/// Applies a filter to one line, appending the filtered bytes to `out`.
///
/// This doesn't write the filter type byte. `prev` is the previous line's
/// unfiltered bytes, with the same "missing means 0" rule as
/// [`unfilter_line`].
pub fn filter_line(filter: FilterType, line: &[u8], prev: &[u8], stride: usize, out: &mut Vec<u8>) {
  let b_at = |i: usize| prev.get(i).copied().unwrap_or(0);
  let a_at = |i: usize| if i >= stride { line[i - stride] } else { 0 };
  out.reserve(line.len());
  match filter {
    FilterType::None => out.extend_from_slice(line),
    FilterType::Sub => {
      out.extend(line.iter().enumerate().map(|(i, x)| x.wrapping_sub(a_at(i))));
    }
    FilterType::Up => {
      out.extend(line.iter().enumerate().map(|(i, x)| x.wrapping_sub(b_at(i))));
    }
    FilterType::Average => out.extend(line.iter().enumerate().map(|(i, x)| {
      let avg = ((u32::from(a_at(i)) + u32::from(b_at(i))) / 2) as u8;
      x.wrapping_sub(avg)
    })),
    FilterType::Paeth => out.extend(line.iter().enumerate().map(|(i, x)| {
      let c = if i >= stride { b_at(i - stride) } else { 0 };
      x.wrapping_sub(paeth_predict(a_at(i), b_at(i), c))
    })),
  }
}

/// Lower is (probably) more compressible.
#[inline]
fn score_filtered(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}

/// Turns decompressed image data into plain scanlines.
///
/// The output is `height` lines of
/// [`bytes_per_scanline`](IHDR::bytes_per_scanline) bytes each, with the
/// filter bytes removed. Extra data past the last scanline is ignored.
///
/// ## Failure
/// * The data is too short for the header's dimensions.
/// * A line has a filter type outside of `0..=4`.
pub fn unfilter_scanlines(header: &IHDR, decompressed: &[u8]) -> Result<Vec<u8>, FormatError> {
  let line_len = header.bytes_per_scanline();
  let stride = header.filter_stride();
  let expected = header
    .decompressed_len()
    .ok_or(FormatError::NotEnoughImageData { expected: usize::MAX, actual: decompressed.len() })?;
  if decompressed.len() < expected {
    return Err(FormatError::NotEnoughImageData { expected, actual: decompressed.len() });
  }
  let mut out: Vec<u8> = Vec::with_capacity(line_len * header.height as usize);
  for (y, filterline) in decompressed[..expected].chunks_exact(line_len + 1).enumerate() {
    let filter = FilterType::try_from(filterline[0])
      .map_err(|filter| FormatError::FilterType { line: y as u32, filter })?;
    let start = out.len();
    out.extend_from_slice(&filterline[1..]);
    let (done, line) = out.split_at_mut(start);
    let prev: &[u8] = if start >= line_len { &done[start - line_len..] } else { &[] };
    unfilter_line(filter, line, prev, stride);
  }
  Ok(out)
}

/// Filters plain scanlines for compression, giving each line its filter byte.
///
/// `scanlines` is `height` lines of
/// [`bytes_per_scanline`](IHDR::bytes_per_scanline) bytes each.
pub fn filter_scanlines(header: &IHDR, scanlines: &[u8], strategy: FilterStrategy) -> Vec<u8> {
  let line_len = header.bytes_per_scanline();
  let stride = header.filter_stride();
  let mut out = Vec::with_capacity(scanlines.len() + header.height as usize);
  let mut scratch = Vec::with_capacity(line_len);
  let mut best = Vec::with_capacity(line_len);
  let mut prev: &[u8] = &[];
  for line in scanlines.chunks_exact(line_len) {
    match strategy {
      FilterStrategy::Fixed(filter) => {
        out.push(filter as u8);
        filter_line(filter, line, prev, stride, &mut out);
      }
      FilterStrategy::MinSumAbs => {
        let mut best_filter = FilterType::None;
        let mut best_score = u64::MAX;
        for filter in FilterType::ALL {
          scratch.clear();
          filter_line(filter, line, prev, stride, &mut scratch);
          let score = score_filtered(&scratch);
          if score < best_score {
            best_score = score;
            best_filter = filter;
            core::mem::swap(&mut best, &mut scratch);
          }
        }
        out.push(best_filter as u8);
        out.extend_from_slice(&best);
      }
    }
    prev = line;
  }
  out
}

#[test]
fn test_paeth_tie_order() {
  // p = a + b - c; all equal distance means `a` wins
  assert_eq!(paeth_predict(5, 5, 5), 5);
  // a=1,b=3,c=2 -> p=2: pa=1, pb=1, pc=0 -> c
  assert_eq!(paeth_predict(1, 3, 2), 2);
  // a=3,b=1,c=1 -> p=3: pa=0 -> a
  assert_eq!(paeth_predict(3, 1, 1), 3);
  // a=1,b=3,c=1 -> p=3: pa=2, pb=0 -> b
  assert_eq!(paeth_predict(1, 3, 1), 3);
  // a=10,b=20,c=15 -> p=15: pa=5, pb=5, pc=0 -> c
  assert_eq!(paeth_predict(10, 20, 15), 15);
  // a=10,b=20,c=30 -> p=0: pa=10, pb=20, pc=30 -> a
  assert_eq!(paeth_predict(10, 20, 30), 10);
  // a=4,b=8,c=0 -> p=12: pa=8, pb=4, pc=12 -> b
  assert_eq!(paeth_predict(4, 8, 0), 8);
}

#[test]
fn test_filter_type_bytes() {
  for b in 0..=u8::MAX {
    match FilterType::try_from(b) {
      Ok(f) => assert_eq!(f as u8, b),
      Err(back) => assert!(back == b && b > 4),
    }
  }
}

#[test]
fn test_known_unfilter_values() {
  // Sub with a 3 byte stride
  let mut line = [10, 20, 30, 1, 2, 3, 250, 250, 250];
  unfilter_line(FilterType::Sub, &mut line, &[], 3);
  assert_eq!(line, [10, 20, 30, 11, 22, 33, 5, 16, 27]);
  // Up
  let mut line = [1, 2, 255];
  unfilter_line(FilterType::Up, &mut line, &[5, 5, 2], 1);
  assert_eq!(line, [6, 7, 1]);
  // Average, first byte only sees b
  let mut line = [1, 1];
  unfilter_line(FilterType::Average, &mut line, &[9, 3], 1);
  // x0 = 1 + 9/2 = 5, x1 = 1 + (5+3)/2 = 5
  assert_eq!(line, [5, 5]);
  // Paeth on the first line degenerates to Sub
  let mut paeth = [7, 1, 1, 1];
  let mut sub = paeth;
  unfilter_line(FilterType::Paeth, &mut paeth, &[], 1);
  unfilter_line(FilterType::Sub, &mut sub, &[], 1);
  assert_eq!(paeth, sub);
}

#[test]
fn test_filter_unfilter_inverse() {
  // deterministic junk, good enough to hit wrapping in every filter
  let mut seed = 0x1234_5678_u32;
  let mut next = move || {
    seed ^= seed << 13;
    seed ^= seed >> 17;
    seed ^= seed << 5;
    seed as u8
  };
  for stride in [1, 2, 3, 4, 6, 8] {
    for len in [0, 1, stride, 17, 64] {
      let line: Vec<u8> = (0..len).map(|_| next()).collect();
      let prev: Vec<u8> = (0..len).map(|_| next()).collect();
      for filter in FilterType::ALL {
        for p in [&prev[..], &[][..]] {
          let mut filtered = Vec::new();
          filter_line(filter, &line, p, stride, &mut filtered);
          assert_eq!(filtered.len(), line.len());
          unfilter_line(filter, &mut filtered, p, stride);
          assert_eq!(filtered, line, "{filter:?} stride {stride} len {len}");
        }
      }
    }
  }
}

#[test]
fn test_scanlines_round_trip_and_errors() {
  use crate::ColorType;
  let header = IHDR::new(3, 4, 8, ColorType::RGB).unwrap();
  let raw: Vec<u8> = (0..36_u8).map(|i| i.wrapping_mul(37)).collect();
  for strategy in [
    FilterStrategy::default(),
    FilterStrategy::Fixed(FilterType::Sub),
    FilterStrategy::Fixed(FilterType::Up),
    FilterStrategy::Fixed(FilterType::Average),
    FilterStrategy::Fixed(FilterType::Paeth),
    FilterStrategy::MinSumAbs,
  ] {
    let filtered = filter_scanlines(&header, &raw, strategy);
    assert_eq!(filtered.len(), 40);
    assert_eq!(unfilter_scanlines(&header, &filtered).unwrap(), raw);
  }
  let mut filtered = filter_scanlines(&header, &raw, FilterStrategy::default());
  assert!(filtered.iter().step_by(10).all(|f| *f == 0));
  assert_eq!(
    unfilter_scanlines(&header, &filtered[..39]),
    Err(FormatError::NotEnoughImageData { expected: 40, actual: 39 })
  );
  filtered[20] = 5;
  assert_eq!(
    unfilter_scanlines(&header, &filtered),
    Err(FormatError::FilterType { line: 2, filter: 5 })
  );
}
