use alloc::vec::Vec;

use crate::{
  image::{map_pixels, pixel_count},
  max_sample, Image, ValidationError,
};

/// Bilinear resize to `width` x `height`.
///
/// Destination pixel `(dx, dy)` reads from source position
/// `(dx * (src_w-1)/(dst_w-1), dy * (src_h-1)/(dst_h-1))`, where a target
/// size of 1 always reads from 0. The four surrounding source pixels are
/// blended by the fractional parts, then rounded and clamped to the depth.
pub fn resize(image: &Image, width: u32, height: u32) -> Result<Image, ValidationError> {
  if width == 0 || height == 0 {
    return Err(ValidationError::ZeroDimension { width, height });
  }
  pixel_count(width, height)?;
  let src = Grid { width: image.width() as usize, height: image.height() as usize };
  let dst = Grid { width: width as usize, height: height as usize };
  let max = f64::from(max_sample(image.bit_depth()));
  let pixels = map_pixels!(image.pixel_buffer(), v => bilinear(v, src, dst, max));
  Image::from_parts(width, height, image.bit_depth(), pixels)
}

#[derive(Clone, Copy)]
struct Grid {
  width: usize,
  height: usize,
}

/// Source step per destination step along one axis.
#[inline]
fn ratio(src: usize, dst: usize) -> f64 {
  if dst > 1 {
    (src - 1) as f64 / (dst - 1) as f64
  } else {
    0.0
  }
}

/// Splits a non-negative coordinate into its two neighbors (clamped to the
/// last index) and the weight of the second one.
#[inline]
fn neighbors(pos: f64, len: usize) -> (usize, usize, f64) {
  // `as` truncates, which is floor for non-negative values
  let lo = (pos as usize).min(len - 1);
  let hi = (lo + 1).min(len - 1);
  (lo, hi, pos - lo as f64)
}

fn bilinear<const N: usize>(data: &[[u16; N]], src: Grid, dst: Grid, max: f64) -> Vec<[u16; N]> {
  let x_ratio = ratio(src.width, dst.width);
  let y_ratio = ratio(src.height, dst.height);
  let mut out = Vec::with_capacity(dst.width * dst.height);
  for dst_y in 0..dst.height {
    let (y0, y1, y_frac) = neighbors(dst_y as f64 * y_ratio, src.height);
    for dst_x in 0..dst.width {
      let (x0, x1, x_frac) = neighbors(dst_x as f64 * x_ratio, src.width);
      let p00 = data[y0 * src.width + x0];
      let p01 = data[y0 * src.width + x1];
      let p10 = data[y1 * src.width + x0];
      let p11 = data[y1 * src.width + x1];
      let mut pixel = [0_u16; N];
      for (c, sample) in pixel.iter_mut().enumerate() {
        let top = f64::from(p00[c]) * (1.0 - x_frac) + f64::from(p01[c]) * x_frac;
        let bottom = f64::from(p10[c]) * (1.0 - x_frac) + f64::from(p11[c]) * x_frac;
        let value = top * (1.0 - y_frac) + bottom * y_frac;
        // round half up, then clamp
        *sample = (value + 0.5).clamp(0.0, max) as u16;
      }
      out.push(pixel);
    }
  }
  out
}
