use core::cmp::Reverse;

use alloc::vec::Vec;

use crate::{image::map_pixels, Image, ValidationError};

/// Stable sort of each row by the sum of the colour channels.
///
/// Ascending unless `reverse` is set. Equal keys keep their order either way.
pub fn sort(image: &Image, reverse: bool) -> Result<Image, ValidationError> {
  let width = image.width() as usize;
  let color = image.color_type().color_channel_count();
  let pixels = map_pixels!(image.pixel_buffer(), v => sort_rows(v, width, color, reverse));
  image.with_buffer(pixels)
}

fn sort_rows<const N: usize>(
  data: &[[u16; N]], width: usize, color: usize, reverse: bool,
) -> Vec<[u16; N]> {
  let key = |p: &[u16; N]| p[..color].iter().map(|s| u32::from(*s)).sum::<u32>();
  let mut out = data.to_vec();
  for row in out.chunks_exact_mut(width) {
    if reverse {
      row.sort_by_key(|p| Reverse(key(p)));
    } else {
      row.sort_by_key(|p| key(p));
    }
  }
  out
}
