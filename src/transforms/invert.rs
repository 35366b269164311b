use crate::{image::map_pixels, max_sample, Image, ValidationError};

/// Every colour sample `v` becomes `max - v`, where `max` is the largest
/// value at the image's depth. Alpha is left alone.
pub fn invert(image: &Image) -> Result<Image, ValidationError> {
  let max = max_sample(image.bit_depth());
  let color = image.color_type().color_channel_count();
  let pixels = map_pixels!(image.pixel_buffer(), v => v
    .iter()
    .map(|p| {
      let mut p = *p;
      p[..color].iter_mut().for_each(|s| *s = max - *s);
      p
    })
    .collect());
  image.with_buffer(pixels)
}
