//! Moving samples between bit depths.

use bitfrob::u8_replicate_bits;

use crate::{image::map_pixels, max_sample, Image, Result};

/// Rescales one sample from `from` bits to `to` bits.
///
/// The result is `v * to_max / from_max` rounded down. When a sub-byte value
/// goes up to 8 bits that's the same as repeating the bit pattern, which is
/// how it's computed.
#[inline]
#[must_use]
pub fn rescale_sample(v: u16, from: u8, to: u8) -> u16 {
  if from == to {
    v
  } else if from < 8 && to == 8 {
    u16::from(u8_replicate_bits(u32::from(from), v as u8))
  } else {
    let scaled = u32::from(v) * u32::from(max_sample(to)) / u32::from(max_sample(from));
    scaled as u16
  }
}

impl Image {
  /// A copy of the image with every sample (alpha included) rescaled to
  /// `bit_depth` bits.
  ///
  /// ## Failure
  /// * The depth isn't allowed for the image's colour type.
  pub fn set_bit_depth(&self, bit_depth: u8) -> Result<Image> {
    self.color_type().check_bit_depth(bit_depth)?;
    let from = self.bit_depth();
    let pixels = map_pixels!(self.pixel_buffer(), v => v
      .iter()
      .map(|p| p.map(|s| rescale_sample(s, from, bit_depth)))
      .collect());
    Ok(Image::from_parts(self.width(), self.height(), bit_depth, pixels)?)
  }
}

#[test]
fn test_rescale_up_to_8() {
  assert_eq!(rescale_sample(1, 1, 8), 255);
  assert_eq!(rescale_sample(0, 1, 8), 0);
  assert_eq!(rescale_sample(1, 2, 8), 85);
  assert_eq!(rescale_sample(2, 2, 8), 170);
  assert_eq!(rescale_sample(0xA, 4, 8), 0xAA);
  for depth in [1_u8, 2, 4] {
    for v in 0..=max_sample(depth) {
      let by_ratio = u32::from(v) * 255 / u32::from(max_sample(depth));
      assert_eq!(u32::from(rescale_sample(v, depth, 8)), by_ratio);
    }
  }
}

#[test]
fn test_rescale_other_depths() {
  assert_eq!(rescale_sample(255, 8, 16), 65535);
  assert_eq!(rescale_sample(1, 8, 16), 257);
  assert_eq!(rescale_sample(65535, 16, 8), 255);
  assert_eq!(rescale_sample(65534, 16, 8), 254);
  assert_eq!(rescale_sample(200, 8, 1), 0);
  assert_eq!(rescale_sample(255, 8, 1), 1);
  assert_eq!(rescale_sample(12, 4, 4), 12);
}

#[test]
fn test_set_bit_depth() {
  use crate::{ColorType, Error, ImageSettings, Pixel, ValidationError};
  let img = Image::new_image(
    ImageSettings { width: 2, height: 2, color_type: ColorType::YA, bit_depth: 8 },
    Some(Pixel::YA([255, 128])),
  )
  .unwrap();
  let deep = img.set_bit_depth(16).unwrap();
  assert_eq!(deep.bit_depth(), 16);
  assert_eq!(deep.get_pixel(1, 1).unwrap(), Pixel::YA([65535, 128 * 257]));
  assert_eq!(deep.set_bit_depth(8).unwrap(), img);
  assert!(matches!(
    img.set_bit_depth(4),
    Err(Error::Validation(ValidationError::BitDepth { bit_depth: 4, color_type: ColorType::YA }))
  ));
}
