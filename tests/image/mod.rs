use pilates::{ColorType, Error, Image, ImageSettings, Pixel, StateError, ValidationError};

fn fixture(name: &str) -> Image {
  Image::from_file(format!("tests/fixtures/{name}")).unwrap()
}

#[test]
fn test_new_image_every_layout() {
  for (color_type, bit_depth, bg) in [
    (ColorType::Y, 1, Pixel::Y([1])),
    (ColorType::Y, 16, Pixel::Y([40000])),
    (ColorType::YA, 8, Pixel::YA([1, 2])),
    (ColorType::RGB, 16, Pixel::RGB([1, 2, 3])),
    (ColorType::RGBA, 8, Pixel::RGBA([1, 2, 3, 4])),
  ] {
    let settings = ImageSettings { width: 4, height: 3, color_type, bit_depth };
    let img = Image::new_image(settings, Some(bg)).unwrap();
    let rows = img.get_pixels();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.len() == 4 && r.iter().all(|p| *p == bg)));
    let back = Image::from_png_bytes(&img.to_png_bytes().unwrap()).unwrap();
    assert_eq!(back, img);
  }
}

#[test]
fn test_conversion_chain_on_a_fixture() {
  let rgb = fixture("rgb8.png");
  let gray = rgb.to_grayscale().unwrap();
  let p = rgb.get_pixel(3, 2).unwrap();
  let s = p.samples();
  let expected = (u32::from(s[0]) + u32::from(s[1]) + u32::from(s[2])) / 3;
  assert_eq!(gray.get_pixel(3, 2).unwrap(), Pixel::Y([expected as u16]));

  let round = gray.to_truecolour().unwrap().to_grayscale().unwrap().to_truecolour().unwrap();
  for row in round.get_pixels() {
    for p in row {
      let s = p.samples();
      assert_eq!(s[0], s[1]);
      assert_eq!(s[1], s[2]);
    }
  }

  let with_alpha = rgb.add_alpha().unwrap();
  assert_eq!(with_alpha.color_type(), ColorType::RGBA);
  assert_eq!(with_alpha.remove_alpha().unwrap(), rgb);
}

#[test]
fn test_conversions_of_sub_byte_gray() {
  let gray = fixture("gray2.png");
  let rgb = gray.to_truecolour().unwrap();
  assert_eq!(rgb.bit_depth(), 8);
  let [y] = match gray.get_pixel(4, 4).unwrap() {
    Pixel::Y(y) => y,
    other => panic!("{other:?}"),
  };
  let wide = y * 85;
  assert_eq!(rgb.get_pixel(4, 4).unwrap(), Pixel::RGB([wide; 3]));
  let bytes = rgb.to_png_bytes().unwrap();
  assert_eq!(Image::from_png_bytes(&bytes).unwrap(), rgb);
}

#[test]
fn test_state_errors() {
  let gray = fixture("gray16.png");
  assert!(matches!(
    gray.to_grayscale(),
    Err(Error::State(StateError::IncompatibleColorType { operation: "to_grayscale", .. }))
  ));
  assert!(matches!(gray.remove_alpha(), Err(Error::State(_))));
  let rgba = fixture("rgba16.png");
  assert!(matches!(rgba.add_alpha(), Err(Error::State(_))));
  assert!(matches!(rgba.to_truecolour(), Err(Error::State(_))));
}

#[test]
fn test_pixel_access() {
  let img = fixture("ya8.png");
  assert_eq!(
    img.get_pixel(5, 4).unwrap(),
    Pixel::YA([super::fixture_sample(5, 4, 0, 8), super::fixture_sample(5, 4, 1, 8)])
  );
  assert!(matches!(img.get_pixel(6, 0), Err(Error::OutOfBounds { width: 6, height: 5, .. })));

  let changed = img.set_pixel(0, 0, Pixel::YA([1, 2])).unwrap();
  assert_eq!(changed.get_pixel(0, 0).unwrap(), Pixel::YA([1, 2]));
  assert_ne!(changed, img);
  assert!(matches!(
    img.set_pixel(0, 0, Pixel::RGB([1, 2, 3])),
    Err(Error::Validation(ValidationError::WrongPixelLayout { .. }))
  ));

  let rows = vec![vec![Pixel::YA([9, 9]); 2]; 3];
  let small = img.replace_pixels(&rows).unwrap();
  assert_eq!(small.shape(), (2, 3));
  assert_eq!(small.get_pixels(), rows);
}

#[test]
fn test_bit_depth_changes() {
  let img = fixture("rgb16.png");
  let narrow = img.set_bit_depth(8).unwrap();
  let wide = narrow.set_bit_depth(16).unwrap();
  let p = img.get_pixel(1, 1).unwrap().samples()[0];
  let q = wide.get_pixel(1, 1).unwrap().samples()[0];
  // 16 -> 8 -> 16 keeps the high byte
  assert_eq!(q, (p / 257) * 257);
  assert!(matches!(img.set_bit_depth(2), Err(Error::Validation(ValidationError::BitDepth { .. }))));

  let gray = fixture("gray4.png");
  let eight = gray.set_bit_depth(8).unwrap();
  assert_eq!(eight.get_pixel(0, 0).unwrap(), Pixel::Y([gray.get_pixel(0, 0).unwrap().samples()[0] * 17]));
  assert_eq!(eight.set_bit_depth(4).unwrap(), gray);
}
