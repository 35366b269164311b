use pilates::{
  ColorType, Error, Image, ImageSettings, Pixel, Transform, ValidationError,
};

fn fixture(name: &str) -> Image {
  Image::from_file(format!("tests/fixtures/{name}")).unwrap()
}

#[test]
fn test_resize_single_pixel() {
  let img = Image::new_image(
    ImageSettings { width: 1, height: 1, color_type: ColorType::RGB, bit_depth: 8 },
    Some(Pixel::RGB([200, 10, 30])),
  )
  .unwrap();
  let big = img.apply_transform(Transform::Resize { width: 6, height: 4 }).unwrap();
  assert_eq!(big.shape(), (6, 4));
  assert_eq!(big.color_type(), ColorType::RGB);
  assert_eq!(big.bit_depth(), 8);
  assert!(big.get_pixels().iter().flatten().all(|p| *p == Pixel::RGB([200, 10, 30])));
}

#[test]
fn test_resize_keeps_corners() {
  for name in ["rgb8.png", "gray2.png", "rgba16.png"] {
    let img = fixture(name);
    let (w, h) = img.shape();
    let out = img.apply_transform(Transform::Resize { width: 13, height: 9 }).unwrap();
    assert_eq!(out.get_pixel(0, 0).unwrap(), img.get_pixel(0, 0).unwrap(), "{name}");
    assert_eq!(out.get_pixel(12, 8).unwrap(), img.get_pixel(w - 1, h - 1).unwrap(), "{name}");
    assert_eq!(out.get_pixel(12, 0).unwrap(), img.get_pixel(w - 1, 0).unwrap(), "{name}");
    // resizing back to the same size is a no-op
    let same = img.apply_transform(Transform::Resize { width: w, height: h }).unwrap();
    assert_eq!(same, img, "{name}");
  }
}

#[test]
fn test_resize_rejects_zero() {
  let img = fixture("rgb8.png");
  for (width, height) in [(0, 3), (3, 0), (0, 0)] {
    assert!(matches!(
      img.apply_transform(Transform::Resize { width, height }),
      Err(Error::Validation(ValidationError::ZeroDimension { .. }))
    ));
  }
}

#[test]
fn test_sort_rows() {
  let base = Image::new_image(
    ImageSettings { width: 1, height: 1, color_type: ColorType::RGB, bit_depth: 8 },
    None,
  )
  .unwrap();
  let img = base
    .replace_pixels(&[vec![
      Pixel::RGB([0, 0, 0]),
      Pixel::RGB([255, 255, 255]),
      Pixel::RGB([10, 10, 10]),
    ]])
    .unwrap();
  let sorted = img.apply_transform(Transform::Sort { reverse: false }).unwrap();
  assert_eq!(sorted.get_pixels(), vec![vec![
    Pixel::RGB([0, 0, 0]),
    Pixel::RGB([10, 10, 10]),
    Pixel::RGB([255, 255, 255]),
  ]]);
  // the source didn't change
  assert_eq!(img.get_pixel(1, 0).unwrap(), Pixel::RGB([255, 255, 255]));
}

#[test]
fn test_sort_fixture_rows_are_ordered() {
  let img = fixture("rgba16.png");
  let sorted = img.apply_transform(Transform::Sort { reverse: true }).unwrap();
  let key = |p: &Pixel| p.samples()[..3].iter().map(|s| u32::from(*s)).sum::<u32>();
  for (before, after) in img.get_pixels().iter().zip(sorted.get_pixels()) {
    assert!(after.windows(2).all(|w| key(&w[0]) >= key(&w[1])));
    let mut a = before.clone();
    let mut b = after.clone();
    a.sort();
    b.sort();
    assert_eq!(a, b);
  }
}

#[test]
fn test_invert_twice() {
  for name in ["gray1.png", "gray4.png", "ya8.png", "rgb16.png", "multi_idat.png"] {
    let img = fixture(name);
    let once = img.apply_transform(Transform::Invert).unwrap();
    assert_ne!(once, img, "{name}");
    assert_eq!(once.apply_transform(Transform::Invert).unwrap(), img, "{name}");
  }
}

#[test]
fn test_transforms_encode_cleanly() {
  let img = fixture("multi_idat.png");
  let out = img
    .apply_transform(Transform::Resize { width: 5, height: 20 })
    .and_then(|i| i.apply_transform(Transform::Sort { reverse: false }))
    .and_then(|i| i.apply_transform(Transform::Invert))
    .unwrap();
  let back = Image::from_png_bytes(&out.to_png_bytes().unwrap()).unwrap();
  assert_eq!(back, out);
}
