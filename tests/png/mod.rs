use pilates::{
  png::{self, RawChunkIter},
  ColorType, Error, FormatError, Image,
};
use walkdir::WalkDir;

#[test]
fn test_RawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in RawChunkIter::new(&v) {
      //
    }
    // the full decoder gets to say no, but not to panic
    let _ = png::decode(&v);
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    for _ in RawChunkIter::new(&v) {
      //
    }
    assert!(png::decode(&v).is_err());
    let mut signed = png::PNG_SIGNATURE.to_vec();
    signed.extend_from_slice(&v);
    assert!(png::decode(&signed).is_err());
  }
}

fn check_fixture(name: &str, color_type: ColorType, bit_depth: u8, shape: (u32, u32)) {
  let path = format!("tests/fixtures/{name}");
  let img = Image::from_file(&path).unwrap();
  assert_eq!(img.color_type(), color_type, "{name}");
  assert_eq!(img.bit_depth(), bit_depth, "{name}");
  assert_eq!(img.shape(), shape, "{name}");
  for (y, row) in img.get_pixels().iter().enumerate() {
    for (x, p) in row.iter().enumerate() {
      for (c, s) in p.samples().iter().enumerate() {
        let expected = super::fixture_sample(x as u32, y as u32, c as u32, bit_depth);
        assert_eq!(*s, expected, "{name} at ({x},{y}) channel {c}");
      }
    }
  }
}

#[test]
fn test_decode_fixtures() {
  check_fixture("rgb8.png", ColorType::RGB, 8, (7, 6));
  check_fixture("rgb16.png", ColorType::RGB, 16, (4, 6));
  check_fixture("rgba16.png", ColorType::RGBA, 16, (5, 5));
  check_fixture("ya8.png", ColorType::YA, 8, (6, 5));
  check_fixture("gray1.png", ColorType::Y, 1, (11, 5));
  check_fixture("gray2.png", ColorType::Y, 2, (9, 5));
  check_fixture("gray4.png", ColorType::Y, 4, (5, 5));
  check_fixture("gray16.png", ColorType::Y, 16, (6, 5));
}

#[test]
fn test_decode_split_and_decorated_fixtures() {
  check_fixture("multi_idat.png", ColorType::RGBA, 8, (16, 10));
  check_fixture("ancillary.png", ColorType::RGB, 8, (6, 5));
}

#[test]
fn test_truncated_fixture() {
  let err = Image::from_file("tests/fixtures/truncated.png").unwrap_err();
  assert!(err.is_format_error());
  assert!(matches!(err, Error::Chunk(FormatError::ChunkLength { .. })));
}

#[test]
fn test_fixtures_survive_reencoding() {
  for name in ["rgb8.png", "gray1.png", "gray4.png", "rgba16.png", "multi_idat.png"] {
    let img = Image::from_file(format!("tests/fixtures/{name}")).unwrap();
    let again = Image::from_png_bytes(&img.to_png_bytes().unwrap()).unwrap();
    assert_eq!(again, img, "{name}");
  }
}

#[test]
fn test_file_round_trip() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("out.png");
  let img = Image::from_file("tests/fixtures/ya8.png").unwrap();
  img.to_file(&path).unwrap();
  assert_eq!(Image::from_file(&path).unwrap(), img);

  let missing = dir.path().join("nope.png");
  assert!(matches!(Image::from_file(&missing), Err(Error::Io(_))));
  let not_a_dir = path.join("child.png");
  assert!(matches!(img.to_file(&not_a_dir), Err(Error::Io(_))));
}

#[test]
fn test_error_messages() {
  let err = png::decode(b"GIF89a").unwrap_err();
  assert_eq!(err.format_error(), Some(FormatError::BadSignature));
  assert_eq!(err.to_string(), "chunk stream: the data does not begin with the PNG signature");
}
