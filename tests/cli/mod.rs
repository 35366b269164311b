use std::process::{Command, Output};

fn pilates(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_pilates")).args(args).output().unwrap()
}

#[test]
fn test_cli_log_levels() {
  let dir = tempfile::tempdir().unwrap();
  let out = dir.path().join("out.png");
  let out = out.to_str().unwrap();

  let quiet = pilates(&["convert", "tests/fixtures/ancillary.png", out]);
  assert!(quiet.status.success());
  let stderr = String::from_utf8_lossy(&quiet.stderr);
  // warnings show without -v, debug lines don't
  assert!(stderr.contains("skipping ancillary chunk gAMA"), "{stderr}");
  assert!(!stderr.contains("decoding 6x5"), "{stderr}");

  let chatty = pilates(&["-v", "convert", "tests/fixtures/ancillary.png", out, "--invert"]);
  assert!(chatty.status.success());
  let stderr = String::from_utf8_lossy(&chatty.stderr);
  assert!(stderr.contains("decoding 6x5"), "{stderr}");
  assert!(stderr.contains("Invert"), "{stderr}");

  let inverted = pilates::Image::from_file(out).unwrap();
  let original = pilates::Image::from_file("tests/fixtures/ancillary.png").unwrap();
  assert_eq!(inverted.apply_transform(pilates::Transform::Invert).unwrap(), original);
}
