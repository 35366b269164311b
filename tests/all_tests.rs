#![allow(bad_style)]

#[cfg(feature = "cli")]
mod cli;
mod image;
mod png;
mod transforms;

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// The sample that the fixture generator put at each position.
fn fixture_sample(x: u32, y: u32, c: u32, bit_depth: u8) -> u16 {
  let modulus = u32::from(pilates::max_sample(bit_depth)) + 1;
  ((x * 37 + y * 91 + c * 53 + x * y * 11) % modulus) as u16
}
