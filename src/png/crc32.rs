//! The CRC-32 used by PNG chunks (the same one zlib uses).

/// Reflected form of the CRC-32 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// The remainder for each possible low byte of the running CRC.
const TABLE: [u32; 256] = {
  let mut table = [0_u32; 256];
  let mut i = 0;
  while i < table.len() {
    table[i] = byte_remainder(i as u8);
    i += 1;
  }
  table
};

const fn byte_remainder(byte: u8) -> u32 {
  let mut rem = byte as u32;
  let mut bit = 0;
  while bit < 8 {
    let low_set = rem & 1 != 0;
    rem >>= 1;
    if low_set {
      rem ^= POLYNOMIAL;
    }
    bit += 1;
  }
  rem
}

/// CRC-32 of an arbitrary byte sequence.
#[inline]
#[must_use]
pub fn png_crc(bytes: impl Iterator<Item = u8>) -> u32 {
  !bytes.fold(u32::MAX, |crc, byte| TABLE[usize::from(crc as u8 ^ byte)] ^ (crc >> 8))
}

/// CRC-32 of a chunk: the 4 type bytes followed by the payload.
#[inline]
#[must_use]
pub fn chunk_crc(chunk_type: [u8; 4], data: &[u8]) -> u32 {
  png_crc(chunk_type.iter().chain(data.iter()).copied())
}

#[test]
fn test_known_crcs() {
  // every PNG ends with this exact IEND chunk
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
  // the standard CRC-32 check value
  assert_eq!(png_crc(b"123456789".iter().copied()), 0xCBF4_3926);
  assert_eq!(png_crc(core::iter::empty()), 0);
}

#[test]
fn test_table_entries() {
  assert_eq!(TABLE[0], 0);
  assert_eq!(TABLE[1], 0x7707_3096);
  assert_eq!(TABLE[128], 0xEDB8_8320);
  assert_eq!(TABLE[255], 0x2D02_EF8D);
}
