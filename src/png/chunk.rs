use core::fmt::{Debug, Write};

use alloc::vec::Vec;
use log::trace;

use super::{crc32::chunk_crc, IHDR, PNG_SIGNATURE};
use crate::FormatError;

/// Chunk payloads (and so chunk lengths) are limited to 31 bits.
pub const MAX_CHUNK_LEN: usize = (1 << 31) - 1;

/// A four byte chunk tag, such as `IHDR`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  /// Image Header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Palette
  pub const PLTE: Self = Self(*b"PLTE");
  /// Image Data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image End
  pub const IEND: Self = Self(*b"IEND");

  /// Critical chunks have an uppercase first letter (bit 5 clear).
  ///
  /// A decoder must understand every critical chunk it sees, while ancillary
  /// chunks can be skipped.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0b0010_0000) == 0
  }

  /// The chunk types this crate knows how to handle as critical data.
  #[inline]
  #[must_use]
  pub const fn is_known_critical(self) -> bool {
    matches!(&self.0, b"IHDR" | b"PLTE" | b"IDAT" | b"IEND")
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// An unparsed chunk borrowed from PNG bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub(crate) chunk_type: ChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> RawChunk<'b> {
  /// The chunk's type tag.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }
  /// The chunk's payload.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  /// The CRC written in the stream.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// The CRC that the type and payload actually produce.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    chunk_crc(self.chunk_type.0, self.data)
  }
  /// Errors if the declared and actual CRC differ.
  #[inline]
  pub fn check_crc(&self) -> Result<(), FormatError> {
    let actual = self.actual_crc();
    if actual == self.declared_crc {
      Ok(())
    } else {
      Err(FormatError::CrcMismatch {
        chunk_type: self.chunk_type,
        declared: self.declared_crc,
        actual,
      })
    }
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// This only does framing: CRCs and chunk ordering are checked by
/// [`parse_chunks`]. After any error the iterator is finished.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawChunkIter<'b>(&'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  ///
  /// This doesn't check the signature, see [`is_png_signature_correct`].
  #[inline]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }

  /// The bytes that haven't been iterated yet.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> &'b [u8] {
    self.0
  }

  fn next_chunk(&mut self) -> Result<RawChunk<'b>, FormatError> {
    let (len_bytes, rest) = split_array::<4>(self.0).ok_or(FormatError::UnexpectedEnd)?;
    let chunk_len = u32::from_be_bytes(len_bytes);
    let (type_bytes, rest) = split_array::<4>(rest).ok_or(FormatError::UnexpectedEnd)?;
    let chunk_type = ChunkType(type_bytes);
    if chunk_len as usize > MAX_CHUNK_LEN {
      return Err(FormatError::ChunkTooLong(u64::from(chunk_len)));
    }
    if rest.len() < chunk_len as usize {
      return Err(FormatError::ChunkLength {
        chunk_type,
        declared: chunk_len,
        available: rest.len(),
      });
    }
    let (data, rest) = rest.split_at(chunk_len as usize);
    let (crc_bytes, rest) = split_array::<4>(rest).ok_or(FormatError::UnexpectedEnd)?;
    self.0 = rest;
    Ok(RawChunk { chunk_type, data, declared_crc: u32::from_be_bytes(crc_bytes) })
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = Result<RawChunk<'b>, FormatError>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.0.is_empty() {
      return None;
    }
    let out = self.next_chunk();
    if out.is_err() {
      self.0 = &[];
    }
    Some(out)
  }
}

#[inline]
fn split_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    Some((head.try_into().ok()?, tail))
  } else {
    None
  }
}

/// Checks if the PNG's initial 8 bytes are correct.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Splits PNG bytes into their chunks, checking everything about the framing.
///
/// ## Failure
/// * The signature is wrong.
/// * A chunk's length runs past the end of the data, or the data ends partway
///   through a chunk.
/// * Any chunk's CRC doesn't match.
/// * `IHDR` isn't first, or `IEND` isn't last, or either appears twice.
/// * There's no `IDAT`, or `IEND` has a payload.
/// * A critical chunk other than `IHDR`, `PLTE`, `IDAT`, `IEND` appears.
///
/// Ancillary chunks are kept in the output (in stream order) so that callers
/// can look at them, but their payloads are never interpreted here.
pub fn parse_chunks(bytes: &[u8]) -> Result<Vec<RawChunk<'_>>, FormatError> {
  if !is_png_signature_correct(bytes) {
    return Err(FormatError::BadSignature);
  }
  let mut it = RawChunkIter::new(bytes);
  let mut chunks: Vec<RawChunk<'_>> = Vec::new();
  let mut saw_idat = false;
  loop {
    let chunk = match it.next() {
      Some(chunk) => chunk?,
      None => return Err(FormatError::MissingEnd),
    };
    trace!("chunk {:?}: {} bytes", chunk.chunk_type, chunk.data.len());
    chunk.check_crc()?;
    match chunk.chunk_type {
      ChunkType::IHDR if !chunks.is_empty() => {
        return Err(FormatError::DuplicateChunk(ChunkType::IHDR))
      }
      other if chunks.is_empty() && other != ChunkType::IHDR => {
        return Err(FormatError::FirstChunkNotHeader(other))
      }
      ChunkType::IDAT => saw_idat = true,
      ChunkType::IEND => {
        if !chunk.data.is_empty() {
          return Err(FormatError::NonEmptyEnd(chunk.data.len()));
        }
        if !saw_idat {
          return Err(FormatError::MissingImageData);
        }
        let trailing = it.remaining().len();
        if trailing > 0 {
          return Err(FormatError::DataAfterEnd(trailing));
        }
        chunks.push(chunk);
        return Ok(chunks);
      }
      other if other.is_critical() && !other.is_known_critical() => {
        return Err(FormatError::UnknownCriticalChunk(other))
      }
      _ => (),
    }
    chunks.push(chunk);
  }
}

/// An owned chunk, ready to be written out.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chunk {
  chunk_type: ChunkType,
  data: Vec<u8>,
  crc: u32,
}
impl Debug for Chunk {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Chunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("crc", &self.crc)
      .finish()
  }
}
impl Chunk {
  /// Makes a chunk, computing its CRC.
  ///
  /// Fails if the payload is longer than 2^31-1 bytes.
  #[inline]
  pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Result<Self, FormatError> {
    if data.len() > MAX_CHUNK_LEN {
      return Err(FormatError::ChunkTooLong(data.len() as u64));
    }
    let crc = chunk_crc(chunk_type.0, &data);
    Ok(Self { chunk_type, data, crc })
  }
  /// The chunk's type tag.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }
  /// The chunk's payload.
  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }
  /// The chunk's CRC.
  #[inline]
  #[must_use]
  pub const fn crc(&self) -> u32 {
    self.crc
  }
  /// Appends the length, type, payload, and CRC to `out`.
  #[inline]
  pub fn write_to(&self, out: &mut Vec<u8>) {
    // `new` already limited the length to 31 bits
    out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
    out.extend_from_slice(&self.chunk_type.0);
    out.extend_from_slice(&self.data);
    out.extend_from_slice(&self.crc.to_be_bytes());
  }
}
impl<'b> From<RawChunk<'b>> for Chunk {
  /// Copies a raw chunk, keeping whatever CRC it declared.
  #[inline]
  fn from(raw: RawChunk<'b>) -> Self {
    Self { chunk_type: raw.chunk_type, data: raw.data.to_vec(), crc: raw.declared_crc }
  }
}

/// Writes a full PNG stream: signature, `IHDR`, the given chunks in order, and
/// then `IEND`.
///
/// The caller's chunks must not include their own `IHDR` or `IEND`.
pub fn serialize_chunks(header: &IHDR, chunks: &[Chunk]) -> Result<Vec<u8>, FormatError> {
  let body_len: usize = chunks.iter().map(|c| c.data.len() + 12).sum();
  let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + 25 + body_len + 12);
  out.extend_from_slice(&PNG_SIGNATURE);
  Chunk::new(ChunkType::IHDR, header.to_bytes().to_vec())?.write_to(&mut out);
  for chunk in chunks {
    if matches!(chunk.chunk_type, ChunkType::IHDR | ChunkType::IEND) {
      return Err(FormatError::DuplicateChunk(chunk.chunk_type));
    }
    chunk.write_to(&mut out);
  }
  Chunk::new(ChunkType::IEND, Vec::new())?.write_to(&mut out);
  Ok(out)
}
