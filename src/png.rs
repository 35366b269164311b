#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Supported Images
//!
//! Greyscale, greyscale + alpha, RGB, and RGBA, at every bit depth PNG allows
//! for each. Palette images and Adam7 interlacing are rejected with a
//! [`FormatError`]. Ancillary chunks are checked (length and CRC) and then
//! skipped.
//!
//! ## Automatic Decoding
//!
//! Call [`decode`] (or [`Image::from_png_bytes`]) and you get an [`Image`] or
//! an [`Error`] saying which stage failed:
//!
//! 1) [`parse_chunks`] splits the bytes into chunks, checking the signature,
//!    every CRC, and the chunk ordering rules. Failures are
//!    [`Error::Chunk`].
//! 2) The `IDAT` payloads are joined and go through the zlib
//!    [`Compression`]. Failures are [`Error::Compression`].
//! 3) [`unfilter_scanlines`] undoes the per-line filters. Failures are
//!    [`Error::Filter`].
//! 4) The plain scanlines are unpacked into pixels. Failures are
//!    [`Error::ColorModel`].
//!
//! Encoding runs the same steps backwards. By default every line uses
//! [`FilterType::None`] and the whole zlib stream goes in one `IDAT` chunk,
//! see [`EncodeOptions`] to change that.
//!
//! Nothing is returned on failure: no partial image, and no partial bytes.
//!
//! ## Manual Decoding
//!
//! All the steps are public, so you can also drive them yourself: parse the
//! chunks, read the [`IHDR`] with `IHDR::try_from(chunk.data())`, decompress
//! with any zlib library, and call [`unfilter_scanlines`].

use alloc::vec::Vec;
use log::{debug, warn};

use crate::{Compression, Error, FormatError, Image, Result, ValidationError};

mod chunk;
pub use chunk::*;

mod crc32;
pub use crc32::*;

mod filter;
pub use filter::*;

mod ihdr;
pub use ihdr::*;

mod packing;
use packing::{pack_scanlines, unpack_scanlines};


/// The first eight bytes of every PNG stream.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Knobs for [`encode_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// How each scanline picks its filter.
  pub filter: FilterStrategy,
  /// The most compressed bytes to put in one `IDAT` chunk.
  ///
  /// `None` means one chunk (unless the stream is over 2^31-1 bytes).
  pub max_idat_len: Option<usize>,
}
impl EncodeOptions {
  #[inline]
  fn idat_len(&self) -> Result<usize, ValidationError> {
    match self.max_idat_len {
      None => Ok(MAX_CHUNK_LEN),
      Some(len) if (1..=MAX_CHUNK_LEN).contains(&len) => Ok(len),
      Some(_) => Err(ValidationError::IdatSplitSize),
    }
  }
}

/// Decodes PNG bytes, using `compression` for the zlib stream.
///
/// ## Failure
/// * Anything wrong with the chunk stream, see [`parse_chunks`].
/// * A palette or interlaced image, or an illegal bit depth.
/// * The image is too big to hold in memory.
/// * The zlib data doesn't decompress. Inflating stops once the image's
///   scanlines are complete, so a stream can't expand past what the header
///   says the image needs.
/// * The decompressed data is too short, or a line has a bad filter type.
pub fn decode_with<C: Compression + ?Sized>(bytes: &[u8], compression: &C) -> Result<Image> {
  let chunks = parse_chunks(bytes).map_err(Error::Chunk)?;
  let first = chunks.first().ok_or(Error::Chunk(FormatError::UnexpectedEnd))?;
  let header = IHDR::try_from(first.data()).map_err(Error::Chunk)?;
  debug!(
    "decoding {}x{} {:?} at {} bits per sample",
    header.width, header.height, header.color_type, header.bit_depth
  );

  let mut idat: Vec<u8> = Vec::new();
  for chunk in &chunks[1..] {
    match chunk.chunk_type() {
      ChunkType::IDAT => idat.extend_from_slice(chunk.data()),
      ChunkType::IEND => (),
      // a suggested palette, which direct colour images don't need
      ChunkType::PLTE => debug!("skipping PLTE"),
      other => warn!("skipping ancillary chunk {other:?} ({} bytes)", chunk.data().len()),
    }
  }

  let expected = header.decompressed_len().ok_or(ValidationError::TooManyPixels {
    width: header.width,
    height: header.height,
  })?;
  // one byte past the image is enough to tell that there's surplus data
  let decompressed = compression.decompress(&idat, expected.saturating_add(1))?;
  if decompressed.len() > expected {
    warn!("ignoring data past the last scanline");
  }
  let scanlines = unfilter_scanlines(&header, &decompressed).map_err(Error::Filter)?;
  let pixels = unpack_scanlines(&header, &scanlines).map_err(Error::ColorModel)?;
  Ok(Image::from_parts(header.width, header.height, header.bit_depth, pixels)?)
}

/// Encodes an image as PNG bytes, using `compression` for the zlib stream.
///
/// ## Failure
/// * Bad options (see [`EncodeOptions::max_idat_len`]).
/// * The image is wider or taller than PNG allows.
/// * The compressor fails.
pub fn encode_with<C: Compression + ?Sized>(
  image: &Image, compression: &C, options: &EncodeOptions,
) -> Result<Vec<u8>> {
  let idat_len = options.idat_len()?;
  let header = IHDR::new(image.width(), image.height(), image.bit_depth(), image.color_type())
    .map_err(Error::Chunk)?;
  debug!(
    "encoding {}x{} {:?} at {} bits per sample, filter {:?}",
    header.width, header.height, header.color_type, header.bit_depth, options.filter
  );

  let scanlines = pack_scanlines(&header, image);
  let filtered = filter_scanlines(&header, &scanlines, options.filter);
  let compressed = compression.compress(&filtered)?;

  let mut idats = compressed
    .chunks(idat_len)
    .map(|part| Chunk::new(ChunkType::IDAT, part.to_vec()))
    .collect::<Result<Vec<Chunk>, FormatError>>()
    .map_err(Error::Chunk)?;
  if idats.is_empty() {
    idats.push(Chunk::new(ChunkType::IDAT, Vec::new()).map_err(Error::Chunk)?);
  }
  serialize_chunks(&header, &idats).map_err(Error::Chunk)
}

/// Decodes PNG bytes with the bundled [`Zlib`](crate::Zlib).
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[inline]
pub fn decode(bytes: &[u8]) -> Result<Image> {
  decode_with(bytes, &crate::Zlib::default())
}

/// Encodes an image with the bundled [`Zlib`](crate::Zlib) and the default
/// [`EncodeOptions`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[inline]
pub fn encode(image: &Image) -> Result<Vec<u8>> {
  encode_with(image, &crate::Zlib::default(), &EncodeOptions::default())
}

#[cfg(feature = "miniz_oxide")]
impl Image {
  /// Attempts to make an image from PNG bytes.
  ///
  /// Same as [`decode`].
  #[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
  #[inline]
  pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
    decode(bytes)
  }

  /// Encodes the image as PNG bytes.
  ///
  /// Same as [`encode`].
  #[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
  #[inline]
  pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
    encode(self)
  }
}

#[cfg(all(feature = "std", feature = "miniz_oxide"))]
impl Image {
  /// Reads and decodes a PNG file.
  ///
  /// ## Failure
  /// * The file can't be read ([`Error::Io`]).
  /// * Anything [`decode`] can fail with.
  #[cfg_attr(docs_rs, doc(cfg(all(feature = "std", feature = "miniz_oxide"))))]
  pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
  }

  /// Encodes the image and writes it to a file.
  ///
  /// The file is only created once encoding has worked.
  #[cfg_attr(docs_rs, doc(cfg(all(feature = "std", feature = "miniz_oxide"))))]
  pub fn to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
    let bytes = encode(self)?;
    std::fs::write(path, bytes)?;
    Ok(())
  }
}
