use alloc::string::String;

use crate::{png::ChunkType, ColorType};

/// Shorthand for results from this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An error from the `pilates` crate.
///
/// Decoding problems are tagged with the stage that found them, so a
/// [`FormatError`] can show up as [`Error::Chunk`], [`Error::Filter`], or
/// [`Error::ColorModel`]. Use [`Error::is_format_error`] if you only care that
/// the input was malformed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The chunk stream (signature, framing, CRCs, ordering, header) was bad.
  #[error("chunk stream: {0}")]
  Chunk(#[source] FormatError),

  /// The decompressed scanlines could not be unfiltered.
  #[error("scanline filtering: {0}")]
  Filter(#[source] FormatError),

  /// The unfiltered scanlines didn't fit the declared pixel layout.
  #[error("colour model: {0}")]
  ColorModel(#[source] FormatError),

  /// The compression collaborator rejected the data.
  #[error(transparent)]
  Compression(#[from] CompressionError),

  /// A colour model conversion was asked of an image with the wrong layout.
  #[error(transparent)]
  State(#[from] StateError),

  /// Bad parameters or pixel data were supplied.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// A pixel position outside of the image.
  #[error("pixel ({x}, {y}) is outside of a {width}x{height} image")]
  OutOfBounds {
    /// requested x
    x: u32,
    /// requested y
    y: u32,
    /// image width
    width: u32,
    /// image height
    height: u32,
  },

  /// Reading or writing a file failed.
  #[cfg(feature = "std")]
  #[error("i/o: {0}")]
  Io(#[from] std::io::Error),
}
impl Error {
  /// If this error means "the PNG data was malformed or unsupported".
  #[inline]
  #[must_use]
  pub const fn is_format_error(&self) -> bool {
    matches!(self, Self::Chunk(_) | Self::Filter(_) | Self::ColorModel(_))
  }

  /// Gets the inner [`FormatError`], whatever stage it came from.
  #[inline]
  #[must_use]
  pub const fn format_error(&self) -> Option<FormatError> {
    match self {
      Self::Chunk(e) | Self::Filter(e) | Self::ColorModel(e) => Some(*e),
      _ => None,
    }
  }
}

/// Malformed or unsupported PNG data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum FormatError {
  /// The first 8 bytes aren't the PNG signature.
  #[error("the data does not begin with the PNG signature")]
  BadSignature,
  /// The data ended partway through a chunk's length, type, or CRC.
  #[error("the data ends partway through a chunk")]
  UnexpectedEnd,
  /// A chunk declared more payload than there is data left.
  #[error("{chunk_type:?} declares {declared} bytes of payload but only {available} remain")]
  ChunkLength {
    /// the chunk's type
    chunk_type: ChunkType,
    /// the declared payload length
    declared: u32,
    /// how many bytes were actually left
    available: usize,
  },
  /// Chunk lengths must fit in 31 bits.
  #[error("chunk length {0} is larger than 2^31-1")]
  ChunkTooLong(u64),
  /// The declared CRC doesn't match the chunk's type and payload.
  #[error("{chunk_type:?} has CRC {declared:#010x} but the data gives {actual:#010x}")]
  CrcMismatch {
    /// the chunk's type
    chunk_type: ChunkType,
    /// the CRC stored in the stream
    declared: u32,
    /// the CRC computed from the stream
    actual: u32,
  },
  /// The first chunk was something other than `IHDR`.
  #[error("the first chunk must be IHDR, found {0:?}")]
  FirstChunkNotHeader(ChunkType),
  /// A chunk that must appear once appeared again.
  #[error("duplicate {0:?} chunk")]
  DuplicateChunk(ChunkType),
  /// There was no `IDAT` chunk.
  #[error("no IDAT chunk present")]
  MissingImageData,
  /// The stream stopped without an `IEND` chunk.
  #[error("the stream has no IEND chunk")]
  MissingEnd,
  /// Bytes follow the `IEND` chunk.
  #[error("{0} bytes follow the IEND chunk")]
  DataAfterEnd(usize),
  /// The `IEND` chunk carried a payload.
  #[error("IEND must be empty but holds {0} bytes")]
  NonEmptyEnd(usize),
  /// A critical chunk we don't know how to handle.
  #[error("unknown critical chunk {0:?}")]
  UnknownCriticalChunk(ChunkType),
  /// The `IHDR` payload wasn't 13 bytes.
  #[error("IHDR must hold 13 bytes, found {0}")]
  HeaderLength(usize),
  /// Width or height of zero, or more than 2^31-1.
  #[error("{width}x{height} are not valid image dimensions")]
  BadDimensions {
    /// declared width
    width: u32,
    /// declared height
    height: u32,
  },
  /// A colour type / bit depth pair outside of the direct colour types.
  #[error("bit depth {bit_depth} with colour type {color_type} is not supported")]
  UnsupportedPixelFormat {
    /// declared bit depth
    bit_depth: u8,
    /// declared colour type
    color_type: u8,
  },
  /// Only compression method 0 (zlib) exists.
  #[error("unknown compression method {0}")]
  CompressionMethod(u8),
  /// Only filter method 0 exists.
  #[error("unknown filter method {0}")]
  FilterMethod(u8),
  /// Adam7 interlacing isn't supported.
  #[error("interlaced images are not supported")]
  Interlaced,
  /// An interlace method other than 0 or 1.
  #[error("unknown interlace method {0}")]
  InterlaceMethod(u8),
  /// A scanline's filter byte was outside `0..=4`.
  #[error("scanline {line} has unknown filter type {filter}")]
  FilterType {
    /// which line (from the top)
    line: u32,
    /// the bad filter byte
    filter: u8,
  },
  /// The decompressed data was too short for the image's scanlines.
  #[error("expected {expected} bytes of scanline data, only {actual} were present")]
  NotEnoughImageData {
    /// bytes required
    expected: usize,
    /// bytes present
    actual: usize,
  },
  /// A scanline didn't have the number of bytes its samples need.
  #[error("scanline holds {actual} bytes but its samples need {expected}")]
  ScanlineLength {
    /// bytes required
    expected: usize,
    /// bytes present
    actual: usize,
  },
}

/// A colour model conversion was requested on an image that can't do it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum StateError {
  /// The image's colour type isn't one the operation accepts.
  #[error("{operation} needs {expected} pixels, but the image is {found:?}")]
  IncompatibleColorType {
    /// the operation's name
    operation: &'static str,
    /// what the operation accepts
    expected: &'static str,
    /// what the image actually is
    found: ColorType,
  },
}

/// Invalid parameters or pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ValidationError {
  /// A target width or height of zero.
  #[error("{width}x{height} must have a positive width and height")]
  ZeroDimension {
    /// requested width
    width: u32,
    /// requested height
    height: u32,
  },
  /// Dimensions whose pixel count doesn't fit in memory.
  #[error("{width}x{height} is too many pixels")]
  TooManyPixels {
    /// requested width
    width: u32,
    /// requested height
    height: u32,
  },
  /// There were no pixels at all.
  #[error("the image has no pixels")]
  EmptyImage,
  /// The pixel count doesn't match the dimensions.
  #[error("{width}x{height} needs {expected} pixels, found {found}")]
  PixelCount {
    /// declared width
    width: u32,
    /// declared height
    height: u32,
    /// width * height
    expected: usize,
    /// what was supplied
    found: usize,
  },
  /// Rows of different lengths.
  #[error("row {row} has {found} pixels but row 0 has {expected}")]
  RaggedRows {
    /// index of the offending row
    row: usize,
    /// length of the first row
    expected: usize,
    /// length of the offending row
    found: usize,
  },
  /// A pixel with the wrong number of channels for the image.
  #[error("expected {expected:?} pixels, found {found:?}")]
  WrongPixelLayout {
    /// the image's colour type
    expected: ColorType,
    /// the supplied pixel's colour type
    found: ColorType,
  },
  /// A sample too big for the bit depth.
  #[error("sample value {sample} does not fit in {bit_depth} bits")]
  SampleTooLarge {
    /// the sample
    sample: u16,
    /// the image's bit depth
    bit_depth: u8,
  },
  /// A bit depth that isn't legal for the colour type.
  #[error("bit depth {bit_depth} is not allowed for {color_type:?}")]
  BitDepth {
    /// requested depth
    bit_depth: u8,
    /// the colour type
    color_type: ColorType,
  },
  /// zlib levels go from 0 to 10.
  #[error("compression level {0} is outside 0..=10")]
  CompressionLevel(u8),
  /// IDAT chunks must be allowed at least one byte.
  #[error("the IDAT split size must be between 1 and 2^31-1")]
  IdatSplitSize,
}

/// The compression collaborator failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CompressionError {
  /// The compressed stream was corrupt or cut short.
  #[error("malformed compressed stream: {0}")]
  Malformed(String),
}
