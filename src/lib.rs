#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for PNG decoding and encoding, plus a few pixel transforms.
//!
//! * [`png`] reads and writes PNG byte streams (direct colour, not
//!   interlaced).
//! * [`Image`] is the in-memory raster that the codec produces and consumes.
//!   It's immutable: colour model conversions and [`Transform`]s give back a
//!   new image.
//!
//! ## Crate Features
//! * `std`: file helpers ([`Image::from_file`], [`Image::to_file`]) and
//!   [`std::error::Error`] impls.
//! * `miniz_oxide`: a bundled zlib ([`Zlib`]) and the simple [`png::decode`]
//!   and [`png::encode`] functions. Without it you supply your own
//!   [`Compression`] to [`png::decode_with`] and [`png::encode_with`].
//! * `cli`: the `pilates` command line program.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod image;
pub use image::{Image, ImageSettings, PixelBuffer};

mod bit_depth_changes;
pub use bit_depth_changes::rescale_sample;

mod color_model;

pub mod compression;
pub use compression::Compression;
#[cfg(feature = "miniz_oxide")]
pub use compression::Zlib;

pub mod transforms;
pub use transforms::Transform;

pub mod png;
