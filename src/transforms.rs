//! Whole-image pixel transforms.
//!
//! A [`Transform`] maps one [`Image`] to a new one. The source image is never
//! touched.

use log::debug;

use crate::{Image, Result, ValidationError};

mod invert;
mod resize;
mod sort;

pub use invert::invert;
pub use resize::resize;
pub use sort::sort;

/// Picks one of the transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
  /// Bilinear resampling to a new size. The colour type and depth stay.
  Resize {
    /// new width in pixels
    width: u32,
    /// new height in pixels
    height: u32,
  },
  /// Sorts the pixels within each row by the sum of their colour channels.
  ///
  /// The sort is stable, alpha rides along with its pixel, and rows don't
  /// mix.
  Sort {
    /// darkest last instead of darkest first
    reverse: bool,
  },
  /// Swaps every colour sample `v` for `max - v`. Alpha stays.
  Invert,
}
impl Transform {
  /// Runs the transform on an image.
  ///
  /// ## Failure
  /// * A resize to zero width or height.
  /// * An image with no pixels.
  pub fn apply(&self, image: &Image) -> Result<Image> {
    if image.pixel_buffer().is_empty() {
      return Err(ValidationError::EmptyImage.into());
    }
    debug!("{self:?} on a {}x{} {:?} image", image.width(), image.height(), image.color_type());
    let out = match *self {
      Self::Resize { width, height } => resize(image, width, height)?,
      Self::Sort { reverse } => sort(image, reverse)?,
      Self::Invert => invert(image)?,
    };
    Ok(out)
  }
}

impl Image {
  /// Shorthand for [`Transform::apply`].
  #[inline]
  pub fn apply_transform(&self, transform: Transform) -> Result<Image> {
    transform.apply(self)
  }
}
