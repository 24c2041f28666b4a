//! Letterbox ratios from image files via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::rescale::LetterboxRatios;
use crate::util::{DetPostError, DetPostResult};
use std::path::Path;

/// Computes letterbox ratios for a decoded image.
pub fn letterbox_ratios_from_image(img: &image::DynamicImage) -> DetPostResult<LetterboxRatios> {
    LetterboxRatios::from_dims(img.width() as usize, img.height() as usize)
}

/// Reads an image header from disk and computes its letterbox ratios.
///
/// Only the dimensions are read; pixel data is not decoded.
pub fn letterbox_ratios_for_path<P: AsRef<Path>>(path: P) -> DetPostResult<LetterboxRatios> {
    let (width, height) =
        image::image_dimensions(path).map_err(|err| DetPostError::ImageIo {
            reason: err.to_string(),
        })?;
    LetterboxRatios::from_dims(width as usize, height as usize)
}
