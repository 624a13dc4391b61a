//! Raw-pixel capability backed by the `image` crate.
//!
//! Covers the three operations the pipeline needs from a raster library:
//! decode to pixels, resize to exact dimensions, and encode to a lossless
//! PNG intermediate that every external encoder accepts.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// Decode raster bytes into pixels.
///
/// The extension picks the codec; when it is unknown the content is sniffed
/// by magic bytes instead, which also covers mislabeled files.
pub fn decode(extension: &str, bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    match ImageFormat::from_extension(extension) {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
}

/// Resize to exact target dimensions, ignoring aspect ratio.
pub fn resize(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode pixels as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Largest power of two less than or equal to `n` (0 maps to 0).
pub fn previous_power_of_two(n: u32) -> u32 {
    let mut n = n;
    n |= n >> 1;
    n |= n >> 2;
    n |= n >> 4;
    n |= n >> 8;
    n |= n >> 16;
    n - (n >> 1)
}
