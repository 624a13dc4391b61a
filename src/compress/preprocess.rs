//! Per-image routing: forward original bytes untouched, or go through raw
//! pixels and a lossless PNG intermediate.

use std::borrow::Cow;
use std::path::PathBuf;

use image::GenericImageView;
use tracing::debug;

use crate::asset::{ImageAsset, ImageSource};
use crate::error::CompressError;
use crate::pixels;

use super::options::CompressionOptions;

/// What gets handed to the encoder for one image.
#[derive(Debug)]
pub(crate) enum EncoderInput {
    /// Existing file used directly, no copy.
    Path(PathBuf),
    /// In-memory bytes written to the workspace before spawning.
    Bytes { data: Vec<u8>, extension: String },
}

/// Decide between passthrough and the raw pixel path.
///
/// Precedence: power-of-two normalization, then staleness (dirty), then
/// encoder extension support. Only when none apply are the original bytes
/// forwarded unchanged.
pub(crate) fn prepare(
    image: &ImageAsset,
    options: &CompressionOptions,
) -> Result<EncoderInput, CompressError> {
    let policy = options.format.policy();

    // Dimensions can only be inspected when a decode succeeded; without
    // pixels the pvrtc tools still normalize via their -pot/-square flags.
    let needs_resize = policy.requires_power_of_two
        && image.pixels.as_ref().is_some_and(|p| {
            let (w, h) = p.dimensions();
            !w.is_power_of_two() || !h.is_power_of_two()
        });

    let passthrough =
        !needs_resize && !image.dirty && policy.accepts_extension(image.extension());
    if passthrough {
        debug!(image = %image.name, "forwarding original bytes unchanged");
        return Ok(match &image.source {
            ImageSource::File { path, .. } => EncoderInput::Path(path.clone()),
            ImageSource::Embedded { bytes, extension } => EncoderInput::Bytes {
                data: bytes.clone(),
                extension: extension.clone(),
            },
        });
    }

    let Some(decoded) = image.pixels.as_ref() else {
        return Err(CompressError::UnsupportedInputFormat {
            image: image.name.clone(),
            format: options.format,
        });
    };

    let decoded = if needs_resize {
        let (w, h) = decoded.dimensions();
        let target_w = pixels::previous_power_of_two(w);
        let target_h = pixels::previous_power_of_two(h);
        debug!(image = %image.name, "normalizing {w}x{h} -> {target_w}x{target_h}");
        Cow::Owned(pixels::resize(decoded, target_w, target_h))
    } else {
        Cow::Borrowed(decoded)
    };

    let data = pixels::encode_png(&decoded)?;
    Ok(EncoderInput::Bytes {
        data,
        extension: "png".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::options::TextureFormat;
    use anyhow::Result;
    use image::DynamicImage;

    fn png_asset(name: &str, width: u32, height: u32) -> ImageAsset {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([64, 32, 16, 255]),
        ));
        ImageAsset::from_bytes(name, pixels::encode_png(&image).unwrap(), "png", false)
    }

    #[test]
    fn clean_accepted_pow2_image_passes_through() -> Result<()> {
        let asset = png_asset("a", 64, 64);
        let original = match &asset.source {
            ImageSource::Embedded { bytes, .. } => bytes.clone(),
            _ => unreachable!(),
        };

        let options = CompressionOptions::new(TextureFormat::Pvrtc1);
        match prepare(&asset, &options)? {
            EncoderInput::Bytes { data, extension } => {
                assert_eq!(data, original);
                assert_eq!(extension, "png");
            }
            other => panic!("expected passthrough bytes, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn file_sources_pass_through_as_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tex.png");
        let image = DynamicImage::ImageRgba8(image::RgbaImage::new(32, 32));
        std::fs::write(&path, pixels::encode_png(&image)?)?;

        let asset = ImageAsset::from_file("f", &path, false)?;
        let options = CompressionOptions::new(TextureFormat::Dxt1);
        assert!(matches!(
            prepare(&asset, &options)?,
            EncoderInput::Path(p) if p == path
        ));
        Ok(())
    }

    #[test]
    fn non_pow2_under_pvrtc_resizes_to_previous_power_of_two() -> Result<()> {
        let asset = png_asset("b", 211, 211);
        let options = CompressionOptions::new(TextureFormat::Pvrtc1);

        let EncoderInput::Bytes { data, extension } = prepare(&asset, &options)? else {
            panic!("expected re-encoded bytes");
        };
        assert_eq!(extension, "png");
        let decoded = pixels::decode("png", &data)?;
        assert_eq!(decoded.dimensions(), (128, 128));
        Ok(())
    }

    #[test]
    fn non_pow2_without_pow2_requirement_passes_through() -> Result<()> {
        let asset = png_asset("c", 211, 211);
        let options = CompressionOptions::new(TextureFormat::Etc2);
        assert!(matches!(
            prepare(&asset, &options)?,
            EncoderInput::Bytes { extension, .. } if extension == "png"
        ));
        Ok(())
    }

    #[test]
    fn dirty_image_is_re_encoded() -> Result<()> {
        // A clean JPEG would pass through to crunch as-is; dirty forces the
        // current pixels through the PNG intermediate.
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(64, 64));
        let mut bytes = Vec::new();
        image.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Jpeg,
        )?;
        let mut asset = ImageAsset::from_bytes("d", bytes, "jpg", false);
        asset.dirty = true;

        let options = CompressionOptions::new(TextureFormat::Dxt5);
        let EncoderInput::Bytes { data, extension } = prepare(&asset, &options)? else {
            panic!("expected re-encoded bytes");
        };
        assert_eq!(extension, "png");
        let decoded = pixels::decode("png", &data)?;
        assert_eq!(decoded.dimensions(), (64, 64));
        Ok(())
    }

    #[test]
    fn unsupported_extension_with_pixels_is_re_encoded() -> Result<()> {
        // EtcTool only takes PNG; a decodable JPEG goes through the
        // intermediate instead of failing.
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(16, 16));
        let mut bytes = Vec::new();
        image.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Jpeg,
        )?;
        let asset = ImageAsset::from_bytes("e", bytes, "jpg", false);
        assert!(asset.pixels.is_some());

        let options = CompressionOptions::new(TextureFormat::Etc1);
        assert!(matches!(
            prepare(&asset, &options)?,
            EncoderInput::Bytes { extension, .. } if extension == "png"
        ));
        Ok(())
    }

    #[test]
    fn undecodable_raw_path_fails_with_format_name() {
        let asset = ImageAsset::from_bytes("f", vec![0, 1, 2, 3], "xyz", false);
        assert!(asset.pixels.is_none());

        let options = CompressionOptions::new(TextureFormat::Astc);
        match prepare(&asset, &options) {
            Err(CompressError::UnsupportedInputFormat { image, format }) => {
                assert_eq!(image, "f");
                assert_eq!(format, TextureFormat::Astc);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
