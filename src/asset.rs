//! Image assets handed to the compression pipeline.

use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::pixels;

/// Authoritative source of an image's original bytes.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image lives on disk; bytes are read on demand.
    File { path: PathBuf, extension: String },
    /// Image bytes are held in memory (e.g. embedded in an asset document).
    Embedded { bytes: Vec<u8>, extension: String },
}

impl ImageSource {
    /// Lowercase extension without the leading dot.
    pub fn extension(&self) -> &str {
        match self {
            ImageSource::File { extension, .. } => extension,
            ImageSource::Embedded { extension, .. } => extension,
        }
    }
}

/// One image in the batch handed to [`crate::compress::compress_all`].
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Identity used in logs and error reports.
    pub name: String,
    /// Decoded pixels, present when the original raster format was decodable.
    pub pixels: Option<DynamicImage>,
    pub source: ImageSource,
    /// Whether the image uses transparency (drives encoder alpha sub-modes).
    pub transparent: bool,
    /// True when pixel content was modified after load, making the original
    /// bytes stale.
    pub dirty: bool,
}

impl ImageAsset {
    /// Build an asset from in-memory bytes, eagerly attempting a pixel
    /// decode. Undecodable formats leave `pixels` unset; such images can
    /// still pass through to an encoder that accepts their extension.
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: Vec<u8>,
        extension: &str,
        transparent: bool,
    ) -> Self {
        let name = name.into();
        let extension = normalize_extension(extension);
        let pixels = match pixels::decode(&extension, &bytes) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(image = %name, %extension, "pixel decode unavailable: {e}");
                None
            }
        };
        Self {
            name,
            pixels,
            source: ImageSource::Embedded { bytes, extension },
            transparent,
            dirty: false,
        }
    }

    /// Build an asset from a file on disk. The file reference stays
    /// authoritative; bytes are read once here only to attempt the decode.
    pub fn from_file(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        transparent: bool,
    ) -> std::io::Result<Self> {
        let name = name.into();
        let path = path.into();
        let extension = normalize_extension(
            path.extension().and_then(|e| e.to_str()).unwrap_or_default(),
        );
        let bytes = std::fs::read(&path)?;
        let pixels = match pixels::decode(&extension, &bytes) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(image = %name, %extension, "pixel decode unavailable: {e}");
                None
            }
        };
        Ok(Self {
            name,
            pixels,
            source: ImageSource::File { path, extension },
            transparent,
            dirty: false,
        })
    }

    pub fn extension(&self) -> &str {
        self.source.extension()
    }

    /// Replacement callback: installs the compressed bytes as the new
    /// authoritative source. Pixel state is dropped since it no longer
    /// reflects the stored representation.
    pub fn install_compressed(&mut self, result: CompressedResult) {
        self.source = ImageSource::Embedded {
            bytes: result.data,
            extension: result.extension.to_string(),
        };
        self.pixels = None;
        self.dirty = false;
    }
}

/// Output of one encoder invocation, consumed by [`ImageAsset::install_compressed`].
#[derive(Debug)]
pub struct CompressedResult {
    pub data: Vec<u8>,
    /// Container extension without the dot (`ktx`, or `crn` for the crunch
    /// family).
    pub extension: &'static str,
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
