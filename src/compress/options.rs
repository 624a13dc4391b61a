//! Compression options and eager validation.

use std::fmt;

use crate::error::CompressError;
use crate::ktx::AstcBlock;

/// Target compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Pvrtc1,
    Pvrtc2,
    Etc1,
    Etc2,
    Astc,
    Dxt1,
    Dxt3,
    Dxt5,
    CrunchDxt1,
    CrunchDxt3,
    CrunchDxt5,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 11] = [
        TextureFormat::Pvrtc1,
        TextureFormat::Pvrtc2,
        TextureFormat::Etc1,
        TextureFormat::Etc2,
        TextureFormat::Astc,
        TextureFormat::Dxt1,
        TextureFormat::Dxt3,
        TextureFormat::Dxt5,
        TextureFormat::CrunchDxt1,
        TextureFormat::CrunchDxt3,
        TextureFormat::CrunchDxt5,
    ];

    /// Parse one of the exact format identifiers, e.g. `"crunch-dxt1"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureFormat::Pvrtc1 => "pvrtc1",
            TextureFormat::Pvrtc2 => "pvrtc2",
            TextureFormat::Etc1 => "etc1",
            TextureFormat::Etc2 => "etc2",
            TextureFormat::Astc => "astc",
            TextureFormat::Dxt1 => "dxt1",
            TextureFormat::Dxt3 => "dxt3",
            TextureFormat::Dxt5 => "dxt5",
            TextureFormat::CrunchDxt1 => "crunch-dxt1",
            TextureFormat::CrunchDxt3 => "crunch-dxt3",
            TextureFormat::CrunchDxt5 => "crunch-dxt5",
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for one compression run. Immutable once validated.
#[derive(Debug, Clone)]
pub struct CompressionOptions {
    pub format: TextureFormat,
    /// Shared quality scale, 0 (fastest) to 10 (best). Each encoder maps it
    /// to its own native scale.
    pub quality: u32,
    /// Bits per pixel; meaningful for the pvrtc family only, where it must
    /// be exactly 2 or 4.
    pub bitrate: f32,
    /// ASTC block size, e.g. `"8x8"`.
    pub block_size: String,
    /// Prefer 1-bit (punch-through) alpha sub-modes for transparent images.
    pub alpha_bit: bool,
}

impl CompressionOptions {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            quality: 5,
            bitrate: 2.0,
            block_size: "8x8".to_string(),
            alpha_bit: false,
        }
    }

    /// Validate before any asynchronous work starts.
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.quality > 10 {
            return Err(CompressError::InvalidOptions(format!(
                "quality must be between 0 and 10, got {}",
                self.quality
            )));
        }
        match self.format {
            TextureFormat::Pvrtc1 | TextureFormat::Pvrtc2 => {
                if self.bitrate != 2.0 && self.bitrate != 4.0 {
                    return Err(CompressError::InvalidOptions(format!(
                        "{} bitrate must be 2 or 4, got {}",
                        self.format, self.bitrate
                    )));
                }
            }
            TextureFormat::Astc => {
                if AstcBlock::parse(&self.block_size).is_none() {
                    return Err(CompressError::InvalidOptions(format!(
                        "unsupported astc block size `{}`",
                        self.block_size
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn astc_block(&self) -> AstcBlock {
        AstcBlock::parse(&self.block_size).unwrap_or(AstcBlock::B8x8)
    }
}
