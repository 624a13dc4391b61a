//! Pixel format tables shared by the KTX parser and the compression policy.

use std::fmt;

const GL_RGB: u32 = 0x1907;
const GL_RGBA: u32 = 0x1908;

const GL_ETC1_RGB8_OES: u32 = 0x8D64;
const GL_COMPRESSED_RGB8_ETC2: u32 = 0x9274;
const GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2: u32 = 0x9276;
const GL_COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;

const GL_COMPRESSED_RGB_PVRTC_4BPPV1_IMG: u32 = 0x8C00;
const GL_COMPRESSED_RGB_PVRTC_2BPPV1_IMG: u32 = 0x8C01;
const GL_COMPRESSED_RGBA_PVRTC_4BPPV1_IMG: u32 = 0x8C02;
const GL_COMPRESSED_RGBA_PVRTC_2BPPV1_IMG: u32 = 0x8C03;
const GL_COMPRESSED_RGBA_PVRTC_2BPPV2_IMG: u32 = 0x9137;
const GL_COMPRESSED_RGBA_PVRTC_4BPPV2_IMG: u32 = 0x9138;

const GL_COMPRESSED_RGB_S3TC_DXT1_EXT: u32 = 0x83F0;
const GL_COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
const GL_COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
const GL_COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;

/// First ASTC LDR internal format code; the remaining 13 block sizes follow
/// contiguously in [`AstcBlock::ALL`] order.
const GL_COMPRESSED_RGBA_ASTC_4X4_KHR: u32 = 0x93B0;

/// ASTC LDR block footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstcBlock {
    B4x4,
    B5x4,
    B5x5,
    B6x5,
    B6x6,
    B8x5,
    B8x6,
    B8x8,
    B10x5,
    B10x6,
    B10x8,
    B10x10,
    B12x10,
    B12x12,
}

impl AstcBlock {
    /// All supported block sizes, in the KHR extension's code order.
    pub const ALL: [AstcBlock; 14] = [
        AstcBlock::B4x4,
        AstcBlock::B5x4,
        AstcBlock::B5x5,
        AstcBlock::B6x5,
        AstcBlock::B6x6,
        AstcBlock::B8x5,
        AstcBlock::B8x6,
        AstcBlock::B8x8,
        AstcBlock::B10x5,
        AstcBlock::B10x6,
        AstcBlock::B10x8,
        AstcBlock::B10x10,
        AstcBlock::B12x10,
        AstcBlock::B12x12,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AstcBlock::B4x4 => "4x4",
            AstcBlock::B5x4 => "5x4",
            AstcBlock::B5x5 => "5x5",
            AstcBlock::B6x5 => "6x5",
            AstcBlock::B6x6 => "6x6",
            AstcBlock::B8x5 => "8x5",
            AstcBlock::B8x6 => "8x6",
            AstcBlock::B8x8 => "8x8",
            AstcBlock::B10x5 => "10x5",
            AstcBlock::B10x6 => "10x6",
            AstcBlock::B10x8 => "10x8",
            AstcBlock::B10x10 => "10x10",
            AstcBlock::B12x10 => "12x10",
            AstcBlock::B12x12 => "12x12",
        }
    }

    /// Block width and height in texels.
    pub fn footprint(self) -> (u32, u32) {
        match self {
            AstcBlock::B4x4 => (4, 4),
            AstcBlock::B5x4 => (5, 4),
            AstcBlock::B5x5 => (5, 5),
            AstcBlock::B6x5 => (6, 5),
            AstcBlock::B6x6 => (6, 6),
            AstcBlock::B8x5 => (8, 5),
            AstcBlock::B8x6 => (8, 6),
            AstcBlock::B8x8 => (8, 8),
            AstcBlock::B10x5 => (10, 5),
            AstcBlock::B10x6 => (10, 6),
            AstcBlock::B10x8 => (10, 8),
            AstcBlock::B10x10 => (10, 10),
            AstcBlock::B12x10 => (12, 10),
            AstcBlock::B12x12 => (12, 12),
        }
    }

    fn index(self) -> u32 {
        Self::ALL.iter().position(|b| *b == self).unwrap_or(0) as u32
    }

    fn from_gl(code: u32) -> Option<Self> {
        let offset = code.checked_sub(GL_COMPRESSED_RGBA_ASTC_4X4_KHR)?;
        Self::ALL.get(offset as usize).copied()
    }

    pub fn gl_code(self) -> u32 {
        GL_COMPRESSED_RGBA_ASTC_4X4_KHR + self.index()
    }
}

impl fmt::Display for AstcBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel format of a KTX container, derived from glInternalFormat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
    Etc1,
    Etc2Rgb,
    Etc2Rgb8A1,
    Etc2Rgba,
    Pvrtc1Rgb2,
    Pvrtc1Rgb4,
    Pvrtc1Rgba2,
    Pvrtc1Rgba4,
    Pvrtc2Rgba2,
    Pvrtc2Rgba4,
    Dxt1Rgb,
    Dxt1Rgba,
    Dxt3,
    Dxt5,
    Astc(AstcBlock),
}

impl PixelFormat {
    /// Look up a format by its glInternalFormat code. Sized-format aliases
    /// (0x8051/0x8058) are remapped by the parser before this call.
    pub fn from_gl(code: u32) -> Option<Self> {
        let format = match code {
            GL_RGB => PixelFormat::Rgb,
            GL_RGBA => PixelFormat::Rgba,
            GL_ETC1_RGB8_OES => PixelFormat::Etc1,
            GL_COMPRESSED_RGB8_ETC2 => PixelFormat::Etc2Rgb,
            GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2 => PixelFormat::Etc2Rgb8A1,
            GL_COMPRESSED_RGBA8_ETC2_EAC => PixelFormat::Etc2Rgba,
            GL_COMPRESSED_RGB_PVRTC_2BPPV1_IMG => PixelFormat::Pvrtc1Rgb2,
            GL_COMPRESSED_RGB_PVRTC_4BPPV1_IMG => PixelFormat::Pvrtc1Rgb4,
            GL_COMPRESSED_RGBA_PVRTC_2BPPV1_IMG => PixelFormat::Pvrtc1Rgba2,
            GL_COMPRESSED_RGBA_PVRTC_4BPPV1_IMG => PixelFormat::Pvrtc1Rgba4,
            GL_COMPRESSED_RGBA_PVRTC_2BPPV2_IMG => PixelFormat::Pvrtc2Rgba2,
            GL_COMPRESSED_RGBA_PVRTC_4BPPV2_IMG => PixelFormat::Pvrtc2Rgba4,
            GL_COMPRESSED_RGB_S3TC_DXT1_EXT => PixelFormat::Dxt1Rgb,
            GL_COMPRESSED_RGBA_S3TC_DXT1_EXT => PixelFormat::Dxt1Rgba,
            GL_COMPRESSED_RGBA_S3TC_DXT3_EXT => PixelFormat::Dxt3,
            GL_COMPRESSED_RGBA_S3TC_DXT5_EXT => PixelFormat::Dxt5,
            other => PixelFormat::Astc(AstcBlock::from_gl(other)?),
        };
        Some(format)
    }

    pub fn gl_code(self) -> u32 {
        match self {
            PixelFormat::Rgb => GL_RGB,
            PixelFormat::Rgba => GL_RGBA,
            PixelFormat::Etc1 => GL_ETC1_RGB8_OES,
            PixelFormat::Etc2Rgb => GL_COMPRESSED_RGB8_ETC2,
            PixelFormat::Etc2Rgb8A1 => GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2,
            PixelFormat::Etc2Rgba => GL_COMPRESSED_RGBA8_ETC2_EAC,
            PixelFormat::Pvrtc1Rgb2 => GL_COMPRESSED_RGB_PVRTC_2BPPV1_IMG,
            PixelFormat::Pvrtc1Rgb4 => GL_COMPRESSED_RGB_PVRTC_4BPPV1_IMG,
            PixelFormat::Pvrtc1Rgba2 => GL_COMPRESSED_RGBA_PVRTC_2BPPV1_IMG,
            PixelFormat::Pvrtc1Rgba4 => GL_COMPRESSED_RGBA_PVRTC_4BPPV1_IMG,
            PixelFormat::Pvrtc2Rgba2 => GL_COMPRESSED_RGBA_PVRTC_2BPPV2_IMG,
            PixelFormat::Pvrtc2Rgba4 => GL_COMPRESSED_RGBA_PVRTC_4BPPV2_IMG,
            PixelFormat::Dxt1Rgb => GL_COMPRESSED_RGB_S3TC_DXT1_EXT,
            PixelFormat::Dxt1Rgba => GL_COMPRESSED_RGBA_S3TC_DXT1_EXT,
            PixelFormat::Dxt3 => GL_COMPRESSED_RGBA_S3TC_DXT3_EXT,
            PixelFormat::Dxt5 => GL_COMPRESSED_RGBA_S3TC_DXT5_EXT,
            PixelFormat::Astc(block) => block.gl_code(),
        }
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, PixelFormat::Rgb | PixelFormat::Rgba)
    }

    /// Byte size of mip level 0 at the given pixel dimensions.
    ///
    /// PVRTC1 surfaces are padded to minimum block grids (8 or 16 texels wide,
    /// 8 tall); everything else is plain block math.
    pub fn level0_size(self, width: u32, height: u32) -> usize {
        let w = width as usize;
        let h = height as usize;
        let blocks = |n: usize, b: usize| n.div_ceil(b);
        match self {
            PixelFormat::Rgb => w * h * 3,
            PixelFormat::Rgba => w * h * 4,
            PixelFormat::Etc1
            | PixelFormat::Etc2Rgb
            | PixelFormat::Etc2Rgb8A1
            | PixelFormat::Dxt1Rgb
            | PixelFormat::Dxt1Rgba => blocks(w, 4) * blocks(h, 4) * 8,
            PixelFormat::Etc2Rgba | PixelFormat::Dxt3 | PixelFormat::Dxt5 => {
                blocks(w, 4) * blocks(h, 4) * 16
            }
            PixelFormat::Pvrtc1Rgb4 | PixelFormat::Pvrtc1Rgba4 => {
                (w.max(8) * h.max(8) * 4 + 7) / 8
            }
            PixelFormat::Pvrtc1Rgb2 | PixelFormat::Pvrtc1Rgba2 => {
                (w.max(16) * h.max(8) * 2 + 7) / 8
            }
            PixelFormat::Pvrtc2Rgba4 => blocks(w, 4) * blocks(h, 4) * 8,
            PixelFormat::Pvrtc2Rgba2 => blocks(w, 8) * blocks(h, 4) * 8,
            PixelFormat::Astc(block) => {
                let (bw, bh) = block.footprint();
                blocks(w, bw as usize) * blocks(h, bh as usize) * 16
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn astc_blocks_round_trip() {
        for block in AstcBlock::ALL {
            assert_eq!(AstcBlock::parse(block.as_str()), Some(block));
            assert_eq!(PixelFormat::from_gl(block.gl_code()), Some(PixelFormat::Astc(block)));
        }
        assert_eq!(AstcBlock::parse("1x1"), None);
        assert_eq!(AstcBlock::B4x4.gl_code(), 0x93B0);
        assert_eq!(AstcBlock::B12x12.gl_code(), 0x93BD);
    }

    #[test]
    fn gl_codes_round_trip() {
        let formats = [
            PixelFormat::Rgb,
            PixelFormat::Rgba,
            PixelFormat::Etc1,
            PixelFormat::Etc2Rgb,
            PixelFormat::Etc2Rgba,
            PixelFormat::Pvrtc1Rgb4,
            PixelFormat::Pvrtc2Rgba2,
            PixelFormat::Dxt1Rgb,
            PixelFormat::Dxt5,
        ];
        for format in formats {
            assert_eq!(PixelFormat::from_gl(format.gl_code()), Some(format));
        }
        assert_eq!(PixelFormat::from_gl(0xBEEF), None);
    }

    #[test]
    fn level0_sizes() {
        // 8x8 ETC1: four 4x4 blocks at 8 bytes.
        assert_eq!(PixelFormat::Etc1.level0_size(8, 8), 32);
        // Non-multiple-of-4 dimensions round up to whole blocks.
        assert_eq!(PixelFormat::Dxt5.level0_size(5, 5), 4 * 16);
        // PVRTC1 4bpp pads to an 8x8 minimum surface.
        assert_eq!(PixelFormat::Pvrtc1Rgb4.level0_size(4, 4), 32);
        assert_eq!(PixelFormat::Pvrtc1Rgb2.level0_size(4, 4), 32);
        // ASTC 8x8: one block per 8x8 texels, 16 bytes each.
        assert_eq!(
            PixelFormat::Astc(AstcBlock::B8x8).level0_size(16, 16),
            4 * 16
        );
        assert_eq!(PixelFormat::Rgba.level0_size(2, 2), 16);
    }
}
