//! KTX 1.1 container parsing.
//!
//! Decodes a little-endian KTX buffer into its pixel format, dimensions and a
//! non-owning slice of the level-0 texture data. Mipmaps beyond level 0,
//! key/value metadata, cubemaps, arrays and 3D textures are rejected or
//! dropped per the validation rules below.

mod format;

pub use format::{AstcBlock, PixelFormat};

use crate::error::KtxError;

/// KTX 1.1 file identifier.
const MAGIC: [u8; 12] = [
    0xAB, b'K', b'T', b'X', b' ', b'1', b'1', 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Value of the endianness field when the writer was little-endian.
const ENDIANNESS_LE: u32 = 0x0403_0201;

/// Fixed header size up to (not including) the key/value data block.
const HEADER_SIZE: usize = 64;

/// Sized internal formats some encoders emit in place of the base formats.
const GL_RGB8: u32 = 0x8051;
const GL_RGBA8: u32 = 0x8058;
const GL_RGB: u32 = 0x1907;
const GL_RGBA: u32 = 0x1908;

/// Decoded KTX container.
///
/// `data` is a borrowed view into the parsed buffer covering exactly one mip
/// level; nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct KtxContainer<'a> {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

fn read_u32(buffer: &[u8], offset: usize) -> Result<u32, KtxError> {
    let bytes = buffer
        .get(offset..offset + 4)
        .ok_or(KtxError::InvalidContainer("buffer shorter than header"))?;
    Ok(u32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
}

/// Parse and validate a KTX 1.1 container.
///
/// Only level 0 of a 2D, single-face, non-array texture is exposed. When a
/// compressed container declares more than one mip level, the returned slice
/// is truncated to the computed level-0 size and the trailing levels are
/// silently discarded.
pub fn parse(buffer: &[u8]) -> Result<KtxContainer<'_>, KtxError> {
    if buffer.len() < MAGIC.len() || buffer[..MAGIC.len()] != MAGIC {
        return Err(KtxError::InvalidContainer("magic bytes do not match"));
    }
    if read_u32(buffer, 12)? != ENDIANNESS_LE {
        return Err(KtxError::WrongEndianness);
    }

    let gl_type = read_u32(buffer, 16)?;
    let gl_type_size = read_u32(buffer, 20)?;
    let gl_format = read_u32(buffer, 24)?;
    let gl_internal_format = read_u32(buffer, 28)?;
    let gl_base_internal_format = read_u32(buffer, 32)?;
    let width = read_u32(buffer, 36)?;
    let height = read_u32(buffer, 40)?;
    let depth = read_u32(buffer, 44)?;
    let array_elements = read_u32(buffer, 48)?;
    let faces = read_u32(buffer, 52)?;
    let mip_levels = read_u32(buffer, 56)?;
    let kv_bytes = read_u32(buffer, 60)? as usize;

    // Tool-emitted sized-format aliases map to the base formats.
    let gl_internal_format = match gl_internal_format {
        GL_RGB8 => GL_RGB,
        GL_RGBA8 => GL_RGBA,
        other => other,
    };
    let format = PixelFormat::from_gl(gl_internal_format)
        .ok_or(KtxError::InvalidInternalFormat(gl_internal_format))?;

    if format.is_compressed() {
        if gl_type != 0 {
            return Err(KtxError::UnsupportedFeature(
                "compressed containers must have glType == 0".into(),
            ));
        }
        if gl_type_size != 1 {
            return Err(KtxError::UnsupportedFeature(
                "compressed containers must have glTypeSize == 1".into(),
            ));
        }
        if gl_format != 0 {
            return Err(KtxError::UnsupportedFeature(
                "compressed containers must have glFormat == 0".into(),
            ));
        }
        if mip_levels < 1 {
            return Err(KtxError::UnsupportedFeature(
                "containers must declare at least one mipmap level".into(),
            ));
        }
    } else if gl_base_internal_format != gl_format {
        return Err(KtxError::UnsupportedFeature(
            "glBaseInternalFormat must equal glFormat for uncompressed containers".into(),
        ));
    }

    if depth != 0 {
        return Err(KtxError::UnsupportedFeature("3D textures".into()));
    }
    if array_elements != 0 {
        return Err(KtxError::UnsupportedFeature("texture arrays".into()));
    }
    if faces != 1 {
        return Err(KtxError::UnsupportedFeature("cubemaps".into()));
    }

    let image_size_offset = HEADER_SIZE
        .checked_add(kv_bytes)
        .ok_or(KtxError::InvalidContainer("key/value length overflows"))?;
    let image_size = read_u32(buffer, image_size_offset)? as usize;
    let data_offset = image_size_offset + 4;
    if buffer.len() < data_offset + image_size {
        return Err(KtxError::InvalidContainer("texture data truncated"));
    }

    // Only level 0 is exposed; a multi-mip compressed container is cut down
    // to the size computed from the format's block layout.
    let mut data_len = image_size;
    if format.is_compressed() && mip_levels > 1 {
        data_len = format.level0_size(width, height);
        if buffer.len() < data_offset + data_len {
            return Err(KtxError::InvalidContainer("texture data truncated"));
        }
    }

    Ok(KtxContainer {
        format,
        width,
        height,
        data: &buffer[data_offset..data_offset + data_len],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KtxBuilder {
        gl_type: u32,
        gl_type_size: u32,
        gl_format: u32,
        gl_internal_format: u32,
        gl_base_internal_format: u32,
        width: u32,
        height: u32,
        depth: u32,
        array_elements: u32,
        faces: u32,
        mip_levels: u32,
        key_value: Vec<u8>,
        data: Vec<u8>,
    }

    impl KtxBuilder {
        /// A valid single-level compressed container for the given format.
        fn compressed(format: PixelFormat, width: u32, height: u32) -> Self {
            let data = vec![0xA5; format.level0_size(width, height)];
            Self {
                gl_type: 0,
                gl_type_size: 1,
                gl_format: 0,
                gl_internal_format: format.gl_code(),
                gl_base_internal_format: 0x1907,
                width,
                height,
                depth: 0,
                array_elements: 0,
                faces: 1,
                mip_levels: 1,
                key_value: Vec::new(),
                data,
            }
        }

        fn uncompressed(gl_internal_format: u32, gl_format: u32, width: u32, height: u32) -> Self {
            Self {
                gl_type: 0x1401, // GL_UNSIGNED_BYTE
                gl_type_size: 1,
                gl_format,
                gl_internal_format,
                gl_base_internal_format: gl_format,
                width,
                height,
                depth: 0,
                array_elements: 0,
                faces: 1,
                mip_levels: 1,
                key_value: Vec::new(),
                data: vec![0xC3; (width * height * 4) as usize],
            }
        }

        fn build(&self) -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(&MAGIC);
            for value in [
                ENDIANNESS_LE,
                self.gl_type,
                self.gl_type_size,
                self.gl_format,
                self.gl_internal_format,
                self.gl_base_internal_format,
                self.width,
                self.height,
                self.depth,
                self.array_elements,
                self.faces,
                self.mip_levels,
                self.key_value.len() as u32,
            ] {
                out.extend_from_slice(&value.to_le_bytes());
            }
            out.extend_from_slice(&self.key_value);
            out.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&self.data);
            out
        }
    }

    #[test]
    fn parses_single_level_compressed_container() {
        let buffer = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8).build();
        let ktx = parse(&buffer).unwrap();
        assert_eq!(ktx.format, PixelFormat::Etc1);
        assert_eq!(ktx.width, 8);
        assert_eq!(ktx.height, 8);
        assert_eq!(ktx.data.len(), 32);
        assert!(ktx.data.iter().all(|b| *b == 0xA5));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buffer = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8).build();
        buffer[0] = 0x00;
        assert!(matches!(
            parse(&buffer),
            Err(KtxError::InvalidContainer(_))
        ));
    }

    #[test]
    fn rejects_big_endian_marker() {
        let mut buffer = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8).build();
        buffer[12..16].copy_from_slice(&0x0102_0304u32.to_le_bytes());
        assert!(matches!(parse(&buffer), Err(KtxError::WrongEndianness)));
    }

    #[test]
    fn remaps_sized_internal_formats() {
        let rgb = KtxBuilder::uncompressed(0x8051, 0x1907, 2, 2).build();
        assert_eq!(parse(&rgb).unwrap().format, PixelFormat::Rgb);

        let rgba = KtxBuilder::uncompressed(0x8058, 0x1908, 2, 2).build();
        assert_eq!(parse(&rgba).unwrap().format, PixelFormat::Rgba);
    }

    #[test]
    fn rejects_unknown_internal_format() {
        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.gl_internal_format = 0xBEEF;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::InvalidInternalFormat(0xBEEF))
        ));
    }

    #[test]
    fn rejects_compressed_field_violations() {
        let mut builder = KtxBuilder::compressed(PixelFormat::Dxt1Rgb, 8, 8);
        builder.gl_type = 0x1401;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("glType")
        ));

        let mut builder = KtxBuilder::compressed(PixelFormat::Dxt1Rgb, 8, 8);
        builder.gl_format = 0x1907;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("glFormat")
        ));

        let mut builder = KtxBuilder::compressed(PixelFormat::Dxt1Rgb, 8, 8);
        builder.mip_levels = 0;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("mipmap")
        ));
    }

    #[test]
    fn rejects_uncompressed_format_mismatch() {
        let mut builder = KtxBuilder::uncompressed(0x1908, 0x1908, 2, 2);
        builder.gl_base_internal_format = 0x1907;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn rejects_depth_arrays_and_cubemaps() {
        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.depth = 8;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("3D")
        ));

        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.array_elements = 4;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("arrays")
        ));

        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.faces = 6;
        assert!(matches!(
            parse(&builder.build()),
            Err(KtxError::UnsupportedFeature(m)) if m.contains("cubemaps")
        ));
    }

    #[test]
    fn skips_key_value_data() {
        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.key_value = vec![0xFF; 24];
        let bytes = builder.build();
        let ktx = parse(&bytes).unwrap();
        assert_eq!(ktx.data.len(), 32);
        assert!(ktx.data.iter().all(|b| *b == 0xA5));
    }

    #[test]
    fn truncates_extra_mip_levels_to_level_zero() {
        // Declare three mip levels and append the extra level data; the
        // parsed view must cover exactly the computed level-0 size.
        let mut builder = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8);
        builder.mip_levels = 3;
        builder.data.extend_from_slice(&[0x11; 8 + 8]);
        let buffer = builder.build();

        let ktx = parse(&buffer).unwrap();
        assert_eq!(ktx.data.len(), PixelFormat::Etc1.level0_size(8, 8));
        assert!(ktx.data.iter().all(|b| *b == 0xA5));
    }

    #[test]
    fn rejects_truncated_texture_data() {
        let mut buffer = KtxBuilder::compressed(PixelFormat::Etc1, 8, 8).build();
        buffer.truncate(buffer.len() - 4);
        assert!(matches!(
            parse(&buffer),
            Err(KtxError::InvalidContainer("texture data truncated"))
        ));
    }
}
