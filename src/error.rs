//! Error types for the compression pipeline and the KTX container parser.

use crate::compress::TextureFormat;

/// Errors raised while compressing a batch of images.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// Options rejected before any asynchronous work started.
    #[error("invalid compression options: {0}")]
    InvalidOptions(String),

    /// Raw pixel access was required but the image's raster format could not
    /// be decoded.
    #[error("image `{image}` has no decodable pixel data required for {format} compression")]
    UnsupportedInputFormat { image: String, format: TextureFormat },

    /// The encoder executable could not be found or spawned.
    #[error("failed to launch encoder `{tool}`: {source}")]
    ToolSpawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The encoder process ran but exited with a failure status.
    #[error("encoder `{tool}` exited with status {code:?}: {stderr}")]
    ToolExit {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// One or more per-image tasks failed. Every image was still attempted.
    #[error("{} of {total} images failed to compress", .errors.len())]
    Batch {
        total: usize,
        errors: Vec<(String, CompressError)>,
    },
}

/// Errors raised while decoding a KTX container.
#[derive(Debug, thiserror::Error)]
pub enum KtxError {
    /// The buffer is not a KTX 1.1 container.
    #[error("invalid KTX container: {0}")]
    InvalidContainer(&'static str),

    /// Big-endian containers are rejected, not byte-swapped.
    #[error("big-endian KTX containers are not supported")]
    WrongEndianness,

    /// glInternalFormat is not a recognized pixel format.
    #[error("unrecognized glInternalFormat 0x{0:04X}")]
    InvalidInternalFormat(u32),

    /// The container is well-formed but uses a feature this parser rejects.
    #[error("unsupported KTX feature: {0}")]
    UnsupportedFeature(String),
}
