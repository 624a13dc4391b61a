//! texpress - texture compression pipeline for GPU-ready assets.
//!
//! Drives external encoders (PVRTexTool, etc2comp's EtcTool, astcenc,
//! crunch) to compress images into GPU texture formats, and parses the
//! resulting KTX containers back into their structural parts.

pub mod asset;
pub mod compress;
pub mod error;
pub mod ktx;
pub mod pixels;

pub use asset::{CompressedResult, ImageAsset, ImageSource};
pub use compress::{compress_all, BatchSummary, CompressionOptions, TextureFormat};
pub use error::{CompressError, KtxError};
pub use ktx::{KtxContainer, PixelFormat};
