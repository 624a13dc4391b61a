//! Compression orchestration.
//!
//! Validates options up front, fans one independent task out per image over
//! a shared temp workspace, waits for every task to settle, then removes the
//! workspace exactly once.

mod encoder;
mod options;
mod policy;
mod preprocess;
mod workspace;

pub use encoder::TOOL_DIR_ENV;
pub use options::{CompressionOptions, TextureFormat};
pub use policy::{EncoderInvocation, FormatPolicy};
pub use workspace::TempWorkspace;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::asset::ImageAsset;
use crate::error::CompressError;

/// Outcome of a fully successful batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub compressed: usize,
}

/// Compress every image in place.
///
/// Option validation happens synchronously before any filesystem or process
/// activity. Per-image failures never stop sibling tasks; when any image
/// fails, the whole batch reports [`CompressError::Batch`] after all images
/// were attempted. The temp workspace is removed on every path once the
/// batch has settled.
pub async fn compress_all(
    images: &mut [ImageAsset],
    options: &CompressionOptions,
) -> Result<BatchSummary, CompressError> {
    options.validate()?;
    if images.is_empty() {
        return Ok(BatchSummary::default());
    }

    let workspace = TempWorkspace::create()?;
    let total = images.len();
    info!(total, format = %options.format, "compressing textures");

    let results = run_batch(images, options, &workspace).await;

    // `collect` inside run_batch only returns once every task has finished
    // its filesystem work; tearing the shared directory down is safe here
    // and nowhere earlier.
    workspace.close();

    let errors: Vec<(String, CompressError)> = results
        .into_iter()
        .filter_map(|(name, outcome)| outcome.err().map(|e| (name, e)))
        .collect();

    if errors.is_empty() {
        info!(compressed = total, "texture compression complete");
        Ok(BatchSummary { compressed: total })
    } else {
        Err(CompressError::Batch { total, errors })
    }
}

/// Fan out one task per image and wait for all of them.
async fn run_batch(
    images: &mut [ImageAsset],
    options: &CompressionOptions,
    workspace: &TempWorkspace,
) -> Vec<(String, Result<(), CompressError>)> {
    let concurrency = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    stream::iter(images.iter_mut())
        .map(|image| async move {
            let name = image.name.clone();
            let outcome = compress_one(image, options, workspace).await;
            (name, outcome)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}

/// One image's task: route input, run the encoder, install the result.
async fn compress_one(
    image: &mut ImageAsset,
    options: &CompressionOptions,
    workspace: &TempWorkspace,
) -> Result<(), CompressError> {
    let input = preprocess::prepare(image, options)?;
    let result = encoder::compress(input, options, image.transparent, workspace).await?;
    debug!(image = %image.name, bytes = result.data.len(), "installing compressed texture");
    image.install_compressed(result);
    Ok(())
}
