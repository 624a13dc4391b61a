//! External encoder invocation: workspace file I/O, process spawn, awaited
//! exit, output readback.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::debug;

use crate::asset::CompressedResult;
use crate::error::CompressError;

use super::options::CompressionOptions;
use super::policy;
use super::preprocess::EncoderInput;
use super::workspace::TempWorkspace;

/// Directory searched for encoder executables before falling back to `PATH`.
pub const TOOL_DIR_ENV: &str = "TEXPRESS_TOOL_DIR";

/// Run the external encoder for one image and read back its output.
///
/// No retries and no timeout: a failing encoder is terminal for this image,
/// a hung one stalls only this task.
pub(crate) async fn compress(
    input: EncoderInput,
    options: &CompressionOptions,
    transparent: bool,
    workspace: &TempWorkspace,
) -> Result<CompressedResult, CompressError> {
    let input_path = match input {
        EncoderInput::Path(path) => path,
        EncoderInput::Bytes { data, extension } => {
            let path = workspace.input_path(&extension);
            tokio::fs::write(&path, &data).await?;
            path
        }
    };

    let extension = options.format.container_extension();
    let output_path = workspace.output_path(extension);
    let invocation = policy::build_invocation(&input_path, &output_path, options, transparent);
    let executable = resolve_tool(invocation.tool)?;

    debug!(
        tool = invocation.tool,
        input = %input_path.display(),
        output = %output_path.display(),
        "spawning encoder"
    );
    let output = Command::new(&executable)
        .args(&invocation.args)
        .output()
        .await
        .map_err(|source| CompressError::ToolSpawn {
            tool: invocation.tool,
            source,
        })?;

    if !output.status.success() {
        return Err(CompressError::ToolExit {
            tool: invocation.tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let data = tokio::fs::read(&output_path).await?;
    Ok(CompressedResult { data, extension })
}

/// Locate an encoder executable: the override directory first, then `PATH`.
fn resolve_tool(tool: &'static str) -> Result<PathBuf, CompressError> {
    if let Ok(dir) = std::env::var(TOOL_DIR_ENV) {
        let candidate = PathBuf::from(dir).join(tool);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    which::which(tool).map_err(|e| CompressError::ToolSpawn {
        tool,
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })
}
