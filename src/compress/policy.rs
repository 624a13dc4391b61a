//! Per-format encoder policy: accepted inputs, power-of-two requirement and
//! CLI argument construction for each external tool.

use std::ffi::OsString;
use std::path::Path;

use super::options::{CompressionOptions, TextureFormat};

pub(crate) const PVRTEXTOOL: &str = "PVRTexToolCLI";
pub(crate) const ETCTOOL: &str = "EtcTool";
pub(crate) const ASTCENC: &str = "astcenc";
pub(crate) const CRUNCH: &str = "crunch";

/// Raw-input extensions each tool accepts directly; anything else is routed
/// through the PNG intermediate.
const PVRTEXTOOL_INPUTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "ktx"];
const ETCTOOL_INPUTS: &[&str] = &["png"];
const ASTCENC_INPUTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];
const CRUNCH_INPUTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "dds"];

/// Five-step presets shared by the tier-based encoders, slowest-to-best last.
const PVRTC_TIERS: [&str; 5] = [
    "pvrtcfastest",
    "pvrtcfast",
    "pvrtcnormal",
    "pvrtchigh",
    "pvrtcbest",
];
const ASTC_TIERS: [&str; 5] = ["-veryfast", "-fast", "-medium", "-thorough", "-exhaustive"];
const CRUNCH_TIERS: [&str; 5] = ["superfast", "fast", "normal", "better", "uber"];

/// Static, read-only description of how a format is encoded.
#[derive(Debug, Clone, Copy)]
pub struct FormatPolicy {
    pub input_extensions: &'static [&'static str],
    pub requires_power_of_two: bool,
    pub tool: &'static str,
}

impl FormatPolicy {
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.input_extensions.contains(&extension)
    }
}

const PVRTC_POLICY: FormatPolicy = FormatPolicy {
    input_extensions: PVRTEXTOOL_INPUTS,
    requires_power_of_two: true,
    tool: PVRTEXTOOL,
};
const ETC_POLICY: FormatPolicy = FormatPolicy {
    input_extensions: ETCTOOL_INPUTS,
    requires_power_of_two: false,
    tool: ETCTOOL,
};
const ASTC_POLICY: FormatPolicy = FormatPolicy {
    input_extensions: ASTCENC_INPUTS,
    requires_power_of_two: false,
    tool: ASTCENC,
};
const CRUNCH_POLICY: FormatPolicy = FormatPolicy {
    input_extensions: CRUNCH_INPUTS,
    requires_power_of_two: false,
    tool: CRUNCH,
};

impl TextureFormat {
    pub fn policy(self) -> &'static FormatPolicy {
        match self {
            TextureFormat::Pvrtc1 | TextureFormat::Pvrtc2 => &PVRTC_POLICY,
            TextureFormat::Etc1 | TextureFormat::Etc2 => &ETC_POLICY,
            TextureFormat::Astc => &ASTC_POLICY,
            TextureFormat::Dxt1
            | TextureFormat::Dxt3
            | TextureFormat::Dxt5
            | TextureFormat::CrunchDxt1
            | TextureFormat::CrunchDxt3
            | TextureFormat::CrunchDxt5 => &CRUNCH_POLICY,
        }
    }

    /// Extension of the emitted container, without the dot.
    pub fn container_extension(self) -> &'static str {
        match self {
            TextureFormat::CrunchDxt1
            | TextureFormat::CrunchDxt3
            | TextureFormat::CrunchDxt5 => "crn",
            _ => "ktx",
        }
    }
}

/// Fully resolved encoder command line; rebuilt fresh per image.
#[derive(Debug)]
pub struct EncoderInvocation {
    pub tool: &'static str,
    pub args: Vec<OsString>,
}

/// Build the command line for one image.
pub(crate) fn build_invocation(
    input: &Path,
    output: &Path,
    options: &CompressionOptions,
    transparent: bool,
) -> EncoderInvocation {
    match options.format {
        TextureFormat::Pvrtc1 | TextureFormat::Pvrtc2 => {
            pvrtc_invocation(input, output, options, transparent)
        }
        TextureFormat::Etc1 | TextureFormat::Etc2 => {
            etc_invocation(input, output, options, transparent)
        }
        TextureFormat::Astc => astc_invocation(input, output, options),
        TextureFormat::Dxt1
        | TextureFormat::Dxt3
        | TextureFormat::Dxt5
        | TextureFormat::CrunchDxt1
        | TextureFormat::CrunchDxt3
        | TextureFormat::CrunchDxt5 => crunch_invocation(input, output, options, transparent),
    }
}

/// Linear rescale of the shared 0-10 quality to a five-step preset index.
fn quality_tier(quality: u32) -> usize {
    ((quality.min(10) * 4 + 5) / 10) as usize
}

/// Linear rescale of the shared 0-10 quality to a percentage.
fn quality_percent(quality: u32) -> u32 {
    quality.min(10) * 10
}

/// Logical core count handed to encoders that thread internally.
fn core_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn pvrtc_invocation(
    input: &Path,
    output: &Path,
    options: &CompressionOptions,
    transparent: bool,
) -> EncoderInvocation {
    let bits = if options.bitrate == 4.0 { "4" } else { "2" };
    // PVRTC1 has distinct opaque variants; PVRTC2 always carries alpha.
    let variant = match (options.format, transparent) {
        (TextureFormat::Pvrtc1, true) => format!("PVRTC1_{bits}"),
        (TextureFormat::Pvrtc1, false) => format!("PVRTC1_{bits}_RGB"),
        _ => format!("PVRTC2_{bits}"),
    };
    let args = vec![
        OsString::from("-i"),
        input.into(),
        OsString::from("-o"),
        output.into(),
        OsString::from("-f"),
        variant.into(),
        OsString::from("-q"),
        PVRTC_TIERS[quality_tier(options.quality)].into(),
        // The tool normalizes to square power-of-two surfaces itself.
        OsString::from("-square"),
        OsString::from("+"),
        OsString::from("-pot"),
        OsString::from("+"),
    ];
    EncoderInvocation {
        tool: PVRTEXTOOL,
        args,
    }
}

fn etc_invocation(
    input: &Path,
    output: &Path,
    options: &CompressionOptions,
    transparent: bool,
) -> EncoderInvocation {
    let mode = match (options.format, transparent, options.alpha_bit) {
        (TextureFormat::Etc1, _, _) => "ETC1",
        (_, false, _) => "RGB8",
        (_, true, true) => "RGB8A1",
        (_, true, false) => "RGBA8",
    };
    let args = vec![
        input.into(),
        OsString::from("-format"),
        OsString::from(mode),
        OsString::from("-effort"),
        quality_percent(options.quality).to_string().into(),
        OsString::from("-jobs"),
        core_count().to_string().into(),
        OsString::from("-output"),
        output.into(),
    ];
    EncoderInvocation {
        tool: ETCTOOL,
        args,
    }
}

fn astc_invocation(input: &Path, output: &Path, options: &CompressionOptions) -> EncoderInvocation {
    let args = vec![
        OsString::from("-cl"),
        input.into(),
        output.into(),
        OsString::from(options.astc_block().as_str()),
        OsString::from(ASTC_TIERS[quality_tier(options.quality)]),
        OsString::from("-j"),
        core_count().to_string().into(),
    ];
    EncoderInvocation {
        tool: ASTCENC,
        args,
    }
}

fn crunch_invocation(
    input: &Path,
    output: &Path,
    options: &CompressionOptions,
    transparent: bool,
) -> EncoderInvocation {
    let dxt = match options.format {
        TextureFormat::Dxt1 | TextureFormat::CrunchDxt1 => {
            if transparent && options.alpha_bit {
                "-DXT1A"
            } else {
                "-DXT1"
            }
        }
        TextureFormat::Dxt3 | TextureFormat::CrunchDxt3 => "-DXT3",
        _ => "-DXT5",
    };
    let args = vec![
        OsString::from("-file"),
        input.into(),
        OsString::from("-out"),
        output.into(),
        OsString::from("-fileformat"),
        OsString::from(options.format.container_extension()),
        OsString::from(dxt),
        OsString::from("-dxtQuality"),
        OsString::from(CRUNCH_TIERS[quality_tier(options.quality)]),
        OsString::from("-helperThreads"),
        core_count().to_string().into(),
        OsString::from("-mipMode"),
        OsString::from("None"),
    ];
    EncoderInvocation { tool: CRUNCH, args }
}
