//! CLI command implementations

pub mod apply;
pub mod histogram;
pub mod info;
pub mod pipeline;

use anyhow::{Context, Result, bail};
use pixlab_core::ImageBuffer;
use serde_json::Value;
use std::path::Path;

use crate::AuxArgs;

/// Load image from path
pub fn load_image(path: &Path) -> Result<ImageBuffer> {
    crate::io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageBuffer) -> Result<()> {
    crate::io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Decoded `--other` and `--mask` images.
#[derive(Default)]
pub struct AuxImages {
    pub other: Option<ImageBuffer>,
    pub mask: Option<ImageBuffer>,
}

impl AuxImages {
    pub fn load(args: &AuxArgs) -> Result<Self> {
        Ok(Self {
            other: args.other.as_deref().map(load_image).transpose()?,
            mask: args.mask.as_deref().map(load_image).transpose()?,
        })
    }

    pub fn as_aux(&self) -> pixlab_engine::Auxiliary<'_> {
        let mut aux = pixlab_engine::Auxiliary::none();
        if let Some(other) = &self.other {
            aux = aux.with_secondary(other);
        }
        if let Some(mask) = &self.mask {
            aux = aux.with_mask(mask);
        }
        aux
    }
}

/// Splits `key=value`; the value is parsed as JSON when it can be.
pub fn parse_param(arg: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = arg.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{arg}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty parameter name in '{arg}'");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
