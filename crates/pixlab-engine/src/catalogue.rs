//! Operation names and legacy aliases.
//!
//! Names are matched case-insensitively and `_` is interchangeable with
//! `-`, so `Reduce_Resolution` and `reduce-resolution` are the same
//! operation. Besides the canonical names a few legacy names are accepted;
//! each resolves to a canonical kind plus a [`Preset`] that fixes some of its
//! parameters.

use std::fmt;

use pixlab_core::{Error, Result};
use pixlab_ops::{ColorModel, GrayMethod};
use serde::{Deserialize, Serialize};

/// Every operation the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Additive or multiplicative brightness.
    Brightness,
    /// Logarithmic or exponential contrast curve.
    Contrast,
    /// `1 - x` on every color sample.
    Negative,
    /// RGB to GRAY reduction.
    Grayscale,
    /// Hard threshold.
    Binarize,
    /// Rotation about the center with canvas expansion.
    Rotate,
    /// Rectangular extraction.
    Crop,
    /// Integer shift on the same canvas.
    Translate,
    /// Area-averaged down-sampling.
    ReduceResolution,
    /// Crop then bilinear up-sampling.
    EnlargeRegion,
    /// Weighted blend of two images.
    Merge,
    /// RGB/CMY channel algebra.
    Channel,
    /// Histogram query; the image is returned unchanged.
    Histogram,
}

impl OperationKind {
    /// All kinds in catalogue order.
    pub const ALL: [Self; 13] = [
        Self::Brightness,
        Self::Contrast,
        Self::Negative,
        Self::Grayscale,
        Self::Binarize,
        Self::Rotate,
        Self::Crop,
        Self::Translate,
        Self::ReduceResolution,
        Self::EnlargeRegion,
        Self::Merge,
        Self::Channel,
        Self::Histogram,
    ];

    /// Canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Negative => "negative",
            Self::Grayscale => "grayscale",
            Self::Binarize => "binarize",
            Self::Rotate => "rotate",
            Self::Crop => "crop",
            Self::Translate => "translate",
            Self::ReduceResolution => "reduce-resolution",
            Self::EnlargeRegion => "enlarge-region",
            Self::Merge => "merge",
            Self::Channel => "channel",
            Self::Histogram => "histogram",
        }
    }

    /// Returns `true` if the operation reads a second image.
    pub const fn needs_secondary(self) -> bool {
        matches!(self, Self::Merge)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters fixed by a legacy alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Canonical name, nothing fixed.
    #[default]
    None,
    /// `log_contrast`: logarithmic curve.
    LogContrast,
    /// `exp_contrast`: exponential curve, `k` accepted for `gamma`.
    ExpContrast,
    /// `grayscale_<method>`.
    Gray(GrayMethod),
    /// `merge_images`: `transparency` is the weight of the second image.
    LegacyMerge,
    /// `channel_<plane>`: keep or drop one plane depending on `enabled`,
    /// or extract it for CMY planes.
    Plane(ColorModel, usize),
}

const ALIASES: &[(&str, OperationKind, Preset)] = &[
    ("invert", OperationKind::Negative, Preset::None),
    ("log-contrast", OperationKind::Contrast, Preset::LogContrast),
    ("exp-contrast", OperationKind::Contrast, Preset::ExpContrast),
    ("grayscale-average", OperationKind::Grayscale, Preset::Gray(GrayMethod::Average)),
    ("grayscale-luminosity", OperationKind::Grayscale, Preset::Gray(GrayMethod::Luminosity)),
    ("grayscale-midgray", OperationKind::Grayscale, Preset::Gray(GrayMethod::Lightness)),
    ("merge-images", OperationKind::Merge, Preset::LegacyMerge),
    ("channel-red", OperationKind::Channel, Preset::Plane(ColorModel::Rgb, 0)),
    ("channel-green", OperationKind::Channel, Preset::Plane(ColorModel::Rgb, 1)),
    ("channel-blue", OperationKind::Channel, Preset::Plane(ColorModel::Rgb, 2)),
    ("channel-cyan", OperationKind::Channel, Preset::Plane(ColorModel::Cmy, 0)),
    ("channel-magenta", OperationKind::Channel, Preset::Plane(ColorModel::Cmy, 1)),
    ("channel-yellow", OperationKind::Channel, Preset::Plane(ColorModel::Cmy, 2)),
];

/// Lowercases and replaces `_` with `-`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

/// Maps a requested name to its kind and preset.
///
/// # Errors
///
/// [`Error::UnknownOperation`] if the name is neither canonical nor an alias.
pub fn resolve(name: &str) -> Result<(OperationKind, Preset)> {
    let key = normalize_name(name);
    if let Some(kind) = OperationKind::ALL.iter().find(|k| k.name() == key) {
        return Ok((*kind, Preset::None));
    }
    ALIASES
        .iter()
        .find(|(alias, _, _)| *alias == key)
        .map(|&(_, kind, preset)| (kind, preset))
        .ok_or_else(|| Error::unknown_operation(name))
}

/// Canonical names and aliases, for help output.
pub fn known_names() -> impl Iterator<Item = &'static str> {
    OperationKind::ALL
        .iter()
        .map(|k| k.name())
        .chain(ALIASES.iter().map(|(alias, _, _)| *alias))
}
