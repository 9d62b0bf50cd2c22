//! Channel algebra on RGB and CMY planes.
//!
//! A [`ChannelOp`] runs in four steps:
//!
//! 1. Read the color planes, converting RGB to CMY (`C = 1 - R` ...) when
//!    the model is [`ColorModel::Cmy`].
//! 2. Reorder the planes: output plane `j` takes input plane `order[j]`.
//! 3. Zero every output plane whose `keep` flag is false.
//! 4. Emit according to [`ChannelOutput`].
//!
//! Alpha is carried through unchanged unless a single plane is extracted.
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_ops::channels::{apply_channels, ChannelOp, ColorModel};
//!
//! let src = ImageBuffer::filled(2, 2, ChannelLayout::Rgb, &[0.25, 0.5, 1.0]).unwrap();
//! let cyan = ChannelOp::extract(ColorModel::Cmy, 0);
//! let plane = apply_channels(&src, &cyan).unwrap();
//! assert_eq!(plane.pixel(0, 0).unwrap(), &[0.75]);
//!
//! let swap = ChannelOp { order: [2, 1, 0], ..ChannelOp::default() };
//! let bgr = apply_channels(&src, &swap).unwrap();
//! assert_eq!(bgr.pixel(0, 0).unwrap(), &[1.0, 0.5, 0.25]);
//! ```

use std::str::FromStr;

use pixlab_core::{ChannelLayout, Error, ImageBuffer, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::parallel::map_pixels;

/// Color model the planes are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Cyan, magenta, yellow (`1 - RGB`).
    Cmy,
}

impl ColorModel {
    /// Plane names in model order.
    pub const fn plane_names(self) -> [&'static str; 3] {
        match self {
            Self::Rgb => ["red", "green", "blue"],
            Self::Cmy => ["cyan", "magenta", "yellow"],
        }
    }
}

impl FromStr for ColorModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "cmy" => Ok(Self::Cmy),
            _ => Err(Error::invalid_parameter("channel", "model", "rgb or cmy")),
        }
    }
}

/// What a [`ChannelOp`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOutput {
    /// The planes as produced, in the operation's model.
    #[default]
    Model,
    /// The planes converted back to RGB.
    Rgb,
    /// One plane as a GRAY buffer.
    Extract(usize),
}

/// A channel reorder/mask/extract request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOp {
    /// Model the planes are computed in.
    pub model: ColorModel,
    /// Source plane for each output plane.
    pub order: [usize; 3],
    /// Output planes to keep; dropped planes become zero.
    pub keep: [bool; 3],
    /// Output form.
    pub output: ChannelOutput,
}

impl Default for ChannelOp {
    fn default() -> Self {
        Self {
            model: ColorModel::Rgb,
            order: [0, 1, 2],
            keep: [true; 3],
            output: ChannelOutput::Model,
        }
    }
}

impl ChannelOp {
    /// Extracts plane `index` of `model` as a GRAY buffer.
    pub fn extract(model: ColorModel, index: usize) -> Self {
        Self {
            model,
            output: ChannelOutput::Extract(index),
            ..Self::default()
        }
    }

    /// Keeps only the planes flagged in `keep`, leaving order unchanged.
    pub fn mask(model: ColorModel, keep: [bool; 3]) -> Self {
        Self {
            model,
            keep,
            ..Self::default()
        }
    }

    /// Checks that `order` is a permutation and the extract index exists.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; 3];
        for &i in &self.order {
            if i > 2 || seen[i] {
                return Err(Error::invalid_parameter(
                    "channel",
                    "order",
                    "a permutation of [0, 1, 2]",
                ));
            }
            seen[i] = true;
        }
        if let ChannelOutput::Extract(i) = self.output {
            if i > 2 {
                return Err(Error::invalid_parameter(
                    "channel",
                    "extract",
                    "a plane index in 0..=2",
                ));
            }
        }
        Ok(())
    }

    #[inline]
    fn planes(&self, px: &[f32]) -> [f32; 3] {
        let read = |i: usize| match self.model {
            ColorModel::Rgb => px[i],
            ColorModel::Cmy => 1.0 - px[i],
        };
        let mut out = [0.0f32; 3];
        for j in 0..3 {
            out[j] = if self.keep[j] { read(self.order[j]) } else { 0.0 };
        }
        out
    }
}

/// Applies a channel operation to an RGB or RGBA buffer.
///
/// # Errors
///
/// - [`Error::UnsupportedOperation`] for GRAY input
/// - [`Error::InvalidParameter`] if the op fails [`ChannelOp::validate`]
pub fn apply_channels(src: &ImageBuffer, op: &ChannelOp) -> Result<ImageBuffer> {
    trace!(?op, width = src.width(), height = src.height(), "channels::apply_channels");
    if !src.layout().is_color() {
        return Err(Error::unsupported("channel", "input has no color planes"));
    }
    op.validate()?;

    match op.output {
        ChannelOutput::Extract(index) => {
            debug!(plane = op.model.plane_names()[index], "extracting plane");
            map_pixels(src, ChannelLayout::Gray, |px, out| {
                out[0] = op.planes(px)[index];
            })
        }
        ChannelOutput::Model | ChannelOutput::Rgb => {
            let back_to_rgb = op.output == ChannelOutput::Rgb && op.model == ColorModel::Cmy;
            map_pixels(src, src.layout(), |px, out| {
                let planes = op.planes(px);
                for c in 0..3 {
                    out[c] = if back_to_rgb { 1.0 - planes[c] } else { planes[c] };
                }
                if let Some(a) = px.get(3) {
                    out[3] = *a;
                }
            })
        }
    }
}
