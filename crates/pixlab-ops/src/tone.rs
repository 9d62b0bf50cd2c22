//! Per-sample tone operations.
//!
//! All operations here are element-wise maps `f: [0,1] -> [0,1]` applied to
//! each color sample independently. The alpha sample of an RGBA buffer is
//! copied through untouched. Results are clamped by
//! [`ImageBuffer::with_samples`].
//!
//! # Operations
//!
//! - [`brightness`] - additive or multiplicative shift
//! - [`contrast`] - logarithmic or exponential (gamma) curve
//! - [`negative`] - `1 - x`
//! - [`grayscale`] - RGB to single channel (average, luminosity, lightness)
//! - [`binarize`] - hard threshold
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_ops::tone::{brightness, BrightnessMode};
//!
//! let img = ImageBuffer::filled(4, 4, ChannelLayout::Rgb, &[0.2, 0.1, 0.05]).unwrap();
//! let out = brightness(&img, 1.5, BrightnessMode::Multiplicative).unwrap();
//! assert!((out.samples()[0] - 0.3).abs() < 1e-6);
//! ```

use std::str::FromStr;

use pixlab_core::{ChannelLayout, Error, ImageBuffer, Result};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::map_pixels;

/// How the brightness factor is combined with each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessMode {
    /// `out = in + factor`
    #[default]
    Additive,
    /// `out = in * factor`
    Multiplicative,
}

impl FromStr for BrightnessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "additive" | "add" | "shift" => Ok(Self::Additive),
            "multiplicative" | "mul" | "multiply" | "scale" => Ok(Self::Multiplicative),
            _ => Err(Error::invalid_parameter(
                "brightness",
                "mode",
                "additive or multiplicative",
            )),
        }
    }
}

/// Contrast curve and its coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ContrastMode {
    /// `out = ln(1 + k*in) / ln(1 + k)`; brightens shadows.
    Logarithmic {
        /// Curve strength, `k > 0`
        k: f32,
    },
    /// `out = in^gamma`; `gamma > 1` darkens, `gamma < 1` brightens.
    Exponential {
        /// Exponent, `gamma > 0`
        gamma: f32,
    },
}

/// Reduction used to turn RGB into a single gray value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrayMethod {
    /// `(R + G + B) / 3`
    Average,
    /// `0.299 R + 0.587 G + 0.114 B`
    #[default]
    Luminosity,
    /// `(max(R,G,B) + min(R,G,B)) / 2`
    Lightness,
}

/// Rec.601 perceptual weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

fn gray_average(rgb: &[f32]) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}

fn gray_luminosity(rgb: &[f32]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

fn gray_lightness(rgb: &[f32]) -> f32 {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    (max + min) / 2.0
}

impl GrayMethod {
    /// The reducer for this method.
    #[inline]
    pub fn reducer(self) -> fn(&[f32]) -> f32 {
        match self {
            Self::Average => gray_average,
            Self::Luminosity => gray_luminosity,
            Self::Lightness => gray_lightness,
        }
    }

    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Luminosity => "luminosity",
            Self::Lightness => "lightness",
        }
    }
}

impl FromStr for GrayMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" => Ok(Self::Average),
            "luminosity" | "luma" | "luminance" => Ok(Self::Luminosity),
            "lightness" | "max" | "midgray" => Ok(Self::Lightness),
            _ => Err(Error::invalid_parameter(
                "grayscale",
                "method",
                "average, luminosity or lightness",
            )),
        }
    }
}

/// Applies `f` to every color sample, copying alpha through.
fn map_color<F>(src: &ImageBuffer, f: F) -> Result<ImageBuffer>
where
    F: Fn(f32) -> f32 + Sync + Send,
{
    let color = src.layout().color_channels();
    map_pixels(src, src.layout(), |px, out| {
        for c in 0..color {
            out[c] = f(px[c]);
        }
        for c in color..px.len() {
            out[c] = px[c];
        }
    })
}

fn require_finite(operation: &str, parameter: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_parameter(operation, parameter, "a finite number"))
    }
}

/// Shifts or scales every color sample.
///
/// Range policing of `factor` against configured bounds is done by the
/// caller; here it only has to be finite (and non-negative when
/// multiplicative).
pub fn brightness(src: &ImageBuffer, factor: f32, mode: BrightnessMode) -> Result<ImageBuffer> {
    trace!(factor, ?mode, width = src.width(), height = src.height(), "tone::brightness");
    require_finite("brightness", "factor", factor)?;
    match mode {
        BrightnessMode::Additive => map_color(src, |v| v + factor),
        BrightnessMode::Multiplicative => {
            if factor < 0.0 {
                return Err(Error::invalid_parameter(
                    "brightness",
                    "factor",
                    "a non-negative multiplier",
                ));
            }
            map_color(src, |v| v * factor)
        }
    }
}

/// Applies a logarithmic or exponential contrast curve.
pub fn contrast(src: &ImageBuffer, mode: ContrastMode) -> Result<ImageBuffer> {
    trace!(?mode, width = src.width(), height = src.height(), "tone::contrast");
    match mode {
        ContrastMode::Logarithmic { k } => {
            if !(k.is_finite() && k > 0.0) {
                return Err(Error::invalid_parameter("contrast", "k", "a positive number"));
            }
            let norm = k.ln_1p();
            map_color(src, |v| (k * v).ln_1p() / norm)
        }
        ContrastMode::Exponential { gamma } => {
            if !(gamma.is_finite() && gamma > 0.0) {
                return Err(Error::invalid_parameter(
                    "contrast",
                    "gamma",
                    "a positive number",
                ));
            }
            map_color(src, |v| v.powf(gamma))
        }
    }
}

/// Inverts every color sample: `1 - x`.
pub fn negative(src: &ImageBuffer) -> Result<ImageBuffer> {
    trace!(width = src.width(), height = src.height(), "tone::negative");
    map_color(src, |v| 1.0 - v)
}

/// Reduces RGB or RGBA to a single gray channel. Alpha is dropped.
///
/// # Errors
///
/// [`Error::UnsupportedOperation`] if the buffer has fewer than three channels.
pub fn grayscale(src: &ImageBuffer, method: GrayMethod) -> Result<ImageBuffer> {
    trace!(
        method = method.name(),
        width = src.width(),
        height = src.height(),
        "tone::grayscale"
    );
    if !src.layout().is_color() {
        return Err(Error::unsupported(
            "grayscale",
            format!("needs at least 3 channels, buffer is {}", src.layout()),
        ));
    }
    let reduce = method.reducer();
    map_pixels(src, ChannelLayout::Gray, |px, out| out[0] = reduce(&px[..3]))
}

/// Maps every color sample to `1.0` if it is at least `threshold`, else `0.0`.
pub fn binarize(src: &ImageBuffer, threshold: f32) -> Result<ImageBuffer> {
    trace!(threshold, width = src.width(), height = src.height(), "tone::binarize");
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::invalid_parameter(
            "binarize",
            "threshold",
            "a number in [0, 1]",
        ));
    }
    map_color(src, |v| if v >= threshold { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(layout: ChannelLayout) -> ImageBuffer {
        let n = 4 * 4 * layout.channels();
        let data = (0..n).map(|i| i as f32 / (n - 1) as f32).collect();
        ImageBuffer::new(4, 4, layout, data).unwrap()
    }

    #[test]
    fn test_brightness_additive_clamps() {
        let img = ImageBuffer::filled(2, 2, ChannelLayout::Rgb, &[0.2, 0.5, 0.9]).unwrap();
        let out = brightness(&img, 0.25, BrightnessMode::Additive).unwrap();
        let px = out.pixel(0, 0).unwrap();
        assert_abs_diff_eq!(px[0], 0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(px[1], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(px[2], 1.0);
    }

    #[test]
    fn test_brightness_multiplicative_example() {
        let img = ImageBuffer::filled(4, 4, ChannelLayout::Rgb, &[0.2, 0.1, 0.05]).unwrap();
        let out = brightness(&img, 1.5, BrightnessMode::Multiplicative).unwrap();
        for px in out.samples().chunks(3) {
            assert_abs_diff_eq!(px[0], 0.3, epsilon = 1e-6);
            assert_abs_diff_eq!(px[1], 0.15, epsilon = 1e-6);
            assert_abs_diff_eq!(px[2], 0.075, epsilon = 1e-6);
        }

        let bright = ImageBuffer::filled(1, 1, ChannelLayout::Rgb, &[0.8, 0.1, 0.05]).unwrap();
        let out = brightness(&bright, 1.5, BrightnessMode::Multiplicative).unwrap();
        assert_abs_diff_eq!(out.samples()[0], 1.0);
    }

    #[test]
    fn test_brightness_rejects_bad_factor() {
        let img = ramp(ChannelLayout::Gray);
        assert!(brightness(&img, f32::NAN, BrightnessMode::Additive).is_err());
        assert!(brightness(&img, -1.0, BrightnessMode::Multiplicative).is_err());
    }

    #[test]
    fn test_brightness_keeps_alpha() {
        let img = ImageBuffer::filled(1, 1, ChannelLayout::Rgba, &[0.5, 0.5, 0.5, 0.4]).unwrap();
        let out = brightness(&img, 0.5, BrightnessMode::Additive).unwrap();
        assert_eq!(out.pixel(0, 0).unwrap(), &[1.0, 1.0, 1.0, 0.4]);
    }

    #[test]
    fn test_contrast_log_endpoints() {
        let img = ImageBuffer::new(3, 1, ChannelLayout::Gray, vec![0.0, 0.5, 1.0]).unwrap();
        let out = contrast(&img, ContrastMode::Logarithmic { k: 9.0 }).unwrap();
        assert_abs_diff_eq!(out.samples()[0], 0.0);
        assert_abs_diff_eq!(out.samples()[2], 1.0, epsilon = 1e-6);
        // ln(5.5) / ln(10)
        assert_abs_diff_eq!(out.samples()[1], 0.740_362_7, epsilon = 1e-5);
    }

    #[test]
    fn test_contrast_exponential() {
        let img = ImageBuffer::new(2, 1, ChannelLayout::Gray, vec![0.5, 0.25]).unwrap();
        let out = contrast(&img, ContrastMode::Exponential { gamma: 2.0 }).unwrap();
        assert_abs_diff_eq!(out.samples()[0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(out.samples()[1], 0.0625, epsilon = 1e-6);
    }

    #[test]
    fn test_contrast_rejects_non_positive() {
        let img = ramp(ChannelLayout::Rgb);
        assert!(contrast(&img, ContrastMode::Logarithmic { k: 0.0 }).is_err());
        assert!(contrast(&img, ContrastMode::Exponential { gamma: -1.0 }).is_err());
    }

    #[test]
    fn test_negative_is_involutive() {
        for layout in [ChannelLayout::Gray, ChannelLayout::Rgb, ChannelLayout::Rgba] {
            let img = ramp(layout);
            let twice = negative(&negative(&img).unwrap()).unwrap();
            for (a, b) in img.samples().iter().zip(twice.samples()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_grayscale_methods() {
        let img = ImageBuffer::filled(1, 1, ChannelLayout::Rgb, &[0.9, 0.3, 0.0]).unwrap();
        let avg = grayscale(&img, GrayMethod::Average).unwrap();
        let lum = grayscale(&img, GrayMethod::Luminosity).unwrap();
        let light = grayscale(&img, GrayMethod::Lightness).unwrap();
        assert_abs_diff_eq!(avg.samples()[0], 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(lum.samples()[0], 0.299 * 0.9 + 0.587 * 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(light.samples()[0], 0.45, epsilon = 1e-6);
    }

    #[test]
    fn test_grayscale_output_is_single_channel() {
        for layout in [ChannelLayout::Rgb, ChannelLayout::Rgba] {
            let out = grayscale(&ramp(layout), GrayMethod::Luminosity).unwrap();
            assert_eq!(out.channels(), 1);
            assert_eq!(out.dimensions(), (4, 4));
        }
    }

    #[test]
    fn test_grayscale_rejects_gray() {
        let err = grayscale(&ramp(ChannelLayout::Gray), GrayMethod::Average).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_binarize() {
        let img = ImageBuffer::new(3, 1, ChannelLayout::Gray, vec![0.2, 0.5, 0.8]).unwrap();
        let out = binarize(&img, 0.5).unwrap();
        assert_eq!(out.samples(), &[0.0, 1.0, 1.0]);
        assert!(binarize(&img, 1.5).is_err());
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!("midgray".parse::<GrayMethod>(), Ok(GrayMethod::Lightness));
        assert_eq!("Mul".parse::<BrightnessMode>(), Ok(BrightnessMode::Multiplicative));
        let err = "sepia".parse::<GrayMethod>().unwrap_err();
        assert!(err.is_parameter_error());
        assert!(err.to_string().contains("average, luminosity or lightness"));
        assert!(matches!(
            "dim".parse::<BrightnessMode>(),
            Err(Error::InvalidParameter { ref parameter, .. }) if parameter == "mode"
        ));
    }

    #[test]
    fn test_all_outputs_in_range() {
        let img = ramp(ChannelLayout::Rgba);
        let outs = [
            brightness(&img, 0.7, BrightnessMode::Additive).unwrap(),
            brightness(&img, -0.7, BrightnessMode::Additive).unwrap(),
            brightness(&img, 3.0, BrightnessMode::Multiplicative).unwrap(),
            contrast(&img, ContrastMode::Logarithmic { k: 100.0 }).unwrap(),
            contrast(&img, ContrastMode::Exponential { gamma: 0.1 }).unwrap(),
            negative(&img).unwrap(),
            binarize(&img, 0.3).unwrap(),
        ];
        for out in outs {
            assert!(out.samples().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
