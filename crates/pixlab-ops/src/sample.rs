//! Shared sampling of a buffer at fractional coordinates.
//!
//! Geometric operations work backwards: for each destination pixel they
//! compute a source coordinate and ask a [`Sampler`] for the value there.
//! Pixel centers sit on integer coordinates, so `(0.0, 0.0)` is exactly the
//! top-left pixel.
//!
//! Neighbors outside the source are resolved by the [`BorderMode`]:
//! `Fill` substitutes the fill color (rotation, translation), `Clamp`
//! replicates the nearest edge pixel (up-sampling inside a region).

use std::str::FromStr;

use pixlab_core::{ChannelLayout, Error, ImageBuffer, Result};
use serde::{Deserialize, Serialize};

/// Coordinates closer than this to an integer are treated as that integer.
const SNAP_EPSILON: f64 = 1e-6;

/// Interpolation used for non-integer source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Round to the closest integer coordinate.
    Nearest,
    /// Weighted average of the four surrounding pixels.
    #[default]
    Bilinear,
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nn" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            _ => Err(Error::invalid_parameter(
                "rotate",
                "interpolation",
                "nearest or bilinear",
            )),
        }
    }
}

/// Value given to destination pixels whose source falls outside the image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// All samples zero: black for GRAY/RGB, transparent for RGBA.
    #[default]
    Zero,
    /// A caller-chosen pixel, one value per channel.
    Color(Vec<f32>),
}

impl FillPolicy {
    /// Expands the policy into one fill pixel for `layout`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if a custom color has the wrong number of
    /// values or a value outside `[0, 1]`.
    pub fn resolve(&self, operation: &str, layout: ChannelLayout) -> Result<Vec<f32>> {
        match self {
            Self::Zero => Ok(vec![0.0; layout.channels()]),
            Self::Color(values) => {
                let ok = values.len() == layout.channels()
                    && values.iter().all(|v| (0.0..=1.0).contains(v));
                if ok {
                    Ok(values.clone())
                } else {
                    Err(Error::invalid_parameter(
                        operation,
                        "fill",
                        format!("{} values in [0, 1]", layout.channels()),
                    ))
                }
            }
        }
    }
}

/// Resolution of neighbors outside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Use the fill pixel.
    Fill,
    /// Use the nearest edge pixel.
    Clamp,
}

/// Reads a buffer at fractional coordinates.
pub struct Sampler<'a> {
    src: &'a ImageBuffer,
    fill: &'a [f32],
    border: BorderMode,
    interpolation: Interpolation,
}

impl<'a> Sampler<'a> {
    /// Creates a sampler. `fill` must have one value per channel of `src`.
    pub fn new(
        src: &'a ImageBuffer,
        fill: &'a [f32],
        border: BorderMode,
        interpolation: Interpolation,
    ) -> Self {
        debug_assert_eq!(fill.len(), src.channels());
        Self {
            src,
            fill,
            border,
            interpolation,
        }
    }

    /// Pixel at integer coordinates, resolving out-of-bounds by border mode.
    #[inline]
    fn fetch(&self, x: i64, y: i64) -> &[f32] {
        let (w, h) = (self.src.width() as i64, self.src.height() as i64);
        let n = self.fill.len();
        let inside = x >= 0 && x < w && y >= 0 && y < h;
        match (inside, self.border) {
            (true, _) => &self.src.row(y as u32)[x as usize * n..][..n],
            (false, BorderMode::Fill) => self.fill,
            (false, BorderMode::Clamp) => {
                let cx = x.clamp(0, w - 1) as usize;
                let cy = y.clamp(0, h - 1) as u32;
                &self.src.row(cy)[cx * n..][..n]
            }
        }
    }

    /// Writes the value at `(x, y)` into `out`.
    pub fn sample(&self, x: f64, y: f64, out: &mut [f32]) {
        let x = snap(x);
        let y = snap(y);
        match self.interpolation {
            Interpolation::Nearest => {
                out.copy_from_slice(self.fetch(x.round() as i64, y.round() as i64));
            }
            Interpolation::Bilinear => {
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = (x - x0) as f32;
                let fy = (y - y0) as f32;
                let (ix, iy) = (x0 as i64, y0 as i64);

                let p00 = self.fetch(ix, iy);
                let p10 = self.fetch(ix + 1, iy);
                let p01 = self.fetch(ix, iy + 1);
                let p11 = self.fetch(ix + 1, iy + 1);

                // lerp form keeps uniform neighborhoods exact
                for c in 0..out.len() {
                    let top = p00[c] + (p10[c] - p00[c]) * fx;
                    let bot = p01[c] + (p11[c] - p01[c]) * fx;
                    out[c] = top + (bot - top) * fy;
                }
            }
        }
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON { r } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_interpolation() {
        assert_eq!("Linear".parse::<Interpolation>(), Ok(Interpolation::Bilinear));
        assert_eq!("nn".parse::<Interpolation>(), Ok(Interpolation::Nearest));
        let err = "cubic".parse::<Interpolation>().unwrap_err();
        assert!(err.to_string().contains("nearest or bilinear"));
    }

    fn two_by_two() -> ImageBuffer {
        ImageBuffer::new(2, 2, ChannelLayout::Gray, vec![0.0, 1.0, 0.5, 0.25]).unwrap()
    }

    #[test]
    fn test_bilinear_center() {
        let img = two_by_two();
        let fill = [0.0];
        let s = Sampler::new(&img, &fill, BorderMode::Fill, Interpolation::Bilinear);
        let mut out = [0.0];
        s.sample(0.5, 0.5, &mut out);
        assert_abs_diff_eq!(out[0], (0.0 + 1.0 + 0.5 + 0.25) / 4.0, epsilon = 1e-6);
        s.sample(1.0, 0.0, &mut out);
        assert_abs_diff_eq!(out[0], 1.0);
    }

    #[test]
    fn test_fill_outside() {
        let img = two_by_two();
        let fill = [0.75];
        let s = Sampler::new(&img, &fill, BorderMode::Fill, Interpolation::Bilinear);
        let mut out = [0.0];
        s.sample(-3.0, 0.0, &mut out);
        assert_abs_diff_eq!(out[0], 0.75);
        // halfway between pixel (1,0) and the fill beyond the right edge
        s.sample(1.5, 0.0, &mut out);
        assert_abs_diff_eq!(out[0], 0.875, epsilon = 1e-6);
    }

    #[test]
    fn test_clamp_replicates_edge() {
        let img = two_by_two();
        let fill = [0.0];
        let s = Sampler::new(&img, &fill, BorderMode::Clamp, Interpolation::Bilinear);
        let mut out = [0.0];
        s.sample(1.5, -0.5, &mut out);
        assert_abs_diff_eq!(out[0], 1.0);
    }

    #[test]
    fn test_nearest_rounds() {
        let img = two_by_two();
        let fill = [0.0];
        let s = Sampler::new(&img, &fill, BorderMode::Fill, Interpolation::Nearest);
        let mut out = [0.0];
        s.sample(0.6, 0.9, &mut out);
        assert_abs_diff_eq!(out[0], 0.25);
    }

    #[test]
    fn test_snap_near_integer() {
        let img = two_by_two();
        let fill = [0.0];
        let s = Sampler::new(&img, &fill, BorderMode::Fill, Interpolation::Bilinear);
        let mut out = [0.0];
        s.sample(-1e-12, 1.0 + 1e-12, &mut out);
        assert_abs_diff_eq!(out[0], 0.5);
    }

    #[test]
    fn test_fill_policy_resolve() {
        assert_eq!(
            FillPolicy::Zero.resolve("rotate", ChannelLayout::Rgba).unwrap(),
            vec![0.0; 4]
        );
        let custom = FillPolicy::Color(vec![1.0, 1.0, 1.0]);
        assert!(custom.resolve("rotate", ChannelLayout::Rgb).is_ok());
        assert!(custom.resolve("rotate", ChannelLayout::Rgba).is_err());
    }
}
