//! Geometric transformations: crop, translate, rotate.
//!
//! Each operation maps destination pixels back to source coordinates.
//! Anything that lands outside the source takes the fill pixel from
//! [`FillPolicy`].
//!
//! # Conventions
//!
//! - `translate(dx, dy)`: positive `dx` moves content right, positive `dy` down.
//! - `rotate(angle)`: degrees, positive is counter-clockwise as seen on
//!   screen, about the image center. The canvas grows to hold the whole
//!   rotated image, so a 90 degree turn of a `W x H` image is `H x W`.
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer, Rect};
//! use pixlab_ops::transform::crop;
//!
//! let src = ImageBuffer::filled(64, 64, ChannelLayout::Rgb, &[0.5, 0.5, 0.5]).unwrap();
//! let cropped = crop(&src, Rect::new(10, 10, 20, 20)).unwrap();
//! assert_eq!(cropped.dimensions(), (20, 20));
//! ```

use pixlab_core::{Error, ImageBuffer, Rect, Result};
use tracing::{debug, trace};

use crate::parallel::fill_rows;
use crate::sample::{BorderMode, FillPolicy, Interpolation, Sampler};

/// Extracts the pixels inside `region`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if the region is empty or reaches past the
/// buffer edges.
pub fn crop(src: &ImageBuffer, region: Rect) -> Result<ImageBuffer> {
    trace!(?region, width = src.width(), height = src.height(), "transform::crop");
    check_region("crop", src, region)?;

    let ch = src.channels();
    let mut dst = Vec::with_capacity(region.area() as usize * ch);
    for row in region.y..region.bottom() {
        let start = region.x as usize * ch;
        dst.extend_from_slice(&src.row(row)[start..start + region.width as usize * ch]);
    }

    ImageBuffer::with_samples(region.width, region.height, src.layout(), dst)
}

/// Validates that `region` is non-empty and inside a `width x height` canvas.
pub fn check_region_in(operation: &str, width: u32, height: u32, region: Rect) -> Result<()> {
    if region.is_empty() || !region.fits_within(width, height) {
        return Err(Error::invalid_parameter(
            operation,
            "region",
            format!(
                "a non-empty rectangle inside {}x{}, got {}x{} at ({}, {})",
                width,
                height,
                region.width,
                region.height,
                region.x,
                region.y
            ),
        ));
    }
    Ok(())
}

pub(crate) fn check_region(operation: &str, src: &ImageBuffer, region: Rect) -> Result<()> {
    check_region_in(operation, src.width(), src.height(), region)
}

/// Shifts content by `(dx, dy)` pixels on the same canvas.
pub fn translate(src: &ImageBuffer, dx: i64, dy: i64, fill: &FillPolicy) -> Result<ImageBuffer> {
    trace!(dx, dy, width = src.width(), height = src.height(), "transform::translate");
    let fill = fill.resolve("translate", src.layout())?;
    let (w, h) = (src.width() as i64, src.height() as i64);
    let ch = src.channels();
    let mut dst = vec![0.0f32; src.samples().len()];

    fill_rows(&mut dst, w as usize * ch, |y, row| {
        // Offsets near i64::MIN overflow; those sources are off-canvas.
        let sy = (y as i64).checked_sub(dy).filter(|v| (0..h).contains(v));
        for x in 0..w {
            let sx = x.checked_sub(dx).filter(|v| (0..w).contains(v));
            let out = &mut row[x as usize * ch..(x as usize + 1) * ch];
            match (sx, sy) {
                (Some(sx), Some(sy)) => {
                    let start = sx as usize * ch;
                    out.copy_from_slice(&src.row(sy as u32)[start..start + ch]);
                }
                _ => out.copy_from_slice(&fill),
            }
        }
    });

    ImageBuffer::with_samples(src.width(), src.height(), src.layout(), dst)
}

/// Cosine and sine of `degrees`, with right angles made exact.
fn exact_sin_cos(degrees: f64) -> (f64, f64) {
    let (mut s, mut c) = degrees.rem_euclid(360.0).to_radians().sin_cos();
    for v in [&mut s, &mut c] {
        if v.abs() < 1e-12 {
            *v = 0.0;
        } else if (v.abs() - 1.0).abs() < 1e-12 {
            *v = v.signum();
        }
    }
    (s, c)
}

/// Canvas size needed to hold a `width x height` image rotated by `degrees`.
pub fn rotated_extent(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (s, c) = exact_sin_cos(degrees);
    let (w, h) = (width as f64, height as f64);
    let new_w = (w * c.abs() + h * s.abs() - 1e-6).ceil().max(1.0);
    let new_h = (w * s.abs() + h * c.abs() - 1e-6).ceil().max(1.0);
    (new_w as u32, new_h as u32)
}

/// Rotates by `degrees` counter-clockwise about the center, expanding the
/// canvas to fit.
pub fn rotate(
    src: &ImageBuffer,
    degrees: f64,
    interpolation: Interpolation,
    fill: &FillPolicy,
) -> Result<ImageBuffer> {
    trace!(
        degrees,
        ?interpolation,
        width = src.width(),
        height = src.height(),
        "transform::rotate"
    );
    if !degrees.is_finite() {
        return Err(Error::invalid_parameter("rotate", "angle", "a finite number of degrees"));
    }
    let fill = fill.resolve("rotate", src.layout())?;
    let (s, c) = exact_sin_cos(degrees);
    let (new_w, new_h) = rotated_extent(src.width(), src.height(), degrees);
    debug!(new_w, new_h, "rotated canvas");

    let src_cx = (src.width() as f64 - 1.0) / 2.0;
    let src_cy = (src.height() as f64 - 1.0) / 2.0;
    let dst_cx = (new_w as f64 - 1.0) / 2.0;
    let dst_cy = (new_h as f64 - 1.0) / 2.0;

    let ch = src.channels();
    let sampler = Sampler::new(src, &fill, BorderMode::Fill, interpolation);
    let mut dst = vec![0.0f32; new_w as usize * new_h as usize * ch];

    fill_rows(&mut dst, new_w as usize * ch, |y, row| {
        let ry = y as f64 - dst_cy;
        for (x, out) in row.chunks_exact_mut(ch).enumerate() {
            let rx = x as f64 - dst_cx;
            // inverse of the on-screen counter-clockwise rotation (y down)
            let sx = c * rx - s * ry + src_cx;
            let sy = s * rx + c * ry + src_cy;
            sampler.sample(sx, sy, out);
        }
    });

    ImageBuffer::with_samples(new_w, new_h, src.layout(), dst)
}
