//! Resolution changes: area-averaged reduction and region enlargement.
//!
//! # Reduction
//!
//! [`reduce_resolution`] shrinks an image by a factor `>= 1` with an exact box
//! filter: every destination pixel is the average of the source area it
//! covers, partially covered source pixels weighted by their overlap. The
//! filter is separable, so it runs as a horizontal pass followed by a
//! vertical pass.
//!
//! # Enlargement
//!
//! [`enlarge_region`] crops a rectangle and up-samples it to a target size
//! with bilinear interpolation. Sampling is pixel-center aligned and edge
//! pixels are replicated, so a single pixel enlarges to a uniform block.
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_ops::resize::reduce_resolution;
//!
//! let src = ImageBuffer::filled(64, 64, ChannelLayout::Rgba, &[0.25, 0.5, 0.75, 1.0]).unwrap();
//! let dst = reduce_resolution(&src, 4.0).unwrap();
//! assert_eq!(dst.dimensions(), (16, 16));
//! ```

use pixlab_core::{Error, ImageBuffer, Rect, Result};
use tracing::{debug, trace};

use crate::parallel::fill_rows;
use crate::sample::{BorderMode, Interpolation, Sampler};
use crate::transform::{check_region, crop};

/// Source taps and weights for one destination index.
type Taps = Vec<(usize, f32)>;

/// Box-filter taps mapping `src_len` samples onto `dst_len` (`dst_len <= src_len`).
fn box_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|j| {
                    let overlap = end.min(j as f64 + 1.0) - start.max(j as f64);
                    (overlap > 0.0).then(|| (j, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// Reduces resolution by `factor` using area averaging.
///
/// The output is `max(1, floor(width / factor)) x max(1, floor(height / factor))`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `factor` is not a finite number `>= 1`.
pub fn reduce_resolution(src: &ImageBuffer, factor: f64) -> Result<ImageBuffer> {
    trace!(factor, width = src.width(), height = src.height(), "resize::reduce_resolution");
    if !(factor.is_finite() && factor >= 1.0) {
        return Err(Error::invalid_parameter(
            "reduce-resolution",
            "factor",
            "a number >= 1",
        ));
    }

    let (src_w, src_h) = (src.width() as usize, src.height() as usize);
    let dst_w = ((src_w as f64 / factor).floor() as usize).max(1);
    let dst_h = ((src_h as f64 / factor).floor() as usize).max(1);
    let ch = src.channels();
    debug!(dst_w, dst_h, "box filter target");

    // Horizontal pass: src_w -> dst_w, all source rows
    let x_taps = box_taps(src_w, dst_w);
    let mut temp = vec![0.0f32; dst_w * src_h * ch];
    fill_rows(&mut temp, dst_w * ch, |y, row| {
        let src_row = src.row(y as u32);
        for (x, taps) in x_taps.iter().enumerate() {
            let out = &mut row[x * ch..(x + 1) * ch];
            for &(sx, w) in taps {
                for c in 0..ch {
                    out[c] += src_row[sx * ch + c] * w;
                }
            }
        }
    });

    // Vertical pass: src_h -> dst_h
    let y_taps = box_taps(src_h, dst_h);
    let mut dst = vec![0.0f32; dst_w * dst_h * ch];
    let stride = dst_w * ch;
    fill_rows(&mut dst, stride, |y, row| {
        for &(sy, w) in &y_taps[y] {
            let src_row = &temp[sy * stride..(sy + 1) * stride];
            for (o, s) in row.iter_mut().zip(src_row) {
                *o += s * w;
            }
        }
    });

    ImageBuffer::with_samples(dst_w as u32, dst_h as u32, src.layout(), dst)
}

/// Crops `region` and up-samples it bilinearly to `target_width x target_height`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if the region is empty or out of bounds, or
/// the target is smaller than the region.
pub fn enlarge_region(
    src: &ImageBuffer,
    region: Rect,
    target_width: u32,
    target_height: u32,
) -> Result<ImageBuffer> {
    trace!(?region, target_width, target_height, "resize::enlarge_region");
    check_region("enlarge-region", src, region)?;
    if target_width < region.width || target_height < region.height {
        return Err(Error::invalid_parameter(
            "enlarge-region",
            "width/height",
            format!(
                "a target of at least {}x{} (the region size)",
                region.width, region.height
            ),
        ));
    }

    let patch = crop(src, region)?;
    let ch = patch.channels();
    let fill = vec![0.0f32; ch];
    let sampler = Sampler::new(&patch, &fill, BorderMode::Clamp, Interpolation::Bilinear);
    let scale_x = region.width as f64 / target_width as f64;
    let scale_y = region.height as f64 / target_height as f64;

    let mut dst = vec![0.0f32; target_width as usize * target_height as usize * ch];
    fill_rows(&mut dst, target_width as usize * ch, |y, row| {
        let sy = (y as f64 + 0.5) * scale_y - 0.5;
        for (x, out) in row.chunks_exact_mut(ch).enumerate() {
            let sx = (x as f64 + 0.5) * scale_x - 0.5;
            sampler.sample(sx, sy, out);
        }
    });

    ImageBuffer::with_samples(target_width, target_height, src.layout(), dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pixlab_core::ChannelLayout;

    #[test]
    fn test_box_taps_cover_source() {
        let taps = box_taps(5, 2);
        for t in &taps {
            let sum: f32 = t.iter().map(|&(_, w)| w).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        }
        // pixel 2 is split between both outputs
        assert!(taps[0].iter().any(|&(j, _)| j == 2));
        assert!(taps[1].iter().any(|&(j, _)| j == 2));
    }

    #[test]
    fn test_reduce_averages_blocks() {
        let src = ImageBuffer::new(
            4,
            2,
            ChannelLayout::Gray,
            vec![0.0, 1.0, 0.2, 0.4, 1.0, 0.0, 0.6, 0.8],
        )
        .unwrap();
        let dst = reduce_resolution(&src, 2.0).unwrap();
        assert_eq!(dst.dimensions(), (2, 1));
        assert_abs_diff_eq!(dst.samples()[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(dst.samples()[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_reduce_is_not_nearest() {
        // A checkerboard averages to gray instead of picking one phase
        let data = (0..64).map(|i| ((i % 8 + i / 8) % 2) as f32).collect();
        let src = ImageBuffer::new(8, 8, ChannelLayout::Gray, data).unwrap();
        let dst = reduce_resolution(&src, 2.0).unwrap();
        for v in dst.samples() {
            assert_abs_diff_eq!(*v, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_reduce_fractional_factor() {
        let src = ImageBuffer::filled(10, 7, ChannelLayout::Rgb, &[0.3, 0.6, 0.9]).unwrap();
        let dst = reduce_resolution(&src, 1.5).unwrap();
        assert_eq!(dst.dimensions(), (6, 4));
        for px in dst.samples().chunks(3) {
            assert_abs_diff_eq!(px[0], 0.3, epsilon = 1e-5);
            assert_abs_diff_eq!(px[2], 0.9, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_reduce_rejects_upscale() {
        let src = ImageBuffer::filled(4, 4, ChannelLayout::Gray, &[0.5]).unwrap();
        assert!(reduce_resolution(&src, 0.5).is_err());
        assert!(reduce_resolution(&src, f64::INFINITY).is_err());
        assert_eq!(reduce_resolution(&src, 100.0).unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn test_enlarge_single_pixel_is_uniform() {
        let mut data = vec![0.0f32; 3 * 3 * 3];
        // center pixel of the 3x3 grid
        data[12..15].copy_from_slice(&[0.9, 0.4, 0.1]);
        let src = ImageBuffer::new(3, 3, ChannelLayout::Rgb, data).unwrap();
        let out = enlarge_region(&src, Rect::new(1, 1, 1, 1), 5, 4).unwrap();
        assert_eq!(out.dimensions(), (5, 4));
        for px in out.samples().chunks(3) {
            assert_eq!(px, &[0.9, 0.4, 0.1]);
        }
    }

    #[test]
    fn test_enlarge_interpolates() {
        let src = ImageBuffer::new(2, 1, ChannelLayout::Gray, vec![0.0, 1.0]).unwrap();
        let out = enlarge_region(&src, Rect::new(0, 0, 2, 1), 4, 1).unwrap();
        let expect = [0.0, 0.25, 0.75, 1.0];
        for (a, b) in out.samples().iter().zip(expect) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_enlarge_rejects_bad_region_or_target() {
        let src = ImageBuffer::filled(4, 4, ChannelLayout::Gray, &[0.5]).unwrap();
        assert!(enlarge_region(&src, Rect::new(3, 3, 2, 2), 8, 8).is_err());
        assert!(enlarge_region(&src, Rect::new(0, 0, 2, 2), 1, 8).is_err());
    }
}
