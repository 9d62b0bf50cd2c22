//! Weighted merging of two images.
//!
//! [`merge`] computes `alpha * A + (1 - alpha) * B` for every sample. The
//! weight is either a single [`AlphaWeight::Global`] value or a GRAY mask
//! giving one weight per pixel ([`AlphaWeight::PerPixel`]).
//!
//! Both inputs must have the same width, height and channel layout. RGBA
//! alpha is blended like any other channel.
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_ops::composite::{merge, AlphaWeight};
//!
//! let a = ImageBuffer::filled(4, 4, ChannelLayout::Rgb, &[1.0, 0.0, 0.0]).unwrap();
//! let b = ImageBuffer::filled(4, 4, ChannelLayout::Rgb, &[0.0, 0.0, 1.0]).unwrap();
//! let mixed = merge(&a, &b, &AlphaWeight::Global(0.25)).unwrap();
//! assert_eq!(mixed.pixel(0, 0).unwrap(), &[0.25, 0.0, 0.75]);
//! ```

use pixlab_core::{ChannelLayout, Error, ImageBuffer, Result, Shape};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::fill_rows;

/// Weight given to the first image in a merge.
#[derive(Debug, Clone, Copy)]
pub enum AlphaWeight<'a> {
    /// Same weight everywhere, in `[0, 1]`.
    Global(f32),
    /// Per-pixel weight from a GRAY mask the size of the inputs.
    PerPixel(&'a ImageBuffer),
}

impl AlphaWeight<'_> {
    fn validate(&self, a: &ImageBuffer) -> Result<()> {
        match *self {
            Self::Global(alpha) => {
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(Error::invalid_parameter("merge", "alpha", "a number in [0, 1]"));
                }
            }
            Self::PerPixel(mask) => {
                if mask.layout() != ChannelLayout::Gray {
                    return Err(Error::unsupported(
                        "merge",
                        format!("alpha mask must be gray, got {}", mask.layout()),
                    ));
                }
                if mask.dimensions() != a.dimensions() {
                    return Err(Error::dimension_mismatch(
                        "merge",
                        Shape::new(a.width(), a.height(), ChannelLayout::Gray),
                        mask.shape(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Blends `a` over `b` with the given weight.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `a` and `b` (or the mask) differ in size
///   or layout
/// - [`Error::InvalidParameter`] if a global alpha is outside `[0, 1]`
/// - [`Error::UnsupportedOperation`] if the mask is not GRAY
pub fn merge(a: &ImageBuffer, b: &ImageBuffer, weight: &AlphaWeight<'_>) -> Result<ImageBuffer> {
    trace!(width = a.width(), height = a.height(), ?weight, "composite::merge");
    if !a.same_shape(b) {
        return Err(Error::dimension_mismatch("merge", a.shape(), b.shape()));
    }
    weight.validate(a)?;

    let ch = a.channels();
    let row_len = a.width() as usize * ch;
    let mut dst = vec![0.0f32; a.samples().len()];

    fill_rows(&mut dst, row_len, |y, row| {
        let ra = a.row(y as u32);
        let rb = b.row(y as u32);
        let mask_row = match weight {
            AlphaWeight::PerPixel(mask) => Some(mask.row(y as u32)),
            AlphaWeight::Global(_) => None,
        };
        for (x, ((out, pa), pb)) in row
            .chunks_exact_mut(ch)
            .zip(ra.chunks_exact(ch))
            .zip(rb.chunks_exact(ch))
            .enumerate()
        {
            let alpha = match (weight, mask_row) {
                (AlphaWeight::Global(alpha), _) => *alpha,
                (_, Some(m)) => m[x],
                _ => 0.0,
            };
            for c in 0..ch {
                out[c] = alpha * pa[c] + (1.0 - alpha) * pb[c];
            }
        }
    });

    ImageBuffer::with_samples(a.width(), a.height(), a.layout(), dst)
}
