//! The normalized image buffer every operation consumes and produces.
//!
//! # Memory Layout
//!
//! Samples are interleaved `f32` values stored row-major, top-to-bottom:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! Logically the buffer is shaped `[height][width][channels]`.
//!
//! # Invariants
//!
//! - `width >= 1` and `height >= 1`
//! - `samples().len() == width * height * channels`
//! - every sample lies in `[0.0, 1.0]`
//!
//! A buffer is never mutated after construction. Operations borrow their
//! input and build a fresh buffer through [`ImageBuffer::with_samples`], which
//! is where the range invariant is enforced for derived data.
//!
//! # Usage
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//!
//! let img = ImageBuffer::filled(4, 2, ChannelLayout::Rgb, &[0.2, 0.1, 0.05]).unwrap();
//! assert_eq!(img.dimensions(), (4, 2));
//! assert_eq!(img.pixel(3, 1), Some(&[0.2, 0.1, 0.05][..]));
//! assert_eq!(img.sample(0, 0, 2), Some(0.05));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ChannelLayout, Error, Result};

/// Width, height and layout of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel layout
    pub layout: ChannelLayout,
}

impl Shape {
    /// Creates a shape.
    #[inline]
    pub const fn new(width: u32, height: u32, layout: ChannelLayout) -> Self {
        Self {
            width,
            height,
            layout,
        }
    }

    /// Samples per pixel.
    #[inline]
    pub const fn channels(&self) -> usize {
        self.layout.channels()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels())
    }
}

/// Immutable, channel-tagged grid of normalized samples.
///
/// Sample storage sits behind an [`Arc`], so cloning is cheap and buffers
/// can be shared read-only across threads.
#[derive(Clone, PartialEq)]
pub struct ImageBuffer {
    data: Arc<Vec<f32>>,
    width: u32,
    height: u32,
    layout: ChannelLayout,
}

impl ImageBuffer {
    /// Builds a buffer from decoded samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if a dimension is zero, the sample
    /// count does not equal `width * height * channels`, or any sample is
    /// non-finite or outside `[0, 1]`.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, data: Vec<f32>) -> Result<Self> {
        check_shape(width, height, layout, data.len())?;
        if let Some((i, v)) = data
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(Error::invalid_image(format!(
                "sample {i} is {v}, outside [0, 1]"
            )));
        }
        Ok(Self::from_parts(width, height, layout, data))
    }

    /// Builds a buffer from a raw channel count, as decoders report it.
    pub fn from_channel_count(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        Self::new(width, height, ChannelLayout::from_count(channels)?, data)
    }

    /// Builds a derived buffer, clamping every sample into `[0, 1]`.
    ///
    /// This is the constructor operations use for their output; the shape is
    /// re-validated and the range invariant is applied here rather than in
    /// each operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] on a bad shape or a non-finite sample.
    pub fn with_samples(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        mut data: Vec<f32>,
    ) -> Result<Self> {
        check_shape(width, height, layout, data.len())?;
        for (i, v) in data.iter_mut().enumerate() {
            if !v.is_finite() {
                return Err(Error::invalid_image(format!("sample {i} is not finite")));
            }
            *v = v.clamp(0.0, 1.0);
        }
        Ok(Self::from_parts(width, height, layout, data))
    }

    /// Builds a buffer where every pixel equals `pixel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if `pixel` does not have one value per
    /// channel or the values are out of range.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, pixel: &[f32]) -> Result<Self> {
        if pixel.len() != layout.channels() {
            return Err(Error::invalid_image(format!(
                "fill pixel has {} values, {layout} needs {}",
                pixel.len(),
                layout.channels()
            )));
        }
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * pixel.len());
        for _ in 0..count {
            data.extend_from_slice(pixel);
        }
        Self::new(width, height, layout, data)
    }

    fn from_parts(width: u32, height: u32, layout: ChannelLayout, data: Vec<f32>) -> Self {
        Self {
            data: Arc::new(data),
            width,
            height,
            layout,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel layout tag.
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Width, height and layout together.
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height, self.layout)
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// All samples, row-major and interleaved.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Index of the first sample of pixel `(x, y)`.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }

    /// The samples of pixel `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        Some(&self.data[start..start + self.channels()])
    }

    /// Channel `c` of pixel `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, c: usize) -> Option<f32> {
        self.pixel(x, y).and_then(|px| px.get(c).copied())
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let len = self.width as usize * self.channels();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Returns `true` if both buffers have equal width, height and layout.
    #[inline]
    pub fn same_shape(&self, other: &ImageBuffer) -> bool {
        self.shape() == other.shape()
    }
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .finish()
    }
}

fn check_shape(width: u32, height: u32, layout: ChannelLayout, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_image(format!(
            "dimensions {width}x{height} must both be at least 1"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(layout.channels()))
        .ok_or_else(|| Error::invalid_image("image dimensions overflow"))?;
    if len != expected {
        return Err(Error::invalid_image(format!(
            "expected {expected} samples for {width}x{height} {layout}, got {len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_and_accessors() {
        let data = vec![0.0, 0.5, 1.0, 0.25, 0.75, 0.125];
        let img = ImageBuffer::new(2, 1, ChannelLayout::Rgb, data).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 1);
        assert_eq!(img.channels(), 3);
        assert_eq!(img.pixel_count(), 2);
        assert_eq!(img.pixel(1, 0), Some(&[0.25, 0.75, 0.125][..]));
        assert_eq!(img.sample(0, 0, 1), Some(0.5));
        assert_eq!(img.sample(2, 0, 0), None);
        assert_eq!(img.sample(0, 0, 3), None);
    }

    #[test]
    fn test_rejects_empty() {
        let err = ImageBuffer::new(0, 4, ChannelLayout::Gray, vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage { .. }));
    }

    #[test]
    fn test_rejects_wrong_sample_count() {
        let err = ImageBuffer::new(2, 2, ChannelLayout::Rgb, vec![0.0; 11]).unwrap_err();
        assert!(err.to_string().contains("expected 12"));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![1.5]).is_err());
        assert!(ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![f32::NAN]).is_err());
    }

    #[test]
    fn test_unrecognized_channel_count() {
        assert!(ImageBuffer::from_channel_count(1, 1, 2, vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_with_samples_clamps() {
        let img = ImageBuffer::with_samples(2, 1, ChannelLayout::Gray, vec![-0.5, 1.5]).unwrap();
        assert_abs_diff_eq!(img.samples()[0], 0.0);
        assert_abs_diff_eq!(img.samples()[1], 1.0);
        assert!(ImageBuffer::with_samples(1, 1, ChannelLayout::Gray, vec![f32::INFINITY]).is_err());
    }

    #[test]
    fn test_filled_and_row() {
        let img = ImageBuffer::filled(3, 2, ChannelLayout::Rgba, &[0.1, 0.2, 0.3, 1.0]).unwrap();
        let row = img.row(1);
        assert_eq!(row.len(), 12);
        assert_eq!(&row[4..8], &[0.1, 0.2, 0.3, 1.0]);
        assert!(ImageBuffer::filled(1, 1, ChannelLayout::Rgb, &[0.0]).is_err());
    }

    #[test]
    fn test_clone_shares_samples() {
        let a = ImageBuffer::filled(2, 2, ChannelLayout::Gray, &[0.5]).unwrap();
        let b = a.clone();
        assert!(a.same_shape(&b));
        assert_eq!(a.samples().as_ptr(), b.samples().as_ptr());
    }

    #[test]
    fn test_shape_display() {
        let img = ImageBuffer::filled(4, 3, ChannelLayout::Rgb, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(img.shape().to_string(), "4x3x3");
    }
}
