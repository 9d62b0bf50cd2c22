//! Conversion between decoded files and [`ImageBuffer`].
//!
//! Files are 8-bit; samples are scaled by 1/255 on the way in and rounded
//! back on the way out. Gray+alpha files are widened to RGBA since the
//! engine has no two-channel layout.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use pixlab_core::{ChannelLayout, ImageBuffer};

/// Decodes `img` into a normalized buffer.
pub fn from_dynamic(img: DynamicImage) -> Result<ImageBuffer> {
    let (width, height) = (img.width(), img.height());
    let (layout, raw) = match img {
        DynamicImage::ImageLuma8(buf) => (ChannelLayout::Gray, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (ChannelLayout::Rgb, buf.into_raw()),
        other if other.color().channel_count() == 1 => {
            (ChannelLayout::Gray, other.into_luma8().into_raw())
        }
        other if other.color().has_alpha() => (ChannelLayout::Rgba, other.into_rgba8().into_raw()),
        other => (ChannelLayout::Rgb, other.into_rgb8().into_raw()),
    };
    let data = raw.into_iter().map(|v| f32::from(v) / 255.0).collect();
    ImageBuffer::new(width, height, layout, data).context("Decoded image is not a valid buffer")
}

/// Encodes `buf` as an 8-bit image with the same layout.
pub fn to_dynamic(buf: &ImageBuffer) -> Result<DynamicImage> {
    let (width, height) = buf.dimensions();
    let raw: Vec<u8> = buf.samples().iter().map(|&v| to_u8(v)).collect();
    let img = match buf.layout() {
        ChannelLayout::Gray => {
            GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8)
        }
        ChannelLayout::Rgb => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        ChannelLayout::Rgba => {
            RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8)
        }
    };
    img.context("Sample count does not match image dimensions")
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Reads and decodes an image file.
pub fn read(path: &Path) -> Result<ImageBuffer> {
    let img = image::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    from_dynamic(img)
}

/// Encodes and writes an image file; the format follows the extension.
pub fn write(path: &Path, buf: &ImageBuffer) -> Result<()> {
    let mut img = to_dynamic(buf)?;
    // JPEG has no alpha channel.
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if is_jpeg && buf.layout().has_alpha() {
        img = DynamicImage::ImageRgb8(img.into_rgb8());
    }
    img.save(path)
        .with_context(|| format!("Failed to write: {}", path.display()))
}
