//! Row-parallel iteration helpers.
//!
//! Every operation writes its output one row at a time and never reads the
//! output while writing it, so rows can be filled independently. With the
//! `parallel` feature (default) rows are distributed over the rayon pool;
//! without it they are filled in order on the calling thread.

use pixlab_core::{ChannelLayout, ImageBuffer, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fills `dst` row by row. `f` receives the row index and the row slice.
#[cfg(feature = "parallel")]
pub fn fill_rows<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Fills `dst` row by row (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub fn fill_rows<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]),
{
    if row_len == 0 {
        return;
    }
    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Builds a new buffer of the same size by mapping every source pixel to
/// an output pixel with `out_layout.channels()` samples.
pub fn map_pixels<F>(src: &ImageBuffer, out_layout: ChannelLayout, f: F) -> Result<ImageBuffer>
where
    F: Fn(&[f32], &mut [f32]) + Sync + Send,
{
    let (w, h) = src.dimensions();
    let in_ch = src.channels();
    let out_ch = out_layout.channels();
    let mut dst = vec![0.0f32; w as usize * h as usize * out_ch];

    fill_rows(&mut dst, w as usize * out_ch, |y, row| {
        let src_row = src.row(y as u32);
        for (src_px, dst_px) in src_row.chunks_exact(in_ch).zip(row.chunks_exact_mut(out_ch)) {
            f(src_px, dst_px);
        }
    });

    ImageBuffer::with_samples(w, h, out_layout, dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rows_visits_every_row() {
        let mut dst = vec![0.0f32; 4 * 3];
        fill_rows(&mut dst, 4, |y, row| row.fill(y as f32));
        assert_eq!(&dst[0..4], &[0.0; 4]);
        assert_eq!(&dst[8..12], &[2.0; 4]);
    }

    #[test]
    fn test_map_pixels_changes_layout() {
        let src = ImageBuffer::filled(2, 2, ChannelLayout::Rgb, &[0.2, 0.4, 0.6]).unwrap();
        let out = map_pixels(&src, ChannelLayout::Gray, |px, out| out[0] = px[1]).unwrap();
        assert_eq!(out.layout(), ChannelLayout::Gray);
        assert_eq!(out.samples(), &[0.4; 4]);
    }
}
