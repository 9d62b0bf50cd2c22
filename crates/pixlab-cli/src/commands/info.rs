//! Image info command.

use anyhow::Result;
use pixlab_core::ImageBuffer;
use serde_json::json;
use std::fs;
use std::path::Path;

use super::{format_size, load_image};
use crate::InfoArgs;

/// Prints dimensions, layout and per-channel ranges for each input.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    for path in &args.input {
        let file_size = fs::metadata(path)?.len();
        let image = load_image(path)?;

        if args.json {
            print_json(path, &image, file_size)?;
        } else {
            print_text(path, &image, file_size, verbose);
        }

        if args.input.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn print_text(path: &Path, image: &ImageBuffer, file_size: u64, verbose: bool) {
    println!("{}", path.display());
    println!("  Resolution: {}x{}", image.width(), image.height());
    println!("  Layout:     {}", image.layout());
    println!("  Pixels:     {}", image.pixel_count());
    println!("  File size:  {}", format_size(file_size));

    if verbose {
        for (c, (min, max, avg)) in channel_stats(image).into_iter().enumerate() {
            println!("  Channel {c}:  min {min:.4}  max {max:.4}  avg {avg:.4}");
        }
    }
}

fn print_json(path: &Path, image: &ImageBuffer, file_size: u64) -> Result<()> {
    let stats: Vec<_> = channel_stats(image)
        .into_iter()
        .map(|(min, max, avg)| json!({ "min": min, "max": max, "avg": avg }))
        .collect();
    let value = json!({
        "path": path.display().to_string(),
        "shape": image.shape(),
        "file_size": file_size,
        "channels": stats,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// (min, max, mean) per channel.
fn channel_stats(image: &ImageBuffer) -> Vec<(f32, f32, f64)> {
    let n = image.channels();
    let mut stats = vec![(f32::MAX, f32::MIN, 0.0f64); n];
    for px in image.samples().chunks_exact(n) {
        for (s, &v) in stats.iter_mut().zip(px) {
            s.0 = s.0.min(v);
            s.1 = s.1.max(v);
            s.2 += f64::from(v);
        }
    }
    let count = image.pixel_count() as f64;
    for s in &mut stats {
        s.2 /= count;
    }
    stats
}
