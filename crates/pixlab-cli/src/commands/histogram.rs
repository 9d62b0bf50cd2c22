//! Histogram command.

use anyhow::Result;
use pixlab_engine::Engine;

use super::load_image;
use crate::HistogramArgs;

pub fn run(engine: &Engine, args: HistogramArgs) -> Result<()> {
    let image = load_image(&args.input)?;
    let table = engine.histogram(&image);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("{}", args.input.display());
    for channel in table.channels() {
        let (bin, count) = channel.peak();
        println!(
            "  {:<8} total {:>10}  peak bin {:>3} ({} px)",
            channel.name,
            channel.total(),
            bin,
            count
        );
    }
    Ok(())
}
