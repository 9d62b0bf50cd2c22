//! Pipeline command: applies a JSON list of operations in order.

use anyhow::{Context, Result};
use pixlab_engine::{Engine, PipelineRequest};
use std::fs;

use super::{AuxImages, load_image, save_image};
use crate::PipelineArgs;

pub fn run(engine: &Engine, args: PipelineArgs, verbose: bool) -> Result<()> {
    let text = fs::read_to_string(&args.ops)
        .with_context(|| format!("Failed to read: {}", args.ops.display()))?;
    let pipeline = PipelineRequest::from_json(&text)
        .with_context(|| format!("Invalid pipeline: {}", args.ops.display()))?;

    let input = load_image(&args.input)?;
    let aux = AuxImages::load(&args.aux)?;

    let result = engine.run_pipeline(&input, &pipeline.operations, aux.as_aux())?;

    if verbose {
        for (i, step) in result.steps.iter().enumerate() {
            println!("[{i}] {} {} -> {}", step.requested, step.input, step.output);
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.steps)?);
    }

    save_image(&args.output, &result.image)
}
