//! Single-operation command.

use anyhow::{Context, Result};
use pixlab_engine::{Engine, OperationRequest};
use tracing::info;

use super::{AuxImages, load_image, parse_param, save_image};
use crate::ApplyArgs;

/// Builds the request from `--op` and `-p` pairs and applies it.
pub fn run(engine: &Engine, args: ApplyArgs, verbose: bool) -> Result<()> {
    let mut request = OperationRequest::new(&args.operation);
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        request = request.with_param(key, value);
    }

    let input = load_image(&args.input)?;
    let aux = AuxImages::load(&args.aux)?;

    let result = engine
        .process(&input, &request, aux.as_aux())
        .with_context(|| format!("'{}' failed", args.operation))?;
    info!(operation = %result.metadata.operation, output = %result.metadata.output, "applied");

    if verbose {
        println!(
            "{} {} -> {}",
            result.metadata.operation, result.metadata.input, result.metadata.output
        );
    }
    if args.json {
        println!("{}", result.metadata_json()?);
    }

    save_image(&args.output, &result.image)
}
