//! Validate, dispatch, describe.
//!
//! [`Engine::process`] runs one request in three stages:
//!
//! 1. **Parse**: resolve the name and type-check parameters
//!    ([`parse_request`]).
//! 2. **Plan**: work out the output shape from the input shape alone,
//!    rejecting layout and size problems ([`Engine::plan`]).
//! 3. **Dispatch**: call the matching `pixlab_ops` function.
//!
//! Everything that can fail is found in stages 1 and 2, before any pixel is
//! computed.

use pixlab_core::{ChannelLayout, Error, ImageBuffer, Result, Shape};
use pixlab_ops::transform::{check_region_in, rotated_extent};
use pixlab_ops::{AlphaWeight, ChannelOutput, HistogramTable, channels, composite, histogram};
use pixlab_ops::{resize, tone, transform};
use tracing::debug;

use crate::config::EngineConfig;
use crate::params::{MergeWeight, Operation, OperationRequest, parse_request};
use crate::result::{OperationResult, ResultMetadata};

/// Extra inputs some operations read.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auxiliary<'a> {
    /// Second image for merge.
    pub secondary: Option<&'a ImageBuffer>,
    /// GRAY weight mask for a per-pixel merge.
    pub mask: Option<&'a ImageBuffer>,
}

impl<'a> Auxiliary<'a> {
    /// No extra inputs.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the second image.
    pub fn with_secondary(mut self, image: &'a ImageBuffer) -> Self {
        self.secondary = Some(image);
        self
    }

    /// Sets the weight mask.
    pub fn with_mask(mut self, mask: &'a ImageBuffer) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Stateless operation runner.
///
/// The engine holds only its [`EngineConfig`]; it is `Send + Sync` and can
/// serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the given limits.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses a request into a typed operation.
    pub fn parse(&self, request: &OperationRequest) -> Result<Operation> {
        parse_request(request, &self.config)
    }

    /// Runs one request against `input`.
    pub fn process(
        &self,
        input: &ImageBuffer,
        request: &OperationRequest,
        aux: Auxiliary<'_>,
    ) -> Result<OperationResult> {
        let op = self.parse(request)?;
        self.execute(input, &op, &request.operation, aux)
    }

    /// Runs an already parsed operation. `requested` is recorded in the
    /// metadata as the name the caller used.
    pub fn execute(
        &self,
        input: &ImageBuffer,
        op: &Operation,
        requested: &str,
        aux: Auxiliary<'_>,
    ) -> Result<OperationResult> {
        let output = self.plan(input.shape(), op, aux)?;
        debug!(operation = %op.kind(), input = %input.shape(), %output, "dispatching");

        let image = dispatch(input, op, aux)?;
        let histogram = matches!(op, Operation::Histogram).then(|| histogram::histogram(&image));

        Ok(OperationResult {
            metadata: ResultMetadata {
                operation: op.kind(),
                requested: requested.to_string(),
                params: op.clone(),
                input: input.shape(),
                output: image.shape(),
                histogram,
            },
            image,
        })
    }

    /// Histogram of `input`.
    pub fn histogram(&self, input: &ImageBuffer) -> HistogramTable {
        histogram::histogram(input)
    }

    /// Output shape of `op` applied to a buffer of shape `input`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedOperation`] if the layout does not fit the
    ///   operation or a required auxiliary input is missing
    /// - [`Error::InvalidParameter`] if a region does not fit the input
    /// - [`Error::DimensionMismatch`] if auxiliary inputs differ in shape
    pub fn plan(&self, input: Shape, op: &Operation, aux: Auxiliary<'_>) -> Result<Shape> {
        let name = op.kind().name();
        let gray = |shape: Shape| Shape::new(shape.width, shape.height, ChannelLayout::Gray);
        let require_color = |why: &str| {
            if input.layout.is_color() {
                Ok(())
            } else {
                Err(Error::unsupported(name, format!("{why}, buffer is {}", input.layout)))
            }
        };

        match op {
            Operation::Brightness { .. }
            | Operation::Contrast(_)
            | Operation::Negative
            | Operation::Histogram => Ok(input),
            Operation::Translate { fill, .. } => {
                fill.resolve(name, input.layout)?;
                Ok(input)
            }
            Operation::Grayscale { .. } => {
                require_color("needs RGB or RGBA input")?;
                Ok(gray(input))
            }
            Operation::Binarize { grayscale, .. } => match grayscale {
                Some(_) => {
                    require_color("gray reduction needs RGB or RGBA input")?;
                    Ok(gray(input))
                }
                None => Ok(input),
            },
            Operation::Rotate { angle, fill, .. } => {
                fill.resolve(name, input.layout)?;
                let (w, h) = rotated_extent(input.width, input.height, *angle);
                Ok(Shape::new(w, h, input.layout))
            }
            Operation::Crop { region } => {
                check_region_in(name, input.width, input.height, *region)?;
                Ok(Shape::new(region.width, region.height, input.layout))
            }
            Operation::ReduceResolution { factor } => {
                let w = ((input.width as f64 / factor).floor() as u32).max(1);
                let h = ((input.height as f64 / factor).floor() as u32).max(1);
                Ok(Shape::new(w, h, input.layout))
            }
            Operation::EnlargeRegion {
                region,
                width,
                height,
            } => {
                check_region_in(name, input.width, input.height, *region)?;
                Ok(Shape::new(*width, *height, input.layout))
            }
            Operation::Merge { weight } => {
                let other = aux
                    .secondary
                    .ok_or_else(|| Error::unsupported(name, "a second image is required"))?;
                if other.shape() != input {
                    return Err(Error::dimension_mismatch(name, input, other.shape()));
                }
                if let MergeWeight::Mask = weight {
                    let mask = aux.mask.ok_or_else(|| {
                        Error::unsupported(name, "mask weighting needs a mask image")
                    })?;
                    if mask.layout() != ChannelLayout::Gray {
                        return Err(Error::unsupported(
                            name,
                            format!("alpha mask must be gray, got {}", mask.layout()),
                        ));
                    }
                    if mask.shape() != gray(input) {
                        return Err(Error::dimension_mismatch(name, gray(input), mask.shape()));
                    }
                }
                Ok(input)
            }
            Operation::Channel(ch) => {
                require_color("needs RGB or RGBA input")?;
                match ch.output {
                    ChannelOutput::Extract(_) => Ok(gray(input)),
                    ChannelOutput::Model | ChannelOutput::Rgb => Ok(input),
                }
            }
        }
    }
}

/// Calls the operation. Inputs are assumed to have passed [`Engine::plan`].
fn dispatch(input: &ImageBuffer, op: &Operation, aux: Auxiliary<'_>) -> Result<ImageBuffer> {
    match op {
        Operation::Brightness { factor, mode } => tone::brightness(input, *factor, *mode),
        Operation::Contrast(mode) => tone::contrast(input, *mode),
        Operation::Negative => tone::negative(input),
        Operation::Grayscale { method } => tone::grayscale(input, *method),
        Operation::Binarize {
            threshold,
            grayscale,
        } => match grayscale {
            Some(method) => tone::binarize(&tone::grayscale(input, *method)?, *threshold),
            None => tone::binarize(input, *threshold),
        },
        Operation::Rotate {
            angle,
            interpolation,
            fill,
        } => transform::rotate(input, *angle, *interpolation, fill),
        Operation::Crop { region } => transform::crop(input, *region),
        Operation::Translate { dx, dy, fill } => transform::translate(input, *dx, *dy, fill),
        Operation::ReduceResolution { factor } => resize::reduce_resolution(input, *factor),
        Operation::EnlargeRegion {
            region,
            width,
            height,
        } => resize::enlarge_region(input, *region, *width, *height),
        Operation::Merge { weight } => {
            let other = aux
                .secondary
                .ok_or_else(|| Error::unsupported("merge", "a second image is required"))?;
            let weight = match (weight, aux.mask) {
                (MergeWeight::Alpha(alpha), _) => AlphaWeight::Global(*alpha),
                (MergeWeight::Mask, Some(mask)) => AlphaWeight::PerPixel(mask),
                (MergeWeight::Mask, None) => {
                    return Err(Error::unsupported("merge", "mask weighting needs a mask image"));
                }
            };
            composite::merge(input, other, &weight)
        }
        Operation::Channel(ch) => channels::apply_channels(input, ch),
        Operation::Histogram => Ok(input.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixlab_core::Rect;
    use serde_json::json;

    fn request(op: &str, params: serde_json::Value) -> OperationRequest {
        OperationRequest {
            operation: op.into(),
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }

    fn rgb(w: u32, h: u32) -> ImageBuffer {
        ImageBuffer::filled(w, h, ChannelLayout::Rgb, &[0.2, 0.4, 0.6]).unwrap()
    }

    #[test]
    fn test_plan_matches_output() {
        let engine = Engine::default();
        let src = rgb(7, 5);
        for (op, params) in [
            ("rotate", json!({"angle": 30})),
            ("crop", json!({"x": 1, "y": 1, "width": 3, "height": 2})),
            ("reduce_resolution", json!({"factor": 1.5})),
            ("enlarge_region", json!({"x": 0, "y": 0, "width": 2, "height": 2, "factor": 3})),
            ("channel_cyan", json!({})),
            ("grayscale", json!({})),
            ("binarize", json!({"grayscale": "average"})),
        ] {
            let parsed = engine.parse(&request(op, params)).unwrap();
            let planned = engine.plan(src.shape(), &parsed, Auxiliary::none()).unwrap();
            let result = engine.execute(&src, &parsed, op, Auxiliary::none()).unwrap();
            assert_eq!(planned, result.image.shape(), "{op}");
        }
    }

    #[test]
    fn test_layout_checks_before_dispatch() {
        let engine = Engine::default();
        let gray = ImageBuffer::filled(2, 2, ChannelLayout::Gray, &[0.5]).unwrap();
        for op in ["grayscale", "channel_red"] {
            let err = engine
                .process(&gray, &OperationRequest::new(op), Auxiliary::none())
                .unwrap_err();
            assert!(matches!(err, Error::UnsupportedOperation { .. }), "{op}");
        }
    }

    #[test]
    fn test_merge_needs_secondary() {
        let engine = Engine::default();
        let a = rgb(2, 2);
        let err = engine
            .process(&a, &request("merge", json!({"alpha": 0.5})), Auxiliary::none())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));

        let err = engine
            .process(
                &a,
                &request("merge", json!({"mask": true})),
                Auxiliary::none().with_secondary(&a),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_crop_region_checked_in_plan() {
        let engine = Engine::default();
        let op = Operation::Crop {
            region: Rect::new(5, 0, 4, 4),
        };
        let err = engine.plan(rgb(6, 6).shape(), &op, Auxiliary::none()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_translate_fill_checked_in_plan() {
        let engine = Engine::default();
        let op = engine
            .parse(&request("translate", json!({"dx": 1, "fill": [1.0, 1.0]})))
            .unwrap();
        let err = engine.plan(rgb(3, 2).shape(), &op, Auxiliary::none()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { ref parameter, .. } if parameter == "fill"
        ));
    }

    #[test]
    fn test_metadata_records_alias_and_params() {
        let engine = Engine::default();
        let result = engine
            .process(&rgb(3, 3), &OperationRequest::new("invert"), Auxiliary::none())
            .unwrap();
        assert_eq!(result.metadata.requested, "invert");
        assert_eq!(result.metadata.params, Operation::Negative);
        let json = result.metadata_json().unwrap();
        assert!(json.contains("\"operation\": \"negative\""));
        assert!(result.metadata.histogram.is_none());
    }

    #[test]
    fn test_histogram_query_keeps_image() {
        let engine = Engine::default();
        let src = rgb(2, 2);
        let result = engine
            .process(&src, &OperationRequest::new("histogram"), Auxiliary::none())
            .unwrap();
        assert_eq!(result.image, src);
        let table = result.metadata.histogram.unwrap();
        assert_eq!(table, engine.histogram(&src));
    }
}
