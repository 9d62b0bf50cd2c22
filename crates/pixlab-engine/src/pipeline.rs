//! Sequential pipelines and concurrent fan-out.
//!
//! A pipeline applies its steps in order, each to the previous output,
//! starting from the given root buffer. All steps are parsed and planned
//! before the first one runs, so a bad step late in the list fails the whole
//! run without computing anything.

use pixlab_core::{Error, ImageBuffer, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{Auxiliary, Engine};
use crate::params::{Operation, OperationRequest};
use crate::result::{OperationResult, PipelineResult};

/// Ordered list of requests, as read from JSON.
///
/// Accepts either `{"operations": [...]}` or a bare array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PipelineRepr")]
pub struct PipelineRequest {
    /// Steps in application order.
    pub operations: Vec<OperationRequest>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PipelineRepr {
    Wrapped { operations: Vec<OperationRequest> },
    Bare(Vec<OperationRequest>),
}

impl From<PipelineRepr> for PipelineRequest {
    fn from(repr: PipelineRepr) -> Self {
        match repr {
            PipelineRepr::Wrapped { operations } | PipelineRepr::Bare(operations) => {
                Self { operations }
            }
        }
    }
}

impl PipelineRequest {
    /// Parses a pipeline from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Engine {
    /// Applies `requests` in order to `input`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an empty pipeline, otherwise the first
    /// error any step raises while being parsed or planned.
    pub fn run_pipeline(
        &self,
        input: &ImageBuffer,
        requests: &[OperationRequest],
        aux: Auxiliary<'_>,
    ) -> Result<PipelineResult> {
        if requests.is_empty() {
            return Err(Error::invalid_parameter(
                "pipeline",
                "operations",
                "at least one operation",
            ));
        }

        let ops = requests
            .iter()
            .map(|r| self.parse(r))
            .collect::<Result<Vec<Operation>>>()?;
        let mut shape = input.shape();
        for op in &ops {
            shape = self.plan(shape, op, aux)?;
        }
        info!(steps = ops.len(), input = %input.shape(), output = %shape, "running pipeline");

        let mut image = input.clone();
        let mut steps = Vec::with_capacity(ops.len());
        for (i, (op, request)) in ops.iter().zip(requests).enumerate() {
            debug!(step = i, operation = %op.kind(), "pipeline step");
            let result = self.execute(&image, op, &request.operation, aux)?;
            image = result.image;
            steps.push(result.metadata);
        }

        Ok(PipelineResult { image, steps })
    }

    /// Runs independent requests on the same input concurrently.
    ///
    /// Each entry succeeds or fails on its own; results keep request order.
    pub fn process_many(
        &self,
        input: &ImageBuffer,
        requests: &[OperationRequest],
        aux: Auxiliary<'_>,
    ) -> Vec<Result<OperationResult>> {
        debug!(count = requests.len(), "fan-out");
        requests
            .par_iter()
            .map(|r| self.process(input, r, aux))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixlab_core::ChannelLayout;

    #[test]
    fn test_pipeline_json_forms() {
        let steps = r#"[{"operation": "invert"}, {"operation": "rotate", "params": {"angle": 90}}]"#;
        let wrapped = format!(r#"{{"operations": {steps}}}"#);
        let wrapped = PipelineRequest::from_json(&wrapped).unwrap();
        let bare = PipelineRequest::from_json(steps).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.operations.len(), 2);
        assert!(wrapped.operations[0].params.is_empty());
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let src = ImageBuffer::filled(2, 2, ChannelLayout::Gray, &[0.5]).unwrap();
        let err = Engine::default()
            .run_pipeline(&src, &[], Auxiliary::none())
            .unwrap_err();
        assert!(err.is_parameter_error());
    }
}
