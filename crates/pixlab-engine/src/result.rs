//! What an engine call hands back.

use pixlab_core::{ImageBuffer, Shape};
use pixlab_ops::HistogramTable;
use serde::{Deserialize, Serialize};

use crate::catalogue::OperationKind;
use crate::params::Operation;

/// Provenance of one processed image, without the pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Canonical operation.
    pub operation: OperationKind,
    /// Name as it appeared in the request (may be a legacy alias).
    pub requested: String,
    /// Parameters after validation and defaulting.
    pub params: Operation,
    /// Shape of the input buffer.
    pub input: Shape,
    /// Shape of the output buffer.
    pub output: Shape,
    /// Histogram of the output, for histogram queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<HistogramTable>,
}

/// A produced buffer with its metadata.
#[derive(Debug, Clone)]
pub struct OperationResult {
    /// Output pixels.
    pub image: ImageBuffer,
    /// How they were produced.
    pub metadata: ResultMetadata,
}

impl OperationResult {
    /// Metadata as pretty JSON.
    pub fn metadata_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.metadata)
    }
}

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Buffer after the last step.
    pub image: ImageBuffer,
    /// One entry per step, in order.
    pub steps: Vec<ResultMetadata>,
}
