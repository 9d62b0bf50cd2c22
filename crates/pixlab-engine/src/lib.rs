//! # pixlab-engine
//!
//! Turns loosely typed operation requests into validated, typed operations
//! and runs them against [`ImageBuffer`]s.
//!
//! The flow is always `parse -> plan -> dispatch`:
//!
//! - [`catalogue`] - operation names, legacy aliases
//! - [`params`] - [`OperationRequest`] to [`Operation`]
//! - [`engine`] - shape planning and dispatch to `pixlab-ops`
//! - [`pipeline`] - sequential pipelines and concurrent fan-out
//! - [`result`] - [`OperationResult`] and serializable [`ResultMetadata`]
//! - [`config`] - [`EngineConfig`] limits, loadable from YAML
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_engine::{Auxiliary, Engine, OperationRequest};
//!
//! let engine = Engine::default();
//! let src = ImageBuffer::filled(4, 4, ChannelLayout::Rgb, &[0.2, 0.1, 0.05]).unwrap();
//! let request = OperationRequest::new("brightness")
//!     .with_param("factor", 1.5)
//!     .with_param("mode", "multiplicative");
//!
//! let result = engine.process(&src, &request, Auxiliary::none()).unwrap();
//! assert_eq!(result.metadata.operation.name(), "brightness");
//! assert!((result.image.samples()[0] - 0.3).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalogue;
pub mod config;
pub mod engine;
pub mod params;
pub mod pipeline;
pub mod result;

pub use catalogue::{OperationKind, Preset};
pub use config::{Bounds, ConfigError, EngineConfig};
pub use engine::{Auxiliary, Engine};
pub use params::{MergeWeight, Operation, OperationRequest, parse_request};
pub use pipeline::PipelineRequest;
pub use result::{OperationResult, PipelineResult, ResultMetadata};

pub use pixlab_core::{Error, ImageBuffer, Result};
