//! # pixlab-core
//!
//! Core types for the pixlab image-processing engine.
//!
//! - [`ImageBuffer`] - immutable, normalized, channel-tagged pixel grid
//! - [`ChannelLayout`] - `Gray`, `Rgb` or `Rgba`
//! - [`Rect`] - rectangular pixel region
//! - [`Error`] - the shared validation error taxonomy
//!
//! ## Crate Structure
//!
//! ```text
//! pixlab-core (this crate)
//!    ^
//!    |
//!    +-- pixlab-ops (tone, geometry, compositing, histogram)
//!    +-- pixlab-engine (catalogue, validation, dispatch)
//!    +-- pixlab-cli (decode/encode boundary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod layout;
pub mod rect;

pub use buffer::{ImageBuffer, Shape};
pub use error::{Error, Result};
pub use layout::ChannelLayout;
pub use rect::Rect;
