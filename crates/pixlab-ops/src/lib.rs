//! # pixlab-ops
//!
//! Pixel operations on [`pixlab_core::ImageBuffer`].
//!
//! Every operation is a pure function: it borrows its inputs, allocates a
//! fresh output and clamps it into `[0, 1]`.
//!
//! # Modules
//!
//! - [`tone`] - brightness, contrast, negative, grayscale, binarize
//! - [`transform`] - crop, translate, rotate
//! - [`resize`] - area-averaged reduction and region enlargement
//! - [`sample`] - fractional-coordinate sampling shared by the geometric ops
//! - [`composite`] - weighted merge of two images
//! - [`channels`] - RGB/CMY channel reorder, mask and extract
//! - [`histogram`] - 256-bin per-channel histograms
//!
//! # Example
//!
//! ```rust
//! use pixlab_core::{ChannelLayout, ImageBuffer};
//! use pixlab_ops::{tone, transform, Interpolation, FillPolicy};
//!
//! let src = ImageBuffer::filled(8, 4, ChannelLayout::Rgb, &[0.2, 0.4, 0.6]).unwrap();
//! let dark = tone::negative(&src).unwrap();
//! let turned =
//!     transform::rotate(&dark, 90.0, Interpolation::Bilinear, &FillPolicy::Zero).unwrap();
//! assert_eq!(turned.dimensions(), (4, 8));
//! ```
//!
//! # Features
//!
//! - `parallel` (default): fill output rows on the rayon thread pool.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channels;
pub mod composite;
pub mod histogram;
pub mod parallel;
pub mod resize;
pub mod sample;
pub mod tone;
pub mod transform;

pub use channels::{ChannelOp, ChannelOutput, ColorModel};
pub use composite::AlphaWeight;
pub use histogram::{ChannelHistogram, HistogramTable};
pub use sample::{BorderMode, FillPolicy, Interpolation};
pub use tone::{BrightnessMode, ContrastMode, GrayMethod};
