//! Paired manga image dataset for colorization training.
//!
//! This crate provides utilities for:
//! - Indexing side-by-side (colorized | sketch) pair images per split
//! - Splitting, white-padding and center-cropping each half to a square
//! - Joining cached colorgram (color palette) side files as histogram tensors
//! - Optional pre-resized companions and shared-seed augmentations
//! - Dataset health summaries with pass/warn/fail thresholds
//! - Burn-compatible batch iteration (`burn-runtime` feature)

pub mod aug;
pub mod colorgram;
pub mod dataset;
pub mod layout;
pub mod tensor;
pub mod types;
pub mod validation;

#[cfg(feature = "burn-runtime")]
pub mod batch;

pub use aug::{AugmentConfig, FnTransform, ImageTransform, TransformPipeline, TransformPipelineBuilder};
pub use colorgram::{
    ColorgramCache, ColorgramSource, HistogramEncoder, JsonColorgramSource, PaletteEncoder,
};
pub use dataset::{PairDatasetConfig, PairedImageDataset, DEFAULT_ROOT, DEFAULT_SIZE};
pub use tensor::{scale, unscale, SampleTensor};
pub use types::*;
pub use validation::{summarize_dataset, summarize_with_thresholds, validate_summary};

#[cfg(feature = "burn-runtime")]
pub use batch::{BatchConfig, BatchIter, PairBatch};
