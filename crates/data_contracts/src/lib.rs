//! Shared data contracts for paired-image side files.

pub mod colorgram;

pub use colorgram::{ColorgramError, ColorgramRecord, PaletteColor};
