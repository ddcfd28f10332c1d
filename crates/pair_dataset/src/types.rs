//! Core types, error definitions, and data structures for pair_dataset.

use crate::tensor::SampleTensor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, PairDatasetError>;

#[derive(Debug, Error)]
pub enum PairDatasetError {
    #[error("invalid dataset mode {mode:?}; pick among (train, val, test)")]
    InvalidMode { mode: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("index {index} out of bounds for dataset of {len} samples")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("{path} is {width}x{height}; expected a side-by-side pair at least 2px wide")]
    PairLayout {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    #[error("colorgram for {id}: {source}")]
    Colorgram {
        id: String,
        #[source]
        source: data_contracts::ColorgramError,
    },
    #[error("shape mismatch: {0}")]
    Shape(String),
    #[error("{0}")]
    Other(String),
}

impl PairDatasetError {
    /// True when the error came from a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PairDatasetError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PairDatasetError::Io {
            path: path.into(),
            source,
        }
    }

    /// Map an `image` error, keeping plain io failures (missing files) as `Io`.
    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        match source {
            image::ImageError::IoError(e) => PairDatasetError::io(path, e),
            other => PairDatasetError::Image {
                path: path.into(),
                source: other,
            },
        }
    }
}

/// Dataset split, mapped to the `<root>/<mode>` subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Train,
    Val,
    Test,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Train => "train",
            Mode::Val => "val",
            Mode::Test => "test",
        }
    }
}

impl FromStr for Mode {
    type Err = PairDatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Mode::Train),
            "val" => Ok(Mode::Val),
            "test" => Ok(Mode::Test),
            other => Err(PairDatasetError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One processed pair.
#[derive(Debug, Clone)]
pub struct PairSample {
    /// File name without directory or extension.
    pub id: String,
    /// Left half, `[3, size, size]` in [-1, 1].
    pub colorized: SampleTensor,
    /// Right half, `[3, size, size]` in [-1, 1].
    pub sketch: SampleTensor,
    pub histogram: Option<SampleTensor>,
    pub resized: Option<SampleTensor>,
}

impl PairSample {
    /// Flatten into `(colorized, sketch, [histogram], [resized])`.
    pub fn into_tensors(self) -> Vec<SampleTensor> {
        let mut out = Vec::with_capacity(4);
        out.push(self.colorized);
        out.push(self.sketch);
        out.extend(self.histogram);
        out.extend(self.resized);
        out
    }

    pub fn arity(&self) -> usize {
        2 + self.histogram.is_some() as usize + self.resized.is_some() as usize
    }
}

/// Per-dataset file health counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub root: PathBuf,
    pub mode: Mode,
    pub total: usize,
    pub ok: usize,
    pub undecodable: usize,
    pub invalid_layout: usize,
    pub odd_width: usize,
    pub missing_colorgram: usize,
    pub invalid_colorgram: usize,
    pub missing_resize: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Pass,
    Warn,
    Fail,
}

impl ValidationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationOutcome::Pass => "pass",
            ValidationOutcome::Warn => "warn",
            ValidationOutcome::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationThresholds {
    pub max_invalid: Option<usize>,
    pub max_missing: Option<usize>,
    pub max_invalid_ratio: Option<f32>,
    pub max_missing_ratio: Option<f32>,
}

impl ValidationThresholds {
    pub fn from_env() -> Self {
        fn parse_usize(key: &str) -> Option<usize> {
            std::env::var(key).ok()?.parse().ok()
        }
        fn parse_ratio(key: &str) -> Option<f32> {
            std::env::var(key).ok()?.parse().ok()
        }
        ValidationThresholds {
            max_invalid: parse_usize("PAIR_DATASET_MAX_INVALID"),
            max_missing: parse_usize("PAIR_DATASET_MAX_MISSING"),
            max_invalid_ratio: parse_ratio("PAIR_DATASET_MAX_INVALID_RATIO"),
            max_missing_ratio: parse_ratio("PAIR_DATASET_MAX_MISSING_RATIO"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub reasons: Vec<String>,
    pub summary: DatasetSummary,
}
