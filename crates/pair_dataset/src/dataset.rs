//! Paired colorized/sketch image dataset.

use crate::aug::ImageTransform;
use crate::colorgram::{
    ColorgramCache, ColorgramSource, HistogramEncoder, JsonColorgramSource, PaletteEncoder,
};
use crate::layout::{pad_and_center_crop, split_pair};
use crate::tensor::SampleTensor;
use crate::types::{DatasetResult, Mode, PairDatasetError, PairSample};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ROOT: &str = "./data/pair_niko";
pub const DEFAULT_SIZE: u32 = 512;

#[derive(Debug, Clone)]
pub struct PairDatasetConfig {
    /// Dataset root; images live under `<root>/<mode>`.
    pub root: PathBuf,
    pub mode: Mode,
    /// Crop size for both halves.
    pub size: u32,
    /// Attach the encoded colorgram of each sample.
    pub color_histogram: bool,
    /// Attach the pre-resized copy of each sample.
    pub need_resize: bool,
    /// Colorgram JSON directory. Defaults to `<root>/colorgram`.
    pub colorgram_dir: Option<PathBuf>,
    /// Pre-resized PNG directory. Defaults to `<root>/resize`.
    pub resize_dir: Option<PathBuf>,
    /// Seed for transform randomness, mixed with the sample index.
    pub seed: Option<u64>,
}

impl Default for PairDatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            mode: Mode::Train,
            size: DEFAULT_SIZE,
            color_histogram: false,
            need_resize: false,
            colorgram_dir: None,
            resize_dir: None,
            seed: None,
        }
    }
}

impl PairDatasetConfig {
    pub fn colorgram_dir(&self) -> PathBuf {
        self.colorgram_dir
            .clone()
            .unwrap_or_else(|| self.root.join("colorgram"))
    }

    pub fn resize_dir(&self) -> PathBuf {
        self.resize_dir
            .clone()
            .unwrap_or_else(|| self.root.join("resize"))
    }

    pub fn split_dir(&self) -> PathBuf {
        self.root.join(self.mode.as_str())
    }
}

pub struct PairedImageDataset {
    config: PairDatasetConfig,
    files: Vec<PathBuf>,
    transform: Option<Arc<dyn ImageTransform>>,
    colorgrams: ColorgramCache,
    encoder: Box<dyn HistogramEncoder>,
}

impl PairedImageDataset {
    /// Index `<root>/<mode>/*.png`, falling back to `*.jpg` when there are no PNGs.
    pub fn new(config: PairDatasetConfig) -> DatasetResult<Self> {
        let split_dir = config.split_dir();
        let mut files = list_with_extension(&split_dir, "png")?;
        if files.is_empty() {
            files = list_with_extension(&split_dir, "jpg")?;
            if !files.is_empty() {
                info!(
                    dir = %split_dir.display(),
                    count = files.len(),
                    "no png pairs found, using jpg"
                );
            }
        }
        debug!(
            dir = %split_dir.display(),
            mode = %config.mode,
            count = files.len(),
            "indexed paired images"
        );
        let colorgrams = ColorgramCache::new(Box::new(JsonColorgramSource::new(
            config.colorgram_dir(),
        )));
        Ok(Self {
            config,
            files,
            transform: None,
            colorgrams,
            encoder: Box::new(PaletteEncoder::default()),
        })
    }

    /// Build from a mode string such as `"train"`; unknown modes are rejected.
    pub fn open(root: impl Into<PathBuf>, mode: &str) -> DatasetResult<Self> {
        let mode: Mode = mode.parse()?;
        Self::new(PairDatasetConfig {
            root: root.into(),
            mode,
            ..PairDatasetConfig::default()
        })
    }

    pub fn with_transform(mut self, transform: Arc<dyn ImageTransform>) -> Self {
        debug!(transform = %transform.describe(), "pair transform set");
        self.transform = Some(transform);
        self
    }

    /// Replace the colorgram source. Drops anything cached so far.
    pub fn with_colorgram_source(mut self, source: Box<dyn ColorgramSource>) -> Self {
        self.colorgrams = ColorgramCache::new(source);
        self
    }

    pub fn with_histogram_encoder(mut self, encoder: Box<dyn HistogramEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn config(&self) -> &PairDatasetConfig {
        &self.config
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn colorgram_cache(&self) -> &ColorgramCache {
        &self.colorgrams
    }

    /// Identifier of the sample at `index` (file name without extension).
    pub fn sample_id(&self, index: usize) -> DatasetResult<String> {
        let path = self.path_at(index)?;
        Ok(sample_id(path))
    }

    pub fn resize_path(&self, id: &str) -> PathBuf {
        self.config.resize_dir().join(format!("{id}.png"))
    }

    /// Load and process the pair at `index`.
    pub fn get(&self, index: usize) -> DatasetResult<PairSample> {
        let path = self.path_at(index)?;
        let id = sample_id(path);

        let histogram = if self.config.color_histogram {
            let record = self.colorgrams.get_or_load(&id)?;
            Some(self.encoder.encode(&id, &record)?)
        } else {
            None
        };

        let image = open_rgb(path)?;
        let (colorized, sketch) = split_pair(&image, path)?;
        drop(image);
        let colorized = pad_and_center_crop(&colorized, self.config.size);
        let sketch = pad_and_center_crop(&sketch, self.config.size);

        let resized = if self.config.need_resize {
            let resized = open_rgb(&self.resize_path(&id))?;
            Some(SampleTensor::from_rgb(&resized).scaled())
        } else {
            None
        };

        let (colorized, sketch) = match &self.transform {
            Some(transform) => {
                let mut rng_colorized = StdRng::seed_from_u64(self.transform_seed(index));
                let mut rng_sketch = rng_colorized.clone();
                (
                    transform.apply(colorized, &mut rng_colorized),
                    transform.apply(sketch, &mut rng_sketch),
                )
            }
            None => (colorized, sketch),
        };

        Ok(PairSample {
            id,
            colorized: SampleTensor::from_rgb(&colorized).scaled(),
            sketch: SampleTensor::from_rgb(&sketch).scaled(),
            histogram,
            resized,
        })
    }

    fn path_at(&self, index: usize) -> DatasetResult<&PathBuf> {
        self.files
            .get(index)
            .ok_or(PairDatasetError::IndexOutOfBounds {
                index,
                len: self.files.len(),
            })
    }

    fn transform_seed(&self, index: usize) -> u64 {
        match self.config.seed {
            Some(seed) => seed ^ index as u64,
            None => rand::rng().random(),
        }
    }
}

impl std::fmt::Debug for PairedImageDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairedImageDataset")
            .field("config", &self.config)
            .field("files", &self.files.len())
            .field(
                "transform",
                &self.transform.as_ref().map(|t| t.describe()),
            )
            .field("colorgrams", &self.colorgrams)
            .finish()
    }
}

pub(crate) fn sample_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn open_rgb(path: &Path) -> DatasetResult<RgbImage> {
    Ok(image::open(path)
        .map_err(|e| PairDatasetError::image(path, e))?
        .to_rgb8())
}

/// Sorted files in `dir` whose extension is exactly `ext`, skipping dot-files
/// (`._0001.png` AppleDouble sidecars). A missing directory is empty.
fn list_with_extension(dir: &Path, ext: &str) -> DatasetResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "split directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(PairDatasetError::io(dir, e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PairDatasetError::io(dir, e))?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !hidden && path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_id_strips_dir_and_extension() {
        assert_eq!(sample_id(Path::new("/data/train/0042.png")), "0042");
        assert_eq!(sample_id(Path::new("page.v2.jpg")), "page.v2");
    }

    #[test]
    fn side_dirs_default_under_root() {
        let cfg = PairDatasetConfig {
            root: PathBuf::from("/tmp/pairs"),
            mode: Mode::Val,
            ..PairDatasetConfig::default()
        };
        assert_eq!(cfg.split_dir(), PathBuf::from("/tmp/pairs/val"));
        assert_eq!(cfg.colorgram_dir(), PathBuf::from("/tmp/pairs/colorgram"));
        assert_eq!(cfg.resize_dir(), PathBuf::from("/tmp/pairs/resize"));
        let cfg = PairDatasetConfig {
            resize_dir: Some(PathBuf::from("/elsewhere")),
            ..cfg
        };
        assert_eq!(cfg.resize_dir(), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn missing_split_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let ds = PairedImageDataset::open(tmp.path(), "test").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn unreadable_split_is_an_error_not_an_empty_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("train"), b"not a directory").unwrap();
        let err = list_with_extension(&tmp.path().join("train"), "png").unwrap_err();
        assert!(matches!(err, PairDatasetError::Io { .. }));
        assert!(!err.is_not_found());
    }
}
