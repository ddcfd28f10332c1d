//! Color-histogram side files: loading, per-dataset caching, and tensor encoding.

use crate::tensor::{scale, SampleTensor};
use crate::types::{DatasetResult, PairDatasetError};
use data_contracts::ColorgramRecord;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Where colorgram records come from.
pub trait ColorgramSource: Send + Sync {
    fn load(&self, id: &str) -> DatasetResult<ColorgramRecord>;
}

/// Reads `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonColorgramSource {
    dir: PathBuf,
}

impl JsonColorgramSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl ColorgramSource for JsonColorgramSource {
    fn load(&self, id: &str) -> DatasetResult<ColorgramRecord> {
        let path = self.path_for(id);
        let raw = fs::read(&path).map_err(|e| PairDatasetError::io(&path, e))?;
        ColorgramRecord::from_slice(&raw).map_err(|e| PairDatasetError::Json { path, source: e })
    }
}

/// Read-through cache in front of a [`ColorgramSource`].
///
/// Entries live as long as the cache; nothing is evicted. Two threads missing the
/// same id may both hit the source, the first insert is kept.
pub struct ColorgramCache {
    source: Box<dyn ColorgramSource>,
    entries: RwLock<HashMap<String, Arc<ColorgramRecord>>>,
}

impl ColorgramCache {
    pub fn new(source: Box<dyn ColorgramSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_load(&self, id: &str) -> DatasetResult<Arc<ColorgramRecord>> {
        if let Some(hit) = self.read_entries().get(id) {
            return Ok(Arc::clone(hit));
        }
        trace!(id, "colorgram cache miss");
        let record = Arc::new(self.source.load(id)?);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(entries.entry(id.to_string()).or_insert(record)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read_entries().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<ColorgramRecord>>> {
        // A panicking writer cannot leave a half-inserted entry behind.
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ColorgramCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorgramCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Turns a decoded record into a fixed-shape tensor.
pub trait HistogramEncoder: Send + Sync {
    fn encode(&self, id: &str, record: &ColorgramRecord) -> DatasetResult<SampleTensor>;
}

/// Flattens the first `colors_per_region` colors of regions `1..=regions`.
///
/// Output shape is `[regions * colors_per_region * 3]`, region-major, channels in
/// RGB order and scaled to [-1, 1]. Missing regions or colors stay 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEncoder {
    pub regions: usize,
    pub colors_per_region: usize,
}

impl Default for PaletteEncoder {
    fn default() -> Self {
        Self {
            regions: 4,
            colors_per_region: 4,
        }
    }
}

impl PaletteEncoder {
    pub fn output_len(&self) -> usize {
        self.regions * self.colors_per_region * 3
    }
}

impl HistogramEncoder for PaletteEncoder {
    fn encode(&self, id: &str, record: &ColorgramRecord) -> DatasetResult<SampleTensor> {
        let mut data = vec![0.0f32; self.output_len()];
        for entry in record.indexed_regions() {
            let (region, colors) = entry.map_err(|e| PairDatasetError::Colorgram {
                id: id.to_string(),
                source: e,
            })?;
            if region > self.regions {
                continue;
            }
            let base = (region - 1) * self.colors_per_region * 3;
            for (slot, color) in colors.iter().take(self.colors_per_region).enumerate() {
                let offset = base + slot * 3;
                let chunk = &mut data[offset..offset + 3];
                for (dst, &c) in chunk.iter_mut().zip(color.iter()) {
                    *dst = c as f32 / 255.0;
                }
                scale(chunk);
            }
        }
        SampleTensor::new(data, vec![self.output_len()])
    }
}
