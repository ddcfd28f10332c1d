//! Batch iteration into burn tensors.

use crate::dataset::PairedImageDataset;
use crate::tensor::SampleTensor;
use crate::types::{DatasetResult, PairDatasetError, PairSample};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, warn};

impl burn::data::dataset::Dataset<PairSample> for PairedImageDataset {
    fn get(&self, index: usize) -> Option<PairSample> {
        match PairedImageDataset::get(self, index) {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!(index, error = %e, "skipping pair");
                None
            }
        }
    }

    fn len(&self) -> usize {
        PairedImageDataset::len(self)
    }
}

pub struct PairBatch<B: burn::tensor::backend::Backend> {
    /// `[N, 3, H, W]`
    pub colorized: burn::tensor::Tensor<B, 4>,
    /// `[N, 3, H, W]`
    pub sketch: burn::tensor::Tensor<B, 4>,
    /// `[N, K]`
    pub histogram: Option<burn::tensor::Tensor<B, 2>>,
    /// `[N, 3, h, w]`
    pub resized: Option<burn::tensor::Tensor<B, 4>>,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    /// Drop the last partial batch (training stability for small batches).
    pub drop_last: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            shuffle: true,
            seed: None,
            drop_last: false,
        }
    }
}

/// Walks a dataset once in (optionally shuffled) order.
pub struct BatchIter {
    order: Vec<usize>,
    cursor: usize,
    cfg: BatchConfig,
    processed_batches: usize,
}

impl BatchIter {
    pub fn new(len: usize, cfg: BatchConfig) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        if cfg.shuffle {
            let mut rng = match cfg.seed {
                Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
                None => rand::rngs::StdRng::from_rng(&mut rand::rng()),
            };
            order.shuffle(&mut rng);
        }
        Self {
            order,
            cursor: 0,
            cfg,
            processed_batches: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Next batch, or `None` once the order is exhausted.
    pub fn next_batch<B: burn::tensor::backend::Backend>(
        &mut self,
        ds: &PairedImageDataset,
        device: &B::Device,
    ) -> DatasetResult<Option<PairBatch<B>>> {
        let batch_size = self.cfg.batch_size.max(1);
        if self.remaining() == 0 || (self.cfg.drop_last && self.remaining() < batch_size) {
            return Ok(None);
        }
        let end = (self.cursor + batch_size).min(self.order.len());
        let slice = &self.order[self.cursor..end];
        self.cursor = end;

        let t_load = Instant::now();
        let samples = slice
            .par_iter()
            .map(|&i| ds.get(i))
            .collect::<DatasetResult<Vec<_>>>()?;
        let load_elapsed = t_load.elapsed();

        let n = samples.len();
        let mut colorized = Vec::with_capacity(n);
        let mut sketch = Vec::with_capacity(n);
        let mut histogram = Vec::with_capacity(n);
        let mut resized = Vec::with_capacity(n);
        for s in samples {
            colorized.push(s.colorized);
            sketch.push(s.sketch);
            histogram.extend(s.histogram);
            resized.extend(s.resized);
        }

        let batch = PairBatch {
            colorized: stack::<B, 4>(&colorized, device)?,
            sketch: stack::<B, 4>(&sketch, device)?,
            histogram: optional_stack::<B, 2>(&histogram, n, device)?,
            resized: optional_stack::<B, 4>(&resized, n, device)?,
        };
        self.processed_batches += 1;
        debug!(
            batch = self.processed_batches,
            samples = n,
            load_ms = load_elapsed.as_secs_f64() * 1000.0,
            "assembled pair batch"
        );
        Ok(Some(batch))
    }
}

fn optional_stack<B: burn::tensor::backend::Backend, const D: usize>(
    items: &[SampleTensor],
    expected: usize,
    device: &B::Device,
) -> DatasetResult<Option<burn::tensor::Tensor<B, D>>> {
    if items.is_empty() {
        return Ok(None);
    }
    if items.len() != expected {
        return Err(PairDatasetError::Shape(format!(
            "{} of {} samples carry this tensor",
            items.len(),
            expected
        )));
    }
    stack::<B, D>(items, device).map(Some)
}

/// Concatenate same-shaped tensors along a new leading batch axis.
fn stack<B: burn::tensor::backend::Backend, const D: usize>(
    items: &[SampleTensor],
    device: &B::Device,
) -> DatasetResult<burn::tensor::Tensor<B, D>> {
    let first = items
        .first()
        .ok_or_else(|| PairDatasetError::Other("cannot stack an empty batch".to_string()))?;
    let mut shape = Vec::with_capacity(D);
    shape.push(items.len());
    shape.extend_from_slice(first.shape());
    let mut data = Vec::with_capacity(items.len() * first.len());
    for t in items {
        if t.shape() != first.shape() {
            return Err(PairDatasetError::Shape(format!(
                "batch contains varying shapes {:?} and {:?}; set a transform target_size",
                first.shape(),
                t.shape()
            )));
        }
        data.extend_from_slice(t.data());
    }
    SampleTensor::new(data, shape)?.to_burn::<B, D>(device)
}
