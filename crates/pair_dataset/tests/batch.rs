#![cfg(feature = "burn-runtime")]

use burn::backend::NdArray;
use burn::data::dataset::Dataset;
use image::RgbImage;
use pair_dataset::{BatchConfig, BatchIter, Mode, PairDatasetConfig, PairedImageDataset};
use std::fs;

type B = NdArray<f32>;

fn dataset(root: &std::path::Path, count: usize) -> anyhow::Result<PairedImageDataset> {
    let split = root.join("train");
    let colorgram = root.join("colorgram");
    fs::create_dir_all(&split)?;
    fs::create_dir_all(&colorgram)?;
    for i in 0..count {
        RgbImage::new(12, 6).save(split.join(format!("{i}.png")))?;
        fs::write(colorgram.join(format!("{i}.json")), br#"{"1": [[9, 9, 9]]}"#)?;
    }
    Ok(PairedImageDataset::new(PairDatasetConfig {
        root: root.to_path_buf(),
        mode: Mode::Train,
        size: 8,
        color_histogram: true,
        ..PairDatasetConfig::default()
    })?)
}

#[test]
fn batches_stack_along_leading_axis() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let ds = dataset(tmp.path(), 5)?;
    let device = Default::default();
    let mut iter = BatchIter::new(
        ds.len(),
        BatchConfig {
            batch_size: 2,
            shuffle: true,
            seed: Some(3),
            drop_last: false,
        },
    );

    let mut sizes = Vec::new();
    while let Some(batch) = iter.next_batch::<B>(&ds, &device)? {
        let [n, c, h, w] = batch.colorized.dims();
        assert_eq!((c, h, w), (3, 8, 8));
        assert_eq!(batch.sketch.dims(), [n, 3, 8, 8]);
        assert_eq!(batch.histogram.as_ref().map(|t| t.dims()), Some([n, 48]));
        assert!(batch.resized.is_none());
        sizes.push(n);
    }
    assert_eq!(sizes, vec![2, 2, 1]);
    Ok(())
}

#[test]
fn drop_last_skips_partial_batch() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let ds = dataset(tmp.path(), 5)?;
    let device = Default::default();
    let mut iter = BatchIter::new(
        ds.len(),
        BatchConfig {
            batch_size: 2,
            shuffle: false,
            seed: None,
            drop_last: true,
        },
    );
    let mut batches = 0;
    while iter.next_batch::<B>(&ds, &device)?.is_some() {
        batches += 1;
    }
    assert_eq!(batches, 2);
    Ok(())
}

#[test]
fn burn_dataset_view_skips_failures() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let ds = dataset(tmp.path(), 2)?;
    fs::remove_file(tmp.path().join("colorgram/1.json"))?;
    assert_eq!(Dataset::len(&ds), 2);
    assert!(Dataset::get(&ds, 0).is_some());
    assert!(Dataset::get(&ds, 1).is_none());
    Ok(())
}
