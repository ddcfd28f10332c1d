//! Dataset validation and quality checks.

use crate::dataset::{sample_id, PairedImageDataset};
use crate::types::{DatasetSummary, ValidationOutcome, ValidationReport, ValidationThresholds};
use data_contracts::ColorgramRecord;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
struct FileCheck {
    ok: bool,
    undecodable: bool,
    invalid_layout: bool,
    odd_width: bool,
    missing_colorgram: bool,
    invalid_colorgram: bool,
    missing_resize: bool,
}

fn check_file(ds: &PairedImageDataset, path: &Path) -> FileCheck {
    let cfg = ds.config();
    let id = sample_id(path);
    let mut check = FileCheck::default();

    match image::image_dimensions(path) {
        Err(_) => check.undecodable = true,
        Ok((w, h)) => {
            check.invalid_layout = w < 2 || h == 0;
            check.odd_width = w % 2 == 1;
        }
    }

    if cfg.color_histogram {
        let json = cfg.colorgram_dir().join(format!("{id}.json"));
        match fs::read(&json) {
            Err(_) => check.missing_colorgram = true,
            Ok(raw) => {
                check.invalid_colorgram = ColorgramRecord::from_slice(&raw)
                    .map(|r| r.validate().is_err())
                    .unwrap_or(true);
            }
        }
    }
    if cfg.need_resize {
        check.missing_resize = !ds.resize_path(&id).is_file();
    }

    check.ok = !(check.undecodable
        || check.invalid_layout
        || check.missing_colorgram
        || check.invalid_colorgram
        || check.missing_resize);
    check
}

/// Check every indexed file without decoding pixel data.
pub fn summarize_dataset(ds: &PairedImageDataset) -> DatasetSummary {
    let checks: Vec<FileCheck> = ds
        .files()
        .par_iter()
        .map(|path| check_file(ds, path))
        .collect();
    let cfg = ds.config();
    let mut summary = DatasetSummary {
        root: cfg.root.clone(),
        mode: cfg.mode,
        total: checks.len(),
        ..Default::default()
    };
    for c in checks {
        summary.ok += c.ok as usize;
        summary.undecodable += c.undecodable as usize;
        summary.invalid_layout += c.invalid_layout as usize;
        summary.odd_width += c.odd_width as usize;
        summary.missing_colorgram += c.missing_colorgram as usize;
        summary.invalid_colorgram += c.invalid_colorgram as usize;
        summary.missing_resize += c.missing_resize as usize;
    }
    summary
}

fn apply_thresholds(
    label: &str,
    count: usize,
    ratio: f32,
    max_count: Option<usize>,
    max_ratio: Option<f32>,
    outcome: &mut ValidationOutcome,
    reasons: &mut Vec<String>,
) {
    if let Some(max) = max_count {
        if count > max {
            *outcome = ValidationOutcome::Fail;
            reasons.push(format!("{label}: {count} exceeds max {max}"));
        }
    }
    if let Some(max_r) = max_ratio {
        if ratio > max_r {
            *outcome = ValidationOutcome::Fail;
            reasons.push(format!(
                "{label}: ratio {:.3} exceeds max {:.3}",
                ratio, max_r
            ));
        }
    }
    if count > 0 {
        if *outcome == ValidationOutcome::Pass {
            *outcome = ValidationOutcome::Warn;
        }
        reasons.push(format!("{label}: {count} observed"));
    }
}

pub fn validate_summary(
    summary: DatasetSummary,
    thresholds: &ValidationThresholds,
) -> ValidationReport {
    let denom = summary.total.max(1) as f32;
    let missing = summary.missing_colorgram + summary.missing_resize;
    let invalid = summary.undecodable + summary.invalid_layout + summary.invalid_colorgram;

    let mut outcome = ValidationOutcome::Pass;
    let mut reasons = Vec::new();

    if summary.total == 0 {
        outcome = ValidationOutcome::Warn;
        reasons.push(format!(
            "no images under {}",
            summary.root.join(summary.mode.as_str()).display()
        ));
    }
    apply_thresholds(
        "missing side files (colorgram/resize)",
        missing,
        missing as f32 / denom,
        thresholds.max_missing,
        thresholds.max_missing_ratio,
        &mut outcome,
        &mut reasons,
    );
    apply_thresholds(
        "invalid files (decode/layout/colorgram)",
        invalid,
        invalid as f32 / denom,
        thresholds.max_invalid,
        thresholds.max_invalid_ratio,
        &mut outcome,
        &mut reasons,
    );
    if summary.odd_width > 0 {
        reasons.push(format!(
            "odd-width pairs: {} (right half keeps the extra column)",
            summary.odd_width
        ));
    }

    ValidationReport {
        outcome,
        reasons,
        summary,
    }
}

pub fn summarize_with_thresholds(
    ds: &PairedImageDataset,
    thresholds: &ValidationThresholds,
) -> ValidationReport {
    validate_summary(summarize_dataset(ds), thresholds)
}
