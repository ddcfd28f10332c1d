use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One palette color, `[r, g, b]` in 0..=255.
pub type PaletteColor = [u8; 3];

/// Extracted color palette for a single sample, as stored in `<id>.json`.
///
/// Keys are 1-based region indices serialized as strings (`"1"`, `"2"`, ...);
/// each value lists that region's dominant colors, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorgramRecord {
    pub regions: BTreeMap<String, Vec<PaletteColor>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorgramError {
    #[error("region key is not a positive integer: {0:?}")]
    InvalidRegionKey(String),
    #[error("region {0} has no colors")]
    EmptyRegion(usize),
    #[error("record has no regions")]
    Empty,
}

impl ColorgramRecord {
    /// Parse a record from raw JSON bytes.
    pub fn from_slice(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }

    /// Iterate `(region_index, colors)` in ascending region order.
    pub fn indexed_regions(
        &self,
    ) -> impl Iterator<Item = Result<(usize, &[PaletteColor]), ColorgramError>> + '_ {
        let mut parsed: Vec<_> = self
            .regions
            .iter()
            .map(|(key, colors)| {
                parse_region_key(key).map(|idx| (idx, colors.as_slice()))
            })
            .collect();
        // BTreeMap orders "10" before "2"; sort numerically once keys are parsed.
        parsed.sort_by_key(|r| match r {
            Ok((idx, _)) => *idx,
            Err(_) => 0,
        });
        parsed.into_iter()
    }

    pub fn region(&self, index: usize) -> Option<&[PaletteColor]> {
        self.regions
            .iter()
            .find(|(key, _)| parse_region_key(key).ok() == Some(index))
            .map(|(_, colors)| colors.as_slice())
    }

    pub fn validate(&self) -> Result<(), ColorgramError> {
        if self.regions.is_empty() {
            return Err(ColorgramError::Empty);
        }
        for entry in self.indexed_regions() {
            let (idx, colors) = entry?;
            if colors.is_empty() {
                return Err(ColorgramError::EmptyRegion(idx));
            }
        }
        Ok(())
    }
}

fn parse_region_key(key: &str) -> Result<usize, ColorgramError> {
    match key.trim().parse::<usize>() {
        Ok(idx) if idx > 0 => Ok(idx),
        _ => Err(ColorgramError::InvalidRegionKey(key.to_string())),
    }
}
