use std::path::{Path, PathBuf};

use pair_dataset::{Mode, PairDatasetConfig, ValidationThresholds, DEFAULT_ROOT, DEFAULT_SIZE};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_NAME: &str = "pair-tools.toml";
pub const CONFIG_ENV: &str = "PAIR_TOOLS_CONFIG";

/// Settings shared by the pair_* binaries.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub root: PathBuf,
    pub mode: Mode,
    pub size: u32,
    pub color_histogram: bool,
    pub need_resize: bool,
    pub colorgram_dir: Option<PathBuf>,
    pub resize_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub thresholds: ValidationThresholds,
}

impl Default for ToolConfig {
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
            thresholds: ValidationThresholds::from_env(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ToolConfigFile {
    dataset: Option<DatasetSection>,
    validation: Option<ValidationSection>,
}

#[derive(Debug, Deserialize, Default)]
struct DatasetSection {
    root: Option<String>,
    mode: Option<Mode>,
    size: Option<u32>,
    color_histogram: Option<bool>,
    need_resize: Option<bool>,
    colorgram_dir: Option<String>,
    resize_dir: Option<String>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ValidationSection {
    max_invalid: Option<usize>,
    max_missing: Option<usize>,
    max_invalid_ratio: Option<f32>,
    max_missing_ratio: Option<f32>,
}

impl ToolConfig {
    /// `$PAIR_TOOLS_CONFIG`, else `./pair-tools.toml`, else defaults.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME));
        let cfg = match Self::from_path(&path) {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable tools config");
                Self::default()
            }
        };
        cfg.warn_if_invalid();
        cfg
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_path(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let file: ToolConfigFile = toml::from_str(&raw)?;
        Ok(Some(Self::from_file(file)))
    }

    fn from_file(file: ToolConfigFile) -> Self {
        let defaults = Self::default();
        let ds = file.dataset.unwrap_or_default();
        let env_thresholds = defaults.thresholds.clone();
        let thresholds = match file.validation {
            Some(v) => ValidationThresholds {
                max_invalid: v.max_invalid.or(env_thresholds.max_invalid),
                max_missing: v.max_missing.or(env_thresholds.max_missing),
                max_invalid_ratio: v.max_invalid_ratio.or(env_thresholds.max_invalid_ratio),
                max_missing_ratio: v.max_missing_ratio.or(env_thresholds.max_missing_ratio),
            },
            None => env_thresholds,
        };
        ToolConfig {
            root: ds
                .root
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.root),
            mode: ds.mode.unwrap_or(defaults.mode),
            size: ds.size.unwrap_or(defaults.size),
            color_histogram: ds.color_histogram.unwrap_or(defaults.color_histogram),
            need_resize: ds.need_resize.unwrap_or(defaults.need_resize),
            colorgram_dir: ds.colorgram_dir.map(|v| expand_path(&v)),
            resize_dir: ds.resize_dir.map(|v| expand_path(&v)),
            seed: ds.seed,
            thresholds,
        }
    }

    pub fn dataset_config(&self) -> PairDatasetConfig {
        PairDatasetConfig {
            root: self.root.clone(),
            mode: self.mode,
            size: self.size,
            color_histogram: self.color_histogram,
            need_resize: self.need_resize,
            colorgram_dir: self.colorgram_dir.clone(),
            resize_dir: self.resize_dir.clone(),
            seed: self.seed,
        }
    }

    fn warn_if_invalid(&self) {
        if self.size == 0 {
            warn!("tools config: dataset.size is 0; every crop will be empty");
        }
        if !self.root.join(self.mode.as_str()).is_dir() {
            warn!(
                root = %self.root.display(),
                mode = %self.mode,
                "tools config: split directory not found"
            );
        }
    }
}

/// Expand a leading `~` and any `${VAR}` references; unknown variables are kept verbatim.
pub fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
