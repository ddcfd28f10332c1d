use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pair_dataset::{
    summarize_with_thresholds, Mode, PairedImageDataset, ValidationOutcome,
};
use pair_tools::{side_by_side, ToolConfig};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Train,
    Val,
    Test,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Train => Mode::Train,
            ModeArg::Val => Mode::Val,
            ModeArg::Test => Mode::Test,
        }
    }
}

/// Overrides for values otherwise taken from pair-tools.toml.
#[derive(Args, Debug)]
struct DatasetArgs {
    /// Dataset root containing train/val/test directories.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Split to inspect.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Crop size for both halves.
    #[arg(long)]
    size: Option<u32>,
    /// Require and attach colorgram side files (`--color-histogram false` to disable).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    color_histogram: Option<bool>,
    /// Require and attach pre-resized side files (`--need-resize false` to disable).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    need_resize: Option<bool>,
    /// Colorgram JSON directory (defaults to <root>/colorgram).
    #[arg(long)]
    colorgram_dir: Option<PathBuf>,
    /// Pre-resized PNG directory (defaults to <root>/resize).
    #[arg(long)]
    resize_dir: Option<PathBuf>,
}

impl DatasetArgs {
    fn apply(&self, cfg: &mut ToolConfig) {
        if let Some(root) = &self.root {
            cfg.root = root.clone();
        }
        if let Some(mode) = self.mode {
            cfg.mode = mode.into();
        }
        if let Some(size) = self.size {
            cfg.size = size;
        }
        if let Some(on) = self.color_histogram {
            cfg.color_histogram = on;
        }
        if let Some(on) = self.need_resize {
            cfg.need_resize = on;
        }
        if self.colorgram_dir.is_some() {
            cfg.colorgram_dir = self.colorgram_dir.clone();
        }
        if self.resize_dir.is_some() {
            cfg.resize_dir = self.resize_dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every pair and its side files; print a JSON report.
    Summary,
    /// Write one processed pair as a side-by-side PNG.
    Preview {
        /// Sample index.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Output PNG path.
        #[arg(long, default_value = "pair_preview.png")]
        out: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "pair_inspect",
    about = "Inspect a paired colorized/sketch dataset"
)]
struct Cli {
    #[command(flatten)]
    dataset: DatasetArgs,
    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = ToolConfig::load();
    cli.dataset.apply(&mut cfg);

    let ds = PairedImageDataset::new(cfg.dataset_config()).with_context(|| {
        format!(
            "open dataset at {} ({})",
            cfg.root.display(),
            cfg.mode
        )
    })?;
    info!(samples = ds.len(), root = %cfg.root.display(), mode = %cfg.mode, "dataset indexed");

    match cli.command {
        Command::Summary => {
            let report = summarize_with_thresholds(&ds, &cfg.thresholds);
            println!("{}", serde_json::to_string_pretty(&report)?);
            info!(outcome = report.outcome.as_str(), "validation finished");
            if report.outcome == ValidationOutcome::Fail {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Preview { index, out } => {
            let sample = ds
                .get(index)
                .with_context(|| format!("load sample {index}"))?;
            let strip = side_by_side(&sample)?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            strip
                .save(&out)
                .with_context(|| format!("write {}", out.display()))?;
            info!(id = %sample.id, out = %out.display(), "preview written");
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid args")
    }

    #[test]
    fn flags_override_file_in_both_directions() {
        let mut cfg = ToolConfig {
            color_histogram: true,
            need_resize: false,
            ..ToolConfig::default()
        };
        parse(&["pair_inspect", "--need-resize", "--color-histogram", "false", "summary"])
            .dataset
            .apply(&mut cfg);
        assert!(!cfg.color_histogram);
        assert!(cfg.need_resize);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let mut cfg = ToolConfig {
            color_histogram: true,
            need_resize: true,
            ..ToolConfig::default()
        };
        parse(&["pair_inspect", "summary"]).dataset.apply(&mut cfg);
        assert!(cfg.color_histogram);
        assert!(cfg.need_resize);
    }
}
