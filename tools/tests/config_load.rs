use std::fs;
use std::path::PathBuf;

use image::RgbImage;
use pair_dataset::{Mode, PairDatasetConfig, PairedImageDataset};
use pair_tools::{side_by_side, ToolConfig};

fn write_temp_config(dir: &std::path::Path, contents: &str) -> PathBuf {
    let path = dir.join("pair-tools.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn loads_dataset_section() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_temp_config(
        tmp.path(),
        r#"
[dataset]
root = "/srv/pairs"
mode = "val"
size = 256
color_histogram = true
resize_dir = "/srv/resize224"

[validation]
max_missing = 3
"#,
    );
    let cfg = ToolConfig::from_path(&path).unwrap().expect("config present");
    assert_eq!(cfg.root, PathBuf::from("/srv/pairs"));
    assert_eq!(cfg.mode, Mode::Val);
    assert_eq!(cfg.size, 256);
    assert!(cfg.color_histogram);
    assert!(!cfg.need_resize);
    assert_eq!(cfg.thresholds.max_missing, Some(3));

    let ds_cfg = cfg.dataset_config();
    assert_eq!(ds_cfg.colorgram_dir(), PathBuf::from("/srv/pairs/colorgram"));
    assert_eq!(ds_cfg.resize_dir(), PathBuf::from("/srv/resize224"));
}

#[test]
fn missing_file_is_none_and_bad_mode_is_error() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(ToolConfig::from_path(&tmp.path().join("absent.toml"))
        .unwrap()
        .is_none());
    let path = write_temp_config(tmp.path(), "[dataset]\nmode = \"bogus\"\n");
    assert!(ToolConfig::from_path(&path).is_err());
}

#[test]
fn preview_strip_is_double_width() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let split = tmp.path().join("train");
    fs::create_dir_all(&split)?;
    RgbImage::new(20, 10).save(split.join("p.png"))?;
    let ds = PairedImageDataset::new(PairDatasetConfig {
        root: tmp.path().to_path_buf(),
        size: 12,
        ..PairDatasetConfig::default()
    })?;
    let strip = side_by_side(&ds.get(0)?)?;
    assert_eq!(strip.dimensions(), (24, 12));
    Ok(())
}
