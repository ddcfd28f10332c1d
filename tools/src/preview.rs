use anyhow::{ensure, Result};
use image::RgbImage;
use pair_dataset::PairSample;

/// Render a processed sample back into one `colorized | sketch` strip.
pub fn side_by_side(sample: &PairSample) -> Result<RgbImage> {
    let colorized = sample.colorized.to_rgb_image()?;
    let sketch = sample.sketch.to_rgb_image()?;
    ensure!(
        colorized.height() == sketch.height(),
        "halves differ in height: {} vs {}",
        colorized.height(),
        sketch.height()
    );
    let mut out = RgbImage::new(colorized.width() + sketch.width(), colorized.height());
    image::imageops::replace(&mut out, &colorized, 0, 0);
    image::imageops::replace(&mut out, &sketch, colorized.width().into(), 0);
    Ok(out)
}
