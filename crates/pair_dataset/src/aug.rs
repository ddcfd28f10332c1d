//! Optional image transforms applied to both halves of a pair.

use image::imageops::FilterType;
use image::RgbImage;
use rand::{Rng, RngCore};

/// A transform run on each half after padding and cropping.
///
/// The dataset hands both halves identically seeded RNGs, so any random
/// decision a transform makes is the same for colorized and sketch.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, img: RgbImage, rng: &mut dyn RngCore) -> RgbImage;

    fn describe(&self) -> String {
        "custom".to_string()
    }
}

/// Adapts a plain deterministic closure.
pub struct FnTransform<F>(pub F);

impl<F> ImageTransform for FnTransform<F>
where
    F: Fn(RgbImage) -> RgbImage + Send + Sync,
{
    fn apply(&self, img: RgbImage, _rng: &mut dyn RngCore) -> RgbImage {
        (self.0)(img)
    }

    fn describe(&self) -> String {
        "fn".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct AugmentConfig {
    /// Resize each half to this (width, height) after cropping.
    pub target_size: Option<(u32, u32)>,
    /// Probability of applying a horizontal flip augmentation.
    pub flip_horizontal_prob: f32,
    /// Probability of applying a light color jitter (brightness/contrast).
    pub color_jitter_prob: f32,
    /// Max jitter scale for brightness/contrast.
    pub color_jitter_strength: f32,
    /// Probability of adding uniform noise per channel.
    pub noise_prob: f32,
    /// Max absolute noise added (0-1 range).
    pub noise_strength: f32,
    /// Probability of applying a blur.
    pub blur_prob: f32,
    /// Blur sigma (passed to image::imageops::blur).
    pub blur_sigma: f32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            target_size: None,
            flip_horizontal_prob: 0.0,
            color_jitter_prob: 0.0,
            color_jitter_strength: 0.1,
            noise_prob: 0.0,
            noise_strength: 0.02,
            blur_prob: 0.0,
            blur_sigma: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformPipeline {
    pub target_size: Option<(u32, u32)>,
    pub flip_horizontal_prob: f32,
    pub color_jitter_prob: f32,
    pub color_jitter_strength: f32,
    pub noise_prob: f32,
    pub noise_strength: f32,
    pub blur_prob: f32,
    pub blur_sigma: f32,
}

impl TransformPipeline {
    pub fn from_config(cfg: &AugmentConfig) -> Self {
        Self {
            target_size: cfg.target_size,
            flip_horizontal_prob: cfg.flip_horizontal_prob,
            color_jitter_prob: cfg.color_jitter_prob,
            color_jitter_strength: cfg.color_jitter_strength,
            noise_prob: cfg.noise_prob,
            noise_strength: cfg.noise_strength,
            blur_prob: cfg.blur_prob,
            blur_sigma: cfg.blur_sigma,
        }
    }
}

impl ImageTransform for TransformPipeline {
    fn apply(&self, img: RgbImage, rng: &mut dyn RngCore) -> RgbImage {
        let mut img = match self.target_size {
            Some((w, h)) if img.dimensions() != (w, h) => {
                image::imageops::resize(&img, w, h, FilterType::Triangle)
            }
            _ => img,
        };
        maybe_hflip(&mut img, self.flip_horizontal_prob, rng);
        maybe_jitter(
            &mut img,
            self.color_jitter_prob,
            self.color_jitter_strength,
            rng,
        );
        maybe_noise(&mut img, self.noise_prob, self.noise_strength, rng);
        maybe_blur(&mut img, self.blur_prob, self.blur_sigma, rng);
        img
    }

    fn describe(&self) -> String {
        let ts = self
            .target_size
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_else(|| "none".to_string());
        format!(
            "target_size={} flip_p={:.2} color_jitter_p={:.2} strength={:.2} noise_p={:.2} strength={:.3} blur_p={:.2} sigma={:.2}",
            ts,
            self.flip_horizontal_prob,
            self.color_jitter_prob,
            self.color_jitter_strength,
            self.noise_prob,
            self.noise_strength,
            self.blur_prob,
            self.blur_sigma,
        )
    }
}

#[derive(Debug, Clone)]
pub struct TransformPipelineBuilder {
    inner: TransformPipeline,
}

impl Default for TransformPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformPipelineBuilder {
    pub fn new() -> Self {
        Self {
            inner: TransformPipeline::from_config(&AugmentConfig::default()),
        }
    }
    pub fn target_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.inner.target_size = size;
        self
    }
    pub fn flip_horizontal_prob(mut self, p: f32) -> Self {
        self.inner.flip_horizontal_prob = p;
        self
    }
    pub fn color_jitter(mut self, prob: f32, strength: f32) -> Self {
        self.inner.color_jitter_prob = prob;
        self.inner.color_jitter_strength = strength;
        self
    }
    pub fn noise(mut self, prob: f32, strength: f32) -> Self {
        self.inner.noise_prob = prob;
        self.inner.noise_strength = strength;
        self
    }
    pub fn blur(mut self, prob: f32, sigma: f32) -> Self {
        self.inner.blur_prob = prob;
        self.inner.blur_sigma = sigma;
        self
    }
    pub fn build(self) -> TransformPipeline {
        self.inner
    }
}

pub(crate) fn maybe_hflip(img: &mut RgbImage, prob: f32, rng: &mut dyn RngCore) {
    if prob <= 0.0 {
        return;
    }
    if rng.random_range(0.0..1.0) < prob {
        image::imageops::flip_horizontal_in_place(img);
    }
}

pub(crate) fn maybe_jitter(img: &mut RgbImage, prob: f32, strength: f32, rng: &mut dyn RngCore) {
    if prob <= 0.0 || strength <= 0.0 {
        return;
    }
    if rng.random_range(0.0..1.0) >= prob {
        return;
    }
    let bright = 1.0 + rng.random_range(-strength..strength);
    let contrast = 1.0 + rng.random_range(-strength..strength);
    for pixel in img.pixels_mut() {
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            let mut v = (v - 0.5) * contrast + 0.5;
            v *= bright;
            pixel[c] = (v.clamp(0.0, 1.0) * 255.0) as u8;
        }
    }
}

pub(crate) fn maybe_noise(img: &mut RgbImage, prob: f32, strength: f32, rng: &mut dyn RngCore) {
    if prob <= 0.0 || strength <= 0.0 {
        return;
    }
    if rng.random_range(0.0..1.0) >= prob {
        return;
    }
    for pixel in img.pixels_mut() {
        for c in 0..3 {
            let noise = rng.random_range(-strength..strength);
            let v = (pixel[c] as f32 / 255.0 + noise).clamp(0.0, 1.0);
            pixel[c] = (v * 255.0) as u8;
        }
    }
}

pub(crate) fn maybe_blur(img: &mut RgbImage, prob: f32, sigma: f32, rng: &mut dyn RngCore) {
    if prob <= 0.0 || sigma <= 0.0 {
        return;
    }
    if rng.random_range(0.0..1.0) >= prob {
        return;
    }
    *img = image::imageops::blur(img, sigma);
}

#[cfg(test)]
mod aug_tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient() -> RgbImage {
        RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8 * 60, y as u8 * 100, 10]))
    }

    #[test]
    fn hflip_mirrors_columns() {
        let mut img = gradient();
        let mut rng = StdRng::seed_from_u64(1);
        maybe_hflip(&mut img, 1.0, &mut rng);
        assert_eq!(img.get_pixel(0, 0)[0], 180);
        assert_eq!(img.get_pixel(3, 0)[0], 0);
    }

    #[test]
    fn same_seed_same_augmentation() {
        let pipeline = TransformPipelineBuilder::new()
            .flip_horizontal_prob(0.5)
            .color_jitter(0.5, 0.3)
            .noise(0.5, 0.1)
            .build();
        for seed in 0..8 {
            let mut rng_a = StdRng::seed_from_u64(seed);
            let mut rng_b = rng_a.clone();
            let a = pipeline.apply(gradient(), &mut rng_a);
            let b = pipeline.apply(gradient(), &mut rng_b);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn target_size_resizes() {
        let pipeline = TransformPipelineBuilder::new()
            .target_size(Some((2, 3)))
            .build();
        let mut rng = StdRng::seed_from_u64(0);
        let out = pipeline.apply(gradient(), &mut rng);
        assert_eq!(out.dimensions(), (2, 3));
        assert!(pipeline.describe().starts_with("target_size=2x3"));
    }

    #[test]
    fn fn_transform_is_passthrough_for_rng() {
        let t = FnTransform(|img: RgbImage| image::imageops::flip_vertical(&img));
        let mut rng = StdRng::seed_from_u64(0);
        let out = t.apply(gradient(), &mut rng);
        assert_eq!(out.get_pixel(0, 0)[1], 100);
    }
}
