//! Plain CPU tensors handed to the training side.

use crate::types::{DatasetResult, PairDatasetError};
use image::RgbImage;

/// Map values in [0, 1] to [-1, 1] in place.
pub fn scale(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = *v * 2.0 - 1.0;
    }
}

/// Inverse of [`scale`].
pub fn unscale(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = (*v + 1.0) / 2.0;
    }
}

/// Row-major `f32` buffer with an explicit shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl SampleTensor {
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> DatasetResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(PairDatasetError::Shape(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    /// CHW layout, normalized to [0, 1].
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let plane = (width * height) as usize;
        let mut data = vec![0.0f32; plane * 3];
        for (x, y, pixel) in img.enumerate_pixels() {
            let base = (y * width + x) as usize;
            data[base] = pixel[0] as f32 / 255.0;
            data[plane + base] = pixel[1] as f32 / 255.0;
            data[2 * plane + base] = pixel[2] as f32 / 255.0;
        }
        Self {
            data,
            shape: vec![3, height as usize, width as usize],
        }
    }

    /// Rebuild an 8-bit image from a CHW tensor in [-1, 1].
    pub fn to_rgb_image(&self) -> DatasetResult<RgbImage> {
        let &[c, h, w] = self.shape.as_slice() else {
            return Err(PairDatasetError::Shape(format!(
                "expected [3, H, W], got {:?}",
                self.shape
            )));
        };
        if c != 3 {
            return Err(PairDatasetError::Shape(format!(
                "expected 3 channels, got {c}"
            )));
        }
        let plane = h * w;
        let mut values = self.data.clone();
        unscale(&mut values);
        let img = RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let base = y as usize * w + x as usize;
            let px = |c: usize| (values[c * plane + base].clamp(0.0, 1.0) * 255.0).round() as u8;
            image::Rgb([px(0), px(1), px(2)])
        });
        Ok(img)
    }

    pub fn scaled(mut self) -> Self {
        scale(&mut self.data);
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// (min, max) over all values; `None` for an empty tensor.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    #[cfg(feature = "burn-runtime")]
    pub fn to_burn<B: burn::tensor::backend::Backend, const D: usize>(
        &self,
        device: &B::Device,
    ) -> DatasetResult<burn::tensor::Tensor<B, D>> {
        let shape: [usize; D] = self.shape.clone().try_into().map_err(|s: Vec<usize>| {
            PairDatasetError::Shape(format!("cannot view {:?} as rank {}", s, D))
        })?;
        Ok(
            burn::tensor::Tensor::<B, 1>::from_floats(self.data.as_slice(), device)
                .reshape(shape),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trip() {
        let original = vec![0.0, 0.25, 0.5, 1.0];
        let mut values = original.clone();
        scale(&mut values);
        assert_eq!(values, vec![-1.0, -0.5, 0.0, 1.0]);
        unscale(&mut values);
        for (a, b) in values.iter().zip(&original) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn from_rgb_is_chw() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        let t = SampleTensor::from_rgb(&img);
        assert_eq!(t.shape(), &[3, 1, 2]);
        assert_eq!(t.data(), &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn rgb_image_survives_scaling() {
        let img = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 80, y as u8 * 120, 7]));
        let back = SampleTensor::from_rgb(&img).scaled().to_rgb_image().unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn new_rejects_bad_shape() {
        assert!(SampleTensor::new(vec![0.0; 5], vec![2, 3]).is_err());
        assert!(SampleTensor::new(vec![0.0; 6], vec![2, 3]).is_ok());
    }
}
