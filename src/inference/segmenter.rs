//! ONNX Runtime segmentation model.

use crate::config::SegmentationConfig;
use crate::constants::segmentation::{CHANNELS, CLASS_COUNT};
use crate::error::{Error, Result};
use crate::inference::SegmentationMask;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Assigns a surface class to every pixel of an image.
pub trait PixelClassifier: Send + Sync {
    /// Input size `(width, height)` the classifier runs at.
    fn input_size(&self) -> (u32, u32);

    /// Classify every pixel of `image`.
    fn classify(&self, image: &RgbImage) -> Result<SegmentationMask>;
}

/// U-Net style segmenter exported to ONNX.
///
/// Expects NHWC `f32` input `[1, H, W, 3]` scaled to `[0, 1]` and produces
/// NHWC class scores `[1, H, W, 5]`.
pub struct OnnxSegmenter {
    session: Mutex<Session>,
    width: u32,
    height: u32,
}

impl OnnxSegmenter {
    /// Load the model named by the segmentation settings.
    pub fn from_config(config: &SegmentationConfig) -> Result<Self> {
        Self::load(&config.model, config.width, config.height, config.threads)
    }

    /// Load a model from disk.
    pub fn load(model: &Path, width: u32, height: u32, threads: Option<usize>) -> Result<Self> {
        if !model.is_file() {
            return Err(Error::ModelFileNotFound {
                path: model.to_path_buf(),
            });
        }

        let mut builder = Session::builder()
            .map_err(build_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(build_error)?;
        if let Some(threads) = threads {
            builder = builder.with_intra_threads(threads).map_err(build_error)?;
        }
        let session = builder.commit_from_file(model).map_err(build_error)?;

        info!(
            "Loaded segmentation model: {} ({}x{})",
            model.display(),
            width,
            height
        );

        Ok(Self {
            session: Mutex::new(session),
            width,
            height,
        })
    }
}

impl PixelClassifier for OnnxSegmenter {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn classify(&self, image: &RgbImage) -> Result<SegmentationMask> {
        let resized;
        let image = if image.dimensions() == (self.width, self.height) {
            image
        } else {
            resized = imageops::resize(image, self.width, self.height, FilterType::Triangle);
            &resized
        };

        let shape = [1usize, self.height as usize, self.width as usize, CHANNELS];
        let input = Tensor::from_array((shape, to_unit_range(image))).map_err(inference_error)?;

        let mut session = self.session.lock().map_err(|_| Error::Inference {
            reason: "segmentation session lock poisoned".to_string(),
        })?;
        let outputs = session.run(ort::inputs![input]).map_err(inference_error)?;
        let (out_shape, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;
        debug!("Segmentation output shape: {:?}", out_shape);

        SegmentationMask::from_scores(self.width, self.height, scores).ok_or_else(|| {
            Error::Inference {
                reason: format!(
                    "expected {} scores for a {}x{}x{} output, got {}",
                    self.width as usize * self.height as usize * CLASS_COUNT,
                    self.height,
                    self.width,
                    CLASS_COUNT,
                    scores.len()
                ),
            }
        })
    }
}

/// Interleaved RGB bytes as `f32` in `[0, 1]`, row-major (NHWC order).
pub(crate) fn to_unit_range(image: &RgbImage) -> Vec<f32> {
    image.as_raw().iter().map(|&b| f32::from(b) / 255.0).collect()
}

fn build_error(e: impl std::fmt::Display) -> Error {
    Error::ClassifierBuild {
        reason: e.to_string(),
    }
}

fn inference_error(e: impl std::fmt::Display) -> Error {
    Error::Inference {
        reason: e.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_to_unit_range_is_nhwc() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let data = to_unit_range(&img);
        assert_eq!(data.len(), 2 * CHANNELS);
        assert_eq!(data[0], 1.0);
        assert_eq!(data[1], 0.0);
        assert!((data[2] - 0.2).abs() < 1e-6);
        assert_eq!(data[4], 1.0);
    }

    #[test]
    fn test_load_missing_model_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = OnnxSegmenter::load(&dir.path().join("absent.onnx"), 256, 256, None);
        assert!(matches!(result, Err(Error::ModelFileNotFound { .. })));
    }
}
