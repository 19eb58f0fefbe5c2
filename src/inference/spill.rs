//! Oil spill decision on a single image.

use crate::error::{Error, Result};
use crate::inference::{PixelClassifier, SurfaceClass, save_visualization};
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of one spill check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpillOutcome {
    /// Whether at least one pixel was labelled as oil spill.
    pub detected: bool,
    /// Visualization written for a confirmed spill.
    pub image_path: Option<PathBuf>,
}

/// Decides whether an image shows an oil spill.
pub trait SpillDetector: Send + Sync {
    /// Inspect `image`; when a spill is found, render to `save_path` if given.
    fn inspect(&self, image: &Path, save_path: Option<&Path>) -> Result<SpillOutcome>;
}

/// Spill detector backed by a pixel classifier.
pub struct SpillInspector<C: PixelClassifier> {
    classifier: C,
    visualize: bool,
}

impl<C: PixelClassifier> SpillInspector<C> {
    /// Wrap `classifier`; `visualize` controls whether spills are rendered.
    pub fn new(classifier: C, visualize: bool) -> Self {
        Self {
            classifier,
            visualize,
        }
    }
}

impl<C: PixelClassifier> SpillDetector for SpillInspector<C> {
    fn inspect(&self, image: &Path, save_path: Option<&Path>) -> Result<SpillOutcome> {
        let original = image::open(image)
            .map_err(|source| Error::ImageRead {
                path: image.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let (width, height) = self.classifier.input_size();
        let resized = imageops::resize(&original, width, height, FilterType::Triangle);
        let mask = self.classifier.classify(&resized)?;

        let counts = mask.class_counts();
        debug!(
            "Class distribution for {}: {}",
            image.display(),
            SurfaceClass::ALL
                .iter()
                .map(|c| format!("{c}={}", counts[c.index()]))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let detected = mask.contains(SurfaceClass::OilSpill);
        if !detected {
            return Ok(SpillOutcome::default());
        }

        let image_path = match save_path {
            Some(path) if self.visualize => {
                save_visualization(&resized, &mask, path)?;
                info!("Saved spill visualization to {}", path.display());
                Some(path.to_path_buf())
            }
            _ => None,
        };

        Ok(SpillOutcome {
            detected,
            image_path,
        })
    }
}

/// Run a spill check, treating every failure as "no spill".
pub fn check_for_spill(
    detector: &dyn SpillDetector,
    image: &Path,
    save_path: Option<&Path>,
) -> SpillOutcome {
    match detector.inspect(image, save_path) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Spill check on {} failed: {e}", image.display());
            SpillOutcome::default()
        }
    }
}
