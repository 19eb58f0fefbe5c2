//! Satellite image segmentation and oil spill checks.

mod mask;
mod segmenter;
mod spill;
mod visualize;

pub use mask::{SegmentationMask, SurfaceClass};
pub use segmenter::{OnnxSegmenter, PixelClassifier};
pub use spill::{SpillDetector, SpillInspector, SpillOutcome, check_for_spill};
pub use visualize::{render_visualization, save_visualization};

#[cfg(test)]
pub(crate) use spill::tests::FakeClassifier;
