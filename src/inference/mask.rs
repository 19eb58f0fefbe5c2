//! Surface classes and per-pixel segmentation masks.

use crate::constants::segmentation::CLASS_COUNT;
use image::{Rgb, RgbImage};
use std::fmt;

/// Surface class predicted for a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SurfaceClass {
    /// Unlabelled pixels.
    Background = 0,
    /// Open water.
    Sea = 1,
    /// Oil on the water surface.
    OilSpill = 2,
    /// Vessels.
    Ship = 3,
    /// Coastline and land.
    Land = 4,
}

impl SurfaceClass {
    /// All classes in model output order.
    pub const ALL: [Self; CLASS_COUNT] = [
        Self::Background,
        Self::Sea,
        Self::OilSpill,
        Self::Ship,
        Self::Land,
    ];

    /// Class for a model output channel index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Model output channel index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Legend colour.
    pub fn color(self) -> Rgb<u8> {
        match self {
            Self::Background => Rgb([0, 0, 0]),
            Self::Sea => Rgb([0, 255, 255]),
            Self::OilSpill => Rgb([238, 130, 238]),
            Self::Ship => Rgb([255, 0, 0]),
            Self::Land => Rgb([0, 128, 0]),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Sea => "sea",
            Self::OilSpill => "oil spill",
            Self::Ship => "ship",
            Self::Land => "land",
        }
    }
}

impl fmt::Display for SurfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row-major per-pixel class labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    labels: Vec<SurfaceClass>,
}

impl SegmentationMask {
    /// Build a mask; `labels` must hold exactly `width * height` entries.
    pub fn new(width: u32, height: u32, labels: Vec<SurfaceClass>) -> Option<Self> {
        (labels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            labels,
        })
    }

    /// Build a mask by taking the arg-max over NHWC class scores.
    ///
    /// `scores` holds `width * height * CLASS_COUNT` values, class innermost.
    /// Ties resolve to the lowest class index.
    pub fn from_scores(width: u32, height: u32, scores: &[f32]) -> Option<Self> {
        let pixels = width as usize * height as usize;
        if scores.len() != pixels * CLASS_COUNT {
            return None;
        }

        let labels = scores
            .chunks_exact(CLASS_COUNT)
            .map(|pixel| {
                let mut best = 0;
                for (i, &score) in pixel.iter().enumerate().skip(1) {
                    if score > pixel[best] {
                        best = i;
                    }
                }
                SurfaceClass::ALL[best]
            })
            .collect();

        Self::new(width, height, labels)
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Label at pixel `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<SurfaceClass> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Pixel count per class, indexed by [`SurfaceClass::index`].
    pub fn class_counts(&self) -> [usize; CLASS_COUNT] {
        let mut counts = [0; CLASS_COUNT];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Whether any pixel carries `class`.
    pub fn contains(&self, class: SurfaceClass) -> bool {
        self.labels.contains(&class)
    }

    /// Render the mask with the legend palette.
    pub fn to_color_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            self.get(x, y)
                .unwrap_or(SurfaceClass::Background)
                .color()
        })
    }
}
