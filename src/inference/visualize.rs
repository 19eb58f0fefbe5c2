//! Side-by-side rendering of an image and its segmentation.

use crate::constants::visualization::{CANVAS_BACKGROUND, LEGEND_WIDTH, PANEL_GAP};
use crate::error::{Error, Result};
use crate::inference::{SegmentationMask, SurfaceClass};
use image::{ImageFormat, Rgb, RgbImage, imageops};
use std::path::Path;

/// Compose `original | coloured mask | legend` on a plain canvas.
///
/// The legend is one unlabelled square swatch per class, top to bottom in
/// class order: background, sea, oil spill, ship, land.
pub fn render_visualization(original: &RgbImage, mask: &SegmentationMask) -> RgbImage {
    let swatch_gap = PANEL_GAP / 2;
    let class_count = SurfaceClass::ALL.len() as u32;
    let legend_height = class_count * LEGEND_WIDTH + (class_count - 1) * swatch_gap;

    let width = original.width() + PANEL_GAP + mask.width() + PANEL_GAP + LEGEND_WIDTH;
    let height = original.height().max(mask.height()).max(legend_height);
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(CANVAS_BACKGROUND));

    imageops::replace(&mut canvas, original, 0, 0);
    let mask_x = original.width() + PANEL_GAP;
    imageops::replace(&mut canvas, &mask.to_color_image(), i64::from(mask_x), 0);

    let legend_x = mask_x + mask.width() + PANEL_GAP;
    for (i, class) in SurfaceClass::ALL.iter().enumerate() {
        let top = i as u32 * (LEGEND_WIDTH + swatch_gap);
        for y in top..top + LEGEND_WIDTH {
            for x in legend_x..legend_x + LEGEND_WIDTH {
                canvas.put_pixel(x, y, class.color());
            }
        }
    }

    canvas
}

/// Render and write the visualization as PNG.
pub fn save_visualization(original: &RgbImage, mask: &SegmentationMask, path: &Path) -> Result<()> {
    render_visualization(original, mask)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
}
