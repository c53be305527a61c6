//! Waveform image rendering.

use crate::waveform::WaveformSummary;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);
const PEAK: Rgba<u8> = Rgba([96, 160, 255, 255]);
const RMS: Rgba<u8> = Rgba([32, 96, 208, 255]);

/// Error from image encoding.
#[derive(Debug)]
pub struct RenderError(pub String);

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "waveform render failed: {}", self.0)
    }
}

impl std::error::Error for RenderError {}

/// Draw a summary as a `width` x `height` PNG.
///
/// Blocks are spread across the width; each column shows the block's
/// min..max span with the RMS band drawn darker on top.
pub fn render_png(summary: &WaveformSummary, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let width = width.max(1);
    let height = height.max(1);
    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);

    if !summary.is_empty() {
        let mid = (height - 1) as f32 / 2.0;
        let to_y = |value: f32| -> u32 {
            let y = mid - value.clamp(-1.0, 1.0) * mid;
            y.round().clamp(0.0, (height - 1) as f32) as u32
        };

        for x in 0..width {
            let index = (x as usize * summary.len()) / width as usize;
            let Some(block) = summary.blocks.get(index) else {
                continue;
            };

            let (top, bottom) = (to_y(block.max), to_y(block.min));
            for y in top..=bottom {
                image.put_pixel(x, y, PEAK);
            }

            let (rms_top, rms_bottom) = (to_y(block.rms), to_y(-block.rms));
            for y in rms_top.max(top)..=rms_bottom.min(bottom) {
                image.put_pixel(x, y, RMS);
            }
        }
    }

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RenderError(e.to_string()))?;
    Ok(bytes)
}
