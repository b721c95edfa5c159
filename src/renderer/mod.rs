//! Renderer — the framebuffer-to-terminal rasterizer.
//!
//! Takes the backend's `PixelBuffer` (bottom row first) and produces a
//! `CellBuffer` of half-block cells: two vertically stacked pixels per
//! terminal cell, each quantized to a 3-bit color index.
//!
//! The rasterizer is deterministic: the same pixels always produce the
//! same cells.

use crate::types::{CellBuffer, HalfBlock, PixelBuffer, Rgb};

/// Channel values strictly above this count as "on".
const CHANNEL_THRESHOLD: u8 = 127;

/// Threshold each channel at the midpoint and pack the bits red=1,
/// green=2, blue=4.
pub fn quantize(color: Rgb) -> u8 {
    let bit = |v: u8| u8::from(v > CHANNEL_THRESHOLD);
    bit(color.r) | (bit(color.g) << 1) | (bit(color.b) << 2)
}

pub struct FrameRasterizer {
    cells: CellBuffer,
}

impl FrameRasterizer {
    pub fn new(cols: usize, rows: usize) -> Self {
        FrameRasterizer {
            cells: CellBuffer::new(cols, rows),
        }
    }

    pub fn cells(&self) -> &CellBuffer {
        &self.cells
    }

    /// Reallocate for a new pane size. Must run before the next pass.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        if self.cells.width() != cols || self.cells.height() != rows {
            self.cells = CellBuffer::new(cols, rows);
        }
    }

    /// Rasterize one frame.
    ///
    /// If `pixels` still has the old pane's size, only the overlap is
    /// sampled; the rest of the grid stays black.
    pub fn rasterize(&mut self, pixels: &PixelBuffer) -> &CellBuffer {
        self.cells.clear();

        let rows = self.cells.height().min(pixels.height() / 2);
        let cols = self.cells.width().min(pixels.width());
        let flip = |row: usize| pixels.height() - 1 - row;

        for y in 0..rows {
            let top_row = flip(2 * y);
            let bottom_row = flip(2 * y + 1);
            for x in 0..cols {
                let top = pixels.get(x, top_row).unwrap_or_default();
                let bottom = pixels.get(x, bottom_row).unwrap_or_default();
                self.cells.set(
                    x,
                    y,
                    HalfBlock {
                        top: quantize(top),
                        bottom: quantize(bottom),
                    },
                );
            }
        }

        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_thresholds_at_midpoint() {
        assert_eq!(quantize(Rgb::new(200, 10, 5)), 1);
        assert_eq!(quantize(Rgb::new(127, 127, 127)), 0);
        assert_eq!(quantize(Rgb::new(128, 128, 128)), 7);
        assert_eq!(quantize(Rgb::new(0, 255, 0)), 2);
        assert_eq!(quantize(Rgb::new(0, 0, 255)), 4);
        assert_eq!(quantize(Rgb::new(255, 255, 0)), 3);
    }

    #[test]
    fn rows_are_flipped_and_paired() {
        // 1 column, 4 pixel rows stored bottom-up: blue, green, red, white.
        let mut pixels = PixelBuffer::new(1, 4);
        pixels.set(0, 0, Rgb::new(0, 0, 255));
        pixels.set(0, 1, Rgb::new(0, 255, 0));
        pixels.set(0, 2, Rgb::new(255, 0, 0));
        pixels.set(0, 3, Rgb::new(255, 255, 255));

        let mut raster = FrameRasterizer::new(1, 2);
        let cells = raster.rasterize(&pixels);

        assert_eq!(cells.get(0, 0), Some(HalfBlock { top: 7, bottom: 1 }));
        assert_eq!(cells.get(0, 1), Some(HalfBlock { top: 2, bottom: 4 }));
    }

    #[test]
    fn stale_pixels_after_grow_use_overlap_only() {
        let mut pixels = PixelBuffer::new(2, 2);
        pixels.fill(Rgb::new(255, 0, 0));

        let mut raster = FrameRasterizer::new(2, 1);
        raster.rasterize(&pixels);
        raster.resize(4, 3);
        let cells = raster.rasterize(&pixels);

        assert_eq!((cells.width(), cells.height()), (4, 3));
        assert_eq!(cells.get(1, 0), Some(HalfBlock { top: 1, bottom: 1 }));
        assert_eq!(cells.get(3, 0), Some(HalfBlock::default()));
        assert_eq!(cells.get(0, 2), Some(HalfBlock::default()));
    }

    #[test]
    fn shrink_ignores_extra_pixels() {
        let mut pixels = PixelBuffer::new(6, 6);
        pixels.fill(Rgb::new(0, 255, 0));
        let mut raster = FrameRasterizer::new(6, 3);
        raster.resize(2, 1);
        let cells = raster.rasterize(&pixels);
        assert_eq!((cells.width(), cells.height()), (2, 1));
        assert_eq!(cells.get(1, 0), Some(HalfBlock { top: 2, bottom: 2 }));
    }

    #[test]
    fn empty_pixels_leave_grid_black() {
        let mut raster = FrameRasterizer::new(3, 2);
        let cells = raster.rasterize(&PixelBuffer::new(0, 0));
        assert!(cells.rows().all(|row| row.iter().all(|c| *c == HalfBlock::default())));
    }
}
