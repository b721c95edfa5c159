//! Shared boundary types for the modeler pipeline.
//!
//! This module defines the two buffers that cross component boundaries:
//! - Backend → Rasterizer: `PixelBuffer`, RGB samples in the backend's
//!   native bottom-to-top row order
//! - Rasterizer → Presenter: `CellBuffer`, one `HalfBlock` per terminal cell

use crossterm::style;

// ---------------------------------------------------------------------------
// Pixels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Convert a unit-range float color (as passed to `color3f`) to bytes.
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb {
            r: to_byte(r),
            g: to_byte(g),
            b: to_byte(b),
        }
    }
}

/// Row-major RGB image. Row 0 is the *bottom* row, matching a GL read-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<Rgb>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            data: vec![Rgb::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = color;
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.data.fill(color);
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Glyph used for every render cell: the lower half is drawn in the
/// foreground color, the upper half shows the background.
pub const HALF_BLOCK: char = '\u{2584}';

/// One terminal cell carrying two stacked 3-bit color indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfBlock {
    pub top: u8,
    pub bottom: u8,
}

impl HalfBlock {
    /// Terminal style for this cell: background = top sample,
    /// foreground = bottom sample.
    pub fn content_style(&self) -> style::ContentStyle {
        let mut cs = style::ContentStyle::default();
        cs.background_color = Some(palette_color(self.top));
        cs.foreground_color = Some(palette_color(self.bottom));
        cs
    }
}

/// Map a quantization index onto the canonical 8-color terminal palette.
/// Bit 0 is red, bit 1 green, bit 2 blue, so ANSI slot N is index N.
pub fn palette_color(index: u8) -> style::Color {
    match index & 0b111 {
        0 => style::Color::Black,
        1 => style::Color::DarkRed,
        2 => style::Color::DarkGreen,
        3 => style::Color::DarkYellow,
        4 => style::Color::DarkBlue,
        5 => style::Color::DarkMagenta,
        6 => style::Color::DarkCyan,
        _ => style::Color::Grey,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBuffer {
    width: usize,
    height: usize,
    cells: Vec<HalfBlock>,
}

impl CellBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        CellBuffer {
            width,
            height,
            cells: vec![HalfBlock::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<HalfBlock> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, cell: HalfBlock) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(HalfBlock::default());
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[HalfBlock]> {
        // chunks() panics on zero, and a zero-width buffer has no rows anyway.
        self.cells.chunks(self.width.max(1)).take(self.height)
    }
}
