/// Narrowest either pane may get.
pub const MIN_PANE_WIDTH: u16 = 10;

/// Render pane on the left, one-column divider, text editor on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub render_width: u16,
    pub render_height: u16,
    pub divider_x: u16,
    pub editor_x: u16,
    pub editor_width: u16,
    pub term_width: u16,
    pub term_height: u16,
}

impl Layout {
    pub fn compute(term_width: u16, term_height: u16, split_ratio: f32) -> Self {
        let wanted = (f32::from(term_width) * split_ratio.clamp(0.0, 1.0)).floor() as u16;
        let render_width = wanted
            .min(term_width.saturating_sub(MIN_PANE_WIDTH))
            .max(MIN_PANE_WIDTH)
            .min(term_width);
        let divider_x = render_width;
        let editor_x = render_width.saturating_add(1).min(term_width);
        Layout {
            render_width,
            render_height: term_height,
            divider_x,
            editor_x,
            editor_width: term_width.saturating_sub(editor_x),
            term_width,
            term_height,
        }
    }

    /// Rows of text visible in the editor pane; the last row is the status line.
    pub fn editor_rows(&self) -> usize {
        usize::from(self.term_height.saturating_sub(1))
    }
}
