//! Line-based text buffer backing the editor pane.
//!
//! Cursor columns count chars, not bytes.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor_x: usize,
    cursor_y: usize,
    scroll_y: usize,
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        TextBuffer {
            lines: text.split('\n').map(str::to_string).collect(),
            cursor_x: 0,
            cursor_y: 0,
            scroll_y: 0,
        }
    }

    /// Swap in new contents, keeping the cursor as close as possible.
    pub fn replace(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.cursor_y = self.cursor_y.min(self.lines.len() - 1);
        self.clamp_x();
        self.scroll_y = self.scroll_y.min(self.cursor_y);
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn scroll(&self) -> usize {
        self.scroll_y
    }

    fn line_len(&self, y: usize) -> usize {
        self.lines[y].chars().count()
    }

    fn clamp_x(&mut self) {
        self.cursor_x = self.cursor_x.min(self.line_len(self.cursor_y));
    }

    fn byte_at(line: &str, char_idx: usize) -> usize {
        line.char_indices()
            .nth(char_idx)
            .map_or(line.len(), |(i, _)| i)
    }

    pub fn move_up(&mut self) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.clamp_x();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_y + 1 < self.lines.len() {
            self.cursor_y += 1;
            self.clamp_x();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.line_len(self.cursor_y);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_x < self.line_len(self.cursor_y) {
            self.cursor_x += 1;
        } else if self.cursor_y + 1 < self.lines.len() {
            self.cursor_y += 1;
            self.cursor_x = 0;
        }
    }

    pub fn home(&mut self) {
        self.cursor_x = 0;
    }

    pub fn end(&mut self) {
        self.cursor_x = self.line_len(self.cursor_y);
    }

    pub fn page_up(&mut self, page: usize) {
        self.cursor_y = self.cursor_y.saturating_sub(page);
        self.scroll_y = self.scroll_y.saturating_sub(page);
        self.clamp_x();
    }

    pub fn page_down(&mut self, page: usize) {
        self.cursor_y = (self.cursor_y + page).min(self.lines.len() - 1);
        self.clamp_x();
    }

    /// Place the cursor at a clicked position, clamped to the text.
    pub fn click(&mut self, x: usize, visible_row: usize) {
        self.cursor_y = (self.scroll_y + visible_row).min(self.lines.len() - 1);
        self.cursor_x = x;
        self.clamp_x();
    }

    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_y];
        let at = Self::byte_at(line, self.cursor_x);
        line.insert(at, c);
        self.cursor_x += 1;
    }

    pub fn newline(&mut self) {
        let line = &mut self.lines[self.cursor_y];
        let at = Self::byte_at(line, self.cursor_x);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor_y + 1, rest);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let at = Self::byte_at(line, self.cursor_x - 1);
            line.remove(at);
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            let line = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.line_len(self.cursor_y);
            self.lines[self.cursor_y].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_x < self.line_len(self.cursor_y) {
            let line = &mut self.lines[self.cursor_y];
            let at = Self::byte_at(line, self.cursor_x);
            line.remove(at);
        } else if self.cursor_y + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_y + 1);
            self.lines[self.cursor_y].push_str(&next);
        }
    }

    /// Keep the cursor inside a window of `height` visible rows.
    pub fn scroll_into_view(&mut self, height: usize) {
        let height = height.max(1);
        if self.cursor_y < self.scroll_y {
            self.scroll_y = self.cursor_y;
        } else if self.cursor_y >= self.scroll_y + height {
            self.scroll_y = self.cursor_y + 1 - height;
        }
    }
}
