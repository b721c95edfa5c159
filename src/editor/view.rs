use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::{cursor, queue, style, terminal};

use crate::camera::CameraState;
use crate::menubar::print_menu_item;
use crate::pipeline::FrameReport;
use crate::types::{CellBuffer, HALF_BLOCK};

use super::state::EditorState;
use super::ui::Layout;

/// Frames counted over the last whole second.
pub struct FpsCounter {
    frames: u32,
    since: Instant,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            frames: 0,
            since: Instant::now(),
            fps: 0,
        }
    }

    pub fn frame(&mut self) -> u32 {
        self.frames += 1;
        if self.since.elapsed() >= Duration::from_secs(1) {
            self.fps = self.frames;
            self.frames = 0;
            self.since = Instant::now();
        }
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Paint the half-block grid, leaving the bottom row to the banner if one
/// is showing.
pub fn render_cells<W: Write>(
    out: &mut W,
    layout: &Layout,
    cells: &CellBuffer,
    banner: bool,
) -> anyhow::Result<()> {
    let rows = if banner {
        layout.render_height.saturating_sub(1)
    } else {
        layout.render_height
    };
    for (y, row) in cells.rows().enumerate().take(usize::from(rows)) {
        queue!(out, cursor::MoveTo(0, y as u16))?;
        for cell in row.iter().take(usize::from(layout.render_width)) {
            queue!(
                out,
                style::PrintStyledContent(style::StyledContent::new(cell.content_style(), HALF_BLOCK)),
            )?;
        }
    }
    queue!(out, style::ResetColor)?;
    Ok(())
}

pub fn render_hud<W: Write>(
    out: &mut W,
    layout: &Layout,
    state: &EditorState,
    camera: &CameraState,
    fps: u32,
) -> anyhow::Result<()> {
    let width = usize::from(layout.render_width);
    let keys = &state.config.key_bindings;
    let hint = format!(
        "[{}] auto-rotate  [{}] save  [{}] quit",
        keys.toggle_auto_rotate, keys.save, keys.quit
    );
    queue!(out, cursor::MoveTo(0, 0))?;
    print_menu_item(out, &hint, width)?;

    let lines = [
        format!("Angle: {:.1}\u{b0}, {:.1}\u{b0}", camera.rotation_y, camera.rotation_x),
        format!("Zoom: {:.1}", camera.distance),
        format!("FPS: {fps}"),
    ];
    for (i, line) in lines.iter().enumerate() {
        let row = i as u16 + 1;
        if row >= layout.render_height {
            break;
        }
        let shown: String = line.chars().take(width).collect();
        queue!(out, cursor::MoveTo(0, row), style::Print(shown))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// White on red; the scene is frozen or cut short.
    Error,
    /// Black on yellow; something was skipped.
    Warning,
}

/// Message across the last render-pane row.
pub fn render_banner<W: Write>(
    out: &mut W,
    layout: &Layout,
    kind: BannerKind,
    message: &str,
) -> anyhow::Result<()> {
    let width = usize::from(layout.render_width);
    let y = layout.render_height.saturating_sub(1);
    // One line only; parse errors can contain newlines.
    let mut text: String = message
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(width)
        .collect();
    let pad = width.saturating_sub(text.chars().count());
    text.extend(std::iter::repeat_n(' ', pad));

    let mut cs = style::ContentStyle::default();
    let (fg, bg) = match kind {
        BannerKind::Error => (style::Color::White, style::Color::DarkRed),
        BannerKind::Warning => (style::Color::Black, style::Color::DarkYellow),
    };
    cs.foreground_color = Some(fg);
    cs.background_color = Some(bg);
    queue!(
        out,
        cursor::MoveTo(0, y),
        style::PrintStyledContent(style::StyledContent::new(cs, text)),
    )?;
    Ok(())
}

pub fn render_editor_pane<W: Write>(out: &mut W, layout: &Layout, state: &EditorState) -> anyhow::Result<()> {
    if layout.divider_x >= layout.term_width {
        return Ok(());
    }
    for y in 0..layout.term_height {
        queue!(out, cursor::MoveTo(layout.divider_x, y), style::Print('\u{2502}'))?;
    }

    let width = usize::from(layout.editor_width);
    if width == 0 {
        return Ok(());
    }
    let (cursor_x, cursor_y) = state.buffer.cursor();
    let scroll = state.buffer.scroll();
    let lines = state.buffer.lines();

    for row in 0..layout.editor_rows() {
        let screen_y = row as u16;
        queue!(
            out,
            cursor::MoveTo(layout.editor_x, screen_y),
            terminal::Clear(terminal::ClearType::UntilNewLine),
        )?;
        let Some(line) = lines.get(scroll + row) else {
            continue;
        };
        let shown = fit_line(line, width);
        if scroll + row == cursor_y {
            queue!(
                out,
                style::SetAttribute(style::Attribute::Reverse),
                style::Print(shown),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        } else {
            queue!(out, style::Print(shown))?;
        }
    }

    // Status line.
    let status_y = layout.term_height.saturating_sub(1);
    let dirty = if state.dirty { "[modified] " } else { "" };
    let status = format!("{dirty}{}", state.status_message().unwrap_or(""));
    queue!(
        out,
        cursor::MoveTo(layout.editor_x, status_y),
        terminal::Clear(terminal::ClearType::UntilNewLine),
        style::SetAttribute(style::Attribute::Dim),
        style::Print(fit_line(&status, width)),
        style::SetAttribute(style::Attribute::Reset),
    )?;

    let visible_y = cursor_y.checked_sub(scroll).filter(|y| *y < layout.editor_rows());
    match visible_y {
        Some(y) => queue!(
            out,
            cursor::MoveTo(layout.editor_x + cursor_x.min(width - 1) as u16, y as u16),
            cursor::Show,
        )?,
        None => queue!(out, cursor::Hide)?,
    }
    Ok(())
}

/// Truncate to `width` chars, marking the cut with an ellipsis.
fn fit_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let mut s: String = line.chars().take(width.saturating_sub(1)).collect();
        s.push('\u{2026}');
        s
    }
}

pub fn render_frame<W: Write>(
    out: &mut W,
    layout: &Layout,
    state: &EditorState,
    camera: &CameraState,
    cells: &CellBuffer,
    report: &FrameReport,
    fps: u32,
) -> anyhow::Result<()> {
    let banner = match (&report.banner, report.warnings.first()) {
        (Some(error), _) => Some((BannerKind::Error, error)),
        (None, Some(warning)) => Some((BannerKind::Warning, warning)),
        (None, None) => None,
    };
    queue!(out, cursor::Hide)?;
    render_cells(out, layout, cells, banner.is_some())?;
    render_hud(out, layout, state, camera, fps)?;
    if let Some((kind, message)) = banner {
        render_banner(out, layout, kind, message)?;
    }
    render_editor_pane(out, layout, state)?;
    out.flush()?;
    Ok(())
}
