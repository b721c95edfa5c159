pub mod buffer;
pub mod config;
mod input;
pub mod state;
mod ui;
mod view;

use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{cursor, event, execute, terminal};
use tracing::{info, warn};

use crate::camera::{CameraState, OrbitCamera};
use crate::pipeline::{FrameReport, Viewport};

use config::EditorConfig;
use input::Action;
use state::EditorState;
use ui::Layout;
use view::FpsCounter;

/// Live scene editor: 3D preview on the left, scene text on the right.
pub struct Editor {
    state: EditorState,
    viewport: Viewport,
    layout: Layout,
    fps: FpsCounter,
    last_banner: Option<String>,
}

impl Editor {
    pub fn open(path: &Path, config: EditorConfig) -> Result<Self> {
        let (term_w, term_h) = terminal::size()?;
        let layout = Layout::compute(term_w, term_h, config.split_ratio);
        let camera = OrbitCamera::new(
            CameraState {
                distance: config.camera_distance,
                auto_rotate: config.auto_rotate,
                ..CameraState::default()
            },
            config.mouse_sensitivity,
            i32::from(layout.render_width),
        );
        let viewport = Viewport::new(
            camera,
            usize::from(layout.render_width),
            usize::from(layout.render_height),
            config.field_of_view,
        );
        let state = EditorState::open(path, config)?;
        Ok(Editor {
            state,
            viewport,
            layout,
            fps: FpsCounter::new(),
            last_banner: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();

        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.main_loop(&mut stdout);

        let _ = execute!(
            stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();

        result
    }

    fn main_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let interval = Duration::from_millis(self.state.config.frame_interval_ms);

        loop {
            let tick_start = Instant::now();

            // Drain input without blocking; camera state is only touched here.
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                match input::handle_event(&mut self.state, &mut self.viewport.camera, &self.layout, event) {
                    Action::Continue => {}
                    Action::Resize(w, h) => self.relayout(stdout, w, h)?,
                    Action::Quit => return Ok(()),
                }
            }

            if let Err(e) = self.state.check_file_changed() {
                warn!(error = %e, "reload failed");
                self.state.set_status(format!("Reload failed: {e}"));
            }

            let report = self.viewport.tick(&self.state.buffer.text());
            self.note_banner(&report);
            let fps = self.fps.frame();
            view::render_frame(
                stdout,
                &self.layout,
                &self.state,
                self.viewport.camera.state(),
                self.viewport.cells(),
                &report,
                fps,
            )?;

            thread::sleep(interval.saturating_sub(tick_start.elapsed()));
        }
    }

    fn relayout(&mut self, stdout: &mut io::Stdout, w: u16, h: u16) -> Result<()> {
        self.layout = Layout::compute(w, h, self.state.config.split_ratio);
        self.viewport.resize(
            usize::from(self.layout.render_width),
            usize::from(self.layout.render_height),
        );
        self.state.buffer.scroll_into_view(self.layout.editor_rows());
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
        stdout.flush()?;
        Ok(())
    }

    fn note_banner(&mut self, report: &FrameReport) {
        if report.banner == self.last_banner {
            return;
        }
        match &report.banner {
            Some(message) => warn!(message = message.as_str(), "scene error shown"),
            None => info!("scene error cleared"),
        }
        self.last_banner = report.banner.clone();
    }
}
