use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use tracing::info;

use crate::engine::source::STARTER_SCENE;

use super::buffer::TextBuffer;
use super::config::EditorConfig;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

pub struct EditorState {
    pub buffer: TextBuffer,
    pub file_path: PathBuf,
    pub config: EditorConfig,
    pub dirty: bool,
    last_modified: Option<SystemTime>,
    status: Option<(String, Instant)>,
}

impl EditorState {
    pub fn open(path: &Path, config: EditorConfig) -> Result<Self> {
        let mut state = EditorState {
            buffer: TextBuffer::from_text(STARTER_SCENE),
            file_path: path.to_path_buf(),
            config,
            dirty: false,
            last_modified: None,
            status: None,
        };
        if path.exists() {
            state.load()?;
        } else {
            state.dirty = true;
            state.set_status(format!("new scene, [Ctrl-s] writes {}", path.display()));
        }
        Ok(state)
    }

    fn load(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        self.buffer.replace(&text);
        self.last_modified = modified(&self.file_path);
        self.dirty = false;
        info!(path = %self.file_path.display(), "scene loaded");
        self.set_status("loaded model from file");
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        std::fs::write(&self.file_path, self.buffer.text())
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        self.last_modified = modified(&self.file_path);
        self.dirty = false;
        info!(path = %self.file_path.display(), "scene saved");
        self.set_status("saved model to file");
        Ok(())
    }

    /// Reload when the file on disk is newer than what we last saw.
    /// External edits win over unsaved buffer changes.
    pub fn check_file_changed(&mut self) -> Result<bool> {
        let Some(on_disk) = modified(&self.file_path) else {
            return Ok(false);
        };
        if self.last_modified.is_some_and(|seen| on_disk <= seen) {
            return Ok(false);
        }
        self.load()?;
        Ok(true)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(msg, _)| msg.as_str())
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
