use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub mouse_sensitivity: f32,
    /// Share of the terminal width given to the render pane.
    pub split_ratio: f32,
    pub frame_interval_ms: u64,
    pub auto_rotate: bool,
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Where to write logs while the TUI owns the terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle_auto_rotate: String,
    pub save: String,
    pub quit: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle_auto_rotate: "Tab".into(),
            save: "Ctrl-s".into(),
            quit: "Ctrl-q".into(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            mouse_sensitivity: 2.0,
            split_ratio: 0.7,
            frame_interval_ms: 16,
            auto_rotate: true,
            camera_distance: 5.0,
            field_of_view: 45.0,
            log_file: None,
            key_bindings: KeyBindings::default(),
        }
    }
}

impl EditorConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::parse(&json).unwrap_or_else(|e| {
                warn!(path = %config_path.display(), error = %e, "invalid editor config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("ascii-modeler");
        path.push("config.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Alt-") {
        if !event.modifiers.contains(KeyModifiers::ALT) {
            return false;
        }
        return named_or_char(rest, event);
    }

    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return named_or_char(rest, event);
    }

    // Plain bindings never fire with Ctrl or Alt held, so "s" is not Ctrl-s.
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    named_or_char(binding, event)
}

fn named_or_char(name: &str, event: &KeyEvent) -> bool {
    match name {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Tab" => event.code == KeyCode::Tab,
        "Backspace" => event.code == KeyCode::Backspace,
        "Home" => event.code == KeyCode::Home,
        "End" => event.code == KeyCode::End,
        s => {
            if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<u8>().ok()) {
                return event.code == KeyCode::F(n);
            }
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => event.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_binding_requires_ctrl() {
        assert!(matches_binding("Ctrl-s", &key(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!matches_binding("Ctrl-s", &key(KeyCode::Char('s'), KeyModifiers::NONE)));
    }

    #[test]
    fn plain_binding_rejects_modifiers() {
        assert!(matches_binding("Tab", &key(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(!matches_binding("q", &key(KeyCode::Char('q'), KeyModifiers::ALT)));
    }

    #[test]
    fn function_keys_and_alt() {
        assert!(matches_binding("F5", &key(KeyCode::F(5), KeyModifiers::NONE)));
        assert!(matches_binding("Alt-Enter", &key(KeyCode::Enter, KeyModifiers::ALT)));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = EditorConfig::parse(r#"{"mouse_sensitivity": 1.0, "key_bindings": {"quit": "Esc"}}"#)
            .unwrap();
        assert_eq!(config.mouse_sensitivity, 1.0);
        assert_eq!(config.split_ratio, 0.7);
        assert_eq!(config.key_bindings.quit, "Esc");
        assert_eq!(config.key_bindings.save, "Ctrl-s");
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(EditorConfig::parse(r#"{"split_ratio": "wide"}"#).is_err());
    }
}
