//! Source scene types — the human-authored description being live-edited.
//!
//! These types mirror the JSON text one-to-one. They carry no meaning
//! beyond structure; `command` decodes them into typed operations.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SceneDescription {
    /// Draw order is list order.
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instruction {
    pub command: String,
    #[serde(default)]
    pub args: Vec<Arg>,
}

impl Instruction {
    pub fn new(command: impl Into<String>, args: Vec<Arg>) -> Self {
        Instruction {
            command: command.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Number(f64),
    Text(String),
}

impl Arg {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Number(n) => Some(*n),
            Arg::Text(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Number(_) => "number",
            Arg::Text(_) => "string",
        }
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Number(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Number(n) => write!(f, "{n}"),
            Arg::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Scene written into a fresh file when the editor opens a path that
/// does not exist yet.
pub const STARTER_SCENE: &str = r#"{
  "instructions": [
    {"command": "begin", "args": ["triangles"]},
    {"command": "color3f", "args": [1, 0, 0]},
    {"command": "vertex3f", "args": [-1, -1, 0]},
    {"command": "color3f", "args": [0, 1, 0]},
    {"command": "vertex3f", "args": [1, -1, 0]},
    {"command": "color3f", "args": [0, 0, 1]},
    {"command": "vertex3f", "args": [0, 1, 0]},
    {"command": "end", "args": []}
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_instructions_key_is_empty() {
        let scene: SceneDescription = serde_json::from_str("{}").unwrap();
        assert!(scene.instructions.is_empty());
    }

    #[test]
    fn args_accept_numbers_and_strings() {
        let ins: Instruction =
            serde_json::from_str(r#"{"command":"begin","args":["quads", 2, 0.5]}"#).unwrap();
        assert_eq!(
            ins.args,
            vec![Arg::Text("quads".into()), Arg::Number(2.0), Arg::Number(0.5)]
        );
    }

    #[test]
    fn missing_args_defaults_to_empty() {
        let ins: Instruction = serde_json::from_str(r#"{"command":"end"}"#).unwrap();
        assert!(ins.args.is_empty());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(serde_json::from_str::<SceneDescription>("[1, 2]").is_err());
        assert!(serde_json::from_str::<SceneDescription>(r#"{"instructions": 3}"#).is_err());
    }

    #[test]
    fn starter_scene_parses() {
        let scene: SceneDescription = serde_json::from_str(STARTER_SCENE).unwrap();
        assert_eq!(scene.instructions.len(), 8);
    }
}
