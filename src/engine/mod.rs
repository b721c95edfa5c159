//! Engine — the scene compiler and executor.
//!
//! Turns live-edited scene text into a `CompiledScene` (a validated,
//! cached instruction list) and replays it against a graphics backend
//! once per frame.
//!
//! The compiler never throws away a good scene: malformed text is reported
//! and the last successful compilation keeps being served until the text
//! parses again.

pub mod command;
pub mod executor;
pub mod source;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;
use tracing::{debug, info, warn};

use command::{Command, InstructionError};
use source::{Instruction, SceneDescription};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("scene parse error: {0}")]
    StructuralParse(String),
}

/// Opaque content hash of raw scene text.
pub fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledScene {
    /// `None` until the first successful compile.
    pub fingerprint: Option<u64>,
    pub instructions: Vec<Instruction>,
    /// One decoded entry per instruction, same order.
    pub program: Vec<Result<Command, InstructionError>>,
}

impl CompiledScene {
    fn from_description(fingerprint: u64, scene: SceneDescription) -> Self {
        let program = scene.instructions.iter().map(Command::try_from).collect();
        CompiledScene {
            fingerprint: Some(fingerprint),
            instructions: scene.instructions,
            program,
        }
    }

    /// Names of instructions that will be skipped as unknown.
    pub fn unknown_commands(&self) -> impl Iterator<Item = &str> {
        self.instructions
            .iter()
            .zip(&self.program)
            .filter(|(_, decoded)| matches!(decoded, Err(InstructionError::UnknownCommand(_))))
            .map(|(ins, _)| ins.command.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutcome {
    pub ok: bool,
    /// True when the fingerprint matched and nothing was parsed.
    pub cache_hit: bool,
    pub error: Option<SceneError>,
}

impl CompileOutcome {
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct SceneCompiler {
    cache: CompiledScene,
    error: Option<SceneError>,
}

impl SceneCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scene to draw: the last successful compilation (possibly empty).
    pub fn scene(&self) -> &CompiledScene {
        &self.cache
    }

    /// Error from the most recent compile, if it failed.
    pub fn last_error(&self) -> Option<&SceneError> {
        self.error.as_ref()
    }

    /// Compile `text`, reusing the cache when its fingerprint is unchanged.
    ///
    /// A failed parse leaves the cache exactly as it was.
    pub fn compile(&mut self, text: &str) -> CompileOutcome {
        let fp = fingerprint(text);
        if self.cache.fingerprint == Some(fp) {
            debug!("scene cache hit");
            // Text may have gone bad and come back to the cached version.
            self.error = None;
            return CompileOutcome {
                ok: true,
                cache_hit: true,
                error: None,
            };
        }

        match parse_scene(text) {
            Ok(scene) => {
                let compiled = CompiledScene::from_description(fp, scene);
                info!(instructions = compiled.instructions.len(), "scene recompiled");
                for name in compiled.unknown_commands() {
                    warn!(command = name, "unknown command will be skipped");
                }
                self.cache = compiled;
                self.error = None;
                CompileOutcome {
                    ok: true,
                    cache_hit: false,
                    error: None,
                }
            }
            Err(err) => {
                if self.error.as_ref() != Some(&err) {
                    warn!(error = %err, "scene text does not parse, keeping last good scene");
                }
                self.error = Some(err.clone());
                CompileOutcome {
                    ok: false,
                    cache_hit: false,
                    error: Some(err),
                }
            }
        }
    }
}

/// Parse scene text. The root must be an object; serde alone would also
/// accept a bare array for a struct.
fn parse_scene(text: &str) -> Result<SceneDescription, SceneError> {
    let parse_err = |e: serde_json::Error| SceneError::StructuralParse(e.to_string());
    let value: serde_json::Value = serde_json::from_str(text).map_err(parse_err)?;
    if !value.is_object() {
        return Err(SceneError::StructuralParse("root must be an object".to_string()));
    }
    serde_json::from_value(value).map_err(parse_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE_A: &str = r#"{"instructions":[{"command":"vertex3f","args":[1,2,3]}]}"#;
    const SCENE_C: &str = r#"{"instructions":[{"command":"end","args":[]}]}"#;
    const BROKEN: &str = r#"{"instructions":[{"command":"vertex3f","args":[1,2,"#;

    #[test]
    fn identical_text_hits_the_cache() {
        let mut compiler = SceneCompiler::new();
        let first = compiler.compile(SCENE_A);
        let before = compiler.scene().clone();
        let second = compiler.compile(SCENE_A);

        assert!(first.ok && !first.cache_hit);
        assert!(second.ok && second.cache_hit);
        assert_eq!(compiler.scene(), &before);
    }

    #[test]
    fn malformed_text_keeps_last_good_scene() {
        let mut compiler = SceneCompiler::new();
        compiler.compile(SCENE_A);
        let good = compiler.scene().clone();

        let outcome = compiler.compile(BROKEN);
        assert!(!outcome.ok);
        assert!(outcome.error_message().starts_with("scene parse error"));
        assert_eq!(compiler.scene(), &good);
        assert!(compiler.last_error().is_some());
    }

    #[test]
    fn valid_text_after_error_recovers() {
        let mut compiler = SceneCompiler::new();
        compiler.compile(BROKEN);
        let outcome = compiler.compile(SCENE_C);

        assert!(outcome.ok);
        assert_eq!(outcome.error, None);
        assert_eq!(compiler.last_error(), None);
        assert_eq!(compiler.scene().instructions[0].command, "end");
    }

    #[test]
    fn returning_to_cached_text_clears_error() {
        let mut compiler = SceneCompiler::new();
        compiler.compile(SCENE_A);
        compiler.compile(BROKEN);
        let outcome = compiler.compile(SCENE_A);
        assert!(outcome.ok && outcome.cache_hit);
        assert_eq!(compiler.last_error(), None);
    }

    #[test]
    fn first_failure_serves_empty_scene() {
        let mut compiler = SceneCompiler::new();
        let outcome = compiler.compile("not json");
        assert!(!outcome.ok);
        assert_eq!(compiler.scene().fingerprint, None);
        assert!(compiler.scene().instructions.is_empty());
    }

    #[test]
    fn repeated_failure_is_not_a_cache_hit() {
        let mut compiler = SceneCompiler::new();
        compiler.compile(SCENE_A);
        assert!(!compiler.compile(BROKEN).ok);
        assert!(!compiler.compile(BROKEN).ok);
    }

    #[test]
    fn non_object_root_is_a_parse_error() {
        let mut compiler = SceneCompiler::new();
        for text in ["[[]]", "3", r#"{"instructions": {}}"#] {
            let outcome = compiler.compile(text);
            assert!(!outcome.ok, "{text} should be rejected");
        }
        assert!(matches!(
            compiler.last_error(),
            Some(SceneError::StructuralParse(msg)) if msg.contains("expected a sequence")
        ));
    }

    #[test]
    fn unknown_commands_are_listed() {
        let mut compiler = SceneCompiler::new();
        compiler.compile(r#"{"instructions":[{"command":"teapot"},{"command":"end"}]}"#);
        assert_eq!(compiler.scene().unknown_commands().collect::<Vec<_>>(), ["teapot"]);
    }
}
