//! Executor — replays a compiled scene against a graphics backend.

use glam::Vec3;
use thiserror::Error;
use tracing::debug;

use crate::backend::{BackendError, GraphicsBackend, RenderContext};
use crate::camera::CameraState;

use super::CompiledScene;
use super::command::{Command, InstructionError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("instruction {index} ({command}): {source}")]
    Instruction {
        index: usize,
        command: String,
        source: InstructionError,
    },
    #[error("instruction {index} ({command}): {source}")]
    Backend {
        index: usize,
        command: String,
        source: BackendError,
    },
    #[error("frame wrapper: {0}")]
    Frame(BackendError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    /// Instructions that reached the backend.
    pub dispatched: usize,
    /// Non-fatal problems, currently only skipped unknown commands.
    pub warnings: Vec<String>,
    /// Set when the frame was cut short.
    pub error: Option<ExecutionError>,
}

impl ExecutionReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_message(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Draw one frame of `scene`.
    ///
    /// The frame is wrapped in push / rotate(current angle about Y) / pop.
    /// Unknown commands are skipped with a warning; any other failure stops
    /// the rest of the list and is returned in the report, never raised.
    pub fn execute<B: GraphicsBackend>(
        scene: &CompiledScene,
        camera: &CameraState,
        backend: &mut B,
        ctx: &mut RenderContext,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        if let Err(e) = backend
            .push_matrix(ctx)
            .and_then(|()| backend.rotate(ctx, camera.current_angle, Vec3::Y))
        {
            report.error = Some(ExecutionError::Frame(e));
            return report;
        }

        for (index, (ins, decoded)) in scene.instructions.iter().zip(&scene.program).enumerate() {
            let command = match decoded {
                Ok(command) => command,
                Err(e) if e.is_skippable() => {
                    report.warnings.push(format!("instruction {index}: {e}"));
                    continue;
                }
                Err(e) => {
                    report.error = Some(ExecutionError::Instruction {
                        index,
                        command: ins.command.clone(),
                        source: e.clone(),
                    });
                    break;
                }
            };
            if let Err(source) = Self::dispatch(command, backend, ctx) {
                report.error = Some(ExecutionError::Backend {
                    index,
                    command: ins.command.clone(),
                    source,
                });
                break;
            }
            report.dispatched += 1;
        }

        if let Some(e) = &report.error {
            // The context is left mid-frame; begin_frame resets it next tick.
            debug!(error = %e, "frame aborted");
        } else if let Err(e) = backend.pop_matrix(ctx) {
            report.error = Some(ExecutionError::Frame(e));
        }

        report
    }

    fn dispatch<B: GraphicsBackend>(
        command: &Command,
        backend: &mut B,
        ctx: &mut RenderContext,
    ) -> Result<(), BackendError> {
        match *command {
            Command::Translate(v) => backend.translate(ctx, v),
            Command::Rotate { angle, axis } => backend.rotate(ctx, angle, axis),
            Command::Scale(v) => backend.scale(ctx, v),
            Command::Begin(topology) => backend.begin(ctx, topology),
            Command::End => backend.end(ctx),
            Command::Vertex(v) => backend.vertex(ctx, v),
            Command::Color(c) => backend.color(ctx, c),
            Command::Normal(n) => backend.normal(ctx, n),
        }
    }
}
