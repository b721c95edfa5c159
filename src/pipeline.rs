//! One pass of the per-frame pipeline:
//! scene text → compile → execute → pixels → half-block cells.

use crate::backend::RenderContext;
use crate::backend::software::SoftwareBackend;
use crate::backend::GraphicsBackend;
use crate::camera::OrbitCamera;
use crate::engine::SceneCompiler;
use crate::engine::executor::CommandExecutor;
use crate::renderer::FrameRasterizer;
use crate::types::CellBuffer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub compile_ok: bool,
    pub exec_ok: bool,
    pub warnings: Vec<String>,
    /// Message to show over the render pane, if any.
    pub banner: Option<String>,
}

/// Owns every piece of per-frame state. Only the control loop touches it.
pub struct Viewport {
    pub camera: OrbitCamera,
    compiler: SceneCompiler,
    backend: SoftwareBackend,
    ctx: RenderContext,
    rasterizer: FrameRasterizer,
}

impl Viewport {
    pub fn new(camera: OrbitCamera, cols: usize, rows: usize, fov: f32) -> Self {
        Viewport {
            camera,
            compiler: SceneCompiler::new(),
            backend: SoftwareBackend::new(cols, rows * 2, fov),
            ctx: RenderContext::new(),
            rasterizer: FrameRasterizer::new(cols, rows),
        }
    }

    pub fn compiler(&self) -> &SceneCompiler {
        &self.compiler
    }

    pub fn cells(&self) -> &CellBuffer {
        self.rasterizer.cells()
    }

    /// Resize the render pane; takes effect on the next `tick`.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        if self.backend.width() != cols || self.backend.height() != rows * 2 {
            self.backend.resize(cols, rows * 2);
        }
        self.rasterizer.resize(cols, rows);
        self.camera.set_pane_width(cols as i32);
    }

    pub fn tick(&mut self, source: &str) -> FrameReport {
        self.camera.tick();
        let compiled = self.compiler.compile(source);

        let camera = *self.camera.state();
        self.backend.begin_frame(&mut self.ctx, camera.view_matrix());
        let executed = CommandExecutor::execute(
            self.compiler.scene(),
            &camera,
            &mut self.backend,
            &mut self.ctx,
        );
        self.rasterizer.rasterize(self.backend.pixels());

        let banner = if !compiled.ok {
            Some(compiled.error_message())
        } else if !executed.ok() {
            Some(executed.error_message())
        } else {
            None
        };

        FrameReport {
            compile_ok: compiled.ok,
            exec_ok: executed.ok(),
            warnings: executed.warnings,
            banner,
        }
    }
}
