//! Backend — the immediate-mode graphics device.
//!
//! `GraphicsBackend` is the opaque device the executor drives. All mutable
//! drawing state (matrix stack, open primitive, current vertex attributes)
//! lives in an explicit `RenderContext` that the caller owns and threads
//! through every call; backends hold only their output surfaces.

pub mod software;

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::engine::command::Topology;

/// Deepest the modelview stack may grow, counting the base entry.
pub const MAX_STACK_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("vertex3f outside begin/end")]
    VertexOutsidePrimitive,
    #[error("begin inside an open {0:?} block")]
    NestedBegin(Topology),
    #[error("end without matching begin")]
    EndWithoutBegin,
    #[error("transform inside begin/end")]
    TransformInsidePrimitive,
    #[error("matrix stack underflow")]
    StackUnderflow,
    #[error("matrix stack overflow (max {MAX_STACK_DEPTH})")]
    StackOverflow,
}

/// A vertex as captured between `begin` and `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Eye-space position (modelview already applied).
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    stack: Vec<Mat4>,
    primitive: Option<Topology>,
    batch: Vec<Vertex>,
    color: Vec3,
    normal: Vec3,
}

impl Default for RenderContext {
    fn default() -> Self {
        RenderContext {
            stack: vec![Mat4::IDENTITY],
            primitive: None,
            batch: Vec::new(),
            color: Vec3::ONE,
            normal: Vec3::Z,
        }
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and start a frame from `view`.
    pub fn reset(&mut self, view: Mat4) {
        self.stack.clear();
        self.stack.push(view);
        self.primitive = None;
        self.batch.clear();
        self.color = Vec3::ONE;
        self.normal = Vec3::Z;
    }

    pub fn modelview(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn primitive(&self) -> Option<Topology> {
        self.primitive
    }

    pub fn current_color(&self) -> Vec3 {
        self.color
    }

    pub fn push(&mut self) -> Result<(), BackendError> {
        self.reject_in_primitive()?;
        if self.stack.len() >= MAX_STACK_DEPTH {
            return Err(BackendError::StackOverflow);
        }
        self.stack.push(self.modelview());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<(), BackendError> {
        self.reject_in_primitive()?;
        if self.stack.len() <= 1 {
            return Err(BackendError::StackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    /// Post-multiply the top of the stack, like glMultMatrix.
    pub fn multiply(&mut self, m: Mat4) -> Result<(), BackendError> {
        self.reject_in_primitive()?;
        if let Some(top) = self.stack.last_mut() {
            *top *= m;
        }
        Ok(())
    }

    pub fn open(&mut self, topology: Topology) -> Result<(), BackendError> {
        if let Some(open) = self.primitive {
            return Err(BackendError::NestedBegin(open));
        }
        self.primitive = Some(topology);
        self.batch.clear();
        Ok(())
    }

    /// Close the open block and hand back its vertices.
    pub fn close(&mut self) -> Result<(Topology, Vec<Vertex>), BackendError> {
        let topology = self.primitive.take().ok_or(BackendError::EndWithoutBegin)?;
        Ok((topology, std::mem::take(&mut self.batch)))
    }

    pub fn emit(&mut self, position: Vec3) -> Result<(), BackendError> {
        if self.primitive.is_none() {
            return Err(BackendError::VertexOutsidePrimitive);
        }
        let vertex = Vertex {
            position: self.modelview().transform_point3(position),
            color: self.color,
            normal: self.normal,
        };
        self.batch.push(vertex);
        Ok(())
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal;
    }

    fn reject_in_primitive(&self) -> Result<(), BackendError> {
        if self.primitive.is_some() {
            Err(BackendError::TransformInsidePrimitive)
        } else {
            Ok(())
        }
    }
}

/// Immediate-mode device driven by the executor.
///
/// The provided methods apply the shared `RenderContext` rules; a device
/// only has to say what happens to a finished primitive.
pub trait GraphicsBackend {
    /// Clear the output and reset `ctx` so the frame starts from `view`.
    fn begin_frame(&mut self, ctx: &mut RenderContext, view: Mat4);

    /// Consume one closed primitive block.
    fn draw(&mut self, topology: Topology, vertices: &[Vertex]);

    fn push_matrix(&mut self, ctx: &mut RenderContext) -> Result<(), BackendError> {
        ctx.push()
    }

    fn pop_matrix(&mut self, ctx: &mut RenderContext) -> Result<(), BackendError> {
        ctx.pop()
    }

    fn translate(&mut self, ctx: &mut RenderContext, offset: Vec3) -> Result<(), BackendError> {
        ctx.multiply(Mat4::from_translation(offset))
    }

    /// `angle` is in degrees. A zero axis leaves the matrix unchanged.
    fn rotate(&mut self, ctx: &mut RenderContext, angle: f32, axis: Vec3) -> Result<(), BackendError> {
        let m = match axis.try_normalize() {
            Some(axis) => Mat4::from_axis_angle(axis, angle.to_radians()),
            None => Mat4::IDENTITY,
        };
        ctx.multiply(m)
    }

    fn scale(&mut self, ctx: &mut RenderContext, factor: Vec3) -> Result<(), BackendError> {
        ctx.multiply(Mat4::from_scale(factor))
    }

    fn begin(&mut self, ctx: &mut RenderContext, topology: Topology) -> Result<(), BackendError> {
        ctx.open(topology)
    }

    fn end(&mut self, ctx: &mut RenderContext) -> Result<(), BackendError> {
        let (topology, vertices) = ctx.close()?;
        self.draw(topology, &vertices);
        Ok(())
    }

    fn vertex(&mut self, ctx: &mut RenderContext, position: Vec3) -> Result<(), BackendError> {
        ctx.emit(position)
    }

    fn color(&mut self, ctx: &mut RenderContext, color: Vec3) -> Result<(), BackendError> {
        ctx.set_color(color);
        Ok(())
    }

    fn normal(&mut self, ctx: &mut RenderContext, normal: Vec3) -> Result<(), BackendError> {
        ctx.set_normal(normal);
        Ok(())
    }
}
