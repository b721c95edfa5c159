//! CPU rasterizer standing in for a hardware immediate-mode device.
//!
//! Renders into a `PixelBuffer` stored bottom-to-top with a depth buffer,
//! perspective projection and per-vertex color interpolation. Normals are
//! carried but unlit.

use glam::{Mat4, Vec3, Vec4};

use crate::engine::command::Topology;
use crate::types::{PixelBuffer, Rgb};

use super::{GraphicsBackend, RenderContext, Vertex};

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 50.0;
pub const DEFAULT_FOV: f32 = 45.0;

/// A vertex after projection: x/y in pixels (y up), z in NDC.
#[derive(Debug, Clone, Copy)]
struct Projected {
    x: f32,
    y: f32,
    z: f32,
    color: Vec3,
}

pub struct SoftwareBackend {
    pixels: PixelBuffer,
    depth: Vec<f32>,
    projection: Mat4,
    fov: f32,
}

impl SoftwareBackend {
    pub fn new(width: usize, height: usize, fov: f32) -> Self {
        let mut backend = SoftwareBackend {
            pixels: PixelBuffer::new(0, 0),
            depth: Vec::new(),
            projection: Mat4::IDENTITY,
            fov,
        };
        backend.resize(width, height);
        backend
    }

    /// Reallocate the surfaces. Nothing from the old size survives.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.pixels = PixelBuffer::new(width, height);
        self.depth = vec![f32::INFINITY; width * height];
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        self.projection =
            Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, NEAR_PLANE, FAR_PLANE);
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// The rendered frame, bottom row first.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    fn project(&self, v: &Vertex) -> Option<Projected> {
        let clip = self.projection * Vec4::from((v.position, 1.0));
        // No real clipping: anything at or behind the eye is dropped.
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.is_finite() {
            return None;
        }
        Some(Projected {
            x: (ndc.x + 1.0) * 0.5 * self.width() as f32,
            y: (ndc.y + 1.0) * 0.5 * self.height() as f32,
            z: ndc.z,
            color: v.color,
        })
    }

    fn plot(&mut self, x: i64, y: i64, z: f32, color: Vec3) {
        let (w, h) = (self.width() as i64, self.height() as i64);
        if x < 0 || y < 0 || x >= w || y >= h || !(-1.0..=1.0).contains(&z) {
            return;
        }
        let idx = (y * w + x) as usize;
        if z < self.depth[idx] {
            self.depth[idx] = z;
            self.pixels
                .set(x as usize, y as usize, Rgb::from_unit(color.x, color.y, color.z));
        }
    }

    fn point(&mut self, p: Projected) {
        self.plot(p.x.floor() as i64, p.y.floor() as i64, p.z, p.color);
    }

    /// DDA line. The segment is clipped to the surface first so the step
    /// count never exceeds its width plus height.
    fn line(&mut self, a: Projected, b: Projected) {
        let Some((a, b)) = clip_to_rect(a, b, self.width() as f64, self.height() as f64) else {
            return;
        };
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.plot(
                (a.x + (b.x - a.x) * t).floor() as i64,
                (a.y + (b.y - a.y) * t).floor() as i64,
                a.z + (b.z - a.z) * t,
                a.color.lerp(b.color, t),
            );
        }
    }

    fn triangle(&mut self, a: Projected, b: Projected, c: Projected) {
        let area = edge(a, b, c.x, c.y);
        if area.abs() <= f32::EPSILON {
            return;
        }
        let max_x = self.width() as f32 - 1.0;
        let max_y = self.height() as f32 - 1.0;
        let x0 = a.x.min(b.x).min(c.x).floor().max(0.0) as i64;
        let x1 = a.x.max(b.x).max(c.x).ceil().min(max_x) as i64;
        let y0 = a.y.min(b.y).min(c.y).floor().max(0.0) as i64;
        let y1 = a.y.max(b.y).max(c.y).ceil().min(max_y) as i64;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b, c, sx, sy) / area;
                let w1 = edge(c, a, sx, sy) / area;
                let w2 = edge(a, b, sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = a.z * w0 + b.z * w1 + c.z * w2;
                let color = a.color * w0 + b.color * w1 + c.color * w2;
                self.plot(px, py, z, color);
            }
        }
    }

    fn triangle_of(&mut self, a: Option<Projected>, b: Option<Projected>, c: Option<Projected>) {
        if let (Some(a), Some(b), Some(c)) = (a, b, c) {
            self.triangle(a, b, c);
        }
    }

    fn line_of(&mut self, a: Option<Projected>, b: Option<Projected>) {
        if let (Some(a), Some(b)) = (a, b) {
            self.line(a, b);
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` against [0, w] x [0, h].
///
/// Runs in f64: endpoints can sit billions of pixels off-screen, far past
/// where f32 keeps whole-pixel precision.
fn clip_to_rect(a: Projected, b: Projected, w: f64, h: f64) -> Option<(Projected, Projected)> {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [(-dx, ax), (dx, w - ax), (-dy, ay), (dy, h - ay)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Projected {
        x: (ax + dx * t) as f32,
        y: (ay + dy * t) as f32,
        z: a.z + (b.z - a.z) * t as f32,
        color: a.color.lerp(b.color, t as f32),
    };
    Some((at(t0), at(t1)))
}

/// Twice the signed area of (a, b, p).
fn edge(a: Projected, b: Projected, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

impl GraphicsBackend for SoftwareBackend {
    fn begin_frame(&mut self, ctx: &mut RenderContext, view: Mat4) {
        self.pixels.fill(Rgb::BLACK);
        self.depth.fill(f32::INFINITY);
        ctx.reset(view);
    }

    fn draw(&mut self, topology: Topology, vertices: &[Vertex]) {
        let v: Vec<Option<Projected>> = vertices.iter().map(|v| self.project(v)).collect();
        let n = v.len();

        match topology {
            Topology::Points => {
                for p in v.iter().flatten() {
                    self.point(*p);
                }
            }
            Topology::Lines => {
                for pair in v.chunks_exact(2) {
                    self.line_of(pair[0], pair[1]);
                }
            }
            Topology::LineStrip | Topology::LineLoop => {
                for pair in v.windows(2) {
                    self.line_of(pair[0], pair[1]);
                }
                if topology == Topology::LineLoop && n > 2 {
                    self.line_of(v[n - 1], v[0]);
                }
            }
            Topology::Triangles => {
                for tri in v.chunks_exact(3) {
                    self.triangle_of(tri[0], tri[1], tri[2]);
                }
            }
            Topology::TriangleStrip => {
                for i in 0..n.saturating_sub(2) {
                    self.triangle_of(v[i], v[i + 1], v[i + 2]);
                }
            }
            Topology::TriangleFan | Topology::Polygon => {
                for i in 1..n.saturating_sub(1) {
                    self.triangle_of(v[0], v[i], v[i + 1]);
                }
            }
            Topology::Quads => {
                for quad in v.chunks_exact(4) {
                    self.triangle_of(quad[0], quad[1], quad[2]);
                    self.triangle_of(quad[0], quad[2], quad[3]);
                }
            }
            Topology::QuadStrip => {
                let mut i = 0;
                while i + 3 < n {
                    self.triangle_of(v[i], v[i + 1], v[i + 3]);
                    self.triangle_of(v[i], v[i + 3], v[i + 2]);
                    i += 2;
                }
            }
        }
    }
}
