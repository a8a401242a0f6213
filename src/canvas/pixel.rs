use crate::canvas::{BlendMode, Canvas, ClipOp, MatrixClipStack, Paint, text_bounds};
use crate::foundation::core::{Affine, BezPath, Color, IntRect, Point, Rect};
use crate::foundation::error::{PileError, PileResult};
use crate::foundation::math::unpremul;
use crate::picture::image::PixelRef;
use kurbo::{PathEl, Shape};
use std::fmt;
use std::sync::Arc;

/// Largest edge a software surface may have.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Premultiplied RGBA8 software surface rastered by `vello_cpu`.
///
/// Rects snap to whole device pixels and land exactly. Paths are anti-aliased. Draw calls are
/// queued on the render context and rastered the next time pixels are read.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    dirty: bool,
    state: MatrixClipStack,
}

impl fmt::Debug for PixelCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .field("clip", &self.state.clip().bounds())
            .finish_non_exhaustive()
    }
}

impl PixelCanvas {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> PileResult<Self> {
        if width == 0 || height == 0 {
            return Err(PileError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return Err(PileError::validation(format!(
                "canvas {width}x{height} exceeds {MAX_SURFACE_DIMENSION}px"
            )));
        }
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(PileError::validation(format!(
                "canvas {width}x{height} does not fit a render context"
            )));
        };
        let device = IntRect::new(0, 0, width as i32, height as i32);
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            dirty: false,
            state: MatrixClipStack::new(device),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw premultiplied bytes, row-major.
    pub fn data(&mut self) -> &[u8] {
        self.render();
        self.pixmap.data_as_u8_slice()
    }

    pub fn into_data(mut self) -> Vec<u8> {
        self.render();
        self.pixmap.data_as_u8_slice().to_vec()
    }

    /// Premultiplied pixel at `(x, y)`, or `None` off the surface.
    pub fn pixel(&mut self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let data = self.data();
        Some([data[i], data[i + 1], data[i + 2], data[i + 3]])
    }

    /// Unpremultiplied color at `(x, y)`.
    pub fn color_at(&mut self, x: u32, y: u32) -> Option<Color> {
        let [r, g, b, a] = unpremul(self.pixel(x, y)?);
        Some(Color::rgba(r, g, b, a))
    }

    /// Current clip in device pixels.
    pub fn clip_bounds(&self) -> IntRect {
        self.state.clip().bounds()
    }

    /// Raster everything queued since the last read. The context keeps its whole command
    /// history, so each pass repaints the surface from transparent.
    fn render(&mut self) {
        if !self.dirty {
            return;
        }
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.dirty = false;
    }

    fn fill_device_rect(&mut self, device_rect: IntRect, color: Color, mode: BlendMode) {
        let pieces: Vec<IntRect> = self.state.clipped(device_rect).collect();
        if pieces.is_empty() {
            return;
        }
        if mode != BlendMode::SrcOver {
            self.ctx.push_blend_layer(erase_mode());
            self.ctx.set_paint(cpu_color(Color::BLACK));
            for piece in &pieces {
                self.ctx.fill_rect(&cpu_rect(*piece));
            }
            self.ctx.pop_layer();
            self.dirty = true;
        }
        if mode == BlendMode::Clear || color.is_transparent() {
            return;
        }
        self.ctx.set_paint(cpu_color(color));
        for piece in &pieces {
            self.ctx.fill_rect(&cpu_rect(*piece));
        }
        self.dirty = true;
    }

    fn fill_device_path(
        &mut self,
        path: &vello_cpu::kurbo::BezPath,
        color: Color,
        mode: BlendMode,
    ) {
        if mode != BlendMode::SrcOver {
            self.ctx.push_blend_layer(erase_mode());
            let clipped = self.push_clip();
            self.ctx.set_paint(cpu_color(Color::BLACK));
            self.ctx.fill_path(path);
            if clipped {
                self.ctx.pop_layer();
            }
            self.ctx.pop_layer();
            self.dirty = true;
        }
        if mode == BlendMode::Clear || color.is_transparent() {
            return;
        }
        let clipped = self.push_clip();
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_path(path);
        if clipped {
            self.ctx.pop_layer();
        }
        self.dirty = true;
    }

    /// Clip to the current region unless it still spans the device. Returns whether a layer
    /// was pushed.
    fn push_clip(&mut self) -> bool {
        if self.state.clip_is_full() {
            return false;
        }
        let mut clip = vello_cpu::kurbo::BezPath::new();
        for r in self.state.clip().rects() {
            let (x0, y0) = (f64::from(r.x), f64::from(r.y));
            let (x1, y1) = (f64::from(r.right()), f64::from(r.bottom()));
            clip.move_to((x0, y0));
            clip.line_to((x1, y0));
            clip.line_to((x1, y1));
            clip.line_to((x0, y1));
            clip.close_path();
        }
        self.ctx.push_clip_layer(&clip);
        true
    }
}

/// Removes the backdrop wherever the layer has coverage.
fn erase_mode() -> vello_cpu::peniko::BlendMode {
    vello_cpu::peniko::BlendMode::new(
        vello_cpu::peniko::Mix::Normal,
        vello_cpu::peniko::Compose::DestOut,
    )
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn cpu_rect(r: IntRect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(
        f64::from(r.x),
        f64::from(r.y),
        f64::from(r.right()),
        f64::from(r.bottom()),
    )
}

/// Map `path` into device space while converting it to the rasterizer's geometry types.
fn device_path(path: &BezPath, transform: Affine) -> vello_cpu::kurbo::BezPath {
    let pt = |p: Point| {
        let d = transform * p;
        vello_cpu::kurbo::Point::new(d.x, d.y)
    };
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

impl Canvas for PixelCanvas {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.translate(dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.scale(sx, sy);
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        self.state.clip_rect(rect, op);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.fill_device_rect(self.state.device(), color, mode);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let device_rect = self.state.device_rect(rect);
        self.fill_device_rect(device_rect, paint.color, paint.blend_mode);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        if paint.blend_mode == BlendMode::SrcOver && paint.color.is_transparent() {
            return;
        }
        let transform = self.state.transform();
        if transform.determinant() == 0.0 {
            return;
        }
        let bounds = IntRect::enclosing(self.state.map_rect(path.bounding_box()));
        if self.state.clipped(bounds).next().is_none() {
            return;
        }
        let device = device_path(path, transform);
        self.fill_device_path(&device, paint.color, paint.blend_mode);
    }

    fn draw_image(&mut self, image: &Arc<PixelRef>, dest: Rect) {
        let device_rect = self.state.device_rect(dest);
        self.fill_device_rect(device_rect, image.color(), BlendMode::SrcOver);
    }

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        let device_rect = self
            .state
            .device_rect(text_bounds(text, origin, font_size));
        self.fill_device_rect(device_rect, paint.color, paint.blend_mode);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/pixel.rs"]
mod tests;
