use crate::canvas::{BlendMode, Canvas, ClipOp, MatrixClipStack, Paint, text_bounds};
use crate::foundation::core::{BezPath, Color, IntRect, Point, Rect};
use crate::picture::image::PixelRef;
use kurbo::Shape;
use std::sync::Arc;

/// Canvas that only answers "did everything drawn reduce to one flat color?".
///
/// Starts out solid transparent. An op keeps the verdict only if it fills the whole surface with
/// the clip untouched; anything else that reaches a pixel gives up.
#[derive(Clone, Debug)]
pub struct AnalysisCanvas {
    state: MatrixClipStack,
    is_solid_color: bool,
    color: Color,
    has_text: bool,
}

impl AnalysisCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: MatrixClipStack::new(IntRect::new(0, 0, width, height)),
            is_solid_color: true,
            color: Color::TRANSPARENT,
            has_text: false,
        }
    }

    /// The flat color everything drew, if there is one.
    pub fn color_if_solid(&self) -> Option<Color> {
        self.is_solid_color.then_some(self.color)
    }

    pub fn is_transparent(&self) -> bool {
        self.is_solid_color && self.color.is_transparent()
    }

    pub fn has_text(&self) -> bool {
        self.has_text
    }

    /// A draw that covers `device` with the clip at full size.
    fn is_full_quad(&self, device: Rect) -> bool {
        if !self.state.clip_is_full() {
            return false;
        }
        let canvas = self.state.device();
        device.x0 <= f64::from(canvas.x)
            && device.y0 <= f64::from(canvas.y)
            && device.x1 >= f64::from(canvas.right())
            && device.y1 >= f64::from(canvas.bottom())
    }

    fn touches_clip(&self, device: Rect) -> bool {
        self.state
            .clipped(IntRect::enclosing(device))
            .next()
            .is_some()
    }

    fn fill(&mut self, device: Rect, color: Color, mode: BlendMode) {
        if !self.touches_clip(device) {
            return;
        }
        if mode == BlendMode::SrcOver && color.is_transparent() {
            return;
        }
        if !self.is_full_quad(device) {
            self.is_solid_color = false;
            return;
        }
        match mode {
            BlendMode::Src => self.color = color,
            BlendMode::Clear => self.color = Color::TRANSPARENT,
            BlendMode::SrcOver if color.is_opaque() => self.color = color,
            BlendMode::SrcOver if self.is_solid_color && self.color.is_transparent() => {
                self.color = color
            }
            BlendMode::SrcOver => self.is_solid_color = false,
        }
    }
}

impl Canvas for AnalysisCanvas {
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
        let device = self.state.device().to_kurbo();
        self.fill(device, color, mode);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let device = self.state.map_rect(rect);
        self.fill(device, paint.color, paint.blend_mode);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        let device = self.state.map_rect(path.bounding_box());
        if !self.touches_clip(device) {
            return;
        }
        if paint.blend_mode == BlendMode::SrcOver && paint.color.is_transparent() {
            return;
        }
        self.is_solid_color = false;
    }

    fn draw_image(&mut self, _image: &Arc<PixelRef>, dest: Rect) {
        // Image content is never inspected.
        if self.touches_clip(self.state.map_rect(dest)) {
            self.is_solid_color = false;
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        let device = self.state.map_rect(text_bounds(text, origin, font_size));
        if !self.touches_clip(device) {
            return;
        }
        self.has_text = true;
        if !(paint.blend_mode == BlendMode::SrcOver && paint.color.is_transparent()) {
            self.is_solid_color = false;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/analysis.rs"]
mod tests;
