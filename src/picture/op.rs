use crate::canvas::{BlendMode, Canvas, ClipOp, Paint};
use crate::foundation::core::{BezPath, Color, Point, Rect};
use crate::picture::image::PixelRef;
use kurbo::PathEl;
use std::sync::Arc;

/// One recorded [`Canvas`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate {
        dx: f64,
        dy: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    ClipRect {
        rect: Rect,
        op: ClipOp,
    },
    DrawColor {
        color: Color,
        mode: BlendMode,
    },
    DrawRect {
        rect: Rect,
        paint: Paint,
    },
    DrawPath {
        path: BezPath,
        paint: Paint,
    },
    DrawImage {
        image: Arc<PixelRef>,
        dest: Rect,
    },
    DrawText {
        text: String,
        origin: Point,
        font_size: f64,
        paint: Paint,
    },
}

impl DrawOp {
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        match self {
            DrawOp::Save => canvas.save(),
            DrawOp::Restore => canvas.restore(),
            DrawOp::Translate { dx, dy } => canvas.translate(*dx, *dy),
            DrawOp::Scale { sx, sy } => canvas.scale(*sx, *sy),
            DrawOp::ClipRect { rect, op } => canvas.clip_rect(*rect, *op),
            DrawOp::DrawColor { color, mode } => canvas.draw_color(*color, *mode),
            DrawOp::DrawRect { rect, paint } => canvas.draw_rect(*rect, paint),
            DrawOp::DrawPath { path, paint } => canvas.draw_path(path, paint),
            DrawOp::DrawImage { image, dest } => canvas.draw_image(image, *dest),
            DrawOp::DrawText {
                text,
                origin,
                font_size,
                paint,
            } => canvas.draw_text(text, *origin, *font_size, paint),
        }
    }

    /// Heap plus inline bytes held by the op.
    pub(crate) fn approximate_bytes(&self) -> usize {
        let heap = match self {
            DrawOp::DrawPath { path, .. } => path.elements().len() * size_of::<PathEl>(),
            DrawOp::DrawText { text, .. } => text.len(),
            _ => 0,
        };
        size_of::<DrawOp>() + heap
    }
}
