//! Drawing sinks pictures replay into.
//!
//! [`Canvas`] is the only contract recorded content relies on. [`PixelCanvas`] turns it into
//! premultiplied RGBA8 pixels, [`AnalysisCanvas`] only tracks whether the result is one flat
//! color, and the picture recorder captures the calls for later replay.

pub(crate) mod analysis;
pub(crate) mod pixel;

pub use analysis::AnalysisCanvas;
pub use pixel::PixelCanvas;

use crate::foundation::core::{Affine, BezPath, Color, IntRect, Point, Rect};
use crate::foundation::region::Region;
use crate::picture::image::PixelRef;
use std::sync::Arc;

/// How a new clip rect combines with the current clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClipOp {
    Intersect,
    Difference,
    /// Discard the current clip and use the rect alone.
    Replace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    #[default]
    SrcOver,
    /// Overwrite the destination, including its alpha.
    Src,
    /// Zero the destination.
    Clear,
}

/// Fill style for shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paint {
    pub color: Color,
    pub blend_mode: BlendMode,
    pub anti_alias: bool,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            blend_mode: BlendMode::SrcOver,
            anti_alias: false,
        }
    }

    pub fn anti_aliased(mut self) -> Self {
        self.anti_alias = true;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }
}

/// Minimal immediate-mode drawing contract.
///
/// Transforms are limited to translate and scale, so every rect stays axis aligned in device
/// space. Clip rects are snapped to whole device pixels.
pub trait Canvas {
    fn save(&mut self);

    /// Pop the last [`Canvas::save`]. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64);

    fn scale(&mut self, sx: f64, sy: f64);

    fn clip_rect(&mut self, rect: Rect, op: ClipOp);

    /// Fill the clip with `color`, replacing what is there.
    fn clear(&mut self, color: Color) {
        self.draw_color(color, BlendMode::Src);
    }

    /// Fill the whole clip.
    fn draw_color(&mut self, color: Color, mode: BlendMode);

    fn draw_rect(&mut self, rect: Rect, paint: &Paint);

    /// Fill `path` with the non-zero winding rule.
    fn draw_path(&mut self, path: &BezPath, paint: &Paint);

    fn draw_image(&mut self, image: &Arc<PixelRef>, dest: Rect);

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint);

    /// Hint that the current contents will be fully overwritten.
    fn discard(&mut self) {}
}

/// Approximate extent of a text run, used where glyphs are not shaped.
pub(crate) fn text_bounds(text: &str, origin: Point, font_size: f64) -> Rect {
    let advance = font_size * 0.6 * text.chars().count() as f64;
    Rect::new(origin.x, origin.y - font_size, origin.x + advance, origin.y)
}

#[derive(Clone, Debug)]
struct MatrixClip {
    transform: Affine,
    clip: Region,
}

/// Transform and clip bookkeeping shared by the canvas implementations.
#[derive(Clone, Debug)]
pub(crate) struct MatrixClipStack {
    device: IntRect,
    current: MatrixClip,
    saved: Vec<MatrixClip>,
}

impl MatrixClipStack {
    pub(crate) fn new(device: IntRect) -> Self {
        Self {
            device,
            current: MatrixClip {
                transform: Affine::IDENTITY,
                clip: Region::from_rect(device),
            },
            saved: Vec::new(),
        }
    }

    pub(crate) fn device(&self) -> IntRect {
        self.device
    }

    pub(crate) fn clip(&self) -> &Region {
        &self.current.clip
    }

    pub(crate) fn transform(&self) -> Affine {
        self.current.transform
    }

    pub(crate) fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    pub(crate) fn restore(&mut self) {
        if let Some(prev) = self.saved.pop() {
            self.current = prev;
        }
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.current.transform = self.current.transform * Affine::translate((dx, dy));
    }

    pub(crate) fn scale(&mut self, sx: f64, sy: f64) {
        self.current.transform = self.current.transform * Affine::scale_non_uniform(sx, sy);
    }

    pub(crate) fn map_rect(&self, rect: Rect) -> Rect {
        self.current.transform.transform_rect_bbox(rect)
    }

    /// Device pixels a user-space rect snaps to.
    pub(crate) fn device_rect(&self, rect: Rect) -> IntRect {
        IntRect::rounded(self.map_rect(rect))
    }

    pub(crate) fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        let device_rect = self.device_rect(rect);
        match op {
            ClipOp::Intersect => self.current.clip.intersect_rect(device_rect),
            ClipOp::Difference => self.current.clip.subtract_rect(device_rect),
            ClipOp::Replace => {
                self.current.clip = Region::from_rect(device_rect.intersection(self.device))
            }
        }
    }

    /// Clip pieces a device rect actually reaches.
    pub(crate) fn clipped(&self, device_rect: IntRect) -> impl Iterator<Item = IntRect> + '_ {
        self.current
            .clip
            .rects()
            .map(move |r| r.intersection(device_rect))
            .filter(|r| !r.is_empty())
    }

    /// True when the clip still spans the whole device.
    pub(crate) fn clip_is_full(&self) -> bool {
        self.current.clip.contains_rect(self.device)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/matrix_clip.rs"]
mod tests;
