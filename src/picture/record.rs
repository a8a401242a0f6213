use crate::canvas::{BlendMode, Canvas, ClipOp, MatrixClipStack, Paint, text_bounds};
use crate::foundation::core::{BezPath, Color, IntRect, IntSize, Point, Rect, Vec2};
use crate::foundation::region::Region;
use crate::picture::image::PixelRef;
use crate::picture::op::DrawOp;
use kurbo::PathEl;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Anti-aliased concave paths a picture may hold before GPU raster is vetoed.
const MAX_CONCAVE_AA_PATHS_FOR_GPU: usize = 5;

/// How a recording pass asks the painter to behave.
///
/// Everything except `Normal` exists for benchmarking the cost of individual painting stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordingMode {
    #[default]
    Normal,
    PaintingDisabled,
    CachingDisabled,
    ConstructionDisabled,
}

/// Painting stage a [`ContentPainter`] should skip, derived from [`RecordingMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintingControl {
    #[default]
    PaintingBehaviorNormal,
    DisplayListPaintingDisabled,
    DisplayListCachingDisabled,
    DisplayListConstructionDisabled,
}

impl From<RecordingMode> for PaintingControl {
    fn from(mode: RecordingMode) -> Self {
        match mode {
            RecordingMode::Normal => PaintingControl::PaintingBehaviorNormal,
            RecordingMode::PaintingDisabled => PaintingControl::DisplayListPaintingDisabled,
            RecordingMode::CachingDisabled => PaintingControl::DisplayListCachingDisabled,
            RecordingMode::ConstructionDisabled => {
                PaintingControl::DisplayListConstructionDisabled
            }
        }
    }
}

/// Source of layer content. Paints in layer coordinates; anything outside `clip` is discarded.
pub trait ContentPainter {
    fn paint_contents(
        &mut self,
        recorder: &mut PictureRecorder,
        clip: IntRect,
        control: PaintingControl,
    );
}

impl<F> ContentPainter for F
where
    F: FnMut(&mut PictureRecorder, IntRect, PaintingControl),
{
    fn paint_contents(
        &mut self,
        recorder: &mut PictureRecorder,
        clip: IntRect,
        control: PaintingControl,
    ) {
        self(recorder, clip, control)
    }
}

/// A lazily decoded image and the layer pixels it lands on.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelRefEntry {
    pub pixel_ref: Arc<PixelRef>,
    pub layer_rect: IntRect,
}

/// Spatial index of a picture's lazily decoded images, bucketed into fixed-size cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct PixelRefMap {
    cell_size: IntSize,
    entries: Vec<PixelRefEntry>,
    cells: HashMap<(i32, i32), SmallVec<[usize; 4]>>,
}

impl PixelRefMap {
    fn build(cell_size: IntSize, entries: Vec<PixelRefEntry>) -> Self {
        let mut map = Self {
            cell_size,
            entries,
            cells: HashMap::new(),
        };
        for (i, entry) in map.entries.iter().enumerate() {
            let (x0, y0, x1, y1) = cell_span(cell_size, entry.layer_rect);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    map.cells.entry((x, y)).or_default().push(i);
                }
            }
        }
        map
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose pixels overlap `rect`, each once, in recording order.
    fn query(&self, rect: IntRect) -> impl Iterator<Item = &PixelRefEntry> {
        let mut hits = BTreeSet::new();
        if !rect.is_empty() && !self.entries.is_empty() {
            let (x0, y0, x1, y1) = cell_span(self.cell_size, rect);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    if let Some(indices) = self.cells.get(&(x, y)) {
                        hits.extend(indices.iter().copied());
                    }
                }
            }
        }
        hits.into_iter()
            .map(|i| &self.entries[i])
            .filter(move |entry| entry.layer_rect.intersects(rect))
    }

    fn approximate_bytes(&self) -> usize {
        self.entries.len() * size_of::<PixelRefEntry>()
            + self
                .cells
                .values()
                .map(|v| size_of::<(i32, i32)>() + size_of::<SmallVec<[usize; 4]>>() + v.len())
                .sum::<usize>()
    }
}

fn cell_span(cell_size: IntSize, rect: IntRect) -> (i32, i32, i32, i32) {
    let cw = cell_size.width.max(1);
    let ch = cell_size.height.max(1);
    (
        rect.x.div_euclid(cw),
        rect.y.div_euclid(ch),
        (rect.right() - 1).div_euclid(cw),
        (rect.bottom() - 1).div_euclid(ch),
    )
}

/// True if `path` is a single subpath that turns one way through at most one full revolution.
fn is_convex(path: &BezPath) -> bool {
    let mut points: Vec<Point> = Vec::new();
    let mut subpaths = 0;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                subpaths += 1;
                if subpaths > 1 {
                    return false;
                }
                points.push(p);
            }
            PathEl::LineTo(p) => points.push(p),
            PathEl::QuadTo(c, p) => points.extend([c, p]),
            PathEl::CurveTo(c1, c2, p) => points.extend([c1, c2, p]),
            PathEl::ClosePath => {}
        }
    }
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return true;
    }

    let n = points.len();
    let mut sign = 0.0_f64;
    let mut turning = 0.0_f64;
    for i in 0..n {
        let a: Vec2 = points[(i + 1) % n] - points[i];
        let b: Vec2 = points[(i + 2) % n] - points[(i + 1) % n];
        let cross = a.cross(b);
        if cross.abs() > f64::EPSILON {
            if sign != 0.0 && cross.signum() != sign {
                return false;
            }
            sign = cross.signum();
        }
        turning += cross.atan2(a.dot(b));
    }
    turning.abs() <= std::f64::consts::TAU + 1e-6
}

/// Canvas that captures draw calls into a [`Picture`].
///
/// Tracks the transform and clip as it goes so lazily decoded images can be located in layer
/// space and GPU suitability can be judged without a second pass.
#[derive(Debug)]
pub struct PictureRecorder {
    layer_rect: IntRect,
    ops: Vec<DrawOp>,
    state: MatrixClipStack,
    pixel_ref_grid: Option<IntSize>,
    pixel_refs: Vec<PixelRefEntry>,
    concave_aa_paths: usize,
    has_text: bool,
}

impl PictureRecorder {
    /// Start recording content for `layer_rect`. With `pixel_ref_grid` set, lazily decoded images
    /// are indexed in cells of that size.
    pub fn new(layer_rect: IntRect, pixel_ref_grid: Option<IntSize>) -> Self {
        Self {
            layer_rect,
            ops: Vec::new(),
            state: MatrixClipStack::new(layer_rect),
            pixel_ref_grid,
            pixel_refs: Vec::new(),
            concave_aa_paths: 0,
            has_text: false,
        }
    }

    pub fn layer_rect(&self) -> IntRect {
        self.layer_rect
    }

    pub fn finish(self) -> Picture {
        let pixel_refs = match self.pixel_ref_grid {
            Some(cell) if !self.pixel_refs.is_empty() => {
                Some(PixelRefMap::build(cell, self.pixel_refs))
            }
            _ => None,
        };
        Picture {
            layer_rect: self.layer_rect,
            ops: self.ops,
            has_text: self.has_text,
            concave_aa_paths: self.concave_aa_paths,
            pixel_refs,
        }
    }
}

impl Canvas for PictureRecorder {
    fn save(&mut self) {
        self.state.save();
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.state.restore();
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.translate(dx, dy);
        self.ops.push(DrawOp::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.scale(sx, sy);
        self.ops.push(DrawOp::Scale { sx, sy });
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        self.state.clip_rect(rect, op);
        self.ops.push(DrawOp::ClipRect { rect, op });
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.ops.push(DrawOp::DrawColor { color, mode });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.ops.push(DrawOp::DrawRect {
            rect,
            paint: *paint,
        });
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        if paint.anti_alias && !is_convex(path) {
            self.concave_aa_paths += 1;
        }
        self.ops.push(DrawOp::DrawPath {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn draw_image(&mut self, image: &Arc<PixelRef>, dest: Rect) {
        if self.pixel_ref_grid.is_some() && image.is_lazily_decoded() {
            let device = IntRect::enclosing(self.state.map_rect(dest));
            let layer_rect = device.intersection(self.state.clip().bounds());
            if !layer_rect.is_empty() {
                self.pixel_refs.push(PixelRefEntry {
                    pixel_ref: Arc::clone(image),
                    layer_rect,
                });
            }
        }
        self.ops.push(DrawOp::DrawImage {
            image: Arc::clone(image),
            dest,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        let device = IntRect::enclosing(self.state.map_rect(text_bounds(text, origin, font_size)));
        if self.state.clip().intersects_rect(device) {
            self.has_text = true;
        }
        self.ops.push(DrawOp::DrawText {
            text: text.to_owned(),
            origin,
            font_size,
            paint: *paint,
        });
    }
}

/// Immutable replay log of a painted layer rect.
///
/// Shared between tiles and raster snapshots behind an `Arc`; identity (`Arc::ptr_eq`) is what
/// "same recording" means throughout the pile.
#[derive(Debug)]
pub struct Picture {
    layer_rect: IntRect,
    ops: Vec<DrawOp>,
    has_text: bool,
    concave_aa_paths: usize,
    pixel_refs: Option<PixelRefMap>,
}

impl Picture {
    /// Ask `painter` for the content of `layer_rect`.
    #[tracing::instrument(level = "trace", skip(painter))]
    pub fn record(
        layer_rect: IntRect,
        painter: &mut dyn ContentPainter,
        mode: RecordingMode,
        pixel_ref_grid: Option<IntSize>,
    ) -> Arc<Picture> {
        let mut recorder = PictureRecorder::new(layer_rect, pixel_ref_grid);
        painter.paint_contents(&mut recorder, layer_rect, mode.into());
        Arc::new(recorder.finish())
    }

    /// Layer pixels the recording covers.
    pub fn layer_rect(&self) -> IntRect {
        self.layer_rect
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn approximate_op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn approximate_memory_usage(&self) -> usize {
        size_of::<Picture>()
            + self.ops.iter().map(DrawOp::approximate_bytes).sum::<usize>()
            + self
                .pixel_refs
                .as_ref()
                .map_or(0, PixelRefMap::approximate_bytes)
    }

    pub fn has_text(&self) -> bool {
        self.has_text
    }

    pub fn is_suitable_for_gpu_rasterization(&self) -> bool {
        self.unsuitable_for_gpu_reason().is_none()
    }

    /// Why GPU raster would be a bad idea for this content, if it would be.
    pub fn unsuitable_for_gpu_reason(&self) -> Option<&'static str> {
        (self.concave_aa_paths > MAX_CONCAVE_AA_PATHS_FOR_GPU)
            .then_some("too many anti-aliased concave paths")
    }

    pub fn has_pixel_refs(&self) -> bool {
        self.pixel_refs.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Lazily decoded images drawn inside `layer_rect`, each once.
    pub fn pixel_refs_in(&self, layer_rect: IntRect) -> impl Iterator<Item = &PixelRefEntry> {
        self.pixel_refs
            .iter()
            .flat_map(move |map| map.query(layer_rect))
    }

    /// Replay the ops with no extra clipping or scaling.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for op in &self.ops {
            op.replay(canvas);
        }
    }

    /// Replay at `contents_scale`, leaving every pixel of `negated_content_region` untouched.
    ///
    /// The region is in the canvas' current (unscaled) space.
    pub fn raster(
        &self,
        canvas: &mut dyn Canvas,
        negated_content_region: &Region,
        contents_scale: f32,
    ) {
        canvas.save();
        for rect in negated_content_region.rects() {
            canvas.clip_rect(rect.to_kurbo(), ClipOp::Difference);
        }
        let scale = f64::from(contents_scale);
        canvas.scale(scale, scale);
        canvas.clip_rect(self.layer_rect.to_kurbo(), ClipOp::Intersect);
        self.replay(canvas);
        canvas.restore();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/picture/record.rs"]
mod tests;
