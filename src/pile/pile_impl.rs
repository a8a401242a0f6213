use crate::canvas::{AnalysisCanvas, Canvas, ClipOp};
use crate::foundation::core::{Color, IntRect, IntSize};
use crate::foundation::region::Region;
use crate::picture::{Picture, PixelRef};
use crate::pile::helper::{PlaybackPreparation, prepare_for_playback_to_canvas};
use crate::pile::picture_pile::{
    PictureMap, PicturePile, can_raster_slow_tile_check, padded_tile_rect,
};
use crate::pile::recording::{GpuRasterization, RasterSource, SolidColorAnalysis};
use crate::settings::DebugSettings;
use crate::tiling::{TileIterator, TilingData};
use std::collections::HashSet;
use std::sync::Arc;

/// Immutable playback snapshot of a [`PicturePile`].
///
/// Shares the pile's pictures; nothing here changes after construction, so a snapshot can be
/// rastered from any thread while the pile keeps recording.
#[derive(Clone, Debug)]
pub struct PicturePileImpl {
    picture_map: Arc<PictureMap>,
    tiling: TilingData,
    recorded_viewport: IntRect,
    min_contents_scale: f32,
    background_color: Color,
    requires_clear: bool,
    can_use_lcd_text: bool,
    is_solid_color: bool,
    solid_color: Color,
    has_any_recordings: bool,
    gpu_rasterization: GpuRasterization,
    debug: DebugSettings,
}

impl PicturePileImpl {
    pub fn from_pile(pile: &PicturePile, can_use_lcd_text: bool) -> Self {
        Self {
            picture_map: Arc::new(pile.picture_map().clone()),
            tiling: *pile.tiling(),
            recorded_viewport: pile.recorded_viewport(),
            min_contents_scale: pile.min_contents_scale(),
            background_color: pile.background_color(),
            requires_clear: pile.requires_clear(),
            can_use_lcd_text,
            is_solid_color: pile.is_solid_color(),
            solid_color: pile.solid_color(),
            has_any_recordings: pile.has_any_recordings(),
            gpu_rasterization: pile.gpu_rasterization(),
            debug: pile.debug_settings().clone(),
        }
    }

    pub fn tiling(&self) -> &TilingData {
        &self.tiling
    }

    pub fn recorded_viewport(&self) -> IntRect {
        self.recorded_viewport
    }

    pub fn can_raster_slow_tile_check(&self, layer_rect: IntRect) -> bool {
        can_raster_slow_tile_check(&self.tiling, &self.picture_map, layer_rect)
    }

    /// Lazily decoded images under `content_rect`, visiting each picture once.
    pub fn pixel_refs(&self, content_rect: IntRect, contents_scale: f32) -> PixelRefIterator<'_> {
        PixelRefIterator::new(self, content_rect, contents_scale)
    }

    /// Pair every picture under `content_rect` with the region it must not draw into.
    ///
    /// Neighbouring pictures overlap by the buffer pixels. Tiles are visited row by row and each
    /// claims only the part of its clip no earlier tile has claimed, so every content pixel is
    /// drawn by exactly one picture. The region returned per picture is the complement of its
    /// claims within `content_rect`, ready to be applied as difference clips.
    fn coalesce_rasters(
        &self,
        content_rect: IntRect,
        contents_scale: f32,
    ) -> Vec<(Arc<Picture>, Region)> {
        let mut results: Vec<(Arc<Picture>, Region)> = Vec::new();
        if content_rect.is_empty() {
            return results;
        }
        let layer_rect = content_rect.scale_to_enclosing(1.0 / contents_scale);

        let mut claimed = Region::new();
        for key in self.tiling.iter(layer_rect, true) {
            let Some(picture) = self.picture_map.get(&key) else {
                continue;
            };

            // Enclosed, so the clip stays on whole content pixels and inside the picture.
            let content_clip = padded_tile_rect(&self.tiling, key)
                .scale_to_enclosed(contents_scale)
                .intersection(content_rect);
            let mut piece = Region::from_rect(content_clip);
            piece.subtract(&claimed);
            if piece.is_empty() {
                continue;
            }

            let slot = match results.iter().position(|(p, _)| Arc::ptr_eq(p, picture)) {
                Some(slot) => slot,
                None => {
                    results.push((Arc::clone(picture), Region::from_rect(content_rect)));
                    results.len() - 1
                }
            };
            results[slot].1.subtract(&piece);
            claimed.union(&piece);
        }
        results
    }

    fn raster_common(
        &self,
        canvas: &mut dyn Canvas,
        canvas_bitmap_rect: IntRect,
        canvas_playback_rect: IntRect,
        contents_scale: f32,
    ) {
        debug_assert!(contents_scale >= self.min_contents_scale);

        canvas.save();
        canvas.translate(
            -f64::from(canvas_bitmap_rect.x),
            -f64::from(canvas_bitmap_rect.y),
        );
        let content_tiling_rect = IntRect::from_size(self.tiling.tiling_size())
            .scale_to_enclosing(contents_scale)
            .intersection(canvas_playback_rect);
        canvas.clip_rect(content_tiling_rect.to_kurbo(), ClipOp::Intersect);

        let rasters = self.coalesce_rasters(content_tiling_rect, contents_scale);
        let repeat_count = self.debug.slow_down_raster_scale_factor.max(1);

        #[cfg(debug_assertions)]
        let mut total_clip = Region::new();
        for (picture, negated_clip_region) in &rasters {
            #[cfg(debug_assertions)]
            {
                let mut positive_clip = Region::from_rect(content_tiling_rect);
                positive_clip.subtract(negated_clip_region);
                debug_assert!(
                    !total_clip.intersects(&positive_clip),
                    "content rastered twice"
                );
                total_clip.union(&positive_clip);
            }
            for _ in 0..repeat_count {
                picture.raster(canvas, negated_clip_region, contents_scale);
            }
        }
        canvas.restore();
    }

    fn playback_preparation(&self, contents_scale: f32) -> PlaybackPreparation<'_> {
        PlaybackPreparation {
            source_rect: IntRect::from_size(self.tiling.tiling_size()),
            contents_scale,
            background_color: self.background_color,
            requires_clear: self.requires_clear,
            debug: &self.debug,
        }
    }
}

impl RasterSource for PicturePileImpl {
    #[tracing::instrument(level = "trace", skip(self, canvas))]
    fn playback_to_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_bitmap_rect: IntRect,
        canvas_playback_rect: IntRect,
        contents_scale: f32,
    ) {
        prepare_for_playback_to_canvas(
            canvas,
            canvas_bitmap_rect,
            canvas_playback_rect,
            &self.playback_preparation(contents_scale),
        );
        self.raster_common(canvas, canvas_bitmap_rect, canvas_playback_rect, contents_scale);
    }

    fn playback_to_shared_canvas(
        &self,
        canvas: &mut dyn Canvas,
        canvas_rect: IntRect,
        contents_scale: f32,
    ) {
        self.raster_common(canvas, canvas_rect, canvas_rect, contents_scale);
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn perform_solid_color_analysis(
        &self,
        content_rect: IntRect,
        contents_scale: f32,
    ) -> SolidColorAnalysis {
        let layer_rect = content_rect
            .scale_to_enclosing(1.0 / contents_scale)
            .intersection(IntRect::from_size(self.tiling.tiling_size()));
        let mut canvas = AnalysisCanvas::new(layer_rect.width, layer_rect.height);
        self.raster_common(&mut canvas, layer_rect, layer_rect, 1.0);
        SolidColorAnalysis::from_color(canvas.color_if_solid())
    }

    fn gather_pixel_refs(&self, content_rect: IntRect, contents_scale: f32) -> Vec<Arc<PixelRef>> {
        self.pixel_refs(content_rect, contents_scale)
            .map(Arc::clone)
            .collect()
    }

    fn covers_rect(&self, content_rect: IntRect, contents_scale: f32) -> bool {
        let size = self.tiling.tiling_size();
        if size.is_empty() {
            return false;
        }
        let layer_rect = content_rect
            .scale_to_enclosing(1.0 / contents_scale)
            .intersection(IntRect::from_size(size));

        if self.recorded_viewport.contains(layer_rect) {
            debug_assert!(
                self.can_raster_slow_tile_check(layer_rect),
                "recorded viewport {:?} claims unrecorded tiles under {layer_rect:?}",
                self.recorded_viewport
            );
            return true;
        }
        self.can_raster_slow_tile_check(layer_rect)
    }

    fn is_solid_color(&self) -> bool {
        self.is_solid_color
    }

    fn solid_color(&self) -> Color {
        self.solid_color
    }

    fn has_recordings(&self) -> bool {
        self.has_any_recordings
    }

    fn size(&self) -> IntSize {
        self.tiling.tiling_size()
    }

    fn picture_memory_usage(&self) -> usize {
        let mut seen = HashSet::new();
        self.picture_map
            .values()
            .filter(|picture| seen.insert(Arc::as_ptr(*picture)))
            .map(|picture| picture.approximate_memory_usage())
            .sum()
    }

    fn can_use_lcd_text(&self) -> bool {
        self.can_use_lcd_text
    }

    fn create_clone_without_lcd_text(&self) -> Arc<dyn RasterSource> {
        Arc::new(Self {
            can_use_lcd_text: false,
            ..self.clone()
        })
    }

    fn is_suitable_for_gpu_rasterization(&self) -> bool {
        self.gpu_rasterization.is_suitable()
    }

    fn as_value(&self) -> serde_json::Value {
        serde_json::json!({
            "tiling": self.tiling,
            "recorded_viewport": self.recorded_viewport,
            "recordings": self.picture_map.len(),
            "picture_memory_usage": self.picture_memory_usage(),
            "is_solid_color": self.is_solid_color,
            "solid_color": self.solid_color,
            "has_recordings": self.has_any_recordings,
            "can_use_lcd_text": self.can_use_lcd_text,
            "gpu_rasterization": self.gpu_rasterization,
        })
    }
}

/// Lazily decoded images under a content rect, gathered tile by tile.
///
/// A picture shared by several tiles is only searched once.
#[derive(Debug)]
pub struct PixelRefIterator<'a> {
    pile: &'a PicturePileImpl,
    layer_rect: IntRect,
    tiles: TileIterator,
    processed: HashSet<*const Picture>,
    current: std::vec::IntoIter<&'a Arc<PixelRef>>,
}

impl<'a> PixelRefIterator<'a> {
    fn new(pile: &'a PicturePileImpl, content_rect: IntRect, contents_scale: f32) -> Self {
        let layer_rect = content_rect.scale_to_enclosing(1.0 / contents_scale);
        Self {
            pile,
            layer_rect,
            tiles: pile.tiling.iter(layer_rect, false),
            processed: HashSet::new(),
            current: Vec::new().into_iter(),
        }
    }

    /// Load the pixel refs of the next unvisited picture that has any under the rect.
    fn advance_to_next_picture(&mut self) -> bool {
        let pile = self.pile;
        for key in self.tiles.by_ref() {
            let Some(picture) = pile.picture_map.get(&key) else {
                continue;
            };
            if !picture.has_pixel_refs() || !self.processed.insert(Arc::as_ptr(picture)) {
                continue;
            }
            let refs: Vec<&'a Arc<PixelRef>> = picture
                .pixel_refs_in(self.layer_rect)
                .map(|entry| &entry.pixel_ref)
                .collect();
            if !refs.is_empty() {
                self.current = refs.into_iter();
                return true;
            }
        }
        false
    }
}

impl<'a> Iterator for PixelRefIterator<'a> {
    type Item = &'a Arc<PixelRef>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pixel_ref) = self.current.next() {
                return Some(pixel_ref);
            }
            if !self.advance_to_next_picture() {
                return None;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pile/pile_impl.rs"]
mod tests;
