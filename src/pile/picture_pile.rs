use crate::canvas::AnalysisCanvas;
use crate::foundation::core::{Color, IntRect, IntSize};
use crate::foundation::region::Region;
use crate::picture::{ContentPainter, Picture, RecordingMode};
use crate::pile::cluster::cluster_tiles;
use crate::pile::pile_impl::PicturePileImpl;
use crate::pile::recording::{GpuRasterization, RasterSource, RecordingSource};
use crate::settings::{DebugSettings, PileSettings};
use crate::tiling::{TileIndex, TilingData};
use std::collections::HashMap;
use std::sync::Arc;

/// Recordings keyed by the tile they serve. Several tiles may share one picture.
pub type PictureMap = HashMap<TileIndex, Arc<Picture>>;

/// Per-tile picture cache for one layer, kept in sync with invalidations on the main thread.
///
/// Each tile is either recorded or absent. A recording covers the tile's bounds padded by
/// `buffer_pixels` so that low-scale playback never samples across a picture seam.
#[derive(Clone, Debug)]
pub struct PicturePile {
    tiling: TilingData,
    picture_map: PictureMap,
    recorded_viewport: IntRect,
    min_contents_scale: f32,
    tile_grid_size: IntSize,
    pixel_record_distance: i32,
    cluster_density_threshold: f32,
    solid_color_op_limit: usize,
    gather_pixel_refs: bool,
    has_any_recordings: bool,
    requires_clear: bool,
    is_solid_color: bool,
    solid_color: Color,
    background_color: Color,
    gpu_rasterization: GpuRasterization,
    debug: DebugSettings,
}

impl Default for PicturePile {
    fn default() -> Self {
        Self::from_settings(&PileSettings::default())
    }
}

impl PicturePile {
    /// Empty pile with default tuning.
    pub fn new(min_contents_scale: f32, tile_grid_size: IntSize) -> Self {
        Self::from_settings(&PileSettings {
            min_contents_scale,
            tile_grid_size,
            ..PileSettings::default()
        })
    }

    pub fn from_settings(settings: &PileSettings) -> Self {
        let picture_size = IntSize::new(settings.base_picture_size, settings.base_picture_size);
        let mut pile = Self {
            tiling: TilingData::new(picture_size, IntSize::default(), 0),
            picture_map: PictureMap::new(),
            recorded_viewport: IntRect::default(),
            min_contents_scale: 0.0,
            tile_grid_size: IntSize::default(),
            pixel_record_distance: settings.pixel_record_distance,
            cluster_density_threshold: settings.cluster_density_threshold,
            solid_color_op_limit: settings.solid_color_op_limit,
            gather_pixel_refs: settings.gather_pixel_refs,
            has_any_recordings: false,
            requires_clear: true,
            is_solid_color: false,
            solid_color: Color::TRANSPARENT,
            background_color: Color::TRANSPARENT,
            gpu_rasterization: GpuRasterization::Suitable,
            debug: settings.debug.clone(),
        };
        pile.set_min_contents_scale(settings.min_contents_scale);
        pile.set_tile_grid_size(settings.tile_grid_size);
        pile
    }

    pub fn tiling(&self) -> &TilingData {
        &self.tiling
    }

    pub fn picture_map(&self) -> &PictureMap {
        &self.picture_map
    }

    /// Layer rect known to be fully recorded. May under-report, never over-reports.
    pub fn recorded_viewport(&self) -> IntRect {
        self.recorded_viewport
    }

    pub fn buffer_pixels(&self) -> i32 {
        self.tiling.border_texels()
    }

    pub fn min_contents_scale(&self) -> f32 {
        self.min_contents_scale
    }

    pub fn tile_grid_size(&self) -> IntSize {
        self.tile_grid_size
    }

    pub fn has_any_recordings(&self) -> bool {
        self.has_any_recordings
    }

    pub fn is_solid_color(&self) -> bool {
        self.is_solid_color
    }

    pub fn solid_color(&self) -> Color {
        self.solid_color
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn requires_clear(&self) -> bool {
        self.requires_clear
    }

    pub fn gpu_rasterization(&self) -> GpuRasterization {
        self.gpu_rasterization
    }

    pub fn debug_settings(&self) -> &DebugSettings {
        &self.debug
    }

    /// Set the smallest scale content will be rastered at.
    ///
    /// At scale `s < 1` one output pixel covers `1/s` layer pixels, so each picture is padded by
    /// `ceil(1/s) - 1` pixels to keep every output pixel inside a single picture. Changing the
    /// padding drops all recordings.
    pub fn set_min_contents_scale(&mut self, min_contents_scale: f32) {
        debug_assert!(min_contents_scale > 0.0);
        if self.min_contents_scale == min_contents_scale {
            return;
        }
        let buffer_pixels = ((1.0 / min_contents_scale).ceil() - 1.0).max(0.0) as i32;
        self.set_buffer_pixels(buffer_pixels);
        self.min_contents_scale = min_contents_scale;
    }

    fn set_buffer_pixels(&mut self, buffer_pixels: i32) {
        if buffer_pixels == self.buffer_pixels() {
            return;
        }
        self.clear();
        self.tiling.set_border_texels(buffer_pixels);
    }

    pub fn set_tile_grid_size(&mut self, tile_grid_size: IntSize) {
        debug_assert!(tile_grid_size.width > 0 && tile_grid_size.height > 0);
        self.tile_grid_size = tile_grid_size;
    }

    pub fn set_pixel_record_distance(&mut self, distance: i32) {
        debug_assert!(distance >= 0);
        self.pixel_record_distance = distance;
    }

    /// Change the per-picture footprint. Existing recordings no longer line up and are dropped.
    pub fn set_max_picture_size(&mut self, size: IntSize) {
        if size == self.tiling.max_texture_size() {
            return;
        }
        self.clear();
        self.tiling.set_max_texture_size(size);
    }

    pub fn set_clear_canvas_with_debug_color(&mut self, enabled: bool) {
        self.debug.clear_canvas_with_debug_color = enabled;
    }

    /// Drop every recording. The tiling keeps its size.
    pub fn clear(&mut self) {
        self.picture_map.clear();
        self.recorded_viewport = IntRect::default();
        self.has_any_recordings = false;
        self.is_solid_color = false;
    }

    /// Ground truth for coverage: every tile under `layer_rect` has a recording.
    pub fn can_raster_slow_tile_check(&self, layer_rect: IntRect) -> bool {
        can_raster_slow_tile_check(&self.tiling, &self.picture_map, layer_rect)
    }

    /// Tile bounds grown by the buffer on every side.
    pub(crate) fn padded_rect(&self, key: TileIndex) -> IntRect {
        padded_tile_rect(&self.tiling, key)
    }

    fn pad_rect(&self, rect: IntRect) -> IntRect {
        rect.outset(self.buffer_pixels())
    }

    /// Resize the tiling, drop recordings that are stale or out of bounds, and expand
    /// `invalidation` to cover everything whose recording went away.
    fn apply_invalidation_and_resize(
        &mut self,
        interest_rect: IntRect,
        invalidation: &mut Region,
        layer_size: IntSize,
    ) -> bool {
        let mut updated = false;
        let mut synthetic_invalidation = Region::new();

        let old_tiling_size = self.size();
        if old_tiling_size != layer_size {
            self.tiling.set_tiling_size(layer_size);
            updated = true;
        }

        let interest_rect_over_tiles = self.tiling.expand_rect_to_tile_bounds(interest_rect);

        if old_tiling_size != layer_size {
            self.resize_picture_map(
                old_tiling_size,
                interest_rect_over_tiles,
                &mut synthetic_invalidation,
            );
        }

        if invalidation.contains_rect(IntRect::from_size(old_tiling_size))
            || invalidation.contains_rect(IntRect::from_size(self.size()))
        {
            tracing::debug!(
                recordings = self.picture_map.len(),
                "invalidation covers the whole layer"
            );
            updated |= !self.picture_map.is_empty();
            self.picture_map.clear();
        } else {
            let mut invalidation_expanded_to_full_tiles = Region::new();
            let invalid_rects: Vec<IntRect> = invalidation.rects().collect();
            for invalid_rect in invalid_rects {
                // Every tile whose bordered bounds touch the rect loses its recording. Those
                // outside the interest rect are not re-recorded below, so their whole bounds
                // become invalid rather than just the touched pixels.
                let mut outside_interest = self.tiling.expand_rect_to_tile_bounds(invalid_rect);
                outside_interest.subtract(interest_rect_over_tiles);
                invalidation_expanded_to_full_tiles.union_rect(outside_interest);

                updated |= self.drop_recordings_touching(invalid_rect);
            }
            invalidation.union(&invalidation_expanded_to_full_tiles);
        }

        invalidation.union(&synthetic_invalidation);
        updated
    }

    /// Drop recordings that no longer fit after a resize and collect the synthetic invalidation
    /// for tiles along the changed edges.
    fn resize_picture_map(
        &mut self,
        old_tiling_size: IntSize,
        interest_rect_over_tiles: IntRect,
        synthetic_invalidation: &mut Region,
    ) {
        let new_tiling_size = self.size();
        let min_tiling_size = old_tiling_size.min(new_tiling_size);
        let max_tiling_size = old_tiling_size.max(new_tiling_size);

        // Tiles at or past these indices reach across the changed edge.
        let min_toss_x = if max_tiling_size.width > min_tiling_size.width {
            self.tiling
                .first_border_tile_x_index_from_src_coord(min_tiling_size.width)
        } else {
            self.tiling.num_tiles_x()
        };
        let min_toss_y = if max_tiling_size.height > min_tiling_size.height {
            self.tiling
                .first_border_tile_y_index_from_src_coord(min_tiling_size.height)
        } else {
            self.tiling.num_tiles_y()
        };

        let before = self.picture_map.len();
        self.picture_map
            .retain(|&(x, y), _| x < min_toss_x && y < min_toss_y);
        self.has_any_recordings = !self.picture_map.is_empty();
        let dropped = before - self.picture_map.len();
        if dropped > 0 {
            tracing::debug!(
                dropped,
                old = ?old_tiling_size,
                new = ?new_tiling_size,
                "resize dropped recordings"
            );
        }

        // Recordings along the old edge (when growing) or the new edge (when shrinking) are gone.
        // Whatever part of that strip will not be re-recorded from the interest rect is
        // invalidated in full, together with the pixels that are exposed or hidden by the resize.
        let min_tiling_rect_over_tiles = self
            .tiling
            .expand_rect_to_tile_bounds(IntRect::from_size(min_tiling_size));

        if min_toss_x < self.tiling.num_tiles_x() {
            let left = self.tiling.tile_position_x(min_toss_x);
            let right = left + self.tiling.tile_size_x(min_toss_x);
            let top = min_tiling_rect_over_tiles.y;
            let bottom = min_tiling_rect_over_tiles.bottom();
            debug_assert!(min_tiling_size.width >= left);

            let exposed = IntRect::from_bounds(
                min_tiling_size.width,
                top,
                max_tiling_size.width,
                max_tiling_size.height,
            );
            union_strip_outside(
                synthetic_invalidation,
                IntRect::from_bounds(left, top, right, bottom),
                interest_rect_over_tiles,
                exposed,
            );
        }

        if min_toss_y < self.tiling.num_tiles_y() {
            let top = self.tiling.tile_position_y(min_toss_y);
            let bottom = top + self.tiling.tile_size_y(min_toss_y);
            let left = min_tiling_rect_over_tiles.x;
            let right = min_tiling_rect_over_tiles.right();
            debug_assert!(min_tiling_size.height >= top);

            let exposed = IntRect::from_bounds(
                left,
                min_tiling_size.height,
                max_tiling_size.width,
                max_tiling_size.height,
            );
            union_strip_outside(
                synthetic_invalidation,
                IntRect::from_bounds(left, top, right, bottom),
                interest_rect_over_tiles,
                exposed,
            );
        }
    }

    /// Drop the recording of every tile whose bordered bounds touch `invalid_rect`.
    ///
    /// Walks whichever is smaller, the tiles under the rect or the recordings, so that a huge
    /// invalidation costs no more than the recordings it can hit.
    fn drop_recordings_touching(&mut self, invalid_rect: IntRect) -> bool {
        if self.picture_map.is_empty() {
            return false;
        }
        let before = self.picture_map.len();
        if border_tile_count(&self.tiling, invalid_rect) <= before as i64 {
            for key in self.tiling.iter(invalid_rect, true) {
                self.picture_map.remove(&key);
            }
        } else {
            let clipped = invalid_rect.intersection(IntRect::from_size(self.size()));
            let tiling = self.tiling;
            self.picture_map
                .retain(|&(x, y), _| !tiling.tile_bounds_with_border(x, y).intersects(clipped));
        }
        self.picture_map.len() != before
    }

    /// Bounds of every tile touching `interest_rect` that has no recording.
    fn invalid_tile_rects(&self, interest_rect: IntRect) -> Vec<IntRect> {
        self.tiling
            .iter(interest_rect, true)
            .filter(|key| !self.picture_map.contains_key(key))
            .map(|(x, y)| self.tiling.tile_bounds(x, y))
            .collect()
    }

    fn create_pictures(
        &mut self,
        painter: &mut dyn ContentPainter,
        recording_mode: RecordingMode,
        record_rects: &[IntRect],
    ) {
        let pixel_ref_grid = self.gather_pixel_refs.then_some(self.tile_grid_size);
        let repeat_count = self.debug.slow_down_raster_scale_factor.max(1);

        for &record_rect in record_rects {
            let padded_record_rect = self.pad_rect(record_rect);

            let mut recorded = None;
            for _ in 0..repeat_count {
                let picture =
                    Picture::record(padded_record_rect, painter, recording_mode, pixel_ref_grid);
                if self.gpu_rasterization.is_suitable()
                    && let Some(reason) = picture.unsuitable_for_gpu_reason()
                {
                    self.gpu_rasterization.veto(reason);
                }
                recorded = Some(picture);
            }
            let Some(picture) = recorded else {
                continue;
            };

            let mut found_tile_for_picture = false;
            for key in self.tiling.iter(padded_record_rect, true) {
                if padded_record_rect.contains(self.padded_rect(key)) {
                    self.picture_map.insert(key, Arc::clone(&picture));
                    found_tile_for_picture = true;
                }
            }
            debug_assert!(
                found_tile_for_picture,
                "recording {padded_record_rect:?} serves no tile"
            );
        }
    }

    /// The pile is solid only when one cheap picture serves every recorded tile and it paints a
    /// single flat color over the whole layer.
    fn determine_if_solid_color(&mut self) {
        self.is_solid_color = false;
        self.solid_color = Color::TRANSPARENT;

        let mut pictures = self.picture_map.values();
        let Some(picture) = pictures.next() else {
            return;
        };
        if picture.approximate_op_count() > self.solid_color_op_limit {
            return;
        }
        if !pictures.all(|other| Arc::ptr_eq(other, picture)) {
            return;
        }
        if self.recorded_viewport.is_empty() {
            return;
        }

        // Analysed over the whole layer: pixels outside the recorded viewport have no content
        // yet, so a pile recorded only in part is never solid.
        let size = self.size();
        let mut canvas = AnalysisCanvas::new(size.width, size.height);
        picture.raster(&mut canvas, &Region::new(), 1.0);
        if let Some(color) = canvas.color_if_solid() {
            self.is_solid_color = true;
            self.solid_color = color;
        }
    }
}

impl RecordingSource for PicturePile {
    #[tracing::instrument(
        level = "debug",
        skip(self, painter, invalidation),
        fields(recordings = self.picture_map.len())
    )]
    fn update_and_expand_invalidation(
        &mut self,
        painter: &mut dyn ContentPainter,
        invalidation: &mut Region,
        layer_size: IntSize,
        visible_layer_rect: IntRect,
        frame_number: i32,
        recording_mode: RecordingMode,
    ) -> bool {
        let interest_rect = visible_layer_rect.outset(self.pixel_record_distance);
        self.recorded_viewport = interest_rect.intersection(IntRect::from_size(layer_size));

        let updated = self.apply_invalidation_and_resize(interest_rect, invalidation, layer_size);

        let invalid_tiles = self.invalid_tile_rects(interest_rect);
        let clusters = cluster_tiles(&invalid_tiles, self.cluster_density_threshold);
        if clusters.rects.is_empty() {
            return updated;
        }
        tracing::debug!(
            tiles = invalid_tiles.len(),
            clusters = clusters.rects.len(),
            density = clusters.density,
            "recording invalid tiles"
        );

        self.create_pictures(painter, recording_mode, &clusters.rects);
        self.determine_if_solid_color();
        self.has_any_recordings = true;
        debug_assert!(self.can_raster_slow_tile_check(self.recorded_viewport));
        true
    }

    fn create_raster_source(&self, can_use_lcd_text: bool) -> Arc<dyn RasterSource> {
        Arc::new(PicturePileImpl::from_pile(self, can_use_lcd_text))
    }

    fn size(&self) -> IntSize {
        self.tiling.tiling_size()
    }

    fn set_empty_bounds(&mut self) {
        self.tiling.set_tiling_size(IntSize::default());
        self.clear();
    }

    fn set_slow_down_raster_scale_factor(&mut self, factor: u32) {
        self.debug.slow_down_raster_scale_factor = factor;
    }

    fn set_gather_pixel_refs(&mut self, gather: bool) {
        self.gather_pixel_refs = gather;
    }

    fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    fn set_requires_clear(&mut self, requires_clear: bool) {
        self.requires_clear = requires_clear;
    }

    fn is_suitable_for_gpu_rasterization(&self) -> bool {
        self.gpu_rasterization.is_suitable()
    }

    fn set_unsuitable_for_gpu_rasterization(&mut self) {
        self.gpu_rasterization.veto("forced unsuitable");
    }
}

pub(crate) fn padded_tile_rect(tiling: &TilingData, (x, y): TileIndex) -> IntRect {
    tiling.tile_bounds(x, y).outset(tiling.border_texels())
}

pub(crate) fn can_raster_slow_tile_check(
    tiling: &TilingData,
    picture_map: &PictureMap,
    layer_rect: IntRect,
) -> bool {
    tiling
        .iter(layer_rect, false)
        .all(|key| picture_map.contains_key(&key))
}

/// Number of tiles a border-inclusive scan of `rect` visits.
fn border_tile_count(tiling: &TilingData, rect: IntRect) -> i64 {
    let rect = rect.intersection(IntRect::from_size(tiling.tiling_size()));
    if rect.is_empty() || tiling.has_empty_bounds() {
        return 0;
    }
    let left = tiling.first_border_tile_x_index_from_src_coord(rect.x);
    let top = tiling.first_border_tile_y_index_from_src_coord(rect.y);
    let right = tiling.last_border_tile_x_index_from_src_coord(rect.right() - 1);
    let bottom = tiling.last_border_tile_y_index_from_src_coord(rect.bottom() - 1);
    i64::from(right - left + 1) * i64::from(bottom - top + 1)
}

/// Union the parts of `strip` outside `keep` plus `exposed` into `region`.
fn union_strip_outside(region: &mut Region, strip: IntRect, keep: IntRect, exposed: IntRect) {
    let left_until = keep.x.min(strip.right());
    let right_until = keep.right().max(strip.x);
    let top_until = keep.y.min(strip.bottom());
    let bottom_until = keep.bottom().max(strip.y);

    region.union_rect(IntRect::from_bounds(
        strip.x,
        strip.y,
        left_until,
        strip.bottom(),
    ));
    region.union_rect(IntRect::from_bounds(
        right_until,
        strip.y,
        strip.right(),
        strip.bottom(),
    ));
    region.union_rect(IntRect::from_bounds(
        strip.x,
        strip.y,
        strip.right(),
        top_until,
    ));
    region.union_rect(IntRect::from_bounds(
        strip.x,
        bottom_until,
        strip.right(),
        strip.bottom(),
    ));
    region.union_rect(exposed);
}

#[cfg(test)]
#[path = "../../tests/unit/pile/picture_pile.rs"]
mod tests;
