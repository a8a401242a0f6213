use crate::foundation::core::{IntRect, IntSize, Vec2};
use crate::tiling::iter::{DifferenceIterator, TileIterator};
use crate::tiling::spiral::{ReverseSpiralDifferenceIterator, SpiralDifferenceIterator};

/// `(x, y)` index of a tile in a [`TilingData`] grid.
pub type TileIndex = (i32, i32);

fn compute_num_tiles(max_texture_size: i32, total_size: i32, border_texels: i32) -> i32 {
    let inner = max_texture_size - 2 * border_texels;
    if inner <= 0 {
        // A border that eats the whole tile only works when one tile covers everything.
        return if total_size > 0 && max_texture_size >= total_size {
            1
        } else {
            0
        };
    }
    if total_size <= 0 {
        return 0;
    }
    (1 + (total_size - 1 - 2 * border_texels) / inner).max(1)
}

/// Maps a 2-D pixel extent onto a grid of overlapping fixed-size tiles.
///
/// Each tile's footprint, including `border_texels` of overlap with its neighbours, is at most
/// `max_texture_size`. Borders only exist at interior seams; the outer edge of the tiling is never
/// padded by [`TilingData::tile_bounds`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TilingData {
    max_texture_size: IntSize,
    tiling_size: IntSize,
    border_texels: i32,
    num_tiles_x: i32,
    num_tiles_y: i32,
}

impl TilingData {
    pub fn new(max_texture_size: IntSize, tiling_size: IntSize, border_texels: i32) -> Self {
        debug_assert!(border_texels >= 0);
        let mut data = Self {
            max_texture_size,
            tiling_size,
            border_texels,
            num_tiles_x: 0,
            num_tiles_y: 0,
        };
        data.recompute_num_tiles();
        data
    }

    pub fn with_border(
        max_texture_size: IntSize,
        tiling_size: IntSize,
        has_border_texels: bool,
    ) -> Self {
        Self::new(max_texture_size, tiling_size, i32::from(has_border_texels))
    }

    pub fn tiling_size(&self) -> IntSize {
        self.tiling_size
    }

    pub fn max_texture_size(&self) -> IntSize {
        self.max_texture_size
    }

    pub fn border_texels(&self) -> i32 {
        self.border_texels
    }

    pub fn num_tiles_x(&self) -> i32 {
        self.num_tiles_x
    }

    pub fn num_tiles_y(&self) -> i32 {
        self.num_tiles_y
    }

    pub fn has_empty_bounds(&self) -> bool {
        self.num_tiles_x <= 0 || self.num_tiles_y <= 0
    }

    pub fn set_tiling_size(&mut self, tiling_size: IntSize) {
        self.tiling_size = tiling_size;
        self.recompute_num_tiles();
    }

    pub fn set_max_texture_size(&mut self, max_texture_size: IntSize) {
        self.max_texture_size = max_texture_size;
        self.recompute_num_tiles();
    }

    pub fn set_has_border_texels(&mut self, has_border_texels: bool) {
        self.set_border_texels(i32::from(has_border_texels));
    }

    pub fn set_border_texels(&mut self, border_texels: i32) {
        debug_assert!(border_texels >= 0);
        self.border_texels = border_texels;
        self.recompute_num_tiles();
    }

    fn recompute_num_tiles(&mut self) {
        self.num_tiles_x = compute_num_tiles(
            self.max_texture_size.width,
            self.tiling_size.width,
            self.border_texels,
        );
        self.num_tiles_y = compute_num_tiles(
            self.max_texture_size.height,
            self.tiling_size.height,
            self.border_texels,
        );
    }

    fn inner_size_x(&self) -> i32 {
        self.max_texture_size.width - 2 * self.border_texels
    }

    fn inner_size_y(&self) -> i32 {
        self.max_texture_size.height - 2 * self.border_texels
    }

    fn assert_tile(&self, i: i32, j: i32) {
        debug_assert!(
            (0..self.num_tiles_x).contains(&i) && (0..self.num_tiles_y).contains(&j),
            "tile ({i}, {j}) outside {}x{} grid",
            self.num_tiles_x,
            self.num_tiles_y
        );
    }

    /// Tile whose border-excluded span contains `src_position`, clamped to the grid.
    pub fn tile_x_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_x <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_x() > 0);
        let x = (src_position - self.border_texels).div_euclid(self.inner_size_x());
        x.clamp(0, self.num_tiles_x - 1)
    }

    pub fn tile_y_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_y <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_y() > 0);
        let y = (src_position - self.border_texels).div_euclid(self.inner_size_y());
        y.clamp(0, self.num_tiles_y - 1)
    }

    /// Lowest tile whose border-inclusive span contains `src_position`.
    pub fn first_border_tile_x_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_x <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_x() > 0);
        let x = (src_position - 2 * self.border_texels).div_euclid(self.inner_size_x());
        x.clamp(0, self.num_tiles_x - 1)
    }

    pub fn first_border_tile_y_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_y <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_y() > 0);
        let y = (src_position - 2 * self.border_texels).div_euclid(self.inner_size_y());
        y.clamp(0, self.num_tiles_y - 1)
    }

    /// Highest tile whose border-inclusive span contains `src_position`.
    pub fn last_border_tile_x_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_x <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_x() > 0);
        let x = src_position.div_euclid(self.inner_size_x());
        x.clamp(0, self.num_tiles_x - 1)
    }

    pub fn last_border_tile_y_index_from_src_coord(&self, src_position: i32) -> i32 {
        if self.num_tiles_y <= 1 {
            return 0;
        }
        debug_assert!(self.inner_size_y() > 0);
        let y = src_position.div_euclid(self.inner_size_y());
        y.clamp(0, self.num_tiles_y - 1)
    }

    /// Union of the border-excluded bounds of the tiles under `rect`'s corners.
    pub fn expand_rect_ignoring_borders_to_tile_bounds(&self, rect: IntRect) -> IntRect {
        if rect.is_empty() || self.has_empty_bounds() {
            return IntRect::default();
        }
        if rect.x > self.tiling_size.width || rect.y > self.tiling_size.height {
            return IntRect::default();
        }
        let index_x = self.tile_x_index_from_src_coord(rect.x);
        let index_y = self.tile_y_index_from_src_coord(rect.y);
        let index_right = self.tile_x_index_from_src_coord(rect.right() - 1);
        let index_bottom = self.tile_y_index_from_src_coord(rect.bottom() - 1);
        self.tile_bounds(index_x, index_y)
            .union_with(self.tile_bounds(index_right, index_bottom))
    }

    /// Like [`Self::expand_rect_ignoring_borders_to_tile_bounds`] but a rect touching a border
    /// texel also pulls in the neighbouring tile.
    pub fn expand_rect_to_tile_bounds(&self, rect: IntRect) -> IntRect {
        if rect.is_empty() || self.has_empty_bounds() {
            return IntRect::default();
        }
        if rect.x > self.tiling_size.width || rect.y > self.tiling_size.height {
            return IntRect::default();
        }
        let index_x = self.first_border_tile_x_index_from_src_coord(rect.x);
        let index_y = self.first_border_tile_y_index_from_src_coord(rect.y);
        let index_right = self.last_border_tile_x_index_from_src_coord(rect.right() - 1);
        let index_bottom = self.last_border_tile_y_index_from_src_coord(rect.bottom() - 1);
        self.tile_bounds(index_x, index_y)
            .union_with(self.tile_bounds(index_right, index_bottom))
    }

    /// Border-excluded tile rect. Tiles partition `tiling_size` exactly.
    pub fn tile_bounds(&self, i: i32, j: i32) -> IntRect {
        self.assert_tile(i, j);
        let inner_x = self.inner_size_x();
        let inner_y = self.inner_size_y();

        let mut lo_x = inner_x * i;
        if i != 0 {
            lo_x += self.border_texels;
        }
        let mut lo_y = inner_y * j;
        if j != 0 {
            lo_y += self.border_texels;
        }

        let mut hi_x = inner_x * (i + 1) + self.border_texels;
        if i + 1 == self.num_tiles_x {
            hi_x += self.border_texels;
        }
        let mut hi_y = inner_y * (j + 1) + self.border_texels;
        if j + 1 == self.num_tiles_y {
            hi_y += self.border_texels;
        }

        hi_x = hi_x.min(self.tiling_size.width);
        hi_y = hi_y.min(self.tiling_size.height);
        IntRect::from_bounds(lo_x, lo_y, hi_x, hi_y)
    }

    /// Tile rect including its border texels, clipped to the tiling.
    pub fn tile_bounds_with_border(&self, i: i32, j: i32) -> IntRect {
        self.assert_tile(i, j);
        let x1 = self.inner_size_x() * i;
        let y1 = self.inner_size_y() * j;
        let x2 = (x1 + self.max_texture_size.width).min(self.tiling_size.width);
        let y2 = (y1 + self.max_texture_size.height).min(self.tiling_size.height);
        IntRect::from_bounds(x1, y1, x2, y2)
    }

    pub fn tile_position_x(&self, x_index: i32) -> i32 {
        debug_assert!((0..self.num_tiles_x).contains(&x_index));
        let mut pos = self.inner_size_x() * x_index;
        if x_index != 0 {
            pos += self.border_texels;
        }
        pos
    }

    pub fn tile_position_y(&self, y_index: i32) -> i32 {
        debug_assert!((0..self.num_tiles_y).contains(&y_index));
        let mut pos = self.inner_size_y() * y_index;
        if y_index != 0 {
            pos += self.border_texels;
        }
        pos
    }

    pub fn tile_size_x(&self, x_index: i32) -> i32 {
        debug_assert!((0..self.num_tiles_x).contains(&x_index));
        if x_index == 0 && self.num_tiles_x == 1 {
            return self.tiling_size.width;
        }
        if x_index == 0 {
            return self.max_texture_size.width - self.border_texels;
        }
        if x_index < self.num_tiles_x - 1 {
            return self.inner_size_x();
        }
        self.tiling_size.width - self.tile_position_x(x_index)
    }

    pub fn tile_size_y(&self, y_index: i32) -> i32 {
        debug_assert!((0..self.num_tiles_y).contains(&y_index));
        if y_index == 0 && self.num_tiles_y == 1 {
            return self.tiling_size.height;
        }
        if y_index == 0 {
            return self.max_texture_size.height - self.border_texels;
        }
        if y_index < self.num_tiles_y - 1 {
            return self.inner_size_y();
        }
        self.tiling_size.height - self.tile_position_y(y_index)
    }

    /// Offset of the border-excluded content inside the tile's texture.
    pub fn texture_offset(&self, x_index: i32, y_index: i32) -> Vec2 {
        let left = if x_index == 0 || self.num_tiles_x == 1 {
            0
        } else {
            self.border_texels
        };
        let top = if y_index == 0 || self.num_tiles_y == 1 {
            0
        } else {
            self.border_texels
        };
        Vec2::new(f64::from(left), f64::from(top))
    }

    /// Row-major scan of tiles touching `consider`.
    pub fn iter(&self, consider: IntRect, include_borders: bool) -> TileIterator {
        TileIterator::new(self, consider, include_borders)
    }

    /// Row-major scan of tiles touching `consider` but not `ignore`.
    pub fn difference_iter(&self, consider: IntRect, ignore: IntRect) -> DifferenceIterator {
        DifferenceIterator::new(self, consider, ignore)
    }

    /// Outward spiral around `center` over tiles touching `consider` but not `ignore`.
    pub fn spiral_iter(
        &self,
        consider: IntRect,
        ignore: IntRect,
        center: IntRect,
    ) -> SpiralDifferenceIterator {
        SpiralDifferenceIterator::new(self, consider, ignore, center)
    }

    /// Inward spiral toward `center`; visits exactly the tiles of
    /// [`Self::spiral_iter`] in reverse order.
    pub fn reverse_spiral_iter(
        &self,
        consider: IntRect,
        ignore: IntRect,
        center: IntRect,
    ) -> ReverseSpiralDifferenceIterator {
        ReverseSpiralDifferenceIterator::new(self, consider, ignore, center)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiling/data.rs"]
mod tests;
