use crate::foundation::core::IntRect;
use crate::tiling::data::{TileIndex, TilingData};

/// Row-major scan over every tile touching a rect.
#[derive(Clone, Debug)]
pub struct TileIterator {
    index_x: i32,
    index_y: i32,
    left: i32,
    right: i32,
    bottom: i32,
}

impl TileIterator {
    pub(crate) fn new(tiling: &TilingData, consider: IntRect, include_borders: bool) -> Self {
        let mut it = Self {
            index_x: -1,
            index_y: -1,
            left: -1,
            right: -1,
            bottom: -1,
        };
        if tiling.has_empty_bounds() {
            return it;
        }

        let consider = consider.intersection(IntRect::from_size(tiling.tiling_size()));
        if consider.is_empty() {
            return it;
        }

        if include_borders {
            it.index_x = tiling.first_border_tile_x_index_from_src_coord(consider.x);
            it.index_y = tiling.first_border_tile_y_index_from_src_coord(consider.y);
            it.right = tiling.last_border_tile_x_index_from_src_coord(consider.right() - 1);
            it.bottom = tiling.last_border_tile_y_index_from_src_coord(consider.bottom() - 1);
        } else {
            it.index_x = tiling.tile_x_index_from_src_coord(consider.x);
            it.index_y = tiling.tile_y_index_from_src_coord(consider.y);
            it.right = tiling.tile_x_index_from_src_coord(consider.right() - 1);
            it.bottom = tiling.tile_y_index_from_src_coord(consider.bottom() - 1);
        }
        it.left = it.index_x;

        // Index lookups clamp, so a rect past the last tile still needs an explicit check.
        let first = if include_borders {
            tiling.tile_bounds_with_border(it.index_x, it.index_y)
        } else {
            tiling.tile_bounds(it.index_x, it.index_y)
        };
        if !first.intersects(consider) {
            it.finish();
        }
        it
    }

    /// Tile the next call to [`Iterator::next`] yields.
    pub fn index(&self) -> Option<TileIndex> {
        (!self.is_done()).then_some((self.index_x, self.index_y))
    }

    fn is_done(&self) -> bool {
        self.index_x == -1 || self.index_y == -1
    }

    fn finish(&mut self) {
        self.index_x = -1;
        self.index_y = -1;
    }

    fn advance(&mut self) {
        self.index_x += 1;
        if self.index_x > self.right {
            self.index_x = self.left;
            self.index_y += 1;
            if self.index_y > self.bottom {
                self.finish();
            }
        }
    }
}

impl Iterator for TileIterator {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        let current = self.index()?;
        self.advance();
        Some(current)
    }
}

/// Consider/ignore tile-index boxes shared by the difference iterators.
///
/// Both boxes use border-excluded membership. `-1` everywhere means "nothing to visit".
#[derive(Clone, Copy, Debug)]
pub(crate) struct DifferenceBounds {
    pub(crate) consider_left: i32,
    pub(crate) consider_top: i32,
    pub(crate) consider_right: i32,
    pub(crate) consider_bottom: i32,
    pub(crate) ignore_left: i32,
    pub(crate) ignore_top: i32,
    pub(crate) ignore_right: i32,
    pub(crate) ignore_bottom: i32,
}

impl DifferenceBounds {
    pub(crate) fn new(tiling: &TilingData, consider: IntRect, ignore: IntRect) -> Self {
        let mut b = Self {
            consider_left: -1,
            consider_top: -1,
            consider_right: -1,
            consider_bottom: -1,
            ignore_left: -1,
            ignore_top: -1,
            ignore_right: -1,
            ignore_bottom: -1,
        };
        if tiling.has_empty_bounds() {
            return b;
        }

        let tiling_bounds = IntRect::from_size(tiling.tiling_size());
        let consider = consider.intersection(tiling_bounds);
        let ignore = ignore.intersection(tiling_bounds);
        if consider.is_empty() {
            return b;
        }

        b.consider_left = tiling.tile_x_index_from_src_coord(consider.x);
        b.consider_top = tiling.tile_y_index_from_src_coord(consider.y);
        b.consider_right = tiling.tile_x_index_from_src_coord(consider.right() - 1);
        b.consider_bottom = tiling.tile_y_index_from_src_coord(consider.bottom() - 1);

        if !ignore.is_empty() {
            b.ignore_left = tiling
                .tile_x_index_from_src_coord(ignore.x)
                .max(b.consider_left);
            b.ignore_top = tiling
                .tile_y_index_from_src_coord(ignore.y)
                .max(b.consider_top);
            b.ignore_right = tiling
                .tile_x_index_from_src_coord(ignore.right() - 1)
                .min(b.consider_right);
            b.ignore_bottom = tiling
                .tile_y_index_from_src_coord(ignore.bottom() - 1)
                .min(b.consider_bottom);
        }

        if b.ignore_left == b.consider_left
            && b.ignore_right == b.consider_right
            && b.ignore_top == b.consider_top
            && b.ignore_bottom == b.consider_bottom
        {
            b.consider_left = -1;
            b.consider_top = -1;
            b.consider_right = -1;
            b.consider_bottom = -1;
        }
        b
    }

    pub(crate) fn has_consider_rect(&self) -> bool {
        self.consider_left != -1
    }

    pub(crate) fn in_consider(&self, x: i32, y: i32) -> bool {
        x >= self.consider_left
            && x <= self.consider_right
            && y >= self.consider_top
            && y <= self.consider_bottom
    }

    pub(crate) fn in_ignore(&self, x: i32, y: i32) -> bool {
        x >= self.ignore_left
            && x <= self.ignore_right
            && y >= self.ignore_top
            && y <= self.ignore_bottom
    }

    pub(crate) fn valid_column(&self, x: i32) -> bool {
        x >= self.consider_left && x <= self.consider_right
    }

    pub(crate) fn valid_row(&self, y: i32) -> bool {
        y >= self.consider_top && y <= self.consider_bottom
    }
}

/// Row-major scan over tiles touching `consider` but not `ignore`.
///
/// Runs of ignored tiles are jumped over rather than stepped through, so a huge ignore rect
/// costs nothing.
#[derive(Clone, Debug)]
pub struct DifferenceIterator {
    bounds: DifferenceBounds,
    index_x: i32,
    index_y: i32,
}

impl DifferenceIterator {
    pub(crate) fn new(tiling: &TilingData, consider: IntRect, ignore: IntRect) -> Self {
        let bounds = DifferenceBounds::new(tiling, consider, ignore);
        let mut it = Self {
            bounds,
            index_x: -1,
            index_y: -1,
        };
        if !bounds.has_consider_rect() {
            return it;
        }
        it.index_x = bounds.consider_left;
        it.index_y = bounds.consider_top;
        if bounds.in_ignore(it.index_x, it.index_y) {
            it.advance();
        }
        it
    }

    pub fn index(&self) -> Option<TileIndex> {
        (self.index_x != -1 && self.index_y != -1).then_some((self.index_x, self.index_y))
    }

    fn advance(&mut self) {
        let b = self.bounds;
        self.index_x += 1;
        if b.in_ignore(self.index_x, self.index_y) {
            self.index_x = b.ignore_right + 1;
        }
        if self.index_x > b.consider_right {
            self.index_x = b.consider_left;
            self.index_y += 1;
            if b.in_ignore(self.index_x, self.index_y) {
                self.index_x = b.ignore_right + 1;
                // Ignore box spans the full row.
                if self.index_x > b.consider_right {
                    self.index_y = b.ignore_bottom + 1;
                    self.index_x = b.consider_left;
                }
            }
            if self.index_y > b.consider_bottom {
                self.index_x = -1;
                self.index_y = -1;
            }
        }
    }
}

impl Iterator for DifferenceIterator {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        let current = self.index()?;
        self.advance();
        Some(current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiling/iter.rs"]
mod tests;
