use crate::foundation::core::IntRect;
use crate::tiling::data::{TileIndex, TilingData};
use crate::tiling::iter::DifferenceBounds;

/// Heading of the current spiral leg. The y axis points down, so `Up` decreases y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Up,
    Left,
    Down,
    Right,
}

/// Tile-index box around the center rect, each edge clamped to `[-1, num_tiles]`.
#[derive(Clone, Copy, Debug)]
struct AroundRect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl AroundRect {
    fn new(tiling: &TilingData, center: IntRect) -> Self {
        let size = tiling.tiling_size();
        let snap_x = |coord: i32| {
            if coord < 0 || center.is_empty() {
                -1
            } else if coord >= size.width {
                tiling.num_tiles_x()
            } else {
                tiling.tile_x_index_from_src_coord(coord)
            }
        };
        let snap_y = |coord: i32| {
            if coord < 0 || center.is_empty() {
                -1
            } else if coord >= size.height {
                tiling.num_tiles_y()
            } else {
                tiling.tile_y_index_from_src_coord(coord)
            }
        };
        Self {
            left: snap_x(center.x),
            top: snap_y(center.y),
            right: snap_x(center.right() - 1),
            bottom: snap_y(center.bottom() - 1),
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Walk cursor shared by both spiral directions.
#[derive(Clone, Debug)]
struct SpiralCursor {
    bounds: DifferenceBounds,
    direction: Direction,
    delta_x: i32,
    delta_y: i32,
    current_step: i32,
    horizontal_step_count: i32,
    vertical_step_count: i32,
    index_x: i32,
    index_y: i32,
    done: bool,
}

impl SpiralCursor {
    fn current_step_count(&self) -> i32 {
        match self.direction {
            Direction::Up | Direction::Down => self.vertical_step_count,
            Direction::Left | Direction::Right => self.horizontal_step_count,
        }
    }

    fn needs_direction_switch(&self) -> bool {
        self.current_step >= self.current_step_count()
    }

    fn step(&mut self, steps: i32) {
        debug_assert!(steps >= 0);
        self.index_x += steps * self.delta_x;
        self.index_y += steps * self.delta_y;
        self.current_step += steps;
    }

    fn in_consider(&self) -> bool {
        self.bounds.in_consider(self.index_x, self.index_y)
    }

    fn in_ignore(&self) -> bool {
        self.bounds.in_ignore(self.index_x, self.index_y)
    }

    /// Steps that keep the cursor inside the ignore box along the current heading.
    fn steps_to_ignore_edge(&self) -> i32 {
        let b = &self.bounds;
        match self.direction {
            Direction::Up => self.index_y - b.ignore_top,
            Direction::Left => self.index_x - b.ignore_left,
            Direction::Down => b.ignore_bottom - self.index_y,
            Direction::Right => b.ignore_right - self.index_x,
        }
    }

    fn skip_ignored_run(&mut self) {
        let max_steps = self.current_step_count() - self.current_step;
        self.step(self.steps_to_ignore_edge().min(max_steps));
    }

    /// Jump along the current leg to just before the consider box, or to the end of the leg if
    /// the leg never reaches it.
    fn skip_toward_consider(&mut self) {
        let b = self.bounds;
        let max_steps = self.current_step_count() - self.current_step;
        let mut steps = max_steps;
        match self.direction {
            Direction::Up => {
                if b.valid_column(self.index_x) && b.consider_bottom < self.index_y {
                    steps = self.index_y - b.consider_bottom - 1;
                }
            }
            Direction::Left => {
                if b.valid_row(self.index_y) && b.consider_right < self.index_x {
                    steps = self.index_x - b.consider_right - 1;
                }
            }
            Direction::Down => {
                if b.valid_column(self.index_x) && b.consider_top > self.index_y {
                    steps = b.consider_top - self.index_y - 1;
                }
            }
            Direction::Right => {
                if b.valid_row(self.index_y) && b.consider_left > self.index_x {
                    steps = b.consider_left - self.index_x - 1;
                }
            }
        }
        self.step(steps.min(max_steps));
    }

    fn index(&self) -> Option<TileIndex> {
        (!self.done).then_some((self.index_x, self.index_y))
    }
}

/// Outward spiral over tiles touching `consider` but not `ignore`, starting next to
/// the tiles under `center`.
///
/// ```text
///   4 3 2
///   5 C 1      C is the center tile; legs turn up, left, down, right
///   6 7 8      and grow by one every second turn
/// ```
#[derive(Clone, Debug)]
pub struct SpiralDifferenceIterator {
    cursor: SpiralCursor,
}

impl SpiralDifferenceIterator {
    pub(crate) fn new(
        tiling: &TilingData,
        consider: IntRect,
        ignore: IntRect,
        center: IntRect,
    ) -> Self {
        let bounds = DifferenceBounds::new(tiling, consider, ignore);
        let mut cursor = SpiralCursor {
            bounds,
            direction: Direction::Right,
            delta_x: 1,
            delta_y: 0,
            current_step: 0,
            horizontal_step_count: 0,
            vertical_step_count: 0,
            index_x: -1,
            index_y: -1,
            done: true,
        };
        if !bounds.has_consider_rect() {
            return Self { cursor };
        }

        let around = AroundRect::new(tiling, center);
        cursor.vertical_step_count = around.bottom - around.top + 1;
        cursor.horizontal_step_count = around.right - around.left + 1;
        cursor.current_step = cursor.horizontal_step_count - 1;
        cursor.index_x = around.right;
        cursor.index_y = around.bottom;
        cursor.done = false;

        // The start sits on the around rect itself, which is never yielded.
        let mut it = Self { cursor };
        it.advance();
        it
    }

    pub fn index(&self) -> Option<TileIndex> {
        self.cursor.index()
    }

    fn switch_direction(&mut self) {
        let c = &mut self.cursor;
        let new_delta_x = c.delta_y;
        c.delta_y = -c.delta_x;
        c.delta_x = new_delta_x;
        c.current_step = 0;
        c.direction = match c.direction {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        };
        if matches!(c.direction, Direction::Right | Direction::Left) {
            c.vertical_step_count += 1;
            c.horizontal_step_count += 1;
        }
    }

    fn advance(&mut self) {
        let mut cannot_hit_consider_count = 0;
        while cannot_hit_consider_count < 4 {
            if self.cursor.needs_direction_switch() {
                self.switch_direction();
            }
            self.cursor.step(1);

            if self.cursor.in_consider() {
                cannot_hit_consider_count = 0;
                if !self.cursor.in_ignore() {
                    break;
                }
                self.cursor.skip_ignored_run();
            } else {
                let c = &self.cursor;
                let b = &c.bounds;
                let can_hit_consider = match c.direction {
                    Direction::Up => b.consider_right >= c.index_x,
                    Direction::Left => b.consider_top <= c.index_y,
                    Direction::Down => b.consider_left <= c.index_x,
                    Direction::Right => b.consider_bottom >= c.index_y,
                };
                self.cursor.skip_toward_consider();
                if can_hit_consider {
                    cannot_hit_consider_count = 0;
                } else {
                    cannot_hit_consider_count += 1;
                }
            }
        }

        if cannot_hit_consider_count >= 4 {
            self.cursor.done = true;
        }
    }
}

impl Iterator for SpiralDifferenceIterator {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        let current = self.cursor.index()?;
        self.advance();
        Some(current)
    }
}

/// Inward spiral: the tiles of [`SpiralDifferenceIterator`] in reverse order.
///
/// The walk starts outside a ring large enough to cover `consider` and stops once it reaches
/// the tiles under `center`.
#[derive(Clone, Debug)]
pub struct ReverseSpiralDifferenceIterator {
    cursor: SpiralCursor,
    around: AroundRect,
}

impl ReverseSpiralDifferenceIterator {
    pub(crate) fn new(
        tiling: &TilingData,
        consider: IntRect,
        ignore: IntRect,
        center: IntRect,
    ) -> Self {
        let bounds = DifferenceBounds::new(tiling, consider, ignore);
        let mut cursor = SpiralCursor {
            bounds,
            direction: Direction::Left,
            delta_x: -1,
            delta_y: 0,
            current_step: 0,
            horizontal_step_count: 0,
            vertical_step_count: 0,
            index_x: -1,
            index_y: -1,
            done: true,
        };
        let mut around = AroundRect {
            left: -1,
            top: -1,
            right: -1,
            bottom: -1,
        };
        if !bounds.has_consider_rect() {
            return Self { cursor, around };
        }

        around = AroundRect::new(tiling, center);

        // Pad the around ring until it covers the consider box on every side.
        let max_distance = 0
            .max(around.top - bounds.consider_top)
            .max(around.left - bounds.consider_left)
            .max(bounds.consider_bottom - around.bottom)
            .max(bounds.consider_right - around.right);

        cursor.vertical_step_count = around.bottom - around.top + 1 + 2 * max_distance;
        cursor.horizontal_step_count = around.right - around.left + 1 + 2 * max_distance;
        cursor.index_x = around.right + max_distance + 1;
        cursor.index_y = around.bottom + max_distance;
        cursor.done = false;

        let mut it = Self { cursor, around };
        it.advance();
        it
    }

    pub fn index(&self) -> Option<TileIndex> {
        self.cursor.index()
    }

    fn in_around(&self) -> bool {
        self.around.contains(self.cursor.index_x, self.cursor.index_y)
    }

    fn switch_direction(&mut self) {
        let c = &mut self.cursor;
        let new_delta_y = c.delta_x;
        c.delta_x = -c.delta_y;
        c.delta_y = new_delta_y;
        c.current_step = 0;
        c.direction = match c.direction {
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
        };
        if matches!(c.direction, Direction::Up | Direction::Down) {
            c.vertical_step_count -= 1;
            c.horizontal_step_count -= 1;
            debug_assert!(c.horizontal_step_count >= 1 && c.vertical_step_count >= 1);
        }
    }

    fn advance(&mut self) {
        while !self.in_around() {
            if self.cursor.needs_direction_switch() {
                self.switch_direction();
            }
            self.cursor.step(1);

            if self.in_around() {
                break;
            }
            if self.cursor.in_consider() {
                if !self.cursor.in_ignore() {
                    break;
                }
                self.cursor.skip_ignored_run();
            } else {
                self.cursor.skip_toward_consider();
            }
        }

        if self.in_around() {
            self.cursor.done = true;
        }
    }
}

impl Iterator for ReverseSpiralDifferenceIterator {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        let current = self.cursor.index()?;
        self.advance();
        Some(current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiling/spiral.rs"]
mod tests;
