pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Integer pixel position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel extent. Negative dimensions are clamped to zero on construction.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }
}

/// Integer rectangle with half-open bounds `[x, right) x [y, bottom)`.
///
/// Mirrors the usual compositor rect contract: widths and heights never go negative, an empty
/// rect intersects nothing, and `subtract` only shrinks the rect when the result is itself a
/// rectangle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn from_size(size: IntSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Build from edges; inverted edges produce an empty rect anchored at `(left, top)`.
    pub fn from_bounds(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    pub fn origin(self) -> IntPoint {
        IntPoint::new(self.x, self.y)
    }

    pub fn size(self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    pub fn contains_point(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains(self, other: IntRect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(self, other: IntRect) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || other.x >= self.right()
            || other.right() <= self.x
            || other.y >= self.bottom()
            || other.bottom() <= self.y)
    }

    pub fn intersect(&mut self, other: IntRect) {
        *self = self.intersection(other);
    }

    /// Overlap of the two rects, or the zero rect if they do not intersect.
    pub fn intersection(self, other: IntRect) -> IntRect {
        if self.is_empty() || other.is_empty() {
            return IntRect::default();
        }
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            return IntRect::default();
        }
        IntRect::from_bounds(left, top, right, bottom)
    }

    pub fn union(&mut self, other: IntRect) {
        *self = self.union_with(other);
    }

    /// Bounding box of both rects. Empty operands are ignored.
    pub fn union_with(self, other: IntRect) -> IntRect {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        IntRect::from_bounds(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Remove `other` from this rect if what remains is still a rectangle; otherwise leave the
    /// rect untouched.
    pub fn subtract(&mut self, other: IntRect) {
        if !self.intersects(other) {
            return;
        }
        if other.contains(*self) {
            *self = IntRect::default();
            return;
        }

        let mut left = self.x;
        let mut top = self.y;
        let mut right = self.right();
        let mut bottom = self.bottom();

        if other.y <= self.y && other.bottom() >= self.bottom() {
            if other.x <= self.x {
                left = other.right();
            } else if other.right() >= self.right() {
                right = other.x;
            }
        } else if other.x <= self.x && other.right() >= self.right() {
            if other.y <= self.y {
                top = other.bottom();
            } else if other.bottom() >= self.bottom() {
                bottom = other.y;
            }
        }
        *self = IntRect::from_bounds(left, top, right, bottom);
    }

    /// Grow (negative values) or shrink each edge independently.
    pub fn inset(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        *self = IntRect::new(
            self.x.saturating_add(left),
            self.y.saturating_add(top),
            self.width.saturating_sub(left).saturating_sub(right),
            self.height.saturating_sub(top).saturating_sub(bottom),
        );
    }

    /// Grow every edge outward by `amount`.
    pub fn outset(self, amount: i32) -> IntRect {
        let mut r = self;
        r.inset(-amount, -amount, -amount, -amount);
        r
    }

    pub fn offset(self, dx: i32, dy: i32) -> IntRect {
        IntRect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Pieces of `self` not covered by `other`, as up to four disjoint rects.
    pub(crate) fn difference(self, other: IntRect) -> impl Iterator<Item = IntRect> {
        let mut out: [Option<IntRect>; 4] = [None; 4];
        if !self.intersects(other) {
            if !self.is_empty() {
                out[0] = Some(self);
            }
            return out.into_iter().flatten();
        }

        let inner_top = self.y.max(other.y);
        let inner_bottom = self.bottom().min(other.bottom());
        let pieces = [
            IntRect::from_bounds(self.x, self.y, self.right(), inner_top),
            IntRect::from_bounds(self.x, inner_bottom, self.right(), self.bottom()),
            IntRect::from_bounds(self.x, inner_top, other.x.max(self.x), inner_bottom),
            IntRect::from_bounds(
                other.right().min(self.right()),
                inner_top,
                self.right(),
                inner_bottom,
            ),
        ];
        for (slot, piece) in out.iter_mut().zip(pieces) {
            if !piece.is_empty() {
                *slot = Some(piece);
            }
        }
        out.into_iter().flatten()
    }

    pub fn to_kurbo(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }

    /// Smallest integer rect containing `rect`.
    pub fn enclosing(rect: Rect) -> IntRect {
        Self::from_kurbo_edges(rect.expand())
    }

    /// Largest integer rect contained in `rect`.
    pub fn enclosed(rect: Rect) -> IntRect {
        Self::from_kurbo_edges(rect.trunc())
    }

    /// Integer rect with each edge rounded to the nearest pixel.
    pub fn rounded(rect: Rect) -> IntRect {
        Self::from_kurbo_edges(rect.round())
    }

    pub fn scale_to_enclosing(self, scale: f32) -> IntRect {
        Self::enclosing(self.to_kurbo().scale_from_origin(f64::from(scale)))
    }

    pub fn scale_to_enclosed(self, scale: f32) -> IntRect {
        Self::enclosed(self.to_kurbo().scale_from_origin(f64::from(scale)))
    }

    fn from_kurbo_edges(rect: Rect) -> IntRect {
        fn clamp_i32(v: f64) -> i32 {
            v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        }
        let rect = rect.abs();
        IntRect::from_bounds(
            clamp_i32(rect.x0),
            clamp_i32(rect.y0),
            clamp_i32(rect.x1),
            clamp_i32(rect.y1),
        )
    }
}

impl From<IntSize> for IntRect {
    fn from(size: IntSize) -> Self {
        IntRect::from_size(size)
    }
}

/// Unpremultiplied 8-bit RGBA color.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            crate::foundation::math::mul_div255_u8(u16::from(self.r), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.g), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
