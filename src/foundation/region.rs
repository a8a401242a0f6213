use crate::foundation::core::IntRect;
use smallvec::SmallVec;

/// A set of pixels described by disjoint integer rects.
///
/// The decomposition is not canonical; equality compares the covered pixel sets.
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: SmallVec<[IntRect; 4]>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: IntRect) -> Self {
        let mut region = Self::new();
        if !rect.is_empty() {
            region.rects.push(rect);
        }
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Disjoint rects making up the region, in no particular order.
    pub fn rects(&self) -> impl Iterator<Item = IntRect> + '_ {
        self.rects.iter().copied()
    }

    pub fn rect_count(&self) -> usize {
        self.rects.len()
    }

    pub fn bounds(&self) -> IntRect {
        self.rects
            .iter()
            .fold(IntRect::default(), |acc, r| acc.union_with(*r))
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    pub fn union_rect(&mut self, rect: IntRect) {
        if rect.is_empty() {
            return;
        }
        if self.rects.iter().any(|r| r.contains(rect)) {
            return;
        }
        let mut pieces: SmallVec<[IntRect; 4]> = SmallVec::new();
        pieces.push(rect);
        for existing in &self.rects {
            if pieces.is_empty() {
                break;
            }
            let mut next: SmallVec<[IntRect; 4]> = SmallVec::new();
            for piece in pieces {
                next.extend(piece.difference(*existing));
            }
            pieces = next;
        }
        self.rects.extend(pieces);
        self.coalesce();
    }

    pub fn union(&mut self, other: &Region) {
        for rect in other.rects() {
            self.union_rect(rect);
        }
    }

    pub fn subtract_rect(&mut self, rect: IntRect) {
        if rect.is_empty() || !self.intersects_rect(rect) {
            return;
        }
        let mut out: SmallVec<[IntRect; 4]> = SmallVec::new();
        for existing in &self.rects {
            out.extend(existing.difference(rect));
        }
        self.rects = out;
        self.coalesce();
    }

    pub fn subtract(&mut self, other: &Region) {
        for rect in other.rects() {
            if self.is_empty() {
                return;
            }
            self.subtract_rect(rect);
        }
    }

    pub fn intersect_rect(&mut self, rect: IntRect) {
        self.rects = self
            .rects
            .iter()
            .map(|r| r.intersection(rect))
            .filter(|r| !r.is_empty())
            .collect();
    }

    pub fn intersect(&mut self, other: &Region) {
        let mut out: SmallVec<[IntRect; 4]> = SmallVec::new();
        for a in &self.rects {
            for b in &other.rects {
                let piece = a.intersection(*b);
                if !piece.is_empty() {
                    out.push(piece);
                }
            }
        }
        self.rects = out;
        self.coalesce();
    }

    /// True if every pixel of a non-empty `rect` is in the region. Empty rects are never
    /// contained.
    pub fn contains_rect(&self, rect: IntRect) -> bool {
        if rect.is_empty() || self.is_empty() {
            return false;
        }
        if self.rects.iter().any(|r| r.contains(rect)) {
            return true;
        }
        let mut remainder = Region::from_rect(rect);
        for r in &self.rects {
            remainder.subtract_rect(*r);
            if remainder.is_empty() {
                return true;
            }
        }
        false
    }

    pub fn contains(&self, other: &Region) -> bool {
        !other.is_empty() && other.rects().all(|r| self.contains_rect(r))
    }

    pub fn intersects_rect(&self, rect: IntRect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    pub fn intersects(&self, other: &Region) -> bool {
        other.rects().any(|r| self.intersects_rect(r))
    }

    /// Merge neighbours that share a full edge so repeated unions do not fragment without bound.
    fn coalesce(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.rects.len() {
                for j in (i + 1)..self.rects.len() {
                    let a = self.rects[i];
                    let b = self.rects[j];
                    let same_columns = a.x == b.x && a.width == b.width;
                    let same_rows = a.y == b.y && a.height == b.height;
                    let stacked = same_columns && (a.bottom() == b.y || b.bottom() == a.y);
                    let side_by_side = same_rows && (a.right() == b.x || b.right() == a.x);
                    if stacked || side_by_side {
                        self.rects[i] = a.union_with(b);
                        self.rects.swap_remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }
}

impl From<IntRect> for Region {
    fn from(rect: IntRect) -> Self {
        Region::from_rect(rect)
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        if self.area() != other.area() {
            return false;
        }
        let mut a = self.clone();
        a.subtract(other);
        a.is_empty()
    }
}

impl Eq for Region {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/region.rs"]
mod tests;
