use crate::core::bounds::Bounds;

/// Rectangles waiting to be redrawn.
///
/// A rectangle already covered by a pending one is dropped, and pending
/// rectangles covered by a new one are replaced. Disjoint or partially
/// overlapping rectangles are kept apart, so a later redraw never grows past
/// what was invalidated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyRegion {
    rects: Vec<Bounds>,
}

impl DirtyRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `rect`; returns `false` when it was empty or already covered
    pub fn add(&mut self, rect: Bounds) -> bool {
        if rect.is_empty() || self.rects.iter().any(|pending| pending.contains_bounds(&rect)) {
            return false;
        }

        self.rects.retain(|pending| !rect.contains_bounds(pending));
        self.rects.push(rect);
        true
    }

    /// Take every pending rectangle, oldest first
    pub fn take(&mut self) -> Vec<Bounds> {
        std::mem::take(&mut self.rects)
    }

    pub fn rects(&self) -> &[Bounds] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Total pending area, counting overlaps once per rectangle
    pub fn area(&self) -> f64 {
        self.rects.iter().map(Bounds::area).sum()
    }

    /// Whether `rect` lies inside one of the pending rectangles
    pub fn covers(&self, rect: &Bounds) -> bool {
        self.rects.iter().any(|pending| pending.contains_bounds(rect))
    }
}
