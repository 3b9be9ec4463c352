//! Scroll surfaces — which region owns vertical scrolling under a point.
//!
//! The gesture controller never walks a widget tree.  Instead the host
//! registers every scrollable (or clipping) region with its bounds and
//! parent, and the controller asks the [`ScrollHost`] which regions enclose
//! the touch point.  Regions live in a flat arena like the rest of the
//! core data structures and reference each other by index.

use super::error::SurfaceError;

/// Index into a [`ScrollRegions`] arena.
pub type SurfaceId = usize;

// ───────────────────────────────────────── geometry ──────────

/// A position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical pixels.  Right/bottom edges are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

// ───────────────────────────────────────── policies ──────────

/// Overflow policy of a region, mirroring the CSS-style vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    /// Whether this policy lets the user scroll the region at all.
    pub fn permits_scroll(self) -> bool {
        matches!(self, Overflow::Scroll | Overflow::Auto)
    }
}

/// What happens when a scroll reaches the edge of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverscrollBehavior {
    /// Chain to the parent / let the platform bounce.
    #[default]
    Auto,
    /// Stop at the edge; no chaining, no native bounce.
    Contain,
}

// ───────────────────────────────────────── host trait ────────

/// What the gesture controller needs from the surface it is attached to.
pub trait ScrollHost {
    /// `true` if the surface permits vertical scrolling and its content is
    /// taller than its viewport.
    fn can_scroll_vertically(&self, id: SurfaceId) -> bool;

    /// Current vertical scroll offset, `None` if the surface is gone.
    fn vertical_scroll_offset(&self, id: SurfaceId) -> Option<f64>;

    /// Surfaces enclosing `point`, innermost first.
    fn enclosing_surfaces(&self, point: Point) -> Vec<SurfaceId>;

    fn contains_surface(&self, id: SurfaceId) -> bool;

    fn overscroll(&self, id: SurfaceId) -> Option<OverscrollBehavior>;

    /// Returns the previous behaviour, `None` if the surface is unknown.
    fn set_overscroll(
        &mut self,
        id: SurfaceId,
        behavior: OverscrollBehavior,
    ) -> Option<OverscrollBehavior>;
}

// ───────────────────────────────────────── registry ──────────

/// A single registered region.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRegion {
    /// Caller-chosen label, handy for logs and for mapping back to panes.
    pub name: String,
    pub bounds: Bounds,
    pub parent: Option<SurfaceId>,
    pub overflow: Overflow,
    pub overscroll: OverscrollBehavior,
    /// Total content height in logical pixels.
    pub content_height: f64,
    /// Visible height in logical pixels.
    pub viewport_height: f64,
    /// Vertical scroll offset (0 = at top).
    pub offset: f64,
}

impl ScrollRegion {
    pub fn new(name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            parent: None,
            overflow: Overflow::Visible,
            overscroll: OverscrollBehavior::Auto,
            content_height: bounds.height,
            viewport_height: bounds.height,
            offset: 0.0,
        }
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn content_height(mut self, height: f64) -> Self {
        self.content_height = height;
        self
    }
}

/// Arena of scroll regions.
///
/// Region ids are stable for the lifetime of the registry; hosts that
/// re-layout update regions in place via [`ScrollRegions::get_mut`].
#[derive(Debug, Clone, Default)]
pub struct ScrollRegions {
    /// Parents always precede their children, so the chain is acyclic.
    regions: Vec<ScrollRegion>,
}

impl ScrollRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level region and return its id.
    pub fn add_root(&mut self, region: ScrollRegion) -> SurfaceId {
        let id = self.regions.len();
        tracing::trace!(id, name = %region.name, "root region registered");
        self.regions.push(ScrollRegion {
            parent: None,
            ..region
        });
        id
    }

    /// Register `region` nested inside `parent` and return its id.  The
    /// parent must already be registered.
    pub fn add_child(
        &mut self,
        parent: SurfaceId,
        region: ScrollRegion,
    ) -> Result<SurfaceId, SurfaceError> {
        if parent >= self.regions.len() {
            return Err(SurfaceError::Unknown(parent));
        }
        let id = self.regions.len();
        tracing::trace!(id, parent, name = %region.name, "region registered");
        self.regions.push(ScrollRegion {
            parent: Some(parent),
            ..region
        });
        Ok(id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&ScrollRegion> {
        self.regions.get(id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut ScrollRegion> {
        self.regions.get_mut(id)
    }

    /// Depth of a region in the parent chain (root = 0).
    fn depth(&self, mut id: SurfaceId) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.regions.get(id).and_then(|r| r.parent) {
            depth += 1;
            id = parent;
        }
        depth
    }

    /// Innermost region whose bounds contain `point`.  Ties on depth go to
    /// the region registered last (drawn on top).
    fn innermost_at(&self, point: Point) -> Option<SurfaceId> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.bounds.contains(point))
            .max_by_key(|(id, _)| (self.depth(*id), *id))
            .map(|(id, _)| id)
    }
}

impl ScrollHost for ScrollRegions {
    fn can_scroll_vertically(&self, id: SurfaceId) -> bool {
        self.regions
            .get(id)
            .is_some_and(|r| r.overflow.permits_scroll() && r.content_height > r.viewport_height)
    }

    fn vertical_scroll_offset(&self, id: SurfaceId) -> Option<f64> {
        self.regions.get(id).map(|r| r.offset)
    }

    fn enclosing_surfaces(&self, point: Point) -> Vec<SurfaceId> {
        let mut chain = Vec::new();
        let mut current = self.innermost_at(point);
        while let Some(id) = current {
            chain.push(id);
            current = self.regions.get(id).and_then(|r| r.parent);
        }
        chain
    }

    fn contains_surface(&self, id: SurfaceId) -> bool {
        id < self.regions.len()
    }

    fn overscroll(&self, id: SurfaceId) -> Option<OverscrollBehavior> {
        self.regions.get(id).map(|r| r.overscroll)
    }

    fn set_overscroll(
        &mut self,
        id: SurfaceId,
        behavior: OverscrollBehavior,
    ) -> Option<OverscrollBehavior> {
        let region = self.regions.get_mut(id)?;
        Some(std::mem::replace(&mut region.overscroll, behavior))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root wrapper (not scrollable) with two side-by-side scrolling lists.
    fn two_panes() -> (ScrollRegions, SurfaceId, SurfaceId, SurfaceId) {
        let mut regions = ScrollRegions::new();
        let root = regions.add_root(ScrollRegion::new("root", Bounds::new(0.0, 0.0, 200.0, 400.0)));
        let left = regions.add_child(
            root,
            ScrollRegion::new("left", Bounds::new(0.0, 0.0, 100.0, 400.0))
                .overflow(Overflow::Auto)
                .content_height(1000.0),
        )
        .unwrap();
        let right = regions.add_child(
            root,
            ScrollRegion::new("right", Bounds::new(100.0, 0.0, 100.0, 400.0))
                .overflow(Overflow::Auto)
                .content_height(100.0),
        )
        .unwrap();
        (regions, root, left, right)
    }

    #[test]
    fn enclosing_chain_is_innermost_first() {
        let (regions, root, left, _) = two_panes();
        assert_eq!(regions.enclosing_surfaces(Point::new(10.0, 10.0)), vec![left, root]);
    }

    #[test]
    fn point_outside_everything_has_no_chain() {
        let (regions, ..) = two_panes();
        assert!(regions.enclosing_surfaces(Point::new(500.0, 10.0)).is_empty());
    }

    #[test]
    fn scroll_capability_needs_policy_and_overflowing_content() {
        let (mut regions, root, left, right) = two_panes();
        assert!(regions.can_scroll_vertically(left));
        // Content fits in the viewport.
        assert!(!regions.can_scroll_vertically(right));
        // Root never permits scrolling.
        assert!(!regions.can_scroll_vertically(root));

        regions.get_mut(left).unwrap().overflow = Overflow::Hidden;
        assert!(!regions.can_scroll_vertically(left));
    }

    #[test]
    fn set_overscroll_returns_previous() {
        let (mut regions, root, ..) = two_panes();
        assert_eq!(
            regions.set_overscroll(root, OverscrollBehavior::Contain),
            Some(OverscrollBehavior::Auto)
        );
        assert_eq!(regions.overscroll(root), Some(OverscrollBehavior::Contain));
        assert_eq!(regions.set_overscroll(42, OverscrollBehavior::Contain), None);
    }

    #[test]
    fn bounds_exclude_far_edges() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(!b.contains(Point::new(10.0, 5.0)));
        assert!(!b.contains(Point::new(5.0, 10.0)));
    }

    #[test]
    fn child_of_unregistered_parent_is_rejected() {
        let mut regions = ScrollRegions::new();
        let root = regions.add_root(ScrollRegion::new("root", Bounds::new(0.0, 0.0, 10.0, 10.0)));
        let orphan = ScrollRegion::new("orphan", Bounds::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(regions.add_child(5, orphan.clone()), Err(SurfaceError::Unknown(5)));
        // Nothing was registered, so a later id 1 cannot close a loop.
        let child = regions.add_child(root, orphan).unwrap();
        assert_eq!(child, 1);
        assert_eq!(regions.enclosing_surfaces(Point::new(1.0, 1.0)), vec![child, root]);
    }
}
