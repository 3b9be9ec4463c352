//! Layout helpers — split the terminal area into regions and map terminal
//! cells to the logical pixels the gesture controller works in.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::state::Pane;
use crate::core::surface::{Bounds, Point};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// Primary screen layout: summary header, two side-by-side panes, and a
/// bottom status bar.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header_area: Rect,
    /// Both panes together.
    pub body_area: Rect,
    pub purchases_area: Rect,
    pub tastings_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.  `split_pct` is the
    /// purchases pane's share of the width.
    pub fn from_area(area: Rect, split_pct: u16) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // summary header
                Constraint::Min(3),    // panes (take all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let split = split_pct.clamp(20, 80);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(split), Constraint::Percentage(100 - split)])
            .split(rows[1]);

        Self {
            header_area: rows[0],
            body_area: rows[1],
            purchases_area: cols[0],
            tastings_area: cols[1],
            status_area: rows[2],
        }
    }

    pub fn pane_area(&self, pane: Pane) -> Rect {
        match pane {
            Pane::Purchases => self.purchases_area,
            Pane::Tastings => self.tastings_area,
        }
    }

    /// Pane under a terminal cell, if any.
    pub fn pane_at(&self, col: u16, row: u16) -> Option<Pane> {
        if point_in_rect(self.purchases_area, col, row) {
            Some(Pane::Purchases)
        } else if point_in_rect(self.tastings_area, col, row) {
            Some(Pane::Tastings)
        } else {
            None
        }
    }

    /// Area inside a pane's border.
    pub fn pane_inner(area: Rect) -> Rect {
        Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(1),
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
        )
    }

    /// The divider is the purchases pane's right border and the tastings
    /// pane's left border; grabbing either counts.
    pub fn is_on_splitter(&self, col: u16, row: u16) -> bool {
        if !point_in_rect(self.body_area, col, row) || self.tastings_area.width == 0 {
            return false;
        }
        let left_edge = self.purchases_area.x + self.purchases_area.width.saturating_sub(1);
        col == left_edge || col == self.tastings_area.x
    }

    /// Split percentage for a divider dragged to `col`.
    pub fn split_pct_from_pointer(&self, col: u16) -> Option<u16> {
        if self.body_area.width == 0 {
            return None;
        }
        let rel = col.saturating_sub(self.body_area.x) as u32 * 100 / self.body_area.width as u32;
        Some((rel as u16).clamp(20, 80))
    }
}

pub fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Logical-pixel position of a terminal cell's top-left corner.
pub fn cell_to_point(col: u16, row: u16, px_per_row: f64) -> Point {
    Point::new(
        f64::from(col) * px_per_row * CELL_ASPECT,
        f64::from(row) * px_per_row,
    )
}

pub fn rect_to_bounds(area: Rect, px_per_row: f64) -> Bounds {
    let origin = cell_to_point(area.x, area.y, px_per_row);
    Bounds::new(
        origin.x,
        origin.y,
        f64::from(area.width) * px_per_row * CELL_ASPECT,
        f64::from(area.height) * px_per_row,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_split_the_body() {
        let l = AppLayout::from_area(Rect::new(0, 0, 100, 30), 40);
        assert_eq!(l.header_area.height, 1);
        assert_eq!(l.status_area.height, 1);
        assert_eq!(l.purchases_area.width, 40);
        assert_eq!(l.tastings_area.x, 40);
        assert_eq!(l.pane_at(10, 5), Some(Pane::Purchases));
        assert_eq!(l.pane_at(60, 5), Some(Pane::Tastings));
        assert_eq!(l.pane_at(60, 0), None);
    }

    #[test]
    fn splitter_hit_and_drag() {
        let l = AppLayout::from_area(Rect::new(0, 0, 100, 30), 50);
        assert!(l.is_on_splitter(49, 10));
        assert!(l.is_on_splitter(50, 10));
        assert!(!l.is_on_splitter(20, 10));
        assert_eq!(l.split_pct_from_pointer(70), Some(70));
        assert_eq!(l.split_pct_from_pointer(5), Some(20));
    }

    #[test]
    fn cell_bounds_contain_their_cells() {
        let area = Rect::new(2, 3, 10, 4);
        let b = rect_to_bounds(area, 16.0);
        assert!(b.contains(cell_to_point(2, 3, 16.0)));
        assert!(b.contains(cell_to_point(11, 6, 16.0)));
        assert!(!b.contains(cell_to_point(12, 6, 16.0)));
        assert!(!b.contains(cell_to_point(5, 7, 16.0)));
    }
}
