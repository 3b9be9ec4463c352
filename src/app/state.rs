//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    collection::Collection,
    gesture::{PullController, RefreshTicket},
    surface::{Overflow, ScrollRegion, ScrollRegions, SurfaceId},
};
use crate::ui::layout::{rect_to_bounds, AppLayout};
use crate::ui::snap_back::SnapBack;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Log,
    SettingsMenu,
    ControlsSubmenu,
}

/// The two scrollable lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Purchases,
    Tastings,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Purchases => Pane::Tastings,
            Pane::Tastings => Pane::Purchases,
        }
    }
}

// ───────────────────────────────────────── list state ────────

/// Selection and scroll position of one list pane.
#[derive(Debug, Default, Clone)]
pub struct ListState {
    /// Index of the highlighted entry.
    pub selected: usize,
    /// First visible row.
    pub offset: usize,
    /// Rows that fit in the pane, refreshed on every layout sync.
    pub viewport_rows: usize,
}

impl ListState {
    pub fn select_next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
        self.keep_selection_visible();
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.keep_selection_visible();
    }

    /// Move the selection by a full page.
    pub fn page(&mut self, len: usize, down: bool) {
        let step = self.viewport_rows.max(1);
        self.selected = if down {
            (self.selected + step).min(len.saturating_sub(1))
        } else {
            self.selected.saturating_sub(step)
        };
        self.keep_selection_visible();
    }

    /// Scroll the viewport by `rows` (positive = further down the list),
    /// dragging the selection along when it falls out of view.
    pub fn scroll_by(&mut self, rows: isize, len: usize) {
        let max_offset = len.saturating_sub(self.viewport_rows);
        self.offset = self.offset.saturating_add_signed(rows).min(max_offset);
        if self.viewport_rows == 0 {
            return;
        }
        if self.selected < self.offset {
            self.selected = self.offset;
        } else if self.selected >= self.offset + self.viewport_rows {
            self.selected = self.offset + self.viewport_rows - 1;
        }
    }

    /// Keep indices in range after the list was replaced.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.offset = self.offset.min(len.saturating_sub(self.viewport_rows));
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        if self.viewport_rows == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.viewport_rows {
            self.offset = self.selected + 1 - self.viewport_rows;
        }
    }
}

// ───────────────────────────────────────── surfaces ──────────

/// Region ids registered for the log view.
#[derive(Debug, Clone, Copy)]
pub struct Surfaces {
    /// Wrapper around both panes; the controller attaches here.
    pub root: SurfaceId,
    pub purchases: SurfaceId,
    pub tastings: SurfaceId,
}

impl Surfaces {
    pub fn pane(&self, id: SurfaceId) -> Option<Pane> {
        if id == self.purchases {
            Some(Pane::Purchases)
        } else if id == self.tastings {
            Some(Pane::Tastings)
        } else {
            None
        }
    }
}

/// An in-progress drag that scrolls a list directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragScroll {
    pub pane: Pane,
    pub last_row: u16,
}

// ───────────────────────────────────────── app state ─────────

/// Top-level application state.
pub struct AppState {
    /// Loaded whiskey log.
    pub collection: Collection,
    /// File the collection was read from.
    pub source: PathBuf,
    /// When the collection was last loaded successfully.
    pub loaded_at: Option<DateTime<Local>>,
    pub purchases_list: ListState,
    pub tastings_list: ListState,
    /// Pane receiving keyboard navigation.
    pub focus: Pane,
    /// The drag-to-refresh gesture.
    pub pull: PullController,
    /// Scroll regions mirrored from the current layout.
    pub regions: ScrollRegions,
    pub surfaces: Surfaces,
    /// Pane showing the pull indicator (kept until it has snapped back).
    pub indicator_pane: Option<Pane>,
    /// Eases the indicator back after release.
    pub snap_back: SnapBack,
    /// Set by handlers when a refresh was committed; the event loop spawns it.
    pub pending_refresh: Option<RefreshTicket>,
    /// Direct drag-scrolling, used when the pull gesture is not armed.
    pub drag_scroll: Option<DragScroll>,
    /// True while the pane divider is being dragged.
    pub dragging_splitter: bool,
    /// Last known terminal area, used for mouse hit testing.
    pub terminal_area: Rect,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    pub config: AppConfig,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted item in the controls submenu.
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,
    /// Monotonic tick counter (drives the spinner).
    pub tick: u64,
}

impl AppState {
    pub fn new(source: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        let mut regions = ScrollRegions::new();
        let root = regions.add_root(ScrollRegion::new("log", Default::default()).overflow(Overflow::Hidden));
        let purchases = regions.add_child(
            root,
            ScrollRegion::new("purchases", Default::default()).overflow(Overflow::Auto),
        )?;
        let tastings = regions.add_child(
            root,
            ScrollRegion::new("tastings", Default::default()).overflow(Overflow::Auto),
        )?;
        let surfaces = Surfaces {
            root,
            purchases,
            tastings,
        };

        let mut pull = PullController::new(config.pull_config())?;
        pull.attach(&mut regions, root)?;

        Ok(Self {
            collection: Collection::default(),
            source,
            loaded_at: None,
            purchases_list: ListState::default(),
            tastings_list: ListState::default(),
            focus: Pane::default(),
            pull,
            regions,
            surfaces,
            indicator_pane: None,
            snap_back: SnapBack::new(0.35),
            pending_refresh: None,
            drag_scroll: None,
            dragging_splitter: false,
            terminal_area: Rect::default(),
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            config,
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            tick: 0,
        })
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.terminal_area, self.config.panel_split_pct)
    }

    pub fn list_mut(&mut self, pane: Pane) -> &mut ListState {
        match pane {
            Pane::Purchases => &mut self.purchases_list,
            Pane::Tastings => &mut self.tastings_list,
        }
    }

    pub fn row_count(&self, pane: Pane) -> usize {
        match pane {
            Pane::Purchases => self.collection.purchases.len(),
            Pane::Tastings => self.collection.tastings.len(),
        }
    }

    pub fn surface(&self, pane: Pane) -> SurfaceId {
        match pane {
            Pane::Purchases => self.surfaces.purchases,
            Pane::Tastings => self.surfaces.tastings,
        }
    }

    /// Mirror the current layout and list positions into the scroll
    /// regions the gesture controller reads.
    pub fn sync_regions(&mut self) {
        let layout = self.layout();
        let px = self.config.px_per_row;

        if let Some(root) = self.regions.get_mut(self.surfaces.root) {
            root.bounds = rect_to_bounds(layout.body_area, px);
            root.viewport_height = root.bounds.height;
            root.content_height = root.bounds.height;
        }

        for pane in [Pane::Purchases, Pane::Tastings] {
            let inner = AppLayout::pane_inner(layout.pane_area(pane));
            let rows = self.row_count(pane);
            let list = self.list_mut(pane);
            list.viewport_rows = inner.height as usize;
            let offset = list.offset;
            let id = self.surface(pane);
            if let Some(region) = self.regions.get_mut(id) {
                region.bounds = rect_to_bounds(layout.pane_area(pane), px);
                region.viewport_height = f64::from(inner.height) * px;
                region.content_height = rows as f64 * px;
                region.offset = offset as f64 * px;
            }
        }
    }

    /// Swap in a freshly loaded collection, keeping selections in range.
    pub fn replace_collection(&mut self, collection: Collection) {
        self.collection = collection;
        let (p, t) = (self.collection.purchases.len(), self.collection.tastings.len());
        self.purchases_list.clamp(p);
        self.tastings_list.clamp(t);
        self.loaded_at = Some(Local::now());
    }

    /// Apply the result of a refresh run.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: anyhow::Result<Collection>,
        elapsed: Duration,
    ) {
        if !self.pull.settle(ticket, &result) {
            return;
        }
        match result {
            Ok(collection) => {
                self.status_message = Some(format!(
                    "Reloaded {} purchases, {} tastings in {}ms",
                    collection.purchases.len(),
                    collection.tastings.len(),
                    elapsed.as_millis()
                ));
                self.replace_collection(collection);
            }
            Err(err) => {
                self.status_message = Some(format!("Reload failed: {err:#}"));
            }
        }
    }

    /// Rebuild the controller after gesture tuning changed.  Refused while a
    /// refresh is in flight so its ticket stays valid.
    pub fn rebuild_controller(&mut self) -> bool {
        if self.pull.state().is_refreshing {
            self.status_message = Some("Wait for the reload to finish".into());
            return false;
        }
        match PullController::new(self.config.pull_config()) {
            Ok(mut pull) => {
                self.pull.detach(&mut self.regions);
                if let Err(err) = pull.attach(&mut self.regions, self.surfaces.root) {
                    tracing::error!("re-attach failed: {err}");
                }
                self.pull = pull;
                self.indicator_pane = None;
                true
            }
            Err(err) => {
                self.status_message = Some(err.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(viewport_rows: usize) -> ListState {
        ListState {
            viewport_rows,
            ..Default::default()
        }
    }

    #[test]
    fn scroll_by_clamps_and_drags_selection() {
        let mut l = list(5);
        l.scroll_by(3, 20);
        assert_eq!(l.offset, 3);
        assert_eq!(l.selected, 3);

        l.scroll_by(100, 20);
        assert_eq!(l.offset, 15);

        l.selected = 19;
        l.scroll_by(-100, 20);
        assert_eq!(l.offset, 0);
        assert_eq!(l.selected, 4);
    }

    #[test]
    fn selection_keeps_viewport_in_step() {
        let mut l = list(3);
        for _ in 0..4 {
            l.select_next(10);
        }
        assert_eq!((l.selected, l.offset), (4, 2));
        l.page(10, true);
        assert_eq!((l.selected, l.offset), (7, 5));
        l.page(10, false);
        l.select_prev();
        assert_eq!((l.selected, l.offset), (3, 3));
    }

    #[test]
    fn clamp_after_shrink() {
        let mut l = list(4);
        l.selected = 9;
        l.offset = 6;
        l.clamp(3);
        assert_eq!((l.selected, l.offset), (2, 0));
    }

    #[test]
    fn regions_follow_layout_and_offsets() {
        let mut s = AppState::new(PathBuf::from("c.toml"), AppConfig::default()).unwrap();
        s.terminal_area = Rect::new(0, 0, 80, 24);
        s.purchases_list.offset = 2;
        s.sync_regions();

        let px = s.config.px_per_row;
        let purchases = s.regions.get(s.surfaces.purchases).unwrap();
        assert_eq!(purchases.offset, 2.0 * px);
        assert!(purchases.viewport_height > 0.0);
        assert_eq!(s.pull.root(), Some(s.surfaces.root));
    }
}
