//! Input handling — maps key/pointer events to state mutations.
//!
//! Left-button presses first go to the pull controller.  When it does not
//! arm (pane scrolled away from the top, pull disabled, refresh in flight)
//! the drag falls back to scrolling the pane directly, the same way a touch
//! screen would.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Action, KeyBind};
use crate::core::gesture::Release;
use crate::ui::layout::cell_to_point;

use super::event::{PointerEvent, PointerKind};
use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState, DragScroll};

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Log => handle_log_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Log view (configurable bindings) ────────────────────────────

fn handle_log_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    // Viewport sizes may be stale after a resize or a row height change.
    state.sync_regions();
    let pane = state.focus;
    let len = state.row_count(pane);

    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::MoveUp => state.list_mut(pane).select_prev(),
        Action::MoveDown => state.list_mut(pane).select_next(len),
        Action::PageUp => state.list_mut(pane).page(len, false),
        Action::PageDown => state.list_mut(pane).page(len, true),
        Action::SwitchPane => state.focus = pane.other(),
        Action::Refresh => request_refresh(state),
        Action::TogglePull => {
            let enabled = !state.config.pull_enabled;
            state.config.pull_enabled = enabled;
            state.pull.set_disabled(!enabled);
            save_config(state);
            state.status_message = Some(
                if enabled {
                    "Pull to refresh enabled"
                } else {
                    "Pull to refresh disabled"
                }
                .into(),
            );
        }
    }
}

/// Keyboard reload: same runtime as the gesture, one at a time.
fn request_refresh(state: &mut AppState) {
    match state.pull.trigger() {
        Some(ticket) => {
            state.pending_refresh = Some(ticket);
            state.indicator_pane = Some(state.focus);
            state.status_message = Some("Reloading…".into());
        }
        None => {
            state.status_message = Some("Reload already in progress".into());
        }
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Log;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                match item {
                    SettingsItem::Submenu { view, .. } => {
                        state.active_view = *view;
                        state.controls_selected = 0;
                    }
                    SettingsItem::Toggle { get, set, .. } => {
                        let current = get(state);
                        set(state, !current);
                    }
                    SettingsItem::Cycle { cycle, .. } => cycle(state),
                }
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Log;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected < item_count - 1 {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                // "Reset to defaults" row.
                state.config.reset_defaults();
                save_config(state);
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                save_config(state);
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }

    let Some(&action) = Action::ALL.get(state.controls_selected) else {
        state.awaiting_rebind = false;
        return;
    };
    state.config.add_binding(action, KeyBind::from_key_event(key));
    save_config(state);
    state.awaiting_rebind = false;
}

fn save_config(state: &mut AppState) {
    if let Err(err) = state.config.save() {
        tracing::warn!("failed to save config: {err:#}");
        state.status_message = Some("Could not save config".into());
    }
}

// ── Pointer ─────────────────────────────────────────────────────

/// Process a left-button press / drag / release.
pub fn handle_pointer(state: &mut AppState, ev: PointerEvent) {
    if state.active_view != ActiveView::Log {
        return;
    }
    state.sync_regions();

    match ev.kind {
        PointerKind::Press => pointer_press(state, ev.column, ev.row),
        PointerKind::Move => pointer_move(state, ev.column, ev.row),
        PointerKind::Release => pointer_release(state),
    }
}

fn pointer_press(state: &mut AppState, col: u16, row: u16) {
    let layout = state.layout();
    if layout.is_on_splitter(col, row) {
        state.dragging_splitter = true;
        return;
    }
    state.dragging_splitter = false;

    let Some(pane) = layout.pane_at(col, row) else {
        return;
    };
    state.focus = pane;
    state.drag_scroll = Some(DragScroll { pane, last_row: row });

    let point = cell_to_point(col, row, state.config.px_per_row);
    if state.pull.press(point, &state.regions) {
        state.indicator_pane = state
            .pull
            .active_surface()
            .and_then(|id| state.surfaces.pane(id))
            .or(Some(pane));
    }
}

fn pointer_move(state: &mut AppState, col: u16, row: u16) {
    if state.dragging_splitter {
        if let Some(pct) = state.layout().split_pct_from_pointer(col) {
            state.config.panel_split_pct = pct;
        }
        return;
    }

    let y = cell_to_point(col, row, state.config.px_per_row).y;
    let outcome = state.pull.drag(y, &state.regions);

    let Some(drag) = state.drag_scroll.as_mut() else {
        return;
    };
    let delta = drag.last_row as isize - row as isize;
    let pane = drag.pane;
    drag.last_row = row;

    // The pull owns this move; the list must not scroll under it.
    if outcome.suppresses_default() || delta == 0 {
        return;
    }
    // Finger moves up → content scrolls further down the list.
    let len = state.row_count(pane);
    state.list_mut(pane).scroll_by(delta, len);
    state.sync_regions();
}

fn pointer_release(state: &mut AppState) {
    state.drag_scroll = None;
    if state.dragging_splitter {
        state.dragging_splitter = false;
        save_config(state);
        return;
    }

    match state.pull.release() {
        Release::Refresh(ticket) => {
            state.pending_refresh = Some(ticket);
            state.status_message = Some("Reloading…".into());
        }
        Release::Reset | Release::Ignored => {}
    }
}

/// Mouse wheel over a pane scrolls it by one row.
pub fn handle_wheel(state: &mut AppState, col: u16, row: u16, down: bool) {
    if state.active_view != ActiveView::Log {
        return;
    }
    let Some(pane) = state.layout().pane_at(col, row) else {
        return;
    };
    state.sync_regions();
    let len = state.row_count(pane);
    state.list_mut(pane).scroll_by(if down { 1 } else { -1 }, len);
}

/// Advance one animation frame.
pub fn handle_tick(state: &mut AppState) {
    state.tick = state.tick.wrapping_add(1);

    let style = state.pull.indicator_style();
    let target = style.offset / state.config.px_per_row;
    if style.animate {
        state.snap_back.tick(target);
    } else {
        state.snap_back.track(target);
    }

    let pull = state.pull.state();
    if !pull.is_pulling && !pull.is_refreshing && !state.snap_back.is_animating(target) {
        state.indicator_pane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::Pane;
    use crate::config::AppConfig;
    use crate::core::collection::{Collection, Purchase, Tasting};
    use chrono::NaiveDate;
    use ratatui::layout::Rect;
    use std::path::PathBuf;

    /// 80x24 terminal, 16px rows, 50 purchases.  The purchases pane spans
    /// rows 1..=22 with content starting at row 2.
    fn app() -> AppState {
        let mut s = AppState::new(PathBuf::from("c.toml"), AppConfig::default()).unwrap();
        s.terminal_area = Rect::new(0, 0, 80, 24);
        let purchases = (0..50)
            .map(|i| Purchase {
                bottle: format!("Bottle {i}"),
                distillery: None,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                price: 50.0,
                discount_pct: None,
                store: None,
                note: None,
            })
            .collect();
        s.collection = Collection {
            purchases,
            tastings: Vec::new(),
        };
        s.sync_regions();
        s
    }

    fn pointer(state: &mut AppState, kind: PointerKind, row: u16) {
        handle_pointer(state, PointerEvent { kind, column: 10, row });
    }

    #[test]
    fn long_pull_queues_one_refresh() {
        let mut s = app();
        pointer(&mut s, PointerKind::Press, 2);
        assert!(s.pull.state().is_pulling);
        assert_eq!(s.indicator_pane, Some(Pane::Purchases));

        // 12 rows * 16px * 0.5 = 96px damped, past the 80px threshold.
        pointer(&mut s, PointerKind::Move, 14);
        assert!(s.pull.state().can_refresh);
        // The pull swallowed the drag; the list did not scroll.
        assert_eq!(s.purchases_list.offset, 0);

        pointer(&mut s, PointerKind::Release, 14);
        assert!(s.pending_refresh.is_some());
        assert!(s.pull.state().is_refreshing);
    }

    #[test]
    fn short_pull_does_nothing() {
        let mut s = app();
        pointer(&mut s, PointerKind::Press, 2);
        pointer(&mut s, PointerKind::Move, 6);
        pointer(&mut s, PointerKind::Release, 6);
        assert!(s.pending_refresh.is_none());
        assert!(!s.pull.state().is_pulling);
    }

    #[test]
    fn scrolled_pane_drags_instead_of_pulling() {
        let mut s = app();
        s.purchases_list.offset = 5;
        s.purchases_list.selected = 5;

        pointer(&mut s, PointerKind::Press, 2);
        assert!(!s.pull.state().is_pulling);

        // Dragging down pulls the content back toward the top.
        pointer(&mut s, PointerKind::Move, 5);
        assert_eq!(s.purchases_list.offset, 2);
        pointer(&mut s, PointerKind::Move, 20);
        assert_eq!(s.purchases_list.offset, 0);

        pointer(&mut s, PointerKind::Release, 20);
        assert!(s.pending_refresh.is_none());
    }

    #[test]
    fn dragging_up_while_armed_scrolls_and_abandons() {
        let mut s = app();
        pointer(&mut s, PointerKind::Press, 10);
        assert!(s.pull.state().is_pulling);

        pointer(&mut s, PointerKind::Move, 7);
        assert_eq!(s.purchases_list.offset, 3);
        // Coming back down finds the pane off its top.
        pointer(&mut s, PointerKind::Move, 12);
        assert!(!s.pull.state().is_pulling);
        pointer(&mut s, PointerKind::Release, 12);
        assert!(s.pending_refresh.is_none());
    }

    #[test]
    fn keyboard_refresh_is_exclusive() {
        let mut s = app();
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        let first = s.pending_refresh.take();
        assert!(first.is_some());

        handle_key(&mut s, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        assert!(s.pending_refresh.is_none());

        // A gesture cannot start either.
        pointer(&mut s, PointerKind::Press, 2);
        assert!(!s.pull.state().is_pulling);
    }

    #[test]
    fn failed_refresh_keeps_old_collection() {
        let mut s = app();
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        let ticket = s.pending_refresh.take().unwrap();
        s.apply_refresh(ticket, Err(anyhow::anyhow!("disk on fire")), Default::default());
        assert_eq!(s.collection.purchases.len(), 50);
        assert!(!s.pull.state().is_refreshing);
        assert!(s.status_message.as_deref().unwrap().contains("disk on fire"));
    }

    #[test]
    fn successful_refresh_swaps_collection() {
        let mut s = app();
        s.purchases_list.selected = 40;
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        let ticket = s.pending_refresh.take().unwrap();
        s.apply_refresh(ticket, Ok(Collection::default()), Default::default());
        assert!(s.collection.purchases.is_empty());
        assert_eq!(s.purchases_list.selected, 0);
        assert!(s.loaded_at.is_some());
    }

    #[test]
    fn splitter_drag_resizes_panes() {
        let mut s = app();
        handle_pointer(&mut s, PointerEvent { kind: PointerKind::Press, column: 40, row: 5 });
        assert!(s.dragging_splitter);
        handle_pointer(&mut s, PointerEvent { kind: PointerKind::Move, column: 56, row: 5 });
        assert_eq!(s.config.panel_split_pct, 70);
        assert!(!s.pull.state().is_pulling);
    }

    #[test]
    fn wheel_scrolls_pane_under_pointer() {
        let mut s = app();
        handle_wheel(&mut s, 10, 5, true);
        handle_wheel(&mut s, 10, 5, true);
        assert_eq!(s.purchases_list.offset, 2);
        handle_wheel(&mut s, 70, 5, true);
        assert_eq!(s.tastings_list.offset, 0);
    }

    #[test]
    fn indicator_tracks_then_snaps_back() {
        let mut s = app();
        pointer(&mut s, PointerKind::Press, 2);
        pointer(&mut s, PointerKind::Move, 10);
        handle_tick(&mut s);
        // 8 rows * 16px * 0.5 = 64px = 4 rows, followed exactly.
        assert_eq!(s.snap_back.rows(), 4);

        pointer(&mut s, PointerKind::Release, 10);
        handle_tick(&mut s);
        assert!(s.snap_back.rows() < 4);
        assert_eq!(s.indicator_pane, Some(Pane::Purchases));

        for _ in 0..50 {
            handle_tick(&mut s);
        }
        assert_eq!(s.snap_back.rows(), 0);
        assert_eq!(s.indicator_pane, None);
    }

    /// 80x24 terminal with 50 tastings and no prior layout sync.
    fn unsynced_app() -> AppState {
        let mut s = AppState::new(PathBuf::from("c.toml"), AppConfig::default()).unwrap();
        s.terminal_area = Rect::new(0, 0, 80, 24);
        s.focus = Pane::Tastings;
        s.collection.tastings = (0..50)
            .map(|i| Tasting {
                bottle: format!("Bottle {i}"),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                rating: 85,
                nose: None,
                palate: None,
                finish: None,
                note: None,
            })
            .collect();
        s
    }

    #[test]
    fn keyboard_navigation_keeps_selection_visible_without_prior_sync() {
        let mut s = unsynced_app();
        for _ in 0..30 {
            handle_key(&mut s, KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        }
        let list = &s.tastings_list;
        assert_eq!(list.selected, 30);
        assert_eq!(list.viewport_rows, 20);
        assert!(list.offset <= list.selected && list.selected < list.offset + list.viewport_rows);
    }

    #[test]
    fn wheel_never_scrolls_past_last_page_without_prior_sync() {
        let mut s = unsynced_app();
        for _ in 0..60 {
            handle_wheel(&mut s, 70, 5, true);
        }
        assert_eq!(s.tastings_list.offset, 50 - 20);
    }

    #[test]
    fn resize_resyncs_before_wheel() {
        let mut s = app();
        s.terminal_area = Rect::new(0, 0, 80, 14);
        for _ in 0..60 {
            handle_wheel(&mut s, 10, 5, true);
        }
        // 14 rows: header + status + borders leave 10 visible rows.
        assert_eq!(s.purchases_list.viewport_rows, 10);
        assert_eq!(s.purchases_list.offset, 40);
    }
}
