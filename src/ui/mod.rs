//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the application state and turns it into cells on the
//! terminal.  No file I/O happens here.

pub mod indicator;
pub mod layout;
pub mod log_pane;
pub mod popup;
pub mod snap_back;
pub mod theme;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::state::{ActiveView, AppState, Pane};

use self::{indicator::PullIndicator, layout::AppLayout, log_pane::LogPane, theme::Theme};

/// Render one frame.
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    state.terminal_area = frame.area();
    state.sync_regions();
    let layout = state.layout();

    frame.render_widget(summary_line(state), layout.header_area);

    for pane in [Pane::Purchases, Pane::Tastings] {
        draw_pane(frame, state, &layout, pane);
    }

    let hint = state.config.status_bar_hint();
    let status_text = match state.active_view {
        ActiveView::Log => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => "",
    };
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    match state.active_view {
        ActiveView::SettingsMenu => {
            frame.render_widget(popup::SettingsPopup { state: &*state }, frame.area());
        }
        ActiveView::ControlsSubmenu => {
            frame.render_widget(
                popup::ControlsPopup {
                    config: &state.config,
                    selected: state.controls_selected,
                    awaiting_rebind: state.awaiting_rebind,
                },
                frame.area(),
            );
        }
        ActiveView::Log => {}
    }
}

fn draw_pane(frame: &mut Frame, state: &mut AppState, layout: &AppLayout, pane: Pane) {
    let area = layout.pane_area(pane);
    let focused = state.focus == pane;
    let title = match pane {
        Pane::Purchases => format!(" Purchases ({}) ", state.collection.purchases.len()),
        Pane::Tastings => format!(" Tastings ({}) ", state.collection.tastings.len()),
    };
    let block = Block::default()
        .title(title)
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style(focused));

    let shift = if state.indicator_pane == Some(pane) {
        state.snap_back.rows()
    } else {
        0
    };

    let widget = LogPane::new(&state.collection, pane).block(block).shift(shift);
    match pane {
        Pane::Purchases => frame.render_stateful_widget(widget, area, &mut state.purchases_list),
        Pane::Tastings => frame.render_stateful_widget(widget, area, &mut state.tastings_list),
    }

    if shift > 0 {
        let inner = AppLayout::pane_inner(area);
        let gap = Rect::new(inner.x, inner.y, inner.width, shift.min(inner.height));
        frame.render_widget(
            PullIndicator {
                state: state.pull.state(),
                style: state.pull.indicator_style(),
                tick: state.tick,
            },
            gap,
        );
    }
}

/// Totals line across the top of the screen.
fn summary_line(state: &AppState) -> Paragraph<'static> {
    let c = &state.collection;
    let rating = c
        .average_rating()
        .map_or_else(|| "–".to_string(), |r| format!("{r:.1}"));
    let loaded = state
        .loaded_at
        .map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S").to_string());

    let line = Line::from(vec![
        Span::raw(format!(" {} ", state.source.display())),
        Span::raw(format!(
            "│ spent ${:.2} │ avg rating {rating} │ loaded {loaded} ",
            c.total_spent()
        )),
    ]);
    Paragraph::new(line).style(Theme::header_style())
}
