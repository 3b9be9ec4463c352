//! Pull indicator — the strip revealed above a pane's content while it is
//! being pulled down, and the spinner shown while the reload runs.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::gesture::{IndicatorStyle, PullState};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Rendered into the gap between a pane's top border and its shifted
/// content.  Draws nothing when the gap is empty.
pub struct PullIndicator {
    pub state: PullState,
    pub style: IndicatorStyle,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl PullIndicator {
    pub fn label(&self) -> String {
        if self.state.is_refreshing {
            let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
            format!("{frame} Reloading…")
        } else if self.state.is_pulling && self.state.can_refresh {
            "↑ Release to reload".to_string()
        } else {
            "↓ Pull to reload".to_string()
        }
    }
}

impl Widget for PullIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let label = self.label();
        let style = if self.state.is_refreshing {
            Theme::refreshing_style()
        } else {
            // Snapping back after a short pull: fade with the strip.
            let opacity = if self.state.is_pulling { self.style.opacity } else { 0.0 };
            Theme::indicator_style(opacity, self.state.is_pulling && self.state.can_refresh)
        };

        let label_width = label.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(label_width) / 2;
        // Bottom row of the gap, right above the content.
        let y = area.y + area.height - 1;

        let line = Line::from(Span::styled(label, style));
        buf.set_line(x, y, &line, area.width.min(label_width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(state: PullState) -> PullIndicator {
        PullIndicator {
            state,
            style: IndicatorStyle {
                offset: 0.0,
                opacity: 0.5,
                animate: false,
            },
            tick: 3,
        }
    }

    #[test]
    fn label_follows_phase() {
        let pulling = PullState {
            is_pulling: true,
            pull_distance: 40.0,
            ..Default::default()
        };
        assert_eq!(indicator(pulling).label(), "↓ Pull to reload");

        let armed = PullState {
            can_refresh: true,
            ..pulling
        };
        assert_eq!(indicator(armed).label(), "↑ Release to reload");

        let refreshing = PullState {
            is_refreshing: true,
            ..Default::default()
        };
        assert_eq!(indicator(refreshing).label(), "⠸ Reloading…");
    }

    #[test]
    fn renders_on_bottom_row_of_gap() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let refreshing = PullState {
            is_refreshing: true,
            ..Default::default()
        };
        indicator(refreshing).render(area, &mut buf);

        let row = |y: u16| -> String { (0..30).map(|x| buf[(x, y)].symbol().to_string()).collect() };
        assert!(row(0).trim().is_empty());
        assert!(row(2).contains("Reloading"));
    }
}
