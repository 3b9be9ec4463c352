//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── log panes ──────────────────────────────────────────────
    pub fn date_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn bottle_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn price_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn discount_style() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn note_style() -> Style {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC)
    }

    /// Ratings colour from red (poor) to green (excellent).
    pub fn rating_style(rating: u8) -> Style {
        let color = match rating {
            90.. => Color::Green,
            80..=89 => Color::LightGreen,
            70..=79 => Color::Yellow,
            _ => Color::Red,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn empty_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── pull indicator ─────────────────────────────────────────

    /// Terminals have no alpha, so opacity steps through grey levels.
    pub fn indicator_style(opacity: f64, armed: bool) -> Style {
        if armed {
            return Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD);
        }
        let color = if opacity < 0.34 {
            Color::DarkGray
        } else if opacity < 0.67 {
            Color::Gray
        } else {
            Color::White
        };
        Style::default().fg(color)
    }

    pub fn refreshing_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style(focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header_style() -> Style {
        Style::default().fg(Color::White).bg(Color::Blue)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
