//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and the popup renderer consume the same source of truth.

use super::state::{ActiveView, AppState};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle — reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. } | Self::Toggle { label, .. } | Self::Cycle { label, .. } => {
                *label
            }
        }
    }
}

/// Next value after `current` in `steps`, wrapping.  Unknown values restart
/// from the step at `fallback`.
fn next_step<T: Copy + PartialEq>(steps: &[T], current: T, fallback: usize) -> T {
    let idx = steps.iter().position(|s| *s == current).unwrap_or(fallback);
    steps[(idx + 1) % steps.len()]
}

fn persist(state: &mut AppState) {
    if let Err(err) = state.config.save() {
        tracing::warn!("failed to save config: {err:#}");
    }
}

/// Apply a gesture-tuning change, reverting it when the controller cannot
/// be rebuilt right now.
fn retune(state: &mut AppState, apply: impl FnOnce(&mut AppState) -> String) {
    let before = (state.config.threshold, state.config.resistance);
    let message = apply(state);
    if state.rebuild_controller() {
        persist(state);
        state.status_message = Some(message);
    } else {
        (state.config.threshold, state.config.resistance) = before;
    }
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Toggle {
        label: "Pull to Refresh",
        get: |s| s.config.pull_enabled,
        set: |s, v| {
            s.config.pull_enabled = v;
            s.pull.set_disabled(!v);
            persist(s);
        },
    },
    SettingsItem::Cycle {
        label: "Pull Threshold",
        value: |s| format!("{}px", s.config.threshold),
        cycle: |s| {
            retune(s, |s| {
                s.config.threshold = next_step(&[48.0, 64.0, 80.0, 96.0, 120.0], s.config.threshold, 2);
                format!("Pull threshold: {}px", s.config.threshold)
            });
        },
    },
    SettingsItem::Cycle {
        label: "Pull Resistance",
        value: |s| format!("{:.2}", s.config.resistance),
        cycle: |s| {
            retune(s, |s| {
                s.config.resistance =
                    next_step(&[0.3, 0.4, 0.5, 0.65, 0.8, 1.0], s.config.resistance, 2);
                format!("Pull resistance: {:.2}", s.config.resistance)
            });
        },
    },
    SettingsItem::Cycle {
        label: "Row Height",
        value: |s| format!("{}px", s.config.px_per_row),
        cycle: |s| {
            s.config.px_per_row = next_step(&[8.0, 12.0, 16.0, 24.0], s.config.px_per_row, 2);
            persist(s);
            s.status_message = Some(format!("Row height: {}px", s.config.px_per_row));
        },
    },
    SettingsItem::Cycle {
        label: "Panel Split",
        value: |s| format!("{}%", s.config.panel_split_pct),
        cycle: |s| {
            s.config.panel_split_pct = next_step(&[30, 40, 50, 60, 70], s.config.panel_split_pct, 2);
            persist(s);
            s.status_message = Some(format!("Panel split: {}%", s.config.panel_split_pct));
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_wrap_and_recover() {
        assert_eq!(next_step(&[1, 2, 3], 3, 0), 1);
        assert_eq!(next_step(&[1, 2, 3], 1, 0), 2);
        assert_eq!(next_step(&[1, 2, 3], 9, 1), 3);
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = SETTINGS_ITEMS.iter().map(SettingsItem::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), SETTINGS_ITEMS.len());
    }
}
