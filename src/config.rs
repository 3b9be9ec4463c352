//! User configuration — keybindings, gesture tuning, and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/dram-pull/config.toml` (default `~/.config/dram-pull/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::gesture::PullConfig;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    SwitchPane,
    Refresh,
    TogglePull,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::PageUp,
        Action::PageDown,
        Action::SwitchPane,
        Action::Refresh,
        Action::TogglePull,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::PageUp => "Page Up",
            Action::PageDown => "Page Down",
            Action::SwitchPane => "Switch Pane",
            Action::Refresh => "Reload Collection",
            Action::TogglePull => "Toggle Pull-to-Refresh",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::SwitchPane => "switch_pane",
            Action::Refresh => "refresh",
            Action::TogglePull => "toggle_pull",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code
            && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Create a binding from a raw key event (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers & MODIFIER_MASK,
        }
    }

    fn modifier_prefix(&self) -> String {
        MODIFIER_NAMES
            .iter()
            .filter(|(_, m)| self.modifiers.contains(*m))
            .map(|(name, _)| format!("{name}+"))
            .collect()
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+p"`, `"q"`).
    pub fn display(&self) -> String {
        let key = named_key(self.code)
            .map(|k| k.glyph.to_string())
            .unwrap_or_else(|| key_name(self.code));
        format!("{}{key}", self.modifier_prefix())
    }

    /// Config-file form (e.g. `"Alt+Up"`, `"Ctrl+p"`, `"q"`).
    fn to_config_string(&self) -> String {
        format!("{}{}", self.modifier_prefix(), key_name(self.code))
    }

    /// Parse `"Ctrl+p"`, `"Alt+Up"`, `"q"`, `"F5"`.  Names are
    /// case-insensitive; single characters keep their case.
    fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            // "+" on its own, or "Ctrl++".
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some(split) => split,
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            let (_, m) = MODIFIER_NAMES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(part))?;
            modifiers |= *m;
        }

        let lower = key.to_ascii_lowercase();
        let code = if let Some(named) = NAMED_KEYS
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(key) || k.aliases.contains(&lower.as_str()))
        {
            named.code
        } else if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            KeyCode::F(n)
        } else {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

const MODIFIER_NAMES: [(&str, KeyModifiers); 3] = [
    ("Ctrl", KeyModifiers::CONTROL),
    ("Alt", KeyModifiers::ALT),
    ("Shift", KeyModifiers::SHIFT),
];

/// A non-character key: config name, on-screen glyph, accepted aliases.
struct NamedKey {
    code: KeyCode,
    name: &'static str,
    glyph: &'static str,
    aliases: &'static [&'static str],
}

const fn named(code: KeyCode, name: &'static str, glyph: &'static str, aliases: &'static [&'static str]) -> NamedKey {
    NamedKey { code, name, glyph, aliases }
}

const NAMED_KEYS: &[NamedKey] = &[
    named(KeyCode::Up, "Up", "↑", &[]),
    named(KeyCode::Down, "Down", "↓", &[]),
    named(KeyCode::Left, "Left", "←", &[]),
    named(KeyCode::Right, "Right", "→", &[]),
    named(KeyCode::Enter, "Enter", "Enter", &["return"]),
    named(KeyCode::Esc, "Esc", "Esc", &["escape"]),
    named(KeyCode::Tab, "Tab", "Tab", &[]),
    named(KeyCode::Backspace, "Backspace", "Bksp", &["bksp"]),
    named(KeyCode::Delete, "Delete", "Del", &["del"]),
    named(KeyCode::Home, "Home", "Home", &[]),
    named(KeyCode::End, "End", "End", &[]),
    named(KeyCode::PageUp, "PageUp", "PgUp", &["pgup"]),
    named(KeyCode::PageDown, "PageDown", "PgDn", &["pgdn"]),
    named(KeyCode::Char(' '), "Space", "Space", &[]),
];

fn named_key(code: KeyCode) -> Option<&'static NamedKey> {
    NAMED_KEYS.iter().find(|k| k.code == code)
}

/// Config-file name of a key code.
fn key_name(code: KeyCode) -> String {
    match (named_key(code), code) {
        (Some(k), _) => k.name.to_string(),
        (None, KeyCode::Char(c)) => c.to_string(),
        (None, KeyCode::F(n)) => format!("F{n}"),
        (None, other) => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

const DEFAULT_PX_PER_ROW: f64 = 16.0;
const DEFAULT_SPLIT_PCT: u16 = 50;

/// Application configuration — keybindings and gesture tuning.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Damped pull distance (logical px) needed to refresh.
    pub threshold: f64,
    /// Drag damping factor, (0, 1].
    pub resistance: f64,
    pub pull_enabled: bool,
    /// Logical pixels per terminal row.
    pub px_per_row: f64,
    /// Width of the purchases pane, in percent.
    pub panel_split_pct: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        let pull = PullConfig::default();
        Self {
            bindings: Self::default_bindings(),
            threshold: pull.threshold,
            resistance: pull.resistance,
            pull_enabled: !pull.disabled,
            px_per_row: DEFAULT_PX_PER_ROW,
            panel_split_pct: DEFAULT_SPLIT_PCT,
        }
    }
}

impl AppConfig {
    /// Hard-coded default keybindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n)]);
        m.insert(SwitchPane, vec![KeyBind::new(Tab, n)]);
        m.insert(Refresh, vec![KeyBind::new(Char('r'), n), KeyBind::new(F(5), n)]);
        m.insert(TogglePull, vec![KeyBind::new(Char('p'), ctrl)]);
        m.insert(OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// The gesture tuning this config describes.
    pub fn pull_config(&self) -> PullConfig {
        PullConfig {
            threshold: self.threshold,
            resistance: self.resistance,
            disabled: !self.pull_enabled,
        }
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Add a binding for `action`.  Removes this key from any other action
    /// to prevent conflicts, then appends it to `action`'s bindings.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for (_, binds) in self.bindings.iter_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        let pull = if self.pull_enabled {
            "drag down at top: reload"
        } else {
            "pull disabled"
        };
        format!(
            "{pull} | {}: reload | {}: pane | {}: settings | {}: quit",
            self.short_binding(Action::Refresh),
            self.short_binding(Action::SwitchPane),
            self.short_binding(Action::OpenSettings),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                if path.exists() {
                    tracing::warn!("could not read {}: {err}", path.display());
                }
                Self::default()
            }
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        let entries = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('['))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()));

        for (key, value) in entries {
            if config.apply_setting(key, value) {
                continue;
            }
            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!("unknown config key {key:?}");
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        if let Err(err) = config.pull_config().validate() {
            tracing::warn!("ignoring gesture settings: {err}");
            let defaults = PullConfig::default();
            config.threshold = defaults.threshold;
            config.resistance = defaults.resistance;
        }

        config
    }

    /// Apply a non-binding setting.  Unparseable values keep the default.
    fn apply_setting(&mut self, key: &str, value: &str) -> bool {
        let number = value.parse::<f64>().ok().filter(|v| v.is_finite());
        match key {
            "threshold" => self.threshold = number.unwrap_or(self.threshold),
            "resistance" => self.resistance = number.unwrap_or(self.resistance),
            "pull_enabled" => self.pull_enabled = value == "true",
            "px_per_row" => {
                if let Some(v) = number {
                    self.px_per_row = v.clamp(4.0, 64.0);
                }
            }
            "panel_split_pct" => {
                if let Ok(v) = value.parse::<u16>() {
                    self.panel_split_pct = v.clamp(20, 80);
                }
            }
            _ => return false,
        }
        true
    }

    fn serialise(&self) -> String {
        let special: Vec<&str> = NAMED_KEYS.iter().map(|k| k.name).collect();
        let mut out = format!(
            "# dram-pull configuration\n\
             \n\
             # Pull-to-refresh\n\
             pull_enabled = {}\n\
             threshold = {}\n\
             resistance = {}\n\
             px_per_row = {}\n\
             \n\
             # Layout\n\
             panel_split_pct = {}\n\
             \n\
             # Key bindings: action = Key1, Key2, ...\n\
             # Modifiers: Ctrl+, Alt+, Shift+\n\
             # Named keys: {}, F1-F12\n\n",
            self.pull_enabled,
            self.threshold,
            self.resistance,
            self.px_per_row,
            self.panel_split_pct,
            special.join(", "),
        );

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                out.push_str(&format!("{} = {}\n", action.config_key(), keys.join(", ")));
            }
        }
        out
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/dram-pull/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("dram-pull").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn parses_gesture_settings() {
        let c = AppConfig::parse_config(
            "threshold = 120\nresistance = 0.25\npull_enabled = false\npx_per_row = 100\n",
        );
        assert_eq!(c.threshold, 120.0);
        assert_eq!(c.resistance, 0.25);
        assert!(!c.pull_enabled);
        assert!(c.pull_config().disabled);
        assert_eq!(c.px_per_row, 64.0);
    }

    #[test]
    fn invalid_tuning_falls_back_to_defaults() {
        let c = AppConfig::parse_config("threshold = -3\nresistance = 2\n");
        assert_eq!(c.threshold, 80.0);
        assert_eq!(c.resistance, 0.5);
    }

    #[test]
    fn round_trips_through_file_format() {
        let mut c = AppConfig::default();
        c.threshold = 64.0;
        c.panel_split_pct = 30;
        c.add_binding(Action::Refresh, KeyBind::new(KeyCode::Char('R'), KeyModifiers::SHIFT));
        let back = AppConfig::parse_config(&c.serialise());
        assert_eq!(back.threshold, 64.0);
        assert_eq!(back.panel_split_pct, 30);
        assert_eq!(back.bindings.get(&Action::Refresh), c.bindings.get(&Action::Refresh));
    }

    #[test]
    fn key_binding_parse_and_display() {
        let b = KeyBind::parse("Ctrl+p").unwrap();
        assert_eq!(b, KeyBind::new(KeyCode::Char('p'), KeyModifiers::CONTROL));
        assert_eq!(b.display(), "Ctrl+p");
        assert_eq!(KeyBind::parse("alt+up").unwrap().display(), "Alt+↑");
        assert_eq!(KeyBind::parse("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
        assert_eq!(KeyBind::parse("pgdn").unwrap().code, KeyCode::PageDown);
        assert_eq!(KeyBind::parse("Ctrl++").unwrap().code, KeyCode::Char('+'));
        assert_eq!(KeyBind::parse("Shift+R").unwrap().to_config_string(), "Shift+R");
    }

    #[test]
    fn match_key_prefers_more_modifiers() {
        let mut c = AppConfig::default();
        c.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(c.match_key(key(KeyCode::Char('r'), KeyModifiers::NONE)), Some(Action::Refresh));
        assert_eq!(c.match_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL)), Some(Action::Quit));
    }

    #[test]
    fn add_binding_steals_from_other_actions() {
        let mut c = AppConfig::default();
        let q = KeyBind::new(KeyCode::Char('q'), KeyModifiers::NONE);
        c.add_binding(Action::Refresh, q.clone());
        assert!(!c.bindings[&Action::Quit].contains(&q));
        assert_eq!(c.display_bindings(Action::Quit), "unbound");
    }

    #[test]
    fn default_page_keys_map_to_page_actions() {
        let c = AppConfig::default();
        assert_eq!(c.match_key(key(KeyCode::PageUp, KeyModifiers::NONE)), Some(Action::PageUp));
        assert_eq!(c.match_key(key(KeyCode::PageDown, KeyModifiers::NONE)), Some(Action::PageDown));
        assert_eq!(c.display_bindings(Action::PageDown), "PgDn");
    }
}
