// Copyright (c) 2026 rezky_nightky

use std::collections::{BTreeMap, HashMap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::SettingsError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tunable {
    Gravitation,
    Wind,
    WindVariation,
    Temperature,
    MaxSpeed,
    FrameRate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

impl Tunable {
    pub fn step(self) -> f64 {
        match self {
            Tunable::Gravitation => 0.05,
            Tunable::Wind => 0.05,
            Tunable::WindVariation => 0.01,
            Tunable::Temperature => 0.1,
            Tunable::MaxSpeed => 0.1,
            Tunable::FrameRate => 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Lightning,
    Adjust(Tunable, Direction),
    ToggleStatus,
    ToggleHelp,
    ToggleClouds,
    SaveConfig,
    ReloadConfig,
}

/// Logical name, action, default key and help text, in help-panel order.
#[rustfmt::skip]
const BINDINGS: &[(&str, Action, &str, &str)] = &[
    ("quit", Action::Quit, "q", "quit"),
    ("lightning", Action::Lightning, "t", "lightning strike"),
    ("gravity_up", Action::Adjust(Tunable::Gravitation, Direction::Up), "+", "gravity +"),
    ("gravity_down", Action::Adjust(Tunable::Gravitation, Direction::Down), "-", "gravity -"),
    ("wind_left", Action::Adjust(Tunable::Wind, Direction::Down), "left", "wind to the left"),
    ("wind_right", Action::Adjust(Tunable::Wind, Direction::Up), "right", "wind to the right"),
    ("gusts_up", Action::Adjust(Tunable::WindVariation, Direction::Up), "]", "gustier wind"),
    ("gusts_down", Action::Adjust(Tunable::WindVariation, Direction::Down), "[", "steadier wind"),
    ("warmer", Action::Adjust(Tunable::Temperature, Direction::Up), "w", "warmer"),
    ("colder", Action::Adjust(Tunable::Temperature, Direction::Down), "c", "colder"),
    ("faster", Action::Adjust(Tunable::MaxSpeed, Direction::Up), "up", "max fall speed +"),
    ("slower", Action::Adjust(Tunable::MaxSpeed, Direction::Down), "down", "max fall speed -"),
    ("fps_up", Action::Adjust(Tunable::FrameRate, Direction::Up), ">", "frame rate +"),
    ("fps_down", Action::Adjust(Tunable::FrameRate, Direction::Down), "<", "frame rate -"),
    ("toggle_status", Action::ToggleStatus, "d", "status line"),
    ("toggle_help", Action::ToggleHelp, "h", "this help"),
    ("toggle_clouds", Action::ToggleClouds, "k", "clouds"),
    ("save", Action::SaveConfig, "s", "save settings"),
    ("reload", Action::ReloadConfig, "r", "reload settings"),
];

pub fn default_bindings() -> BTreeMap<String, String> {
    BINDINGS
        .iter()
        .map(|(name, _, key, _)| (name.to_string(), key.to_string()))
        .collect()
}

pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = s.trim().to_ascii_lowercase();
    let code = match lower.as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        f if f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
        _ => return None,
    };
    Some(code)
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        other => format!("{other:?}").to_ascii_lowercase(),
    }
}

#[derive(Clone, Debug)]
pub struct KeyMap {
    keys: HashMap<KeyCode, Action>,
    help: Vec<(String, &'static str)>,
}

impl KeyMap {
    /// Resolves logical names from the settings file. Names missing from
    /// `bindings` keep their default key.
    pub fn resolve(bindings: &BTreeMap<String, String>) -> Result<Self, SettingsError> {
        if let Some(unknown) = bindings
            .keys()
            .find(|name| !BINDINGS.iter().any(|(n, ..)| n == name))
        {
            return Err(SettingsError::UnknownAction(unknown.clone()));
        }

        let mut keys: HashMap<KeyCode, Action> = HashMap::new();
        let mut owner: HashMap<KeyCode, &str> = HashMap::new();
        let mut help = Vec::with_capacity(BINDINGS.len());

        for &(name, action, default_key, text) in BINDINGS {
            let raw = bindings.get(name).map(String::as_str).unwrap_or(default_key);
            let code = parse_key(raw).ok_or_else(|| SettingsError::UnknownKey {
                action: name.to_string(),
                key: raw.to_string(),
            })?;
            if let Some(first) = owner.insert(code, name) {
                return Err(SettingsError::DuplicateKey {
                    key: raw.to_string(),
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
            keys.insert(code, action);
            help.push((key_label(code), text));
        }

        Ok(Self { keys, help })
    }

    pub fn action_for(&self, ev: &KeyEvent) -> Option<Action> {
        if ev.code == KeyCode::Esc
            || (ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Some(Action::Quit);
        }
        self.keys.get(&ev.code).copied()
    }

    pub fn help_rows(&self) -> &[(String, &'static str)] {
        &self.help
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::resolve(&BTreeMap::new()).unwrap_or_else(|_| Self {
            keys: HashMap::new(),
            help: Vec::new(),
        })
    }
}
