/// Keyboard input tracker.
///
/// Tracks which keys are held and which were freshly pressed during the
/// current frame. HUD key queries (`SceneHost::key_down`) are edge
/// triggered: a held pause key toggles once, not every frame.
///
/// Uses crossterm's keyboard enhancement for Release events when available
/// and falls back to timeout-based release detection otherwise.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

/// After this long without a Press/Repeat event, a key counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
}

/// Parse a config key name (`"Esc"`, `"P"`, `"F1"`, `"Space"`, ...).
pub fn parse_key(name: &str) -> Result<KeyCode, InputError> {
    let trimmed = name.trim();
    let upper = trimmed.to_ascii_uppercase();
    let code = match upper.as_str() {
        "ESC" | "ESCAPE" => KeyCode::Esc,
        "ENTER" | "RETURN" => KeyCode::Enter,
        "SPACE" => KeyCode::Char(' '),
        "TAB" => KeyCode::Tab,
        "BACKSPACE" => KeyCode::Backspace,
        "PAUSE" => KeyCode::Pause,
        "UP" => KeyCode::Up,
        "DOWN" => KeyCode::Down,
        "LEFT" => KeyCode::Left,
        "RIGHT" => KeyCode::Right,
        _ => {
            if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
                _ => return Err(InputError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(code)
}

/// Letters match regardless of case.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        let code = normalize(key.code);
        match key.kind {
            // Terminals without keyboard enhancement never send these; holds expire by timeout
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(code);
                self.last_active.insert(code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&normalize(code))
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&normalize(code))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
