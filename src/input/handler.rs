use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::DriveInput;

/// Keys that stay "down" between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveKey {
    Throttle,
    Brake,
    Left,
    Right,
    Cruise,
    Boost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Drive(DriveKey),
    Save,
    Restart,
    Quit,
    /// A key with no binding; the race shows a hint
    Unbound,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up => KeyAction::Drive(DriveKey::Throttle),
            KeyCode::Down => KeyAction::Drive(DriveKey::Brake),
            KeyCode::Left => KeyAction::Drive(DriveKey::Left),
            KeyCode::Right => KeyAction::Drive(DriveKey::Right),
            KeyCode::Tab => KeyAction::Drive(DriveKey::Boost),
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Drive(DriveKey::Cruise),

            // Controls
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Save,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::Unbound,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive keys currently held down.
///
/// Most terminals only report presses and auto-repeats, so a key counts
/// as held for `hold_window` after its last press. Once a release event
/// has been seen the terminal reports releases, and keys stay down until
/// released.
#[derive(Debug, Clone)]
pub struct HeldKeys {
    pressed: HashMap<DriveKey, Instant>,
    hold_window: Duration,
    reports_release: bool,
}

impl HeldKeys {
    pub fn new(hold_window: Duration) -> Self {
        Self {
            pressed: HashMap::new(),
            hold_window,
            reports_release: false,
        }
    }

    pub fn handle(&mut self, key: DriveKey, kind: KeyEventKind, now: Instant) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.pressed.insert(key, now);
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.pressed.remove(&key);
            }
        }
    }

    pub fn is_held(&self, key: DriveKey, now: Instant) -> bool {
        self.pressed.get(&key).is_some_and(|&last| {
            self.reports_release || now.saturating_duration_since(last) <= self.hold_window
        })
    }

    /// Held keys as this tick's drive input
    pub fn input(&self, now: Instant) -> DriveInput {
        DriveInput {
            throttle: self.is_held(DriveKey::Throttle, now),
            brake: self.is_held(DriveKey::Brake, now),
            left: self.is_held(DriveKey::Left, now),
            right: self.is_held(DriveKey::Right, now),
            boost: self.is_held(DriveKey::Boost, now),
            cruise: self.is_held(DriveKey::Cruise, now),
        }
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}
