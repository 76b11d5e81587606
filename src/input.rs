//! Input handling with NES-style auto-repeat
//!
//! Two layers: `KeyTracker` turns terminal key events into per-tick button
//! levels, and `InputState` turns consecutive levels into edge signals.
//! Release events are used when the terminal reports them; otherwise a key is
//! considered released once no event has been seen for a short timeout.

use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Ticks a repeatable button must be held before it starts repeating
const REPEAT_DELAY: u32 = 10;
/// Ticks skipped between repeats (fires on the next one)
const REPEAT_SKIP: u32 = 5;

const BUTTON_COUNT: usize = 9;

/// Logical buttons the game reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCcw,
    RotateCw,
    Up,
    Down,
    Pause,
    Drop,
}

impl Button {
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::MoveLeft,
        Button::MoveRight,
        Button::SoftDrop,
        Button::RotateCcw,
        Button::RotateCw,
        Button::Up,
        Button::Down,
        Button::Pause,
        Button::Drop,
    ];

    /// Whether holding this button produces repeated presses
    pub fn repeats(self) -> bool {
        matches!(
            self,
            Button::MoveLeft | Button::MoveRight | Button::SoftDrop | Button::Up | Button::Down
        )
    }
}

/// One boolean per button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub move_left: bool,
    pub move_right: bool,
    pub soft_drop: bool,
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
    pub up: bool,
    pub down: bool,
    pub pause: bool,
    pub drop: bool,
}

impl Buttons {
    pub fn get(&self, button: Button) -> bool {
        match button {
            Button::MoveLeft => self.move_left,
            Button::MoveRight => self.move_right,
            Button::SoftDrop => self.soft_drop,
            Button::RotateCcw => self.rotate_ccw,
            Button::RotateCw => self.rotate_cw,
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Pause => self.pause,
            Button::Drop => self.drop,
        }
    }

    pub fn set(&mut self, button: Button, value: bool) {
        let slot = match button {
            Button::MoveLeft => &mut self.move_left,
            Button::MoveRight => &mut self.move_right,
            Button::SoftDrop => &mut self.soft_drop,
            Button::RotateCcw => &mut self.rotate_ccw,
            Button::RotateCw => &mut self.rotate_cw,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Pause => &mut self.pause,
            Button::Drop => &mut self.drop,
        };
        *slot = value;
    }

    /// Shorthand for building a snapshot with the given buttons down
    #[cfg(test)]
    pub fn with(buttons: &[Button]) -> Self {
        let mut levels = Self::default();
        for &button in buttons {
            levels.set(button, true);
        }
        levels
    }
}

/// Button levels plus the edges derived from the previous tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Raw levels this tick
    pub held: Buttons,
    /// Just pressed this tick, or auto-repeated
    pub pressed: Buttons,
    /// Ticks since the last release or new repeatable press
    frame_count: u32,
    /// Ticks since the last repeat fired
    skip_count: u32,
}

impl InputState {
    /// Derive the next tick's state from this one and the new raw levels
    pub fn next(&self, raw: Buttons) -> InputState {
        let mut pressed = Buttons::default();
        let mut restart = false;
        for button in Button::ALL {
            let before = self.held.get(button);
            let now = raw.get(button);
            pressed.set(button, now && !before);
            if (before && !now) || (now && !before && button.repeats()) {
                restart = true;
            }
        }

        let (frame_count, mut skip_count) = if restart {
            (0, 0)
        } else {
            (self.frame_count.saturating_add(1), self.skip_count)
        };

        if frame_count >= REPEAT_DELAY {
            let fire = skip_count >= REPEAT_SKIP;
            skip_count = if fire { 0 } else { skip_count + 1 };
            for button in Button::ALL.into_iter().filter(|b| b.repeats()) {
                pressed.set(button, fire && raw.get(button));
            }
        }

        InputState {
            held: raw,
            pressed,
            frame_count,
            skip_count,
        }
    }
}

/// Key bindings configuration - supports multiple keys per button
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub up: Vec<KeyCode>,
    pub down: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub drop: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        tracing::warn!("Ignoring unknown key binding {:?}", s);
                        return None;
                    }
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            up: Self::parse_keys(&keys.up),
            down: Self::parse_keys(&keys.down),
            pause: Self::parse_keys(&keys.pause),
            drop: Self::parse_keys(&keys.drop),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    fn keys(&self, button: Button) -> &[KeyCode] {
        match button {
            Button::MoveLeft => &self.move_left,
            Button::MoveRight => &self.move_right,
            Button::SoftDrop => &self.soft_drop,
            Button::RotateCcw => &self.rotate_ccw,
            Button::RotateCw => &self.rotate_cw,
            Button::Up => &self.up,
            Button::Down => &self.down,
            Button::Pause => &self.pause,
            Button::Drop => &self.drop,
        }
    }

    /// Buttons bound to a key (a key may drive several)
    fn buttons_for(&self, code: KeyCode) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(move |&button| self.keys(button).contains(&code))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Tracks which buttons are down from terminal key events
pub struct KeyTracker {
    bindings: KeyBindings,
    /// Last press or repeat event per button, None when released
    last_seen: [Option<Instant>; BUTTON_COUNT],
    /// Pressed since the last `levels` call; keeps a press-and-release within one tick visible
    tapped: [bool; BUTTON_COUNT],
    key_timeout: Duration,
    release_events: bool,
}

impl KeyTracker {
    pub fn new(bindings: KeyBindings, key_timeout: Duration) -> Self {
        Self {
            bindings,
            last_seen: [None; BUTTON_COUNT],
            tapped: [false; BUTTON_COUNT],
            key_timeout,
            release_events: false,
        }
    }

    /// Create a tracker from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            KeyBindings::from_settings(settings),
            Duration::from_millis(settings.gameplay.key_timeout_ms),
        )
    }

    /// Tell the tracker whether the terminal reports key releases
    pub fn set_release_events(&mut self, enabled: bool) {
        self.release_events = enabled;
    }

    /// Handle a key event. Returns true when the key asks to quit.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let code = normalize_key(key.code);
        if key.kind == KeyEventKind::Press && self.bindings.quit.contains(&code) {
            return true;
        }

        for button in self.bindings.buttons_for(code) {
            let slot = button as usize;
            match key.kind {
                KeyEventKind::Press => {
                    self.last_seen[slot] = Some(now);
                    self.tapped[slot] = true;
                }
                KeyEventKind::Repeat => self.last_seen[slot] = Some(now),
                KeyEventKind::Release => self.last_seen[slot] = None,
            }
        }
        false
    }

    /// Button levels for this tick (call once per frame)
    pub fn levels(&mut self, now: Instant) -> Buttons {
        let mut levels = Buttons::default();
        for button in Button::ALL {
            let slot = button as usize;
            if !self.release_events {
                if let Some(seen) = self.last_seen[slot] {
                    if now.duration_since(seen) > self.key_timeout {
                        self.last_seen[slot] = None;
                    }
                }
            }
            levels.set(button, self.last_seen[slot].is_some() || self.tapped[slot]);
            self.tapped[slot] = false;
        }
        levels
    }

    /// Forget all held keys
    pub fn clear(&mut self) {
        self.last_seen = [None; BUTTON_COUNT];
        self.tapped = [false; BUTTON_COUNT];
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    /// Feed the same levels for `ticks` ticks, collecting the pressed signals
    fn hold(state: &mut InputState, raw: Buttons, ticks: usize) -> Vec<Buttons> {
        (0..ticks)
            .map(|_| {
                *state = state.next(raw);
                state.pressed
            })
            .collect()
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_edge_only_on_first_tick() {
        let mut state = InputState::default();
        let pressed = hold(&mut state, Buttons::with(&[Button::RotateCw]), 30);
        assert!(pressed[0].rotate_cw);
        // Rotation never repeats
        assert!(pressed[1..].iter().all(|p| !p.rotate_cw));
    }

    #[test]
    fn test_release_is_not_a_press() {
        let mut state = InputState::default();
        state = state.next(Buttons::with(&[Button::Pause]));
        assert!(state.pressed.pause);
        state = state.next(Buttons::default());
        assert!(!state.pressed.pause);
        assert_eq!(state.pressed, Buttons::default());
    }

    #[test]
    fn test_auto_repeat_timing() {
        let mut state = InputState::default();
        let pressed = hold(&mut state, Buttons::with(&[Button::MoveLeft]), 40);
        let fired: Vec<usize> = pressed
            .iter()
            .enumerate()
            .filter(|(_, p)| p.move_left)
            .map(|(tick, _)| tick)
            .collect();
        // Initial press, then every sixth tick once ten ticks have passed
        assert_eq!(fired, vec![0, 15, 21, 27, 33, 39]);
    }

    #[test]
    fn test_release_restarts_repeat_delay() {
        let mut state = InputState::default();
        hold(&mut state, Buttons::with(&[Button::SoftDrop]), 20);
        state = state.next(Buttons::default());
        let pressed = hold(&mut state, Buttons::with(&[Button::SoftDrop]), 12);
        assert!(pressed[0].soft_drop);
        assert!(pressed[1..].iter().all(|p| !p.soft_drop));
    }

    #[test]
    fn test_new_press_after_idle_fires_immediately() {
        let mut state = InputState::default();
        // Idle long enough to be past the repeat delay
        hold(&mut state, Buttons::default(), 50);
        state = state.next(Buttons::with(&[Button::MoveRight]));
        assert!(state.pressed.move_right);
    }

    #[test]
    fn test_edge_buttons_unaffected_by_repeat_phase() {
        let mut state = InputState::default();
        let held = Buttons::with(&[Button::MoveLeft]);
        hold(&mut state, held, 12);
        // Rotation pressed while left is repeating still registers
        state = state.next(Buttons::with(&[Button::MoveLeft, Button::RotateCcw]));
        assert!(state.pressed.rotate_ccw);
    }

    #[test]
    fn test_buttons_get_set() {
        let mut buttons = Buttons::default();
        for button in Button::ALL {
            assert!(!buttons.get(button));
            buttons.set(button, true);
            assert!(buttons.get(button));
        }
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert!(bindings.move_left.contains(&KeyCode::Char('a')));
        assert!(bindings.rotate_cw.contains(&KeyCode::Right));
        assert!(bindings.drop.contains(&KeyCode::Char(' ')));
        let down: Vec<_> = bindings.buttons_for(KeyCode::Down).collect();
        assert_eq!(down, vec![Button::Down]);
    }

    #[test]
    fn test_tracker_timeout_release() {
        let mut tracker = KeyTracker::new(KeyBindings::default(), Duration::from_millis(100));
        let start = Instant::now();
        assert!(!tracker.handle_key(key(KeyCode::Char('A'), KeyEventKind::Press), start));

        assert!(tracker.levels(start).move_left);
        assert!(tracker.levels(start + Duration::from_millis(50)).move_left);
        assert!(!tracker.levels(start + Duration::from_millis(150)).move_left);
    }

    #[test]
    fn test_tracker_release_events() {
        let mut tracker = KeyTracker::new(KeyBindings::default(), Duration::from_millis(100));
        tracker.set_release_events(true);
        let start = Instant::now();
        tracker.handle_key(key(KeyCode::Char('d'), KeyEventKind::Press), start);
        // No timeout when releases are reported
        assert!(tracker.levels(start + Duration::from_secs(2)).move_right);

        tracker.handle_key(key(KeyCode::Char('d'), KeyEventKind::Release), start);
        assert!(!tracker.levels(start).move_right);
    }

    #[test]
    fn test_tracker_sees_tap_within_one_tick() {
        let mut tracker = KeyTracker::new(KeyBindings::default(), Duration::from_millis(100));
        tracker.set_release_events(true);
        let now = Instant::now();
        tracker.handle_key(key(KeyCode::Char('p'), KeyEventKind::Press), now);
        tracker.handle_key(key(KeyCode::Char('p'), KeyEventKind::Release), now);
        assert!(tracker.levels(now).pause);
        assert!(!tracker.levels(now).pause);
    }

    #[test]
    fn test_tracker_clear_drops_held_keys() {
        let mut tracker = KeyTracker::new(KeyBindings::default(), Duration::from_millis(100));
        tracker.set_release_events(true);
        let now = Instant::now();
        tracker.handle_key(key(KeyCode::Char('a'), KeyEventKind::Press), now);
        tracker.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press), now);

        // Focus lost: the release for these keys never arrives
        tracker.clear();
        assert_eq!(tracker.levels(now + Duration::from_secs(1)), Buttons::default());
    }

    #[test]
    fn test_tracker_quit_keys() {
        let mut tracker = KeyTracker::new(KeyBindings::default(), Duration::from_millis(100));
        let now = Instant::now();
        assert!(tracker.handle_key(key(KeyCode::Esc, KeyEventKind::Press), now));
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'), KeyEventKind::Press)
        };
        assert!(tracker.handle_key(ctrl_c, now));
    }
}
