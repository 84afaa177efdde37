//! Keyboard mapping and per-frame input polling

use glam::Vec2;

use crate::sim::tick::FrameInput;

const ACTION_COUNT: usize = 7;

/// Logical buttons shared by keyboard and touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    /// Space: jump, charge or fire depending on the game
    Primary,
    Start,
    Pause,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Primary,
        Action::Start,
        Action::Pause,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Keyboard mapping (`KeyboardEvent.key` values)
    pub fn for_key(key: &str) -> Option<Action> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Action::Left),
            "ArrowRight" | "d" | "D" => Some(Action::Right),
            "ArrowUp" | "w" | "W" => Some(Action::Up),
            "ArrowDown" | "s" | "S" => Some(Action::Down),
            " " | "Spacebar" => Some(Action::Primary),
            "Enter" => Some(Action::Start),
            "p" | "P" | "Escape" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Anything that can report held buttons and an analog stick
pub trait InputSource {
    fn is_action_pressed(&self, action: Action) -> bool;

    /// x = right, y = up, each in [-1, 1]
    fn steering_axis(&self) -> Vec2;
}

/// Held keys, updated from key events
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: [bool; ACTION_COUNT],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the key is mapped (the caller should prevent the
    /// browser default, e.g. scrolling on space)
    pub fn key_down(&mut self, key: &str) -> bool {
        match Action::for_key(key) {
            Some(action) => {
                self.held[action.index()] = true;
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match Action::for_key(key) {
            Some(action) => {
                self.held[action.index()] = false;
                true
            }
            None => false,
        }
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.held = Default::default();
    }
}

impl InputSource for KeyboardState {
    fn is_action_pressed(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    fn steering_axis(&self) -> Vec2 {
        let axis = |neg: Action, pos: Action| {
            self.is_action_pressed(pos) as i32 as f32 - self.is_action_pressed(neg) as i32 as f32
        };
        Vec2::new(axis(Action::Left, Action::Right), axis(Action::Down, Action::Up))
    }
}

/// Keyboard OR touch
#[derive(Debug, Clone, Copy)]
pub struct CombinedInput<'a, T: InputSource> {
    pub keyboard: &'a KeyboardState,
    pub touch: Option<&'a T>,
}

impl<'a, T: InputSource> CombinedInput<'a, T> {
    pub fn new(keyboard: &'a KeyboardState, touch: Option<&'a T>) -> Self {
        Self { keyboard, touch }
    }
}

impl<T: InputSource> InputSource for CombinedInput<'_, T> {
    fn is_action_pressed(&self, action: Action) -> bool {
        self.keyboard.is_action_pressed(action) || self.touch.is_some_and(|t| t.is_action_pressed(action))
    }

    fn steering_axis(&self) -> Vec2 {
        let touch = self.touch.map(|t| t.steering_axis()).unwrap_or(Vec2::ZERO);
        (self.keyboard.steering_axis() + touch).clamp(Vec2::NEG_ONE, Vec2::ONE)
    }
}

/// Turns held buttons into a [`FrameInput`], with edge detection for the
/// one-shot actions
#[derive(Debug, Clone, Default)]
pub struct InputPoller {
    previous: [bool; ACTION_COUNT],
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll<S: InputSource>(&mut self, source: &S) -> FrameInput {
        let mut now = [false; ACTION_COUNT];
        for action in Action::ALL {
            now[action.index()] = source.is_action_pressed(action);
        }
        let held = |a: Action| now[a.index()];
        let pressed = |a: Action| now[a.index()] && !self.previous[a.index()];

        let input = FrameInput {
            steer: source.steering_axis(),
            jump: held(Action::Primary) || held(Action::Up),
            duck: held(Action::Down),
            fire: held(Action::Primary),
            left: pressed(Action::Left),
            right: pressed(Action::Right),
            start: pressed(Action::Start),
            pause: pressed(Action::Pause),
        };
        self.previous = now;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::touch::TouchControls;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::for_key("ArrowLeft"), Some(Action::Left));
        assert_eq!(Action::for_key("D"), Some(Action::Right));
        assert_eq!(Action::for_key(" "), Some(Action::Primary));
        assert_eq!(Action::for_key("Enter"), Some(Action::Start));
        assert_eq!(Action::for_key("p"), Some(Action::Pause));
        assert_eq!(Action::for_key("q"), None);
    }

    #[test]
    fn test_keyboard_axis() {
        let mut kb = KeyboardState::new();
        kb.key_down("ArrowRight");
        kb.key_down("w");
        assert_eq!(kb.steering_axis(), Vec2::new(1.0, 1.0));
        kb.key_down("a");
        assert_eq!(kb.steering_axis().x, 0.0);
        kb.clear();
        assert_eq!(kb.steering_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_one_shots_fire_once_per_press() {
        let mut kb = KeyboardState::new();
        let mut poller = InputPoller::new();
        let none: Option<&TouchControls> = None;

        kb.key_down("ArrowLeft");
        assert!(poller.poll(&CombinedInput::new(&kb, none)).left);
        // Still held: no repeat
        assert!(!poller.poll(&CombinedInput::new(&kb, none)).left);

        kb.key_up("ArrowLeft");
        poller.poll(&CombinedInput::new(&kb, none));
        kb.key_down("ArrowLeft");
        assert!(poller.poll(&CombinedInput::new(&kb, none)).left);
    }

    #[test]
    fn test_held_actions_repeat() {
        let mut kb = KeyboardState::new();
        let mut poller = InputPoller::new();
        kb.key_down(" ");
        for _ in 0..3 {
            let input = poller.poll(&kb);
            assert!(input.jump);
            assert!(input.fire);
        }
    }

    #[test]
    fn test_combined_touch_or_keyboard() {
        let kb = KeyboardState::new();
        let mut touch = TouchControls::new(120.0);
        touch.add_button("fire", Action::Primary);
        touch.button_down("fire");

        let combined = CombinedInput::new(&kb, Some(&touch));
        assert!(combined.is_action_pressed(Action::Primary));
        assert!(!combined.is_action_pressed(Action::Left));
    }
}
