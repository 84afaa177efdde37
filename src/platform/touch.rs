//! On-screen joystick and buttons for touch devices

use glam::Vec2;

use super::input::{Action, InputSource};

/// Dead margin between the stick's travel limit and the joystick rim (px)
const RIM_MARGIN: f32 = 10.0;

#[derive(Debug, Clone)]
struct TouchButton {
    id: String,
    action: Action,
    pressed: bool,
}

/// Virtual joystick plus a set of buttons bound to actions
#[derive(Debug, Clone)]
pub struct TouchControls {
    /// Joystick diameter (px)
    size: f32,
    /// Joystick center in client coordinates
    center: Vec2,
    /// Identifier of the touch driving the stick
    active_touch: Option<i32>,
    /// Stick deflection, screen orientation (y down), each axis in [-1, 1]
    direction: Vec2,
    buttons: Vec<TouchButton>,
}

impl TouchControls {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            center: Vec2::ZERO,
            active_touch: None,
            direction: Vec2::ZERO,
            buttons: Vec::new(),
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn add_button(&mut self, id: &str, action: Action) {
        self.buttons.push(TouchButton {
            id: id.to_string(),
            action,
            pressed: false,
        });
    }

    /// Furthest the stick travels from the center (px)
    pub fn max_distance(&self) -> f32 {
        (self.size / 2.0 - RIM_MARGIN).max(1.0)
    }

    pub fn joystick_start(&mut self, touch_id: i32) {
        self.active_touch = Some(touch_id);
    }

    /// Only the touch that started the gesture moves the stick
    pub fn joystick_move(&mut self, touch_id: i32, client: Vec2) {
        if self.active_touch != Some(touch_id) {
            return;
        }
        let max = self.max_distance();
        let delta = (client - self.center).clamp_length_max(max);
        self.direction = delta / max;
    }

    pub fn joystick_end(&mut self, touch_id: i32) {
        if self.active_touch == Some(touch_id) {
            self.active_touch = None;
            self.direction = Vec2::ZERO;
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Stick offset in px, for drawing the knob
    pub fn stick_offset(&self) -> Vec2 {
        self.direction * self.max_distance()
    }

    pub fn button_down(&mut self, id: &str) {
        self.set_button(id, true);
    }

    pub fn button_up(&mut self, id: &str) {
        self.set_button(id, false);
    }

    fn set_button(&mut self, id: &str, pressed: bool) {
        if let Some(button) = self.buttons.iter_mut().find(|b| b.id == id) {
            button.pressed = pressed;
        }
    }

    pub fn is_button_pressed(&self, id: &str) -> bool {
        self.buttons.iter().any(|b| b.id == id && b.pressed)
    }

    /// Release everything, e.g. on `touchcancel`
    pub fn reset(&mut self) {
        self.active_touch = None;
        self.direction = Vec2::ZERO;
        for button in &mut self.buttons {
            button.pressed = false;
        }
    }
}

impl InputSource for TouchControls {
    fn is_action_pressed(&self, action: Action) -> bool {
        self.buttons.iter().any(|b| b.action == action && b.pressed)
    }

    fn steering_axis(&self) -> Vec2 {
        // Screen y grows downward
        Vec2::new(self.direction.x, -self.direction.y)
    }
}

/// Phone/tablet user agents, or any narrow viewport
pub fn is_mobile(user_agent: &str, viewport_width: f64) -> bool {
    const MOBILE_AGENTS: [&str; 8] = [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];
    let ua = user_agent.to_lowercase();
    MOBILE_AGENTS.iter().any(|m| ua.contains(m)) || viewport_width < 768.0
}
