//! Pointer input state, unified across mouse and touch.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Unified pointer event. Mouse and touch both reduce to press, move and
/// release against canvas coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

/// Double-press detection constants.
const DOUBLE_PRESS_TIME_MS: u128 = 500;
const DOUBLE_PRESS_DISTANCE: f64 = 5.0;

/// Tracks pointer state across frames.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in canvas coordinates.
    pub position: Point,
    /// Whether the pointer is currently pressed.
    pub pressed: bool,
    /// Last press time for double-press detection.
    last_press_time: Option<Instant>,
    /// Last press position for double-press detection.
    last_press_position: Option<Point>,
    /// Whether the most recent press was a double-press.
    double_press: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            pressed: false,
            last_press_time: None,
            last_press_position: None,
            double_press: false,
        }
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => {
                self.position = position;
                self.pressed = true;
                self.double_press = self.detect_double_press(position);
            }
            PointerEvent::Move { position } => {
                self.position = position;
            }
            PointerEvent::Up { position } => {
                self.position = position;
                self.pressed = false;
            }
        }
    }

    fn detect_double_press(&mut self, position: Point) -> bool {
        let now = Instant::now();
        let hit = if let (Some(last_time), Some(last_pos)) =
            (self.last_press_time, self.last_press_position)
        {
            let elapsed = now.duration_since(last_time).as_millis();
            let distance = ((position.x - last_pos.x).powi(2)
                + (position.y - last_pos.y).powi(2))
            .sqrt();
            elapsed < DOUBLE_PRESS_TIME_MS && distance < DOUBLE_PRESS_DISTANCE
        } else {
            false
        };

        if hit {
            // Reset so a triple press is not another double press.
            self.last_press_time = None;
            self.last_press_position = None;
        } else {
            self.last_press_time = Some(now);
            self.last_press_position = Some(position);
        }
        hit
    }

    /// Whether the most recent press was a double press.
    pub fn is_double_press(&self) -> bool {
        self.double_press
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_tracking() {
        let mut input = InputState::new();
        input.handle(PointerEvent::Down { position: Point::new(100.0, 100.0) });
        assert!(input.pressed);
        assert_eq!(input.position, Point::new(100.0, 100.0));

        input.handle(PointerEvent::Move { position: Point::new(150.0, 120.0) });
        assert!(input.pressed);
        assert_eq!(input.position, Point::new(150.0, 120.0));

        input.handle(PointerEvent::Up { position: Point::new(150.0, 120.0) });
        assert!(!input.pressed);
    }

    #[test]
    fn test_double_press_detection() {
        let mut input = InputState::new();
        let pos = Point::new(100.0, 100.0);

        input.handle(PointerEvent::Down { position: pos });
        assert!(!input.is_double_press());
        input.handle(PointerEvent::Up { position: pos });

        input.handle(PointerEvent::Down { position: pos });
        assert!(input.is_double_press());
    }

    #[test]
    fn test_double_press_too_far() {
        let mut input = InputState::new();
        input.handle(PointerEvent::Down { position: Point::new(100.0, 100.0) });
        input.handle(PointerEvent::Up { position: Point::new(100.0, 100.0) });

        input.handle(PointerEvent::Down { position: Point::new(200.0, 200.0) });
        assert!(!input.is_double_press());
    }

    #[test]
    fn test_triple_press_is_single() {
        let mut input = InputState::new();
        let pos = Point::new(50.0, 50.0);
        for expected in [false, true, false] {
            input.handle(PointerEvent::Down { position: pos });
            assert_eq!(input.is_double_press(), expected);
            input.handle(PointerEvent::Up { position: pos });
        }
    }
}
