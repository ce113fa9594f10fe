//! Pointer and device-tilt snapshot
//!
//! Event handlers write this between ticks; the tick reads it once at the top.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Last pointer position in surface-local coordinates
    pub pointer: Vec2,
    /// Pointer is over the surface
    pub active: bool,
    /// Primary button / touch is held
    pub down: bool,
    /// Device tilt, each axis roughly in [-1, 1]
    pub tilt: Vec2,
}

impl InputState {
    pub fn pointer_move(&mut self, pos: Vec2) {
        if pos.is_finite() {
            self.pointer = pos;
            self.active = true;
        }
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.pointer_move(pos);
        self.down = true;
        self.active = true;
    }

    pub fn pointer_up(&mut self) {
        self.down = false;
    }

    pub fn pointer_leave(&mut self) {
        self.active = false;
        self.down = false;
    }

    /// Set the tilt vector (from device orientation); clamped to the unit square
    pub fn set_tilt(&mut self, tilt: Vec2) {
        self.tilt = if tilt.is_finite() {
            tilt.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
        } else {
            Vec2::ZERO
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_lifecycle() {
        let mut input = InputState::default();
        input.pointer_down(Vec2::new(10.0, 20.0));
        assert!(input.active && input.down);
        input.pointer_up();
        assert!(input.active && !input.down);
        input.pointer_leave();
        assert!(!input.active);
        assert_eq!(input.pointer, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut input = InputState::default();
        input.pointer_move(Vec2::new(f32::NAN, 1.0));
        assert!(!input.active);
        input.set_tilt(Vec2::new(3.0, f32::INFINITY));
        assert_eq!(input.tilt, Vec2::ZERO);
        input.set_tilt(Vec2::new(3.0, -0.5));
        assert_eq!(input.tilt, Vec2::new(1.0, -0.5));
    }
}
