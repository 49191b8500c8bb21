//! Per-tick input snapshot and paddle steering
//!
//! The simulation never reads devices. The host samples keyboard, touch,
//! pointer or gamepad once per frame and hands the result to `tick`.

use serde::{Deserialize, Serialize};

use super::state::Side;

/// A pair of up/down buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionKeys {
    pub up: bool,
    pub down: bool,
}

impl DirectionKeys {
    pub const UP: Self = Self { up: true, down: false };
    pub const DOWN: Self = Self { up: false, down: true };

    /// Map an analog stick axis (-1 = up, 1 = down) to buttons
    pub fn from_axis(axis: f32, deadzone: f32) -> Self {
        if !axis.is_finite() || axis.abs() <= deadzone {
            return Self::default();
        }
        Self {
            up: axis < 0.0,
            down: axis > 0.0,
        }
    }

    /// Either source pressing a button presses it
    pub fn merge(self, other: Self) -> Self {
        Self {
            up: self.up || other.up,
            down: self.down || other.down,
        }
    }

    /// -1 for up, 1 for down, 0 for neither (up wins when both are held)
    pub fn direction(&self) -> f32 {
        if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        }
    }
}

/// Which key pair drives a human paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    Wasd,
    Arrows,
}

impl ControlScheme {
    /// Scheme used when a paddle has none assigned
    pub fn default_for(side: Side) -> Self {
        match side {
            Side::Left => ControlScheme::Wasd,
            Side::Right => ControlScheme::Arrows,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// W/S keys
    pub wasd: DirectionKeys,
    /// Arrow keys
    pub arrows: DirectionKeys,
    /// Pointer/touch drag target (paddle centre y), per side
    pub left_drag: Option<f32>,
    pub right_drag: Option<f32>,
    /// Start/pause toggle
    pub pause: bool,
    /// Restart the match
    pub reset: bool,
}

impl TickInput {
    pub fn keys(&self, scheme: ControlScheme) -> DirectionKeys {
        match scheme {
            ControlScheme::Wasd => self.wasd,
            ControlScheme::Arrows => self.arrows,
        }
    }

    pub fn drag(&self, side: Side) -> Option<f32> {
        match side {
            Side::Left => self.left_drag,
            Side::Right => self.right_drag,
        }
    }

    /// Fold an analog stick into the key pair of `scheme`
    pub fn merge_axis(&mut self, scheme: ControlScheme, axis: f32, deadzone: f32) {
        let pad = DirectionKeys::from_axis(axis, deadzone);
        match scheme {
            ControlScheme::Wasd => self.wasd = self.wasd.merge(pad),
            ControlScheme::Arrows => self.arrows = self.arrows.merge(pad),
        }
    }

    /// Human steering for a paddle: a finite drag target beats the keys
    pub fn steering_for(&self, side: Side, scheme: Option<ControlScheme>) -> Steering {
        if let Some(target) = self.drag(side).filter(|t| t.is_finite()) {
            return Steering::Drag(target);
        }
        let scheme = scheme.unwrap_or_else(|| ControlScheme::default_for(side));
        Steering::Keys(self.keys(scheme))
    }
}

/// How a paddle wants to move this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// No movement
    Idle,
    /// Ease the paddle centre toward a y coordinate
    Drag(f32),
    /// Move at full speed while a key is held
    Keys(DirectionKeys),
    /// Move the centre toward `target` at `speed_scale` of paddle speed,
    /// stopping inside the deadband
    Chase { target: f32, speed_scale: f32 },
}
