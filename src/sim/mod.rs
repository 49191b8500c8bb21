//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Input arrives as a per-tick snapshot, never read from devices
//! - Seeded RNG only
//! - Timed effects expire against match time, no deferred callbacks
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod effects;
pub mod input;
pub mod state;
pub mod tick;

pub use ai::{AiController, fold_into_playfield, predict_intercept_y};
pub use collision::{BounceParams, circle_circle_overlap, circle_rect_overlap, paddle_bounce};
pub use effects::{BallEffect, BallEffects, PaddleEffects, apply_power_up};
pub use input::{ControlScheme, DirectionKeys, Steering, TickInput};
pub use state::{
    ActiveEffect, Ball, Controller, GameEvent, GameMode, GamePhase, GameState, HelperBrain,
    MatchStatus, Obstacle, Paddle, Particle, PowerUp, PowerUpKind, Side,
};
pub use tick::tick;
