//! Power Pong - arcade Pong with power-ups, an AI opponent and tournaments
//!
//! Core modules:
//! - `sim`: Simulation (entities, physics, effects, AI, match loop)
//! - `tournament`: Three-player round-robin with seeded final battles
//! - `settings`: Injected tuning constants and AI difficulty table

pub mod settings;
pub mod sim;
pub mod tournament;

pub use settings::{AiProfile, Difficulty, Settings};
pub use tournament::{Tournament, TournamentMatch, TournamentPlayer, TournamentStatus};

/// Default tuning values (the `Settings` defaults)
pub mod consts {
    /// Nominal display tick (~60 Hz), in milliseconds
    pub const TICK_MS: f64 = 1000.0 / 60.0;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1200.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// First to this score wins the match
    pub const WINNING_SCORE: u32 = 10;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    pub const PADDLE_OFFSET: f32 = 10.0;
    /// Difficulty shrink per level (multiplicative) and the floor it stops at
    pub const PADDLE_SHRINK_FACTOR: f32 = 0.9;
    pub const MIN_PADDLE_HEIGHT_RATIO: f32 = 0.5;
    /// Pointer drag: fraction of the gap closed per tick, snap distance
    pub const DRAG_SMOOTHING: f32 = 0.3;
    pub const DRAG_SNAP_THRESHOLD: f32 = 2.0;
    /// Combo resets after this long without a hit
    pub const COMBO_WINDOW_MS: f64 = 3000.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_INITIAL_SPEED: f32 = 5.0;
    pub const BALL_MAX_SPEED: f32 = 18.0;
    /// Speed-up on every paddle hit (multiplicative)
    pub const BALL_SPEED_INCREMENT: f32 = 1.05;
    /// Steepest deflection at the paddle edge (degrees)
    pub const MAX_BOUNCE_ANGLE_DEG: f32 = 60.0;
    /// Serve: vertical velocity drawn from [-range, range)
    pub const SERVE_DY_RANGE: f32 = 2.0;
    pub const TRAIL_LENGTH: usize = 10;
    pub const CURVE_FREQUENCY: f32 = 0.02;
    pub const CURVE_STRENGTH: f32 = 0.3;
    pub const SLOW_MOTION_FACTOR: f32 = 0.5;

    /// Power-up defaults
    pub const POWER_UP_RADIUS: f32 = 15.0;
    pub const POWER_UP_SPAWN_INTERVAL_MS: f64 = 8000.0;
    pub const POWER_UP_DURATION_MS: f64 = 5000.0;
    pub const INVISIBLE_DURATION_MS: f64 = 4000.0;
    pub const MAX_POWER_UPS: usize = 2;
    /// Power-ups spawn at least this far from every edge
    pub const POWER_UP_MARGIN: f32 = 100.0;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 2.0;
    pub const SIZE_BOOST_MULTIPLIER: f32 = 1.5;
    pub const EXTRA_BALL_COUNT: usize = 2;
    /// Multiball: horizontal speed drawn from [min, max), vertical from [-range, range)
    pub const EXTRA_BALL_SPEED_MIN: f32 = 4.0;
    pub const EXTRA_BALL_SPEED_MAX: f32 = 7.0;
    pub const EXTRA_BALL_DY_RANGE: f32 = 4.0;

    /// Helper paddle defaults
    pub const HELPER_DURATION_MS: f64 = 8000.0;
    pub const HELPER_HEIGHT: f32 = 60.0;
    pub const HELPER_SPEED: f32 = 6.0;
    /// Distance between the owner's paddle face and the helper
    pub const HELPER_GAP: f32 = 80.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 15.0;
    pub const OBSTACLE_HEIGHT: f32 = 60.0;
    pub const OBSTACLE_SPEED: f32 = 2.0;
    pub const OBSTACLE_COUNT: usize = 3;
    pub const MAX_OBSTACLES: usize = 6;
    /// Combined score that switches obstacles on
    pub const OBSTACLE_SPAWN_SCORE: u32 = 5;
    /// Horizontal scatter around the centre line
    pub const OBSTACLE_SPREAD: f32 = 150.0;
    pub const OBSTACLE_MARGIN: f32 = 50.0;

    /// Difficulty ramp
    pub const DIFFICULTY_INTERVAL_MS: f64 = 30_000.0;
    pub const SPEED_INCREASE_FACTOR: f32 = 1.1;

    /// AI defaults
    pub const AI_REACTION_MS: f64 = 100.0;
    pub const AI_ERROR_MARGIN: f32 = 15.0;
    pub const AI_DEADBAND: f32 = 5.0;
    pub const AI_ESCALATION_SCORE_STEP: u32 = 3;
    pub const AI_ESCALATION_INTERVAL_MS: f64 = 60_000.0;

    /// Particles
    pub const MAX_PARTICLES: usize = 500;
    pub const PARTICLE_GRAVITY: f32 = 0.1;
    /// Burst sizes
    pub const PADDLE_HIT_PARTICLES: usize = 10;
    pub const OBSTACLE_HIT_PARTICLES: usize = 15;
    /// A pickup fires two bursts: a spark then a flash
    pub const PICKUP_PARTICLES: usize = 20;
    pub const PICKUP_FLASH_PARTICLES: usize = 30;
    pub const LEVEL_UP_PARTICLES: usize = 30;

    /// Analog stick deadzone
    pub const GAMEPAD_DEADZONE: f32 = 0.15;

    /// Palette (0xRRGGBB)
    pub const COLOR_PLAYER1: u32 = 0xff6b6b;
    pub const COLOR_PLAYER2: u32 = 0x4ecdc4;
    pub const COLOR_PLAYER3: u32 = 0xf39c12;
    pub const COLOR_HELPER: u32 = 0x00ff88;
    pub const COLOR_OBSTACLE: u32 = 0xff3333;
    pub const COLOR_LEVEL_UP: u32 = 0xff00ff;
}
