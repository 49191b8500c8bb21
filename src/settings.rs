//! Match tuning and AI difficulty table
//!
//! Everything the simulation treats as an injected constant. Loaded from a
//! JSON file by the native runner; missing fields fall back to `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// AI difficulty levels, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Difficulty {
    VeryEasy,
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "Very Easy",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "veryeasy" => Some(Difficulty::VeryEasy),
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Position in the profile table
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Level at `index`, saturating at Expert
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// One step stronger (Expert stays Expert)
    pub fn harder(&self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

/// Speed multiplier and accuracy for one AI level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Fraction of paddle speed the AI may use
    pub speed: f32,
    /// 1.0 = perfect prediction, 0.0 = full error margin
    pub accuracy: f32,
}

/// Default profile table, indexed by `Difficulty::index`
pub const AI_PROFILES: [AiProfile; 5] = [
    AiProfile { speed: 0.4, accuracy: 0.5 },
    AiProfile { speed: 0.55, accuracy: 0.65 },
    AiProfile { speed: 0.75, accuracy: 0.8 },
    AiProfile { speed: 0.9, accuracy: 0.92 },
    AiProfile { speed: 1.0, accuracy: 0.98 },
];

/// Match configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub winning_score: u32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    /// Gap between the playfield edge and the paddle
    pub paddle_offset: f32,
    /// Baseline height multiplier applied on each difficulty level (1.0 disables)
    pub paddle_shrink_factor: f32,
    /// Baseline never drops below this fraction of `paddle_height`
    pub min_paddle_height_ratio: f32,
    pub drag_smoothing: f32,
    pub drag_snap_threshold: f32,
    pub combo_window_ms: f64,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_initial_speed: f32,
    /// Per-axis cap
    pub ball_max_speed: f32,
    pub ball_speed_increment: f32,
    pub max_bounce_angle_deg: f32,
    pub serve_dy_range: f32,
    pub trail_length: usize,
    pub curve_frequency: f32,
    pub curve_strength: f32,
    pub slow_motion_factor: f32,

    // === Power-ups ===
    pub power_up_radius: f32,
    pub power_up_spawn_interval_ms: f64,
    /// Lifetime of speed, size, curve and slow
    pub power_up_duration_ms: f64,
    pub invisible_duration_ms: f64,
    pub max_power_ups: usize,
    pub power_up_margin: f32,
    pub speed_boost_multiplier: f32,
    pub size_boost_multiplier: f32,
    pub extra_ball_count: usize,
    /// Multiball horizontal speed range
    pub extra_ball_speed_min: f32,
    pub extra_ball_speed_max: f32,
    pub extra_ball_dy_range: f32,

    // === Helper paddle ===
    pub helper_duration_ms: f64,
    pub helper_height: f32,
    pub helper_speed: f32,
    pub helper_gap: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub obstacle_speed: f32,
    pub obstacle_count: usize,
    pub max_obstacles: usize,
    pub obstacle_spawn_score: u32,
    pub obstacle_spread: f32,
    pub obstacle_margin: f32,

    // === Difficulty ramp ===
    pub difficulty_interval_ms: f64,
    pub speed_increase_factor: f32,

    // === AI ===
    pub ai_profiles: [AiProfile; 5],
    pub ai_start_level: Difficulty,
    pub ai_reaction_ms: f64,
    pub ai_error_margin: f32,
    pub ai_deadband: f32,
    /// Staircase the AI up as the human scores and time passes
    pub ai_escalation: bool,
    /// One level per this many human points
    pub ai_escalation_score_step: u32,
    /// One level per this much match time
    pub ai_escalation_interval_ms: f64,

    // === Misc ===
    pub max_particles: usize,
    pub particle_gravity: f32,
    pub paddle_hit_particles: usize,
    pub obstacle_hit_particles: usize,
    pub pickup_particles: usize,
    pub pickup_flash_particles: usize,
    pub level_up_particles: usize,
    pub gamepad_deadzone: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            winning_score: WINNING_SCORE,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            paddle_offset: PADDLE_OFFSET,
            paddle_shrink_factor: PADDLE_SHRINK_FACTOR,
            min_paddle_height_ratio: MIN_PADDLE_HEIGHT_RATIO,
            drag_smoothing: DRAG_SMOOTHING,
            drag_snap_threshold: DRAG_SNAP_THRESHOLD,
            combo_window_ms: COMBO_WINDOW_MS,

            ball_radius: BALL_RADIUS,
            ball_initial_speed: BALL_INITIAL_SPEED,
            ball_max_speed: BALL_MAX_SPEED,
            ball_speed_increment: BALL_SPEED_INCREMENT,
            max_bounce_angle_deg: MAX_BOUNCE_ANGLE_DEG,
            serve_dy_range: SERVE_DY_RANGE,
            trail_length: TRAIL_LENGTH,
            curve_frequency: CURVE_FREQUENCY,
            curve_strength: CURVE_STRENGTH,
            slow_motion_factor: SLOW_MOTION_FACTOR,

            power_up_radius: POWER_UP_RADIUS,
            power_up_spawn_interval_ms: POWER_UP_SPAWN_INTERVAL_MS,
            power_up_duration_ms: POWER_UP_DURATION_MS,
            invisible_duration_ms: INVISIBLE_DURATION_MS,
            max_power_ups: MAX_POWER_UPS,
            power_up_margin: POWER_UP_MARGIN,
            speed_boost_multiplier: SPEED_BOOST_MULTIPLIER,
            size_boost_multiplier: SIZE_BOOST_MULTIPLIER,
            extra_ball_count: EXTRA_BALL_COUNT,
            extra_ball_speed_min: EXTRA_BALL_SPEED_MIN,
            extra_ball_speed_max: EXTRA_BALL_SPEED_MAX,
            extra_ball_dy_range: EXTRA_BALL_DY_RANGE,

            helper_duration_ms: HELPER_DURATION_MS,
            helper_height: HELPER_HEIGHT,
            helper_speed: HELPER_SPEED,
            helper_gap: HELPER_GAP,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            obstacle_speed: OBSTACLE_SPEED,
            obstacle_count: OBSTACLE_COUNT,
            max_obstacles: MAX_OBSTACLES,
            obstacle_spawn_score: OBSTACLE_SPAWN_SCORE,
            obstacle_spread: OBSTACLE_SPREAD,
            obstacle_margin: OBSTACLE_MARGIN,

            difficulty_interval_ms: DIFFICULTY_INTERVAL_MS,
            speed_increase_factor: SPEED_INCREASE_FACTOR,

            ai_profiles: AI_PROFILES,
            ai_start_level: Difficulty::Medium,
            ai_reaction_ms: AI_REACTION_MS,
            ai_error_margin: AI_ERROR_MARGIN,
            ai_deadband: AI_DEADBAND,
            ai_escalation: true,
            ai_escalation_score_step: AI_ESCALATION_SCORE_STEP,
            ai_escalation_interval_ms: AI_ESCALATION_INTERVAL_MS,

            max_particles: MAX_PARTICLES,
            particle_gravity: PARTICLE_GRAVITY,
            paddle_hit_particles: PADDLE_HIT_PARTICLES,
            obstacle_hit_particles: OBSTACLE_HIT_PARTICLES,
            pickup_particles: PICKUP_PARTICLES,
            pickup_flash_particles: PICKUP_FLASH_PARTICLES,
            level_up_particles: LEVEL_UP_PARTICLES,
            gamepad_deadzone: GAMEPAD_DEADZONE,
        }
    }
}

impl Settings {
    /// Profile for an AI level
    pub fn ai_profile(&self, level: Difficulty) -> AiProfile {
        self.ai_profiles[level.index()]
    }

    /// Smallest height the difficulty ramp may shrink a paddle to
    pub fn min_paddle_height(&self) -> f32 {
        self.paddle_height * self.min_paddle_height_ratio
    }

    /// Vertical centre of the playfield
    pub fn center_y(&self) -> f32 {
        self.playfield_height / 2.0
    }

    /// Parse settings from JSON (missing fields take their defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Cannot read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }
}
