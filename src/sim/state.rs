//! Match state and entity types
//!
//! Everything a renderer or scoreboard needs to read lives here. The match
//! controller in `tick` is the only writer.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiController;
use super::collision::{circle_circle_overlap, circle_rect_overlap, clamp_axes, hit_offset};
use super::effects::{BallEffect, BallEffects, PaddleEffects};
use super::input::{ControlScheme, Steering};
use crate::consts::*;
use crate::settings::{Difficulty, Settings};
use crate::tournament::{Tournament, TournamentStatus};

/// Which half of the playfield a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Side of the playfield containing `x`
    pub fn of_x(x: f32, playfield_width: f32) -> Side {
        if x < playfield_width / 2.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Horizontal velocity sign of a ball heading into this side's goal
    pub fn incoming_sign(&self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Lifecycle of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start toggle
    NotStarted,
    Running,
    Paused,
    /// Match (or tournament) finished; only a reset leaves this
    Over,
}

/// Who holds the paddles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Human on the left, AI on the right
    SinglePlayer,
    TwoPlayer,
    /// Two human paddles shared by three tournament players
    ThreePlayer,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    Size,
    Freeze,
    Invisible,
    MultiBall,
    Curve,
    Slow,
    Helper,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::Speed,
        PowerUpKind::Size,
        PowerUpKind::Freeze,
        PowerUpKind::Invisible,
        PowerUpKind::MultiBall,
        PowerUpKind::Curve,
        PowerUpKind::Slow,
        PowerUpKind::Helper,
    ];

    /// Pickup burst colour
    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Speed => 0xff00ff,
            PowerUpKind::Size => 0x00ff00,
            PowerUpKind::Freeze => 0x00ffff,
            PowerUpKind::Invisible => 0x888888,
            PowerUpKind::MultiBall => 0xff6600,
            PowerUpKind::Curve => 0xffff00,
            PowerUpKind::Slow => 0x9b59b6,
            PowerUpKind::Helper => COLOR_HELPER,
        }
    }
}

/// Per-tick brain of a helper paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperBrain {
    pub owner: Side,
    pub spawned_at: f64,
}

/// Steering strategy attached to a paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai(AiController),
    Helper(HelperBrain),
}

/// A paddle (player, AI or helper)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Left edge (fixed)
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    /// Displayed height (size power-up may pin it above `base_height`)
    pub height: f32,
    /// Height the difficulty ramp shrinks
    pub base_height: f32,
    pub dy: f32,
    pub score: u32,
    pub color: u32,
    pub effects: PaddleEffects,
    pub combo: u32,
    pub last_hit_time: f64,
    /// Key pair for human control (None = side default)
    pub control_scheme: Option<ControlScheme>,
    pub controller: Controller,
}

impl Paddle {
    pub fn new(side: Side, color: u32, settings: &Settings) -> Self {
        let x = match side {
            Side::Left => settings.paddle_offset,
            Side::Right => {
                settings.playfield_width - settings.paddle_width - settings.paddle_offset
            }
        };
        Self {
            side,
            x,
            y: settings.center_y() - settings.paddle_height / 2.0,
            width: settings.paddle_width,
            height: settings.paddle_height,
            base_height: settings.paddle_height,
            dy: 0.0,
            score: 0,
            color,
            effects: PaddleEffects::default(),
            combo: 0,
            last_hit_time: 0.0,
            control_scheme: None,
            controller: Controller::Human,
        }
    }

    /// A short-lived helper standing in front of `owner`'s paddle
    pub fn helper(owner: Side, spawned_at: f64, settings: &Settings) -> Self {
        let inset = settings.paddle_offset + settings.paddle_width + settings.helper_gap;
        let x = match owner {
            Side::Left => inset,
            Side::Right => settings.playfield_width - inset - settings.paddle_width,
        };
        Self {
            side: owner,
            x,
            y: settings.center_y() - settings.helper_height / 2.0,
            width: settings.paddle_width,
            height: settings.helper_height,
            base_height: settings.helper_height,
            dy: 0.0,
            score: 0,
            color: COLOR_HELPER,
            effects: PaddleEffects::default(),
            combo: 0,
            last_hit_time: 0.0,
            control_scheme: None,
            controller: Controller::Helper(HelperBrain { owner, spawned_at }),
        }
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn is_helper(&self) -> bool {
        matches!(self.controller, Controller::Helper(_))
    }

    pub fn ai(&self) -> Option<&AiController> {
        match &self.controller {
            Controller::Ai(ai) => Some(ai),
            _ => None,
        }
    }

    /// Normalized hit position (-1 top edge, 1 bottom edge)
    pub fn hit_offset(&self, ball_y: f32) -> f32 {
        hit_offset(ball_y, self.y, self.height)
    }

    pub fn overlaps(&self, ball: &Ball) -> bool {
        circle_rect_overlap(
            ball.pos,
            ball.radius,
            Vec2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
        )
    }

    pub fn record_hit(&mut self, now: f64) {
        self.last_hit_time = now;
        self.combo += 1;
    }

    /// Base speed for this paddle's controller, boosted under a speed power-up
    pub fn effective_speed(&self, settings: &Settings) -> f32 {
        let base = match self.controller {
            Controller::Helper(_) => settings.helper_speed,
            _ => settings.paddle_speed,
        };
        if self.effects.has(PowerUpKind::Speed) {
            base * settings.speed_boost_multiplier
        } else {
            base
        }
    }

    /// Recompute the displayed height from the baseline and active size boost
    pub fn sync_height(&mut self, settings: &Settings) {
        self.height = if self.effects.has(PowerUpKind::Size) {
            (settings.paddle_height * settings.size_boost_multiplier).max(self.base_height)
        } else {
            self.base_height
        };
        self.clamp_to_playfield(settings);
    }

    /// Shrink the baseline by one difficulty step, stopping at the floor
    pub fn shrink_baseline(&mut self, settings: &Settings) {
        self.base_height =
            (self.base_height * settings.paddle_shrink_factor).max(settings.min_paddle_height());
        self.sync_height(settings);
    }

    pub fn clamp_to_playfield(&mut self, settings: &Settings) {
        let max_y = (settings.playfield_height - self.height).max(0.0);
        self.y = self.y.clamp(0.0, max_y);
    }

    /// Advance one tick. Returns a power-up that expired this tick.
    pub fn update(
        &mut self,
        now: f64,
        steering: Steering,
        settings: &Settings,
    ) -> Option<PowerUpKind> {
        let expired = self.effects.expire(now, settings);
        if expired == Some(PowerUpKind::Size) {
            self.sync_height(settings);
        }

        if now - self.last_hit_time > settings.combo_window_ms {
            self.combo = 0;
        }

        let speed = self.effective_speed(settings);
        self.dy = 0.0;

        if !self.effects.is_stunned() {
            match steering {
                Steering::Idle => {}
                Steering::Drag(target) => {
                    let max_y = (settings.playfield_height - self.height).max(0.0);
                    let target_top = (target - self.height / 2.0).clamp(0.0, max_y);
                    let gap = target_top - self.y;
                    self.dy = if gap.abs() <= settings.drag_snap_threshold {
                        gap
                    } else {
                        gap * settings.drag_smoothing
                    };
                }
                Steering::Keys(keys) => {
                    self.dy = keys.direction() * speed;
                }
                Steering::Chase {
                    target,
                    speed_scale,
                } => {
                    let diff = target - self.center_y();
                    if diff.abs() > settings.ai_deadband {
                        self.dy = diff.signum() * speed * speed_scale;
                    }
                }
            }
        }

        self.y += self.dy;
        self.clamp_to_playfield(settings);
        expired
    }

    /// Restore the start-of-match state (keeps controller kind and colour)
    pub fn reset(&mut self, settings: &Settings) {
        self.score = 0;
        self.base_height = settings.paddle_height;
        self.height = settings.paddle_height;
        self.y = settings.center_y() - settings.paddle_height / 2.0;
        self.dy = 0.0;
        self.effects.clear();
        self.combo = 0;
        self.last_hit_time = 0.0;
        if let Controller::Ai(ai) = &mut self.controller {
            ai.reset(settings);
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub effects: BallEffects,
    /// Recent positions, oldest first (rendering only)
    pub trail: VecDeque<Vec2>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, settings: &Settings) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: settings.ball_radius,
            effects: BallEffects::default(),
            trail: VecDeque::with_capacity(settings.trail_length + 1),
        }
    }

    /// Back to the centre with a random serve direction
    pub fn serve(&mut self, settings: &Settings, rng: &mut Pcg32) {
        self.pos = Vec2::new(settings.playfield_width / 2.0, settings.center_y());
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.vel = Vec2::new(
            dir * settings.ball_initial_speed,
            uniform(rng, -settings.serve_dy_range, settings.serve_dy_range),
        );
        self.effects.invisible_since = None;
        self.effects.curved_since = None;
        self.trail.clear();
    }

    /// True if the ball is travelling into `side`'s goal
    pub fn is_heading_to(&self, side: Side) -> bool {
        self.vel.x * side.incoming_sign() > 0.0
    }

    /// Record current position to trail
    pub fn record_trail(&mut self, capacity: usize) {
        self.trail.push_back(self.pos);
        while self.trail.len() > capacity {
            self.trail.pop_front();
        }
    }

    /// Advance one tick. Returns effects that expired this tick.
    pub fn update(&mut self, now: f64, settings: &Settings) -> Vec<BallEffect> {
        let expired = self.effects.expire(now, settings);

        if self.effects.is_active(BallEffect::Curve) {
            self.vel.y += (self.pos.x * settings.curve_frequency).sin() * settings.curve_strength;
            self.vel = clamp_axes(self.vel, settings.ball_max_speed);
        }

        let speed_mod = if self.effects.is_active(BallEffect::SlowMotion) {
            settings.slow_motion_factor
        } else {
            1.0
        };
        self.pos += self.vel * speed_mod;

        // Top/bottom walls
        if self.pos.y - self.radius <= 0.0
            || self.pos.y + self.radius >= settings.playfield_height
        {
            self.vel.y = -self.vel.y;
            let bottom = (settings.playfield_height - self.radius).max(self.radius);
            self.pos.y = self.pos.y.clamp(self.radius, bottom);
        }

        self.record_trail(settings.trail_length);
        expired
    }
}

/// A collectible power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
    /// Animation phase (cosmetic)
    pub phase: f32,
}

impl PowerUp {
    pub fn update(&mut self) {
        self.phase += 0.1;
    }

    pub fn collides(&self, ball: &Ball) -> bool {
        circle_circle_overlap(self.pos, self.radius, ball.pos, ball.radius)
    }
}

/// A block drifting up and down the middle of the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub dy: f32,
}

impl Obstacle {
    pub fn update(&mut self, settings: &Settings) {
        self.pos.y += self.dy;
        if self.pos.y <= 0.0 || self.pos.y + self.size.y >= settings.playfield_height {
            self.dy = -self.dy;
        }
    }

    pub fn collides(&self, ball: &Ball) -> bool {
        circle_rect_overlap(ball.pos, ball.radius, self.pos, self.size)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at birth, dead at 0
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
    pub size: f32,
    pub color: u32,
}

impl Particle {
    pub fn update(&mut self, gravity: f32) {
        self.pos += self.vel;
        self.life -= self.decay;
        self.vel.y += gravity;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

/// Discrete things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { phase: GamePhase },
    PaddleHit { side: Side, helper: bool, combo: u32 },
    PointScored { side: Side, score: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind, side: Side },
    PowerUpExpired { side: Side, kind: PowerUpKind },
    BallEffectExpired { effect: BallEffect },
    HelperExpired { side: Side },
    ObstaclesActivated { count: usize },
    ObstacleHit,
    DifficultyIncreased { level: u32 },
    AiLevelChanged { level: Difficulty },
    MatchOver { winner: Side },
    TournamentMatchReady { current: usize, total: usize },
    TournamentComplete { champion: Option<u8> },
}

/// Effect tag for the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveEffect {
    PowerUp { side: Side, kind: PowerUpKind },
    Stunned { side: Side },
    Helper { side: Side },
    Ball(BallEffect),
}

/// Raw scoreboard data (formatting is the consumer's job)
#[derive(Debug, Clone, Serialize)]
pub struct MatchStatus {
    pub phase: GamePhase,
    pub mode: GameMode,
    pub left_score: u32,
    pub right_score: u32,
    pub elapsed_ms: f64,
    pub difficulty_level: u32,
    pub ai_level: Option<Difficulty>,
    pub active_effects: Vec<ActiveEffect>,
    pub tournament: Option<TournamentStatus>,
    pub match_title: Option<String>,
}

/// Complete match state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub seed: u64,
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Match time in ms, advanced only while running
    pub elapsed_ms: f64,
    pub time_ticks: u64,
    pub difficulty_level: u32,
    pub last_difficulty_increase: f64,
    pub left: Paddle,
    pub right: Paddle,
    pub helpers: Vec<Paddle>,
    pub ball: Ball,
    pub extra_balls: Vec<Ball>,
    pub power_ups: Vec<PowerUp>,
    pub last_power_up_spawn: f64,
    pub obstacles: Vec<Obstacle>,
    pub obstacles_active: bool,
    pub particles: Vec<Particle>,
    pub tournament: Option<Tournament>,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// New two-player match with the given seed
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::new(1, Vec2::ZERO, Vec2::ZERO, settings);
        ball.serve(settings, &mut rng);

        Self {
            seed,
            mode: GameMode::TwoPlayer,
            phase: GamePhase::NotStarted,
            elapsed_ms: 0.0,
            time_ticks: 0,
            difficulty_level: 1,
            last_difficulty_increase: 0.0,
            left: Paddle::new(Side::Left, COLOR_PLAYER1, settings),
            right: Paddle::new(Side::Right, COLOR_PLAYER2, settings),
            helpers: Vec::new(),
            ball,
            extra_balls: Vec::new(),
            power_ups: Vec::new(),
            last_power_up_spawn: 0.0,
            obstacles: Vec::new(),
            obstacles_active: false,
            particles: Vec::new(),
            tournament: None,
            events: Vec::new(),
            rng,
            next_id: 2,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Main ball first, then extra balls
    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        std::iter::once(&self.ball).chain(self.extra_balls.iter())
    }

    pub fn helper(&self, owner: Side) -> Option<&Paddle> {
        self.helpers.iter().find(|h| h.side == owner)
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged { phase });
        }
    }

    /// Switch mode, assign controllers and start a fresh match
    pub fn set_game_mode(
        &mut self,
        mode: GameMode,
        control_scheme: Option<ControlScheme>,
        settings: &Settings,
    ) {
        self.mode = mode;
        self.left.controller = Controller::Human;
        self.left.control_scheme = None;
        self.right.control_scheme = None;

        match mode {
            GameMode::SinglePlayer => {
                self.right.controller =
                    Controller::Ai(AiController::new(settings.ai_start_level, settings));
                self.left.control_scheme = Some(control_scheme.unwrap_or(ControlScheme::Arrows));
                self.tournament = None;
            }
            GameMode::TwoPlayer => {
                self.right.controller = Controller::Human;
                self.tournament = None;
            }
            GameMode::ThreePlayer => {
                self.right.controller = Controller::Human;
                self.tournament = Some(Tournament::new());
            }
        }

        log::info!("Game mode: {:?}", mode);
        self.reset(settings);
    }

    /// Put an explicit controller on one side (e.g. AI vs AI demos)
    pub fn set_controller(&mut self, side: Side, controller: Controller) {
        self.paddle_mut(side).controller = controller;
    }

    /// Fresh match: scores, paddles, balls, effects, obstacles and timers
    pub fn reset(&mut self, settings: &Settings) {
        if let Some(tournament) = &mut self.tournament {
            if tournament.status().complete {
                tournament.reset();
            }
        }

        self.elapsed_ms = 0.0;
        self.difficulty_level = 1;
        self.last_difficulty_increase = 0.0;
        self.last_power_up_spawn = 0.0;
        self.clear_field(settings);
        self.left.reset(settings);
        self.right.reset(settings);
        self.apply_tournament_colors();
        self.set_phase(GamePhase::NotStarted);
    }

    /// Remove everything transient from the playfield and re-serve
    pub(crate) fn clear_field(&mut self, settings: &Settings) {
        self.helpers.clear();
        self.extra_balls.clear();
        self.power_ups.clear();
        self.obstacles.clear();
        self.obstacles_active = false;
        self.particles.clear();
        self.ball.effects.clear();
        self.ball.serve(settings, &mut self.rng);
    }

    /// Colour the paddles after the players of the current tournament match
    pub(crate) fn apply_tournament_colors(&mut self) {
        let colors = self.tournament.as_ref().and_then(|t| {
            let m = t.current_match()?;
            Some((t.player(m.player1)?.color, t.player(m.player2)?.color))
        });
        match colors {
            Some((left, right)) => {
                self.left.color = left;
                self.right.color = right;
            }
            None if self.tournament.is_none() => {
                self.left.color = COLOR_PLAYER1;
                self.right.color = COLOR_PLAYER2;
            }
            None => {}
        }
    }

    /// Emit a burst of particles, respecting the particle cap
    pub fn emit_particles(&mut self, pos: Vec2, count: usize, color: u32, max_particles: usize) {
        let room = max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let vel = Vec2::new(
                self.rng.random_range(-3.0..3.0),
                self.rng.random_range(-3.0..3.0),
            );
            self.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
                decay: self.rng.random_range(0.01..0.03),
                size: self.rng.random_range(2.0..5.0),
                color,
            });
        }
    }

    /// Drop one obstacle near the centre line
    pub fn spawn_obstacle(&mut self, settings: &Settings) {
        let x = settings.playfield_width / 2.0 - settings.obstacle_width / 2.0
            + uniform(&mut self.rng, -settings.obstacle_spread, settings.obstacle_spread);
        let y = uniform(
            &mut self.rng,
            settings.obstacle_margin,
            settings.playfield_height - settings.obstacle_height - settings.obstacle_margin,
        );
        let dy = if self.rng.random_bool(0.5) {
            settings.obstacle_speed
        } else {
            -settings.obstacle_speed
        };
        self.obstacles.push(Obstacle {
            pos: Vec2::new(x, y),
            size: Vec2::new(settings.obstacle_width, settings.obstacle_height),
            dy,
        });
    }

    /// Scoreboard snapshot
    pub fn status(&self) -> MatchStatus {
        let mut active_effects = Vec::new();
        for paddle in [&self.left, &self.right] {
            if let Some(active) = &paddle.effects.power_up {
                active_effects.push(ActiveEffect::PowerUp {
                    side: paddle.side,
                    kind: active.kind,
                });
            }
            if paddle.effects.is_stunned() {
                active_effects.push(ActiveEffect::Stunned { side: paddle.side });
            }
        }
        for helper in &self.helpers {
            active_effects.push(ActiveEffect::Helper { side: helper.side });
        }
        for effect in BallEffect::ALL {
            if self.ball.effects.is_active(effect) {
                active_effects.push(ActiveEffect::Ball(effect));
            }
        }

        let ai_level = self
            .left
            .ai()
            .or_else(|| self.right.ai())
            .map(|ai| ai.level);

        let (tournament, match_title) = match &self.tournament {
            Some(t) => (Some(t.status()), t.current_match().map(|m| t.match_title(m))),
            None => (None, None),
        };

        MatchStatus {
            phase: self.phase,
            mode: self.mode,
            left_score: self.left.score,
            right_score: self.right.score,
            elapsed_ms: self.elapsed_ms,
            difficulty_level: self.difficulty_level,
            ai_level,
            active_effects,
            tournament,
            match_title,
        }
    }
}

/// Uniform sample from [lo, hi), or `lo` for an empty range
pub(crate) fn uniform(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
