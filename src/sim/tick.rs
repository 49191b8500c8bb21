//! Match controller
//!
//! One call advances the match by one display tick. Motion uses per-tick
//! increments; `dt_ms` only feeds the match clock that drives timers.

use glam::Vec2;
use rand::Rng;

use super::ai::helper_steering;
use super::collision::{BounceParams, clamp_axes, paddle_bounce, reverse};
use super::effects::{apply_power_up, clear_stuns, expire_helpers};
use super::input::{Steering, TickInput};
use super::state::{
    Ball, Controller, GameEvent, GamePhase, GameState, Paddle, PowerUp, PowerUpKind, Side, uniform,
};
use crate::consts::*;
use crate::settings::Settings;

/// Advance the match by one tick
pub fn tick(state: &mut GameState, settings: &Settings, input: &TickInput, dt_ms: f64) {
    state.events.clear();

    if input.reset {
        state.reset(settings);
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::NotStarted | GamePhase::Paused => state.set_phase(GamePhase::Running),
            GamePhase::Running => {
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Over => {}
        }
    }

    if state.phase != GamePhase::Running {
        return;
    }

    state.elapsed_ms += dt_ms.max(0.0);
    state.time_ticks += 1;
    let now = state.elapsed_ms;

    step_difficulty(state, settings, now);
    escalate_ai(state, settings);
    expire_helpers(state, now, settings);

    update_paddles(state, settings, input, now);
    update_balls(state, settings, now);

    resolve_paddle_hits(state, settings, now);
    resolve_obstacle_hits(state, settings);

    if resolve_scoring(state, settings) {
        return;
    }

    update_power_ups(state, settings, now);

    for obstacle in state.obstacles.iter_mut() {
        obstacle.update(settings);
    }

    for particle in state.particles.iter_mut() {
        particle.update(settings.particle_gravity);
    }
    state.particles.retain(|p| !p.is_dead());
}

/// Level up on a fixed interval of match time
fn step_difficulty(state: &mut GameState, settings: &Settings, now: f64) {
    if now - state.last_difficulty_increase <= settings.difficulty_interval_ms {
        return;
    }
    state.last_difficulty_increase = now;
    state.difficulty_level += 1;

    let factor = settings.speed_increase_factor;
    state.ball.vel = clamp_axes(state.ball.vel * factor, settings.ball_max_speed);
    for ball in state.extra_balls.iter_mut() {
        ball.vel = clamp_axes(ball.vel * factor, settings.ball_max_speed);
    }

    state.left.shrink_baseline(settings);
    state.right.shrink_baseline(settings);

    if state.obstacles_active && state.obstacles.len() < settings.max_obstacles {
        state.spawn_obstacle(settings);
    }

    let center = Vec2::new(settings.playfield_width / 2.0, settings.center_y());
    state.emit_particles(
        center,
        settings.level_up_particles,
        COLOR_LEVEL_UP,
        settings.max_particles,
    );

    log::info!("Difficulty level {}", state.difficulty_level);
    state.events.push(GameEvent::DifficultyIncreased {
        level: state.difficulty_level,
    });
}

/// Let AI paddles climb the difficulty staircase
fn escalate_ai(state: &mut GameState, settings: &Settings) {
    for side in [Side::Left, Side::Right] {
        let opponent_score = state.paddle(side.opponent()).score;
        let elapsed = state.elapsed_ms;
        let raised = match &mut state.paddle_mut(side).controller {
            Controller::Ai(ai) => ai.escalate(opponent_score, elapsed, settings),
            _ => None,
        };
        if let Some(level) = raised {
            log::info!("AI on the {:?} side now {}", side, level.as_str());
            state.events.push(GameEvent::AiLevelChanged { level });
        }
    }
}

fn update_paddles(state: &mut GameState, settings: &Settings, input: &TickInput, now: f64) {
    for side in [Side::Left, Side::Right] {
        let GameState {
            left,
            right,
            ball,
            extra_balls,
            rng,
            events,
            ..
        } = &mut *state;
        let paddle = match side {
            Side::Left => left,
            Side::Right => right,
        };

        let steering = match &mut paddle.controller {
            Controller::Human => input.steering_for(side, paddle.control_scheme),
            Controller::Ai(ai) => {
                let balls = std::iter::once(&*ball).chain(extra_balls.iter());
                ai.steer(side, paddle.x, balls, now, settings, rng)
            }
            Controller::Helper(_) => Steering::Idle,
        };

        if let Some(kind) = paddle.update(now, steering, settings) {
            log::debug!("{:?} expired on the {:?} side", kind, side);
            events.push(GameEvent::PowerUpExpired { side, kind });
        }
    }

    let GameState {
        helpers,
        ball,
        extra_balls,
        ..
    } = &mut *state;
    for helper in helpers.iter_mut() {
        let balls = std::iter::once(&*ball).chain(extra_balls.iter());
        let steering = helper_steering(helper.x, helper.center_y(), balls);
        helper.update(now, steering, settings);
    }
}

fn update_balls(state: &mut GameState, settings: &Settings, now: f64) {
    let GameState {
        ball,
        extra_balls,
        events,
        ..
    } = &mut *state;
    for ball in std::iter::once(ball).chain(extra_balls.iter_mut()) {
        for effect in ball.update(now, settings) {
            log::debug!("Ball {} lost {:?}", ball.id, effect);
            events.push(GameEvent::BallEffectExpired { effect });
        }
    }
}

/// Bounce `ball` off `paddle` if it is coming at the paddle's face.
/// Returns true on a hit.
fn bounce_off_paddle(
    ball: &mut Ball,
    paddle: &mut Paddle,
    params: &BounceParams,
    now: f64,
) -> bool {
    if !ball.is_heading_to(paddle.side) || !paddle.overlaps(ball) {
        return false;
    }

    let offset = paddle.hit_offset(ball.pos.y);
    ball.vel = paddle_bounce(ball.vel, offset, params);
    // Flush against the face so the same contact can't fire twice
    ball.pos.x = match paddle.side {
        Side::Left => paddle.x + paddle.width + ball.radius,
        Side::Right => paddle.x - ball.radius,
    };
    paddle.record_hit(now);
    true
}

struct PaddleHit {
    pos: Vec2,
    side: Side,
    helper: bool,
    combo: u32,
    color: u32,
}

fn resolve_paddle_hits(state: &mut GameState, settings: &Settings, now: f64) {
    let params = BounceParams {
        max_angle: settings.max_bounce_angle_deg.to_radians(),
        speed_increment: settings.ball_speed_increment,
        max_speed: settings.ball_max_speed,
    };

    let mut hits = Vec::new();
    {
        let GameState {
            ball: main_ball,
            extra_balls,
            left,
            right,
            helpers,
            ..
        } = &mut *state;
        for ball in std::iter::once(main_ball).chain(extra_balls.iter_mut()) {
            let paddles = [&mut *left, &mut *right]
                .into_iter()
                .chain(helpers.iter_mut());
            for paddle in paddles {
                if bounce_off_paddle(ball, paddle, &params, now) {
                    hits.push(PaddleHit {
                        pos: ball.pos,
                        side: paddle.side,
                        helper: paddle.is_helper(),
                        combo: paddle.combo,
                        color: paddle.color,
                    });
                    break;
                }
            }
        }
    }

    for hit in hits {
        state.emit_particles(
            hit.pos,
            settings.paddle_hit_particles,
            hit.color,
            settings.max_particles,
        );
        state.events.push(GameEvent::PaddleHit {
            side: hit.side,
            helper: hit.helper,
            combo: hit.combo,
        });
    }
}

/// Obstacles send balls straight back where they came from
fn resolve_obstacle_hits(state: &mut GameState, settings: &Settings) {
    let mut impacts = Vec::new();
    {
        let GameState {
            ball: main_ball,
            extra_balls,
            obstacles,
            ..
        } = &mut *state;
        for ball in std::iter::once(main_ball).chain(extra_balls.iter_mut()) {
            if obstacles.iter().any(|o| o.collides(ball)) {
                ball.vel = reverse(ball.vel);
                // Back out of the block along the new heading
                ball.pos += ball.vel;
                impacts.push(ball.pos);
            }
        }
    }

    for pos in impacts {
        state.emit_particles(
            pos,
            settings.obstacle_hit_particles,
            COLOR_OBSTACLE,
            settings.max_particles,
        );
        state.events.push(GameEvent::ObstacleHit);
    }
}

/// Side credited when `ball` has left the field
fn scorer(ball: &Ball, settings: &Settings) -> Option<Side> {
    if ball.pos.x - ball.radius <= 0.0 {
        Some(Side::Right)
    } else if ball.pos.x + ball.radius >= settings.playfield_width {
        Some(Side::Left)
    } else {
        None
    }
}

/// Returns true if a point ended the match
fn resolve_scoring(state: &mut GameState, settings: &Settings) -> bool {
    if let Some(side) = scorer(&state.ball, settings) {
        if award_point(state, side, settings) {
            return true;
        }
        state.ball.serve(settings, &mut state.rng);
    }

    let mut i = 0;
    while i < state.extra_balls.len() {
        match scorer(&state.extra_balls[i], settings) {
            Some(side) => {
                state.extra_balls.remove(i);
                if award_point(state, side, settings) {
                    return true;
                }
            }
            None => i += 1,
        }
    }
    false
}

/// One point to `side`, whatever ball or combo produced it
fn award_point(state: &mut GameState, side: Side, settings: &Settings) -> bool {
    let paddle = state.paddle_mut(side);
    paddle.score += 1;
    let score = paddle.score;
    state.paddle_mut(side.opponent()).combo = 0;
    clear_stuns(state);

    log::info!(
        "Point {:?}: {} - {}",
        side,
        state.left.score,
        state.right.score
    );
    state.events.push(GameEvent::PointScored { side, score });

    let total = state.left.score + state.right.score;
    if total >= settings.obstacle_spawn_score && !state.obstacles_active {
        activate_obstacles(state, settings);
    }

    if score >= settings.winning_score {
        end_match(state, side, settings);
        return true;
    }
    false
}

fn activate_obstacles(state: &mut GameState, settings: &Settings) {
    let count = settings.obstacle_count.min(settings.max_obstacles);
    for _ in 0..count {
        state.spawn_obstacle(settings);
    }
    state.obstacles_active = true;
    log::info!("Obstacles active ({count})");
    state.events.push(GameEvent::ObstaclesActivated { count });
}

/// Finish the match: single matches stop, tournaments line up the next one
fn end_match(state: &mut GameState, winner: Side, settings: &Settings) {
    log::info!(
        "{:?} wins {} - {}",
        winner,
        state.left.score,
        state.right.score
    );
    state.events.push(GameEvent::MatchOver { winner });

    let outcome = state.tournament.as_mut().map(|t| {
        let winner_id = t.current_match().map(|m| match winner {
            Side::Left => m.player1,
            Side::Right => m.player2,
        });
        if let Some(id) = winner_id {
            t.record_match_result(id);
        }
        (t.status(), t.winner().map(|p| p.id))
    });

    match outcome {
        Some((status, _)) if !status.complete => {
            state.reset(settings);
            state.events.push(GameEvent::TournamentMatchReady {
                current: status.current,
                total: status.total,
            });
        }
        Some((_, champion)) => {
            state.events.push(GameEvent::TournamentComplete { champion });
            state.set_phase(GamePhase::Over);
        }
        None => state.set_phase(GamePhase::Over),
    }
}

fn update_power_ups(state: &mut GameState, settings: &Settings, now: f64) {
    if now - state.last_power_up_spawn > settings.power_up_spawn_interval_ms
        && state.power_ups.len() < settings.max_power_ups
    {
        spawn_power_up(state, settings);
        state.last_power_up_spawn = now;
    }

    for power_up in state.power_ups.iter_mut() {
        power_up.update();
    }

    let mut i = 0;
    while i < state.power_ups.len() {
        let collector = state
            .balls()
            .find(|b| state.power_ups[i].collides(b))
            .map(|b| Side::of_x(b.pos.x, settings.playfield_width));
        let Some(side) = collector else {
            i += 1;
            continue;
        };

        let power_up = state.power_ups.remove(i);
        let color = power_up.kind.color();
        state.emit_particles(
            power_up.pos,
            settings.pickup_particles,
            color,
            settings.max_particles,
        );
        state.emit_particles(
            power_up.pos,
            settings.pickup_flash_particles,
            color,
            settings.max_particles,
        );
        apply_power_up(state, power_up.kind, side, now, settings);
    }
}

fn spawn_power_up(state: &mut GameState, settings: &Settings) {
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let margin = settings.power_up_margin;
    let pos = Vec2::new(
        uniform(&mut state.rng, margin, settings.playfield_width - margin),
        uniform(&mut state.rng, margin, settings.playfield_height - margin),
    );
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        pos,
        radius: settings.power_up_radius,
        kind,
        phase: 0.0,
    });
    log::debug!("Spawned {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
    state.events.push(GameEvent::PowerUpSpawned { kind });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::effects::BallEffect;
    use crate::sim::input::DirectionKeys;
    use crate::sim::state::{GameMode, Obstacle};

    const DT: f64 = TICK_MS;

    fn running(settings: &Settings) -> GameState {
        let mut state = GameState::new(12345, settings);
        start(&mut state, settings);
        state
    }

    /// Toggle into Running with the ball parked in the middle, standing still
    fn start(state: &mut GameState, settings: &Settings) {
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        park_ball(state);
        tick(state, settings, &input, DT);
        assert_eq!(state.phase, GamePhase::Running);
        park_ball(state);
    }

    fn park_ball(state: &mut GameState) {
        state.ball.pos = Vec2::new(600.0, 300.0);
        state.ball.vel = Vec2::ZERO;
    }

    fn idle(state: &mut GameState, settings: &Settings) {
        tick(state, settings, &TickInput::default(), DT);
    }

    #[test]
    fn test_tick_start_and_pause() {
        let settings = Settings::default();
        let mut state = GameState::new(12345, &settings);
        assert_eq!(state.phase, GamePhase::NotStarted);

        // Nothing moves before the start toggle
        idle(&mut state, &settings);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.elapsed_ms, 0.0);

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &toggle, DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(
            state
                .events
                .contains(&GameEvent::PhaseChanged { phase: GamePhase::Running })
        );

        tick(&mut state, &settings, &toggle, DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &settings, &toggle, DT);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_elapsed_excludes_pause() {
        let settings = Settings::default();
        let mut state = GameState::new(1, &settings);
        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &settings, &toggle, 10.0);
        for _ in 0..9 {
            tick(&mut state, &settings, &TickInput::default(), 10.0);
        }
        assert_eq!(state.elapsed_ms, 100.0);

        tick(&mut state, &settings, &toggle, 10.0);
        for _ in 0..50 {
            tick(&mut state, &settings, &TickInput::default(), 10.0);
        }
        assert_eq!(state.elapsed_ms, 100.0);

        tick(&mut state, &settings, &toggle, 10.0);
        assert_eq!(state.elapsed_ms, 110.0);
    }

    #[test]
    fn test_paddle_hit() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.ball.pos = Vec2::new(35.0, 300.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);

        idle(&mut state, &settings);
        assert!((state.ball.vel.x - 5.25).abs() < 1e-5);
        assert_eq!(state.ball.vel.y, 0.0);
        assert_eq!(state.ball.pos.x, 10.0 + 15.0 + 8.0);
        assert_eq!(state.left.combo, 1);
        assert_eq!(state.particles.len(), 10);
        assert!(state.events.contains(&GameEvent::PaddleHit {
            side: Side::Left,
            helper: false,
            combo: 1
        }));
    }

    #[test]
    fn test_helper_deflects_ball() {
        let settings = Settings::default();
        let mut state = running(&settings);
        let now = state.elapsed_ms;
        apply_power_up(&mut state, PowerUpKind::Helper, Side::Left, now, &settings);
        // Helper face sits at x = 10 + 15 + 80 + 15 = 120, centred at 300
        state.ball.pos = Vec2::new(130.0, 300.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);

        idle(&mut state, &settings);
        assert!(state.ball.vel.x > 0.0);
        assert!(state.events.contains(&GameEvent::PaddleHit {
            side: Side::Left,
            helper: true,
            combo: 1
        }));
    }

    #[test]
    fn test_point_is_always_one() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.left.combo = 5;
        state.right.combo = 7;
        state.left.effects.stun(0.0);
        state.right.effects.stun(0.0);
        state
            .extra_balls
            .push(Ball::new(99, Vec2::new(600.0, 300.0), Vec2::new(3.0, 0.0), &settings));

        state.ball.pos = Vec2::new(5.0, 50.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);
        idle(&mut state, &settings);

        assert_eq!(state.right.score, 1);
        assert_eq!(state.left.score, 0);
        assert_eq!(state.left.combo, 0, "conceding side loses its combo");
        assert!(!state.left.effects.is_stunned());
        assert!(!state.right.effects.is_stunned());
        assert_eq!(state.ball.pos, Vec2::new(600.0, 300.0));
        assert_eq!(state.extra_balls.len(), 1);
        assert!(state.events.contains(&GameEvent::PointScored {
            side: Side::Right,
            score: 1
        }));
    }

    #[test]
    fn test_extra_ball_point() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.right.effects.stun(0.0);
        state
            .extra_balls
            .push(Ball::new(99, Vec2::new(1195.0, 50.0), Vec2::new(5.0, 0.0), &settings));

        idle(&mut state, &settings);
        assert_eq!(state.left.score, 1);
        assert!(state.extra_balls.is_empty());
        assert!(!state.right.effects.is_stunned());
    }

    #[test]
    fn test_obstacles_activate_once() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.left.score = 4;

        state.ball.pos = Vec2::new(1195.0, 50.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        idle(&mut state, &settings);
        assert!(state.obstacles_active);
        assert_eq!(state.obstacles.len(), 3);
        assert!(
            state
                .events
                .contains(&GameEvent::ObstaclesActivated { count: 3 })
        );

        state.ball.pos = Vec2::new(1195.0, 50.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        idle(&mut state, &settings);
        assert_eq!(state.left.score, 6);
        assert_eq!(state.obstacles.len(), 3);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::ObstaclesActivated { .. }))
        );
    }

    #[test]
    fn test_obstacle_reverses_ball() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.obstacles.push(Obstacle {
            pos: Vec2::new(600.0, 280.0),
            size: Vec2::new(15.0, 60.0),
            dy: 0.0,
        });
        state.obstacles_active = true;
        state.ball.pos = Vec2::new(595.0, 300.0);
        state.ball.vel = Vec2::new(2.0, 1.0);

        idle(&mut state, &settings);
        assert_eq!(state.ball.vel, Vec2::new(-2.0, -1.0));
        assert!(state.events.contains(&GameEvent::ObstacleHit));
    }

    #[test]
    fn test_difficulty_ramp() {
        let settings = Settings {
            difficulty_interval_ms: 100.0,
            ..Default::default()
        };
        let mut state = running(&settings);
        state.ball.vel = Vec2::new(4.0, 2.0);

        tick(&mut state, &settings, &TickInput::default(), 100.0);
        assert_eq!(state.difficulty_level, 2);
        assert!((state.ball.vel.x - 4.4).abs() < 1e-5);
        assert!((state.ball.vel.y - 2.2).abs() < 1e-5);
        assert_eq!(state.left.base_height, 90.0);
        assert_eq!(state.right.height, 90.0);
        assert!(
            state
                .events
                .contains(&GameEvent::DifficultyIncreased { level: 2 })
        );

        // Not again until another interval has passed
        idle(&mut state, &settings);
        assert_eq!(state.difficulty_level, 2);
    }

    #[test]
    fn test_nan_drag_leaves_paddle_usable() {
        let settings = Settings::default();
        let mut state = running(&settings);
        let y = state.left.y;
        let drag = TickInput {
            left_drag: Some(f32::NAN),
            ..Default::default()
        };
        tick(&mut state, &settings, &drag, DT);
        assert_eq!(state.left.y, y);

        let up = TickInput {
            wasd: DirectionKeys::UP,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &settings, &up, DT);
        }
        assert!(state.left.y.is_finite());
        assert!(state.left.y < y);
    }

    #[test]
    fn test_burst_sizes_come_from_settings() {
        let settings = Settings {
            paddle_hit_particles: 3,
            ..Default::default()
        };
        let mut state = running(&settings);
        state.ball.pos = Vec2::new(35.0, 300.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);

        idle(&mut state, &settings);
        assert_eq!(state.left.combo, 1);
        assert_eq!(state.particles.len(), 3);
    }

    #[test]
    fn test_difficulty_ramp_respects_axis_cap() {
        let settings = Settings {
            difficulty_interval_ms: 100.0,
            ..Default::default()
        };
        let mut state = running(&settings);
        state.ball.vel = Vec2::new(17.0, -17.0);

        tick(&mut state, &settings, &TickInput::default(), 100.0);
        assert_eq!(state.difficulty_level, 2);
        assert_eq!(state.ball.vel, Vec2::new(18.0, -18.0));
        assert!(state.ball.vel.x.abs() <= settings.ball_max_speed);
        assert!(state.ball.vel.y.abs() <= settings.ball_max_speed);
    }

    #[test]
    fn test_power_up_pickup_by_side() {
        let settings = Settings::default();
        let mut state = running(&settings);
        state.power_ups.push(PowerUp {
            id: 50,
            pos: Vec2::new(300.0, 300.0),
            radius: 15.0,
            kind: PowerUpKind::Freeze,
            phase: 0.0,
        });
        state.ball.pos = Vec2::new(299.0, 300.0);
        state.ball.vel = Vec2::new(1.0, 0.0);

        idle(&mut state, &settings);
        assert!(state.power_ups.is_empty());
        // Collected on the left half: the right paddle is frozen
        assert!(state.right.effects.is_stunned());
        assert!(!state.left.effects.is_stunned());
        assert_eq!(state.particles.len(), 50);

        // Frozen paddle ignores input until somebody scores
        let y = state.right.y;
        let input = TickInput {
            arrows: DirectionKeys::UP,
            ..Default::default()
        };
        tick(&mut state, &settings, &input, DT);
        assert_eq!(state.right.y, y);
    }

    #[test]
    fn test_power_up_spawns_on_interval() {
        let settings = Settings {
            power_up_spawn_interval_ms: 50.0,
            ..Default::default()
        };
        let mut state = running(&settings);
        for _ in 0..20 {
            // Above the spawn band so nothing gets picked up
            state.ball.pos = Vec2::new(600.0, 30.0);
            state.ball.vel = Vec2::ZERO;
            idle(&mut state, &settings);
        }
        assert_eq!(state.power_ups.len(), settings.max_power_ups);
        for p in &state.power_ups {
            assert!(p.pos.x >= 100.0 && p.pos.x <= 1100.0);
            assert!(p.pos.y >= 100.0 && p.pos.y <= 500.0);
        }
    }

    #[test]
    fn test_curve_expires_with_match_time() {
        let settings = Settings::default();
        let mut state = running(&settings);
        let now = state.elapsed_ms;
        apply_power_up(&mut state, PowerUpKind::Curve, Side::Left, now, &settings);

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &toggle, DT);
        // A long pause doesn't count against the effect
        for _ in 0..1000 {
            tick(&mut state, &settings, &TickInput::default(), DT);
        }
        tick(&mut state, &settings, &toggle, DT);
        assert!(state.ball.effects.is_active(BallEffect::Curve));

        let mut expired = false;
        for _ in 0..400 {
            park_ball(&mut state);
            idle(&mut state, &settings);
            if state.events.contains(&GameEvent::BallEffectExpired {
                effect: BallEffect::Curve,
            }) {
                expired = true;
                break;
            }
        }
        assert!(expired);
        assert!(state.elapsed_ms > settings.power_up_duration_ms);
    }

    #[test]
    fn test_reset_clears_effects() {
        let settings = Settings::default();
        let mut state = running(&settings);
        let now = state.elapsed_ms;
        apply_power_up(&mut state, PowerUpKind::Size, Side::Left, now, &settings);
        apply_power_up(&mut state, PowerUpKind::Speed, Side::Right, now, &settings);
        apply_power_up(&mut state, PowerUpKind::Helper, Side::Right, now, &settings);
        apply_power_up(&mut state, PowerUpKind::Freeze, Side::Right, now, &settings);
        apply_power_up(&mut state, PowerUpKind::MultiBall, Side::Right, now, &settings);
        state.left.combo = 4;
        state.left.y = 0.0;
        state.right.shrink_baseline(&settings);

        let input = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &input, DT);

        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.elapsed_ms, 0.0);
        assert!(state.helpers.is_empty());
        assert!(state.extra_balls.is_empty());
        for paddle in [&state.left, &state.right] {
            assert!(paddle.effects.power_up.is_none());
            assert!(!paddle.effects.is_stunned());
            assert_eq!(paddle.combo, 0);
            assert_eq!(paddle.height, 100.0);
            assert_eq!(paddle.base_height, 100.0);
            assert_eq!(paddle.y, 250.0);
        }
    }

    #[test]
    fn test_match_over() {
        let settings = Settings {
            winning_score: 1,
            ..Default::default()
        };
        let mut state = running(&settings);
        state.ball.pos = Vec2::new(5.0, 50.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);
        idle(&mut state, &settings);

        assert_eq!(state.phase, GamePhase::Over);
        assert!(state.events.contains(&GameEvent::MatchOver { winner: Side::Right }));

        // Start toggle does nothing once the match is over
        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &toggle, DT);
        assert_eq!(state.phase, GamePhase::Over);

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &reset, DT);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.right.score, 0);
    }

    #[test]
    fn test_tournament_advances_between_matches() {
        let settings = Settings {
            winning_score: 1,
            ..Default::default()
        };
        let mut state = GameState::new(3, &settings);
        state.set_game_mode(GameMode::ThreePlayer, None, &settings);
        start(&mut state, &settings);

        // Player 1 (left) beats player 2
        state.ball.pos = Vec2::new(1195.0, 50.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        idle(&mut state, &settings);

        assert!(state.events.contains(&GameEvent::MatchOver { winner: Side::Left }));
        assert!(state.events.contains(&GameEvent::TournamentMatchReady {
            current: 2,
            total: 3
        }));
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!((state.left.score, state.right.score), (0, 0));
        assert_eq!((state.left.color, state.right.color), (COLOR_PLAYER2, COLOR_PLAYER3));

        let status = state.status();
        assert_eq!(status.match_title.as_deref(), Some("Player 2 vs Player 3"));
        let standings = state.tournament.as_ref().map(|t| t.standings());
        assert_eq!(standings.map(|s| s[0].id), Some(1));
    }

    #[test]
    fn test_tournament_completes() {
        let settings = Settings {
            winning_score: 1,
            ..Default::default()
        };
        let mut state = GameState::new(3, &settings);
        state.set_game_mode(GameMode::ThreePlayer, None, &settings);

        // Left always wins: 1 beats 2, 2 beats 3, 1 beats 3, then the finals
        let mut matches = 0;
        while state.phase != GamePhase::Over {
            start(&mut state, &settings);
            state.ball.pos = Vec2::new(1195.0, 50.0);
            state.ball.vel = Vec2::new(5.0, 0.0);
            idle(&mut state, &settings);
            matches += 1;
            assert!(matches <= 6);
        }

        assert_eq!(matches, 6);
        assert!(
            state
                .events
                .contains(&GameEvent::TournamentComplete { champion: Some(1) })
        );
        assert!(state.status().tournament.is_some_and(|t| t.complete));

        // Reset starts the tournament over
        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &settings, &reset, DT);
        assert!(state.status().tournament.is_some_and(|t| !t.complete && t.current == 1));
    }

    #[test]
    fn test_single_player_ai_chases_ball() {
        let settings = Settings::default();
        let mut state = GameState::new(5, &settings);
        state.set_game_mode(GameMode::SinglePlayer, None, &settings);
        start(&mut state, &settings);
        assert_eq!(state.status().ai_level, Some(Difficulty::Medium));

        state.ball.pos = Vec2::new(600.0, 100.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        // Skip the reaction delay left over from the start tick
        if let Controller::Ai(ai) = &mut state.right.controller {
            ai.last_reaction = None;
        }
        idle(&mut state, &settings);

        // Medium: 75% of paddle speed, heading up
        assert_eq!(state.right.dy, -6.0);
        let target = state.right.ai().map(|ai| ai.target_y);
        assert!(target.is_some_and(|t| (t - 100.0).abs() < 2.0));

        // Human on the left plays with the arrow keys
        let input = TickInput {
            arrows: DirectionKeys::DOWN,
            ..Default::default()
        };
        tick(&mut state, &settings, &input, DT);
        assert_eq!(state.left.dy, 8.0);
    }

    #[test]
    fn test_ai_escalates_with_human_score() {
        let settings = Settings::default();
        let mut state = GameState::new(5, &settings);
        state.set_game_mode(GameMode::SinglePlayer, None, &settings);
        start(&mut state, &settings);
        state.left.score = 2;

        state.ball.pos = Vec2::new(1195.0, 50.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        idle(&mut state, &settings);
        assert_eq!(state.left.score, 3);

        park_ball(&mut state);
        idle(&mut state, &settings);
        assert!(state.events.contains(&GameEvent::AiLevelChanged {
            level: Difficulty::Hard
        }));
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let run = || {
            let mut state = GameState::new(99999, &settings);
            state.set_game_mode(GameMode::SinglePlayer, None, &settings);
            let inputs = [
                TickInput {
                    pause: true,
                    ..Default::default()
                },
                TickInput {
                    arrows: DirectionKeys::UP,
                    ..Default::default()
                },
                TickInput {
                    left_drag: Some(420.0),
                    ..Default::default()
                },
                TickInput::default(),
            ];
            for i in 0..3000 {
                let input = if i == 0 { &inputs[0] } else { &inputs[1 + i % 3] };
                tick(&mut state, &settings, input, DT);
            }
            state
        };

        let a = run();
        let b = run();
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(
            serde_json::to_string(&a).ok(),
            serde_json::to_string(&b).ok()
        );
    }
}
