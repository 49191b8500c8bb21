//! Timed power-up effects
//!
//! Every effect stores the match time it started and is expired by a
//! duration check on the tick that follows. Freeze is the exception: it
//! lasts until somebody scores.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Controller, GameEvent, GameState, Paddle, PowerUpKind, Side, uniform};
use crate::settings::Settings;

/// Effects carried by a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallEffect {
    Invisible,
    Curve,
    SlowMotion,
}

impl BallEffect {
    pub const ALL: [BallEffect; 3] = [
        BallEffect::Invisible,
        BallEffect::Curve,
        BallEffect::SlowMotion,
    ];

    pub fn duration_ms(&self, settings: &Settings) -> f64 {
        match self {
            BallEffect::Invisible => settings.invisible_duration_ms,
            BallEffect::Curve | BallEffect::SlowMotion => settings.power_up_duration_ms,
        }
    }
}

/// A power-up held by a paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub since: f64,
}

/// Paddle-side effect state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaddleEffects {
    /// At most one held power-up; a new one replaces it
    pub power_up: Option<ActivePowerUp>,
    /// Set by freeze, cleared by any point
    pub stunned_since: Option<f64>,
}

impl PaddleEffects {
    pub fn has(&self, kind: PowerUpKind) -> bool {
        self.power_up.is_some_and(|p| p.kind == kind)
    }

    pub fn grant(&mut self, kind: PowerUpKind, now: f64) {
        self.power_up = Some(ActivePowerUp { kind, since: now });
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned_since.is_some()
    }

    pub fn stun(&mut self, now: f64) {
        self.stunned_since = Some(now);
    }

    pub fn clear_stun(&mut self) {
        self.stunned_since = None;
    }

    /// Drop the held power-up once its duration has passed
    pub fn expire(&mut self, now: f64, settings: &Settings) -> Option<PowerUpKind> {
        let active = self.power_up?;
        if now - active.since > settings.power_up_duration_ms {
            self.power_up = None;
            return Some(active.kind);
        }
        None
    }

    pub fn clear(&mut self) {
        self.power_up = None;
        self.stunned_since = None;
    }
}

/// Ball-side effect state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BallEffects {
    pub invisible_since: Option<f64>,
    pub curved_since: Option<f64>,
    pub slow_since: Option<f64>,
}

impl BallEffects {
    fn slot(&mut self, effect: BallEffect) -> &mut Option<f64> {
        match effect {
            BallEffect::Invisible => &mut self.invisible_since,
            BallEffect::Curve => &mut self.curved_since,
            BallEffect::SlowMotion => &mut self.slow_since,
        }
    }

    pub fn is_active(&self, effect: BallEffect) -> bool {
        match effect {
            BallEffect::Invisible => self.invisible_since.is_some(),
            BallEffect::Curve => self.curved_since.is_some(),
            BallEffect::SlowMotion => self.slow_since.is_some(),
        }
    }

    /// Start (or restart) an effect
    pub fn activate(&mut self, effect: BallEffect, now: f64) {
        *self.slot(effect) = Some(now);
    }

    /// Turn off effects whose duration has passed
    pub fn expire(&mut self, now: f64, settings: &Settings) -> Vec<BallEffect> {
        let mut expired = Vec::new();
        for effect in BallEffect::ALL {
            let duration = effect.duration_ms(settings);
            let slot = self.slot(effect);
            if slot.is_some_and(|since| now - since > duration) {
                *slot = None;
                expired.push(effect);
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Apply a collected power-up. `collector` is the half of the field the
/// ball was in: that side gets the benefit, the other side gets frozen.
pub fn apply_power_up(
    state: &mut GameState,
    kind: PowerUpKind,
    collector: Side,
    now: f64,
    settings: &Settings,
) {
    match kind {
        PowerUpKind::Speed | PowerUpKind::Size => {
            let paddle = state.paddle_mut(collector);
            paddle.effects.grant(kind, now);
            paddle.sync_height(settings);
        }
        PowerUpKind::Freeze => {
            state.paddle_mut(collector.opponent()).effects.stun(now);
        }
        PowerUpKind::Invisible => state.ball.effects.activate(BallEffect::Invisible, now),
        PowerUpKind::Curve => state.ball.effects.activate(BallEffect::Curve, now),
        PowerUpKind::Slow => state.ball.effects.activate(BallEffect::SlowMotion, now),
        PowerUpKind::MultiBall => spawn_extra_balls(state, settings),
        PowerUpKind::Helper => spawn_helper(state, collector, now, settings),
    }

    log::debug!("{:?} collected on the {:?} side", kind, collector);
    state.events.push(GameEvent::PowerUpCollected {
        kind,
        side: collector,
    });
}

fn spawn_extra_balls(state: &mut GameState, settings: &Settings) {
    let origin = state.ball.pos;
    for _ in 0..settings.extra_ball_count {
        let id = state.next_entity_id();
        let dir = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let vel = Vec2::new(
            dir * uniform(
                &mut state.rng,
                settings.extra_ball_speed_min,
                settings.extra_ball_speed_max,
            ),
            uniform(
                &mut state.rng,
                -settings.extra_ball_dy_range,
                settings.extra_ball_dy_range,
            ),
        );
        state.extra_balls.push(Ball::new(id, origin, vel, settings));
    }
}

/// One helper per side; collecting another refreshes its lifetime
fn spawn_helper(state: &mut GameState, owner: Side, now: f64, settings: &Settings) {
    if let Some(helper) = state.helpers.iter_mut().find(|h| h.side == owner) {
        if let Controller::Helper(brain) = &mut helper.controller {
            brain.spawned_at = now;
        }
        return;
    }
    state.helpers.push(Paddle::helper(owner, now, settings));
}

/// Remove helpers that outlived their duration
pub fn expire_helpers(state: &mut GameState, now: f64, settings: &Settings) {
    let mut expired = Vec::new();
    state.helpers.retain(|helper| match &helper.controller {
        Controller::Helper(brain)
            if now - brain.spawned_at > settings.helper_duration_ms =>
        {
            expired.push(brain.owner);
            false
        }
        _ => true,
    });
    for side in expired {
        log::debug!("Helper expired on the {:?} side", side);
        state.events.push(GameEvent::HelperExpired { side });
    }
}

/// Any point unfreezes both paddles
pub fn clear_stuns(state: &mut GameState) {
    state.left.effects.clear_stun();
    state.right.effects.clear_stun();
}
