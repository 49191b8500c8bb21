//! Computer opponent
//!
//! Re-plans on a fixed reaction cadence by predicting where the most
//! threatening ball crosses the paddle's plane, then chases that point
//! every tick.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::input::Steering;
use super::state::{Ball, Side};
use crate::settings::{AiProfile, Difficulty, Settings};

/// Mirror `y` back into `[0, height]` as if it bounced off both walls.
///
/// Closed form of repeated reflection (`y → -y` below 0, `y → 2H - y`
/// above H): the bounce pattern repeats every `2H`.
pub fn fold_into_playfield(y: f32, height: f32) -> f32 {
    if height <= 0.0 || !y.is_finite() {
        return 0.0;
    }
    let period = 2.0 * height;
    let m = y.rem_euclid(period);
    let folded = if m > height { period - m } else { m };
    folded.clamp(0.0, height)
}

/// y coordinate at which `ball` reaches the vertical plane `plane_x`,
/// accounting for any number of wall bounces. A ball with no horizontal
/// velocity never arrives; its current y is returned instead.
pub fn predict_intercept_y(ball: &Ball, plane_x: f32, height: f32) -> f32 {
    if ball.vel.x == 0.0 || !ball.vel.x.is_finite() {
        return ball.pos.y.clamp(0.0, height.max(0.0));
    }
    let time_to_reach = (ball.pos.x - plane_x).abs() / ball.vel.x.abs();
    let predicted = ball.pos.y + ball.vel.y * time_to_reach;
    fold_into_playfield(predicted, height)
}

/// Nearest ball (on x) that is heading into `side`'s goal
pub fn pick_threat<'a>(
    balls: impl IntoIterator<Item = &'a Ball>,
    side: Side,
    paddle_x: f32,
) -> Option<&'a Ball> {
    balls
        .into_iter()
        .filter(|b| b.is_heading_to(side))
        .min_by(|a, b| {
            (a.pos.x - paddle_x)
                .abs()
                .partial_cmp(&(b.pos.x - paddle_x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// AI paddle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiController {
    /// Current difficulty (only ever rises within a match)
    pub level: Difficulty,
    /// Level restored on reset
    pub start_level: Difficulty,
    /// Where the paddle centre is heading
    pub target_y: f32,
    /// Match time of the last re-plan
    pub last_reaction: Option<f64>,
}

impl AiController {
    pub fn new(level: Difficulty, settings: &Settings) -> Self {
        Self {
            level,
            start_level: level,
            target_y: settings.center_y(),
            last_reaction: None,
        }
    }

    pub fn reset(&mut self, settings: &Settings) {
        self.level = self.start_level;
        self.target_y = settings.center_y();
        self.last_reaction = None;
    }

    pub fn profile(&self, settings: &Settings) -> AiProfile {
        settings.ai_profile(self.level)
    }

    /// Re-plan if the reaction delay has passed, then chase the target
    pub fn steer<'a, R: Rng>(
        &mut self,
        side: Side,
        paddle_x: f32,
        balls: impl IntoIterator<Item = &'a Ball>,
        now: f64,
        settings: &Settings,
        rng: &mut R,
    ) -> Steering {
        let profile = self.profile(settings);

        let due = self
            .last_reaction
            .is_none_or(|last| now - last > settings.ai_reaction_ms);
        if due {
            self.last_reaction = Some(now);
            self.target_y = match pick_threat(balls, side, paddle_x) {
                Some(ball) => {
                    let predicted =
                        predict_intercept_y(ball, paddle_x, settings.playfield_height);
                    let error = (rng.random::<f32>() - 0.5)
                        * settings.ai_error_margin
                        * (1.0 - profile.accuracy);
                    predicted + error
                }
                // Nothing incoming: drift back to the middle
                None => settings.center_y(),
            };
        }

        Steering::Chase {
            target: self.target_y,
            speed_scale: profile.speed,
        }
    }

    /// Step up the difficulty staircase from the human's score and match
    /// time. Returns the new level if it changed.
    pub fn escalate(
        &mut self,
        human_score: u32,
        elapsed_ms: f64,
        settings: &Settings,
    ) -> Option<Difficulty> {
        if !settings.ai_escalation {
            return None;
        }

        let base = self.start_level.index();
        let by_score = if settings.ai_escalation_score_step > 0 {
            (human_score / settings.ai_escalation_score_step) as usize
        } else {
            0
        };
        let by_time = if settings.ai_escalation_interval_ms > 0.0 {
            (elapsed_ms / settings.ai_escalation_interval_ms).max(0.0) as usize
        } else {
            0
        };

        let earned = Difficulty::from_index(base + by_score.max(by_time));
        if earned > self.level {
            self.level = earned;
            return Some(earned);
        }
        None
    }
}

/// Helper paddles chase whichever ball is closest to them
pub fn helper_steering<'a>(
    paddle_x: f32,
    paddle_center: f32,
    balls: impl IntoIterator<Item = &'a Ball>,
) -> Steering {
    let nearest = balls.into_iter().min_by(|a, b| {
        let da = (a.pos.x - paddle_x).powi(2) + (a.pos.y - paddle_center).powi(2);
        let db = (b.pos.x - paddle_x).powi(2) + (b.pos.y - paddle_center).powi(2);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    match nearest {
        Some(ball) => Steering::Chase {
            target: ball.pos.y,
            speed_scale: 1.0,
        },
        None => Steering::Idle,
    }
}
