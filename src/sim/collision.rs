//! Collision detection and response
//!
//! Balls are circles; paddles and obstacles are axis-aligned rectangles
//! given by their top-left corner and size.

use glam::Vec2;

/// Circle vs axis-aligned rectangle (closest-point test)
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_pos: Vec2, rect_size: Vec2) -> bool {
    let closest = center.clamp(rect_pos, rect_pos + rect_size);
    center.distance_squared(closest) < radius * radius
}

/// Circle vs circle
pub fn circle_circle_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Where on a paddle the ball struck: -1 at the top edge, 0 at the centre,
/// 1 at the bottom edge
pub fn hit_offset(ball_y: f32, paddle_y: f32, paddle_height: f32) -> f32 {
    let half = paddle_height / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball_y - (paddle_y + half)) / half).clamp(-1.0, 1.0)
}

/// Cap each velocity component independently
#[inline]
pub fn clamp_axes(vel: Vec2, max_speed: f32) -> Vec2 {
    vel.clamp(Vec2::splat(-max_speed), Vec2::splat(max_speed))
}

/// Tuning for the paddle bounce
#[derive(Debug, Clone, Copy)]
pub struct BounceParams {
    /// Deflection at offset ±1, in radians
    pub max_angle: f32,
    /// Speed multiplier per hit
    pub speed_increment: f32,
    /// Per-axis cap
    pub max_speed: f32,
}

/// Velocity after a paddle hit.
///
/// Horizontal direction flips, the vertical component is set from the hit
/// offset (`sin(offset · max_angle) · |dx|`), both grow by the increment
/// and are capped per axis. No randomness.
pub fn paddle_bounce(vel: Vec2, offset: f32, params: &BounceParams) -> Vec2 {
    let dx = -vel.x;
    let dy = (offset * params.max_angle).sin() * dx.abs();
    clamp_axes(Vec2::new(dx, dy) * params.speed_increment, params.max_speed)
}

/// Full 180° turn (obstacle hits)
#[inline]
pub fn reverse(vel: Vec2) -> Vec2 {
    -vel
}
