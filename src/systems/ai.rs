//! AI target selection and steering.

use bevy_ecs::prelude::*;

use crate::components::{AiControlled, PlayerId, Transform};
use crate::config::GameConfig;
use crate::math::{lerp, normalize_degrees, to_degrees, Vec2};
use crate::systems::movement::FixedDelta;

/// How close to the current target before choosing a new one.
const RETARGET_RADIUS_SQ: f32 = 100.0;

/// Fixed thrust for AI karts.
const AI_ACCELERATION: f32 = 5.0;

/// Re-targets an AI kart once it gets near its current target: chase the
/// closest player, or keep driving to the old target when none exist.
pub fn ai_target_system(
    mut ai_query: Query<(&mut AiControlled, &Transform)>,
    players: Query<&Transform, With<PlayerId>>,
) {
    for (mut ai, transform) in ai_query.iter_mut() {
        // A zero target means "not chosen yet"; otherwise drive the current
        // one down before picking again.
        if ai.target != Vec2::ZERO
            && transform.pos().distance_sq(ai.target) > RETARGET_RADIUS_SQ
        {
            continue;
        }

        let mut nearest: Option<(f32, Vec2)> = None;
        for player in players.iter() {
            let dist = transform.pos().distance_sq(player.pos());
            if nearest.map(|(best, _)| dist < best).unwrap_or(true) {
                nearest = Some((dist, player.pos()));
            }
        }
        if let Some((_, position)) = nearest {
            ai.target = position;
        }
    }
}

/// Steers AI karts toward their target in the fixed phase, with the same
/// speed-widened turning radius players get.
pub fn ai_steering_system(
    dt: Res<FixedDelta>,
    config: Res<GameConfig>,
    mut query: Query<(&AiControlled, &mut Transform)>,
) {
    let delta = dt.0;

    for (ai, mut transform) in query.iter_mut() {
        if ai.target == Vec2::ZERO {
            continue;
        }

        let away = (transform.pos() - ai.target).normalized();
        let desired = normalize_degrees(to_degrees(away.y.atan2(away.x)) - 90.0);

        // Signed shortest turn toward the desired facing.
        let diff = normalize_degrees(desired - transform.angle);
        let steer = if diff == 0.0 {
            0.0
        } else if diff > 180.0 {
            -1.0
        } else {
            1.0
        };

        let radius = lerp(
            config.minimum_steering_radius.data,
            config.maximum_steering_radius.data,
            transform.speed() / config.max_speed.data,
        );

        transform.set_angle(desired);
        transform.accel = AI_ACCELERATION;

        let limit = if transform.accel_mult > 1.0 {
            config.max_speed.data * 2.0
        } else {
            config.max_speed.data
        };
        let movement = (transform.speed() + AI_ACCELERATION).clamp(-limit, limit);

        let next = transform.angle + steer * delta * radius;
        transform.set_angle(next);

        let push = transform.heading() * (movement * delta);
        transform.velocity += push;
        transform.update_speed_dot();
    }
}
