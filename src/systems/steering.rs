//! Player steering: turns held inputs into acceleration, steering and boost.
//!
//! Runs in the fixed phase so the handling model is deterministic for a
//! given input sequence, independent of frame rate.

use bevy_ecs::prelude::*;

use crate::components::{PlayerId, Transform};
use crate::config::GameConfig;
use crate::input::{InputAction, InputCollector};
use crate::math::lerp;
use crate::systems::movement::FixedDelta;

/// Fraction of max speed granted up front when a boost starts.
const BOOST_UPFRONT_PCT: f32 = 0.2;

pub fn player_steering_system(
    dt: Res<FixedDelta>,
    config: Res<GameConfig>,
    input: Res<InputCollector>,
    mut query: Query<(&PlayerId, &mut Transform)>,
) {
    let delta = dt.0;

    for (player, mut transform) in query.iter_mut() {
        transform.accel = 0.0;
        let mut steer = 0.0;

        for event in input.held_for(player.0) {
            match event.action {
                InputAction::Accel => {
                    transform.accel = if transform.is_reversing() {
                        -config.braking_acceleration.data
                    } else {
                        config.forward_acceleration.data
                    };
                }
                InputAction::Brake => {
                    transform.accel = if transform.is_reversing() {
                        config.reverse_acceleration.data
                    } else {
                        -config.braking_acceleration.data
                    };
                }
                InputAction::SteerLeft => steer = -event.amount,
                InputAction::SteerRight => steer = event.amount,
                _ => {}
            }
        }

        for event in input.pressed_for(player.0) {
            if event.action != InputAction::Boost {
                continue;
            }
            // One boost at a time, and not while reversing.
            if !transform.is_reversing() && transform.accel_mult <= 1.0 {
                transform.accel_mult = config.boost_acceleration.data;
                let kick = transform.heading() * (config.max_speed.data * BOOST_UPFRONT_PCT);
                transform.velocity += kick;
            }
        }

        // Steering radius widens with speed, so fast karts turn wide.
        if transform.speed() > 0.01 {
            let radius = lerp(
                config.minimum_steering_radius.data,
                config.maximum_steering_radius.data,
                transform.speed() / config.max_speed.data,
            );
            let next = transform.angle + steer * config.steering_sensitivity.data * delta * radius;
            transform.set_angle(next);
        }

        let decayed =
            transform.accel_mult - transform.accel_mult * config.boost_decay_percent.data * delta;
        transform.accel_mult = decayed.max(1.0);

        let movement = if transform.accel != 0.0 {
            (transform.speed() + transform.accel * transform.accel_mult)
                .clamp(-config.max_speed.data, config.max_speed.data)
        } else {
            transform
                .speed()
                .clamp(-config.max_speed.data, config.max_speed.data)
        };

        let thrust = if transform.is_reversing() {
            -movement
        } else {
            movement
        };
        let push = transform.heading() * (thrust * delta);
        transform.velocity += push;
        transform.update_speed_dot();
    }
}
