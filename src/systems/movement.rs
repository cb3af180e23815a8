//! Movement integration and screen wraparound.

use bevy_ecs::prelude::*;

use crate::components::{Cleanup, Transform, WrapAround};
use crate::config::CurrentResolution;
use crate::math::Rect;

/// Variable frame delta for the update phase.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Constant physics delta for the fixed phase.
#[derive(Resource, Default)]
pub struct FixedDelta(pub f32);

/// Velocity damping per fixed tick while under acceleration.
const DAMPING_ACCELERATING: f32 = 0.99;
/// Velocity damping per fixed tick while coasting. Geometric decay: the
/// kart drifts on and never fully stops without counter-acceleration.
const DAMPING_COASTING: f32 = 0.98;

/// Applies velocity to position and damps velocity to fake friction.
pub fn movement_system(mut query: Query<&mut Transform>) {
    for mut transform in query.iter_mut() {
        let velocity = transform.velocity;
        transform.position += velocity;

        let damping = if transform.accel != 0.0 {
            DAMPING_ACCELERATING
        } else {
            DAMPING_COASTING
        };
        transform.velocity = velocity * damping;
    }
}

/// Teleports wrap-eligible entities that left the play area (plus padding)
/// to the opposite edge. The resolution is a single per-tick lookup, never
/// queried per entity.
pub fn wraparound_system(
    mut commands: Commands,
    resolution: Res<CurrentResolution>,
    mut query: Query<(Entity, &mut Transform, &WrapAround)>,
) {
    let width = resolution.width;
    let height = resolution.height;
    let screen = Rect::new(0.0, 0.0, width, height);

    for (entity, mut transform, wrap) in query.iter_mut() {
        if screen.overlaps(&transform.rect()) {
            continue;
        }

        // Fully off-screen from here on.
        if transform.cleanup_out_of_bounds {
            commands.entity(entity).insert(Cleanup);
            continue;
        }
        if !transform.render_out_of_bounds {
            continue;
        }

        let padding = wrap.padding;
        if transform.rect().x > width + padding {
            transform.position.x = -padding;
        }
        if transform.rect().x < -padding {
            transform.position.x = width + padding;
        }
        if transform.rect().y < -padding {
            transform.position.y = height + padding;
        }
        if transform.rect().y > height + padding {
            transform.position.y = -padding;
        }
    }
}
