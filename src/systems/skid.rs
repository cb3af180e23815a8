//! Skid detection and tire-mark bookkeeping.
//!
//! A kart is skidding when its velocity is mostly perpendicular to its
//! facing (or while a strong boost is active). Skidding appends points to
//! the kart's tire-mark trail and asks for the skid sound at the start of
//! each new segment. Drawing the marks is the renderer's problem.

use bevy_ecs::prelude::*;

use crate::components::{SoundKind, TireMarks, Transform};
use crate::config::GameConfig;
use crate::makers::make_sound_request;
use crate::math::{to_radians, Vec2};
use crate::systems::movement::DeltaTime;

fn should_skid(transform: &Transform, skid_threshold_pct: f32) -> bool {
    if transform.accel_mult > 2.0 {
        return true;
    }
    let speed = transform.speed();
    if speed == 0.0 {
        return false;
    }

    let velocity_normalized = transform.velocity / speed;
    let rad = to_radians(transform.angle - 90.0);
    let forward = Vec2::new(rad.cos(), rad.sin());

    // The closer the dot is to zero, the more sideways the kart slides.
    let dot = velocity_normalized.dot(forward);
    dot.abs() < skid_threshold_pct / 100.0
}

pub fn skid_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    config: Res<GameConfig>,
    mut query: Query<(&Transform, &mut TireMarks)>,
) {
    for (transform, mut marks) in query.iter_mut() {
        marks.pass_time(dt.0);

        if should_skid(transform, config.skid_threshold.data) {
            let starting_segment = !marks.added_last_frame;
            marks.add_mark(transform.center(), starting_segment);
            marks.added_last_frame = true;
            if starting_segment {
                make_sound_request(&mut commands, SoundKind::Skid);
            }
        } else {
            marks.added_last_frame = false;
        }
    }
}
