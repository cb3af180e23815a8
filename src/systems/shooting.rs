//! Weapon cooldowns, trigger handling and fire effects.
//!
//! A successful fire runs its effects exactly once: one projectile per
//! configured angle offset (plus spread jitter), a muzzle poof pinned to the
//! firer, a sound request, and a recoil impulse perpendicular to the firer's
//! facing.

use bevy_ecs::prelude::*;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::components::{AiControlled, PlayerId, Transform};
use crate::input::{InputAction, InputCollector};
use crate::makers::{make_poof, make_projectile, make_sound_request};
use crate::math::{normalize_degrees, to_degrees, Vec2};
use crate::systems::movement::DeltaTime;
use crate::weapons::{CanShoot, FiredWeapon};

/// AI fires only when facing within this many degrees of its target.
const AI_ALIGNMENT_DEG: f32 = 10.0;

/// Seeded jitter stream for projectile spread, so runs replay identically.
#[derive(Resource)]
pub struct SpreadRng(pub Pcg32);

impl SpreadRng {
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(Pcg32::seed_from_u64(seed))
    }
}

impl Default for SpreadRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}

fn apply_fire_effects(
    commands: &mut Commands,
    rng: &mut SpreadRng,
    firer: Entity,
    transform: &mut Transform,
    fired: &FiredWeapon,
) {
    let projectile = &fired.config.projectile;

    for offset in &projectile.angle_offsets {
        let mut angle_offset = *offset;
        if projectile.spread > 0.0 {
            let jitter: f32 = rng.0.gen_range(-projectile.spread..=projectile.spread);
            angle_offset += projectile.size.x * jitter;
        }
        make_projectile(commands, firer, transform, fired, angle_offset);
    }

    make_poof(commands, firer, transform, fired, 0.0);
    make_sound_request(commands, fired.config.sound);

    // Recoil: perpendicular to the facing direction, scaled by knockback.
    let facing = Vec2::new(transform.as_rad().cos(), transform.as_rad().sin());
    let recoil = facing.perpendicular().normalized() * fired.config.knockback_amt;
    transform.velocity += recoil;
}

/// Counts weapon cooldowns down and fires slots whose trigger is held.
pub fn shoot_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    input: Res<InputCollector>,
    mut rng: ResMut<SpreadRng>,
    mut query: Query<(Entity, &mut Transform, &mut CanShoot, &PlayerId)>,
) {
    for (entity, mut transform, mut can_shoot, player) in query.iter_mut() {
        for action in InputAction::ALL {
            can_shoot.pass_time(action, dt.0);
        }

        for event in input.held_for(player.0) {
            if !matches!(
                event.action,
                InputAction::ShootLeft | InputAction::ShootRight
            ) {
                continue;
            }
            if let Some(fired) = can_shoot.fire(event.action) {
                apply_fire_effects(&mut commands, &mut rng, entity, &mut transform, &fired);
            }
        }
    }
}

/// AI trigger discipline: fire the primary slot when roughly aimed at the
/// current target.
pub fn ai_shoot_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut rng: ResMut<SpreadRng>,
    mut query: Query<(Entity, &mut Transform, &mut CanShoot, &AiControlled)>,
) {
    for (entity, mut transform, mut can_shoot, ai) in query.iter_mut() {
        for action in InputAction::ALL {
            can_shoot.pass_time(action, dt.0);
        }

        if ai.target == Vec2::ZERO {
            continue;
        }
        let to_target = (ai.target - transform.center()).normalized();
        if to_target == Vec2::ZERO {
            continue;
        }

        // Facing angle whose heading points at the target.
        let aim = to_degrees(to_target.x.atan2(-to_target.y));
        let diff = normalize_degrees(aim - transform.angle);
        let misalignment = if diff > 180.0 { 360.0 - diff } else { diff };
        if misalignment > AI_ALIGNMENT_DEG {
            continue;
        }

        if let Some(fired) = can_shoot.fire(InputAction::ShootLeft) {
            apply_fire_effects(&mut commands, &mut rng, entity, &mut transform, &fired);
        }
    }
}
