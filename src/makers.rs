//! Entity factories: karts, projectiles and effect entities.

use bevy_ecs::prelude::*;

use crate::components::{
    AiControlled, AnimationRequest, DamageOnContact, Health, KillCount, Lifetime, Lives, PlayerId,
    SoundKind, SoundRequest, TireMarks, TracksEntity, Transform, WrapAround,
};
use crate::config::{CurrentResolution, GameConfig};
use crate::input::InputAction;
use crate::math::{to_radians, Vec2};
use crate::query::EntityQuery;
use crate::round::RoundManager;
use crate::weapons::{FiredWeapon, FiringDirection, WeaponKind, MAX_HEALTH};

const KART_SIZE: Vec2 = Vec2::new(15.0, 25.0);
const KART_MASS: f32 = 1000.0;

/// Fractional spawn slots, mirrored pairs working inward from the sides.
const SPAWN_SLOTS: [(f32, f32); 8] = [
    (0.1, 0.5),
    (0.9, 0.5),
    (0.1, 0.1),
    (0.9, 0.1),
    (0.1, 0.9),
    (0.9, 0.9),
    (0.5, 0.1),
    (0.5, 0.9),
];

/// Spawn point for the given slot, scaled to the current play area.
pub fn spawn_position(slot: usize, width: f32, height: f32) -> Vec2 {
    let (pct_x, pct_y) = SPAWN_SLOTS[slot % SPAWN_SLOTS.len()];
    Vec2::new(pct_x * width, pct_y * height)
}

/// Spawns a bare kart at the given spawn slot with the default loadout.
pub fn spawn_kart(world: &mut World, slot: usize) -> Entity {
    let (width, height) = {
        let resolution = world.resource::<CurrentResolution>();
        (resolution.width, resolution.height)
    };
    let tuning = world.resource::<GameConfig>().clone();
    let (enabled, starting_lives) = {
        let rounds = world.resource::<RoundManager>();
        (rounds.enabled_weapons(), rounds.starting_lives())
    };

    let mut transform = Transform::new(spawn_position(slot, width, height), KART_SIZE);
    transform.mass = KART_MASS;

    let mut can_shoot = crate::weapons::CanShoot::default();
    can_shoot
        .register_weapon(
            InputAction::ShootLeft,
            FiringDirection::Forward,
            WeaponKind::Shotgun,
            &tuning,
            enabled,
        )
        .register_weapon(
            InputAction::ShootRight,
            FiringDirection::Forward,
            WeaponKind::MachineGun,
            &tuning,
            enabled,
        );

    world
        .spawn((
            transform,
            Health::new(MAX_HEALTH),
            Lives::new(starting_lives),
            WrapAround::default(),
            TireMarks::default(),
            KillCount::default(),
            can_shoot,
        ))
        .id()
}

/// Spawns a player-controlled kart for the given gamepad slot.
pub fn spawn_player(world: &mut World, player_id: u32) -> Entity {
    let entity = spawn_kart(world, player_id as usize);
    world.entity_mut(entity).insert(PlayerId(player_id));
    entity
}

/// Spawns an AI kart in the next free spawn slot.
pub fn spawn_ai_kart(world: &mut World) -> Entity {
    let num_players = EntityQuery::new(world)
        .with_component::<PlayerId>()
        .gen_count();
    let num_ais = EntityQuery::new(world)
        .with_component::<AiControlled>()
        .gen_count();

    let entity = spawn_kart(world, num_players + num_ais);
    world.entity_mut(entity).insert(AiControlled::default());
    entity
}

/// Spawns one projectile inheriting the firer's heading plus `angle_offset`.
pub fn make_projectile(
    commands: &mut Commands,
    firer: Entity,
    firer_transform: &Transform,
    weapon: &FiredWeapon,
    angle_offset: f32,
) {
    let projectile = &weapon.config.projectile;
    let direction = weapon.firing_direction.angle_offset();

    let spawn_bias = Vec2::new(0.0, projectile.size.y);
    let mut transform = Transform::new(firer_transform.pos() + spawn_bias, projectile.size);
    transform.set_angle(firer_transform.angle + direction + angle_offset);
    // Projectiles never take part in impulse resolution.
    transform.mass = 0.0;

    let rad = firer_transform.as_rad() + to_radians(direction + angle_offset);
    transform.velocity = Vec2::new(rad.sin() * projectile.speed, -rad.cos() * projectile.speed);
    transform.accel = projectile.acceleration;
    transform.render_out_of_bounds = projectile.can_wrap_around && projectile.render_out_of_bounds;
    // A projectile that cannot wrap flies into the void and is reclaimed.
    transform.cleanup_out_of_bounds = !projectile.can_wrap_around;

    let wrap_padding = if projectile.can_wrap_around {
        0.0
    } else {
        f32::MAX
    };

    commands.spawn((
        transform,
        DamageOnContact::new(firer, projectile.base_damage),
        Lifetime(projectile.life_time_seconds),
        WrapAround {
            padding: wrap_padding,
        },
    ));
}

/// Spawns the muzzle-flash animation pinned to the firer.
pub fn make_poof(
    commands: &mut Commands,
    firer: Entity,
    firer_transform: &Transform,
    weapon: &FiredWeapon,
    angle_offset: f32,
) {
    let (offset, angle) = match weapon.firing_direction {
        FiringDirection::Forward => (Vec2::ZERO, 0.0),
        FiringDirection::Left => (Vec2::new(-20.0, 10.0), -90.0),
        FiringDirection::Right => (Vec2::new(20.0, 10.0), 90.0),
        FiringDirection::Back => (Vec2::ZERO, 180.0),
    };

    let frames = 14;
    let frame_duration = 1.0 / 20.0;
    let mut transform = Transform::new(firer_transform.pos() + offset, Vec2::new(10.0, 10.0));
    transform.set_angle(firer_transform.angle + angle + angle_offset);
    transform.mass = 0.0;

    commands.spawn((
        transform,
        TracksEntity::new(firer, offset),
        AnimationRequest {
            sprite_cell: (0, 0),
            total_frames: frames,
            frame_duration,
            scale: 1.0,
        },
        Lifetime(frames as f32 * frame_duration),
    ));
}

/// Spawns the death explosion at the given transform.
pub fn make_explosion(commands: &mut Commands, at: &Transform) {
    let frames = 9;
    let frame_duration = 1.0 / 20.0;
    let mut transform = Transform::new(at.pos(), Vec2::new(10.0, 10.0));
    transform.mass = 0.0;

    commands.spawn((
        transform,
        AnimationRequest {
            sprite_cell: (0, 3),
            total_frames: frames,
            frame_duration,
            scale: 2.0,
        },
        Lifetime(frames as f32 * frame_duration),
        SoundRequest {
            kind: SoundKind::Explosion,
        },
    ));
}

/// Spawns a standalone sound request. Requests expire on their own if the
/// host's audio system does not drain them first.
pub fn make_sound_request(commands: &mut Commands, kind: SoundKind) {
    commands.spawn((SoundRequest { kind }, Lifetime(0.5)));
}
