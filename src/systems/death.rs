//! Death processing, respawns, kill attribution and the cleanup sweep.

use bevy_ecs::prelude::*;
use tracing::{info, warn};

use crate::components::{Cleanup, Health, KillCount, Lives, PlayerId, Transform};
use crate::config::CurrentResolution;
use crate::makers::{make_explosion, spawn_position};
use crate::round::{RoundManager, RoundType};

/// Handles every entity whose health dropped to or below zero this tick.
///
/// Death always spawns an explosion. Players are moved back to their spawn
/// point. In a Kills round the killer is credited and the victim's health
/// simply refills; in a Lives round a life is spent and only a kart with
/// none left is tombstoned for good.
///
/// Runs after the damage system and before the cleanup sweep, so a death is
/// processed exactly once in the tick it is detected.
pub fn death_system(
    mut commands: Commands,
    resolution: Res<CurrentResolution>,
    rounds: Res<RoundManager>,
    mut karts: Query<(
        Entity,
        &mut Transform,
        &mut Health,
        Option<&mut Lives>,
        Option<&PlayerId>,
    )>,
    damager_ids: Query<&PlayerId>,
    mut kill_trackers: Query<(&PlayerId, &mut KillCount)>,
) {
    for (entity, mut transform, mut health, lives, player) in karts.iter_mut() {
        if health.amount > 0 {
            continue;
        }

        info!("kart {:?} died with health {}", entity, health.amount);
        make_explosion(&mut commands, &transform);

        if let Some(player) = player {
            transform.position =
                spawn_position(player.0 as usize, resolution.width, resolution.height);
        }

        if rounds.active == RoundType::Kills {
            award_kill(&health, &damager_ids, &mut kill_trackers);
            if lives.is_some() {
                health.amount = health.max_amount;
                continue;
            }
        }

        if let Some(mut lives) = lives {
            lives.remaining -= 1;
            if lives.remaining > 0 {
                health.amount = health.max_amount;
                continue;
            }
        }

        commands.entity(entity).insert(Cleanup);
    }
}

fn award_kill(
    health: &Health,
    damager_ids: &Query<&PlayerId>,
    kill_trackers: &mut Query<(&PlayerId, &mut KillCount)>,
) {
    let Some(damager) = health.last_damaged_by else {
        warn!("kart died but nothing is on record as the cause");
        return;
    };
    let Ok(killer) = damager_ids.get(damager) else {
        warn!("kart died from environment damage - no kill awarded");
        return;
    };

    for (player, mut kills) in kill_trackers.iter_mut() {
        if player == killer {
            kills.0 += 1;
            info!("player {} got a kill", player.0);
            return;
        }
    }
}

/// Destructively removes tombstoned entities. This is the only place
/// entities leave the store, so in-tick iteration never sees a dangling id.
pub fn cleanup_sweep_system(world: &mut World) {
    let doomed: Vec<Entity> = world
        .query_filtered::<Entity, With<Cleanup>>()
        .iter(world)
        .collect();
    for entity in doomed {
        world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::AnimationRequest;
    use crate::math::Vec2;
    use crate::round::RoundOutcome;
    use crate::weapons::MAX_HEALTH;

    fn setup() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(CurrentResolution::default());
        world.insert_resource(RoundManager::default());
        world.insert_resource(RoundOutcome::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(death_system);
        (world, schedule)
    }

    fn dead_kart(world: &mut World, lives: i32) -> Entity {
        let mut health = Health::new(MAX_HEALTH);
        health.amount = 0;
        world
            .spawn((
                Transform::new(Vec2::new(400.0, 300.0), Vec2::new(15.0, 25.0)),
                health,
                Lives::new(lives),
                PlayerId(0),
            ))
            .id()
    }

    #[test]
    fn test_lives_respawn_cycle() {
        let (mut world, mut schedule) = setup();
        let kart = dead_kart(&mut world, 2);

        // First death: a life is spent, health refills, no tombstone.
        schedule.run(&mut world);
        assert_eq!(world.get::<Health>(kart).unwrap().amount, MAX_HEALTH);
        assert_eq!(world.get::<Lives>(kart).unwrap().remaining, 1);
        assert!(world.get::<Cleanup>(kart).is_none());

        // Respawn puts the player back on its spawn slot.
        let position = world.get::<Transform>(kart).unwrap().position;
        assert_eq!(position, spawn_position(0, 1280.0, 720.0));

        // Second death: out of lives, tombstoned.
        world.get_mut::<Health>(kart).unwrap().amount = 0;
        schedule.run(&mut world);
        assert_eq!(world.get::<Lives>(kart).unwrap().remaining, 0);
        assert!(world.get::<Cleanup>(kart).is_some());
    }

    #[test]
    fn test_death_spawns_explosion_once() {
        let (mut world, mut schedule) = setup();
        dead_kart(&mut world, 3);

        schedule.run(&mut world);
        let mut query = world.query::<&AnimationRequest>();
        assert_eq!(query.iter(&world).count(), 1);

        // Health was restored; a second run must not re-process the death.
        schedule.run(&mut world);
        let mut query = world.query::<&AnimationRequest>();
        assert_eq!(query.iter(&world).count(), 1);
    }

    #[test]
    fn test_kills_round_credits_killer_and_refills() {
        let (mut world, mut schedule) = setup();
        world.resource_mut::<RoundManager>().active = RoundType::Kills;

        let killer = world.spawn((PlayerId(1), KillCount::default())).id();
        let victim = dead_kart(&mut world, 1);
        world.get_mut::<Health>(victim).unwrap().last_damaged_by = Some(killer);

        schedule.run(&mut world);

        assert_eq!(world.get::<KillCount>(killer).unwrap().0, 1);
        // Kills rounds never consume lives.
        assert_eq!(world.get::<Health>(victim).unwrap().amount, MAX_HEALTH);
        assert_eq!(world.get::<Lives>(victim).unwrap().remaining, 1);
        assert!(world.get::<Cleanup>(victim).is_none());
    }

    #[test]
    fn test_environment_death_awards_nothing() {
        let (mut world, mut schedule) = setup();
        world.resource_mut::<RoundManager>().active = RoundType::Kills;

        let bystander = world.spawn((PlayerId(1), KillCount::default())).id();
        dead_kart(&mut world, 1); // last_damaged_by is None

        schedule.run(&mut world);
        assert_eq!(world.get::<KillCount>(bystander).unwrap().0, 0);
    }

    #[test]
    fn test_entity_without_lives_is_tombstoned() {
        let (mut world, mut schedule) = setup();
        let mut health = Health::new(MAX_HEALTH);
        health.amount = -10;
        let drone = world
            .spawn((
                Transform::new(Vec2::ZERO, Vec2::new(10.0, 10.0)),
                health,
            ))
            .id();

        schedule.run(&mut world);
        assert!(world.get::<Cleanup>(drone).is_some());
    }

    #[test]
    fn test_cleanup_sweep_despawns_tombstoned() {
        let mut world = World::new();
        let doomed = world
            .spawn((Transform::new(Vec2::ZERO, Vec2::new(1.0, 1.0)), Cleanup))
            .id();
        let alive = world
            .spawn(Transform::new(Vec2::ZERO, Vec2::new(1.0, 1.0)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(cleanup_sweep_system);
        schedule.run(&mut world);

        assert!(world.get_entity(doomed).is_err());
        assert!(world.get_entity(alive).is_ok());
    }
}
