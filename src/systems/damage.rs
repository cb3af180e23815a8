//! Overlap damage, invulnerability windows and lifetime expiry.

use bevy_ecs::prelude::*;

use crate::components::{Cleanup, DamageOnContact, Health, Lifetime, Transform};
use crate::query::{required, required_mut, EntityQuery};
use crate::systems::movement::DeltaTime;

/// Applies every overlapping damager to every vulnerable health-bearing
/// entity.
///
/// Per target: the iframes timer counts down first; while it is positive
/// all matched damage is ignored outright. Otherwise each overlapping
/// damager (in ascending entity order, so multi-hit ticks are
/// deterministic) subtracts its damage, re-arms the target's iframes and is
/// destroyed. Several hits can land in one tick and health may go negative.
///
/// The self check compares the damager's firer id against the *target's*
/// id, so a firer's projectile can still hit the firer's other entities.
pub fn damage_system(world: &mut World) {
    let dt = world.resource::<DeltaTime>().0;

    let targets = EntityQuery::new(world)
        .with_component::<Transform>()
        .with_component::<Health>()
        .gen();

    for target in targets {
        {
            let mut health = required_mut::<Health>(world, target);
            health.pass_time(dt);
            if health.is_invulnerable() {
                continue;
            }
        }

        let rect = required::<Transform>(world, target).rect();
        let damagers = EntityQuery::new(world)
            .with_component::<DamageOnContact>()
            .with_component::<Transform>()
            .where_not_id(target)
            .where_overlaps(rect)
            .gen();

        for damager in damagers {
            let contact = *required::<DamageOnContact>(world, damager);
            if contact.firer == target {
                continue;
            }

            {
                let mut health = required_mut::<Health>(world, target);
                health.amount -= contact.amount;
                health.iframes = health.iframes_reset;
                health.last_damaged_by = Some(contact.firer);
            }
            // One-shot: the damager dies the moment it lands.
            world.entity_mut(damager).insert(Cleanup);
        }
    }
}

/// Counts lifetimes down and tombstones expired entities, regardless of
/// anything else going on around them.
pub fn lifetime_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in query.iter_mut() {
        lifetime.0 -= dt.0;
        if lifetime.0 <= 0.0 {
            commands.entity(entity).insert(Cleanup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::weapons::MAX_HEALTH;

    fn vulnerable_kart(world: &mut World) -> Entity {
        let mut health = Health::new(MAX_HEALTH);
        health.iframes = 0.0;
        world
            .spawn((
                Transform::new(Vec2::ZERO, Vec2::new(20.0, 20.0)),
                health,
            ))
            .id()
    }

    fn projectile(world: &mut World, firer: Entity, x: f32, amount: i32) -> Entity {
        world
            .spawn((
                Transform::new(Vec2::new(x, 5.0), Vec2::new(10.0, 10.0)),
                DamageOnContact::new(firer, amount),
            ))
            .id()
    }

    fn run_damage(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(damage_system);
        schedule.run(world);
    }

    #[test]
    fn test_hit_applies_damage_and_rearms_iframes() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let target = vulnerable_kart(&mut world);
        let firer = world.spawn_empty().id();
        let shot = projectile(&mut world, firer, 5.0, 30);

        run_damage(&mut world);

        let health = world.get::<Health>(target).unwrap();
        assert_eq!(health.amount, MAX_HEALTH - 30);
        assert_eq!(health.iframes, health.iframes_reset);
        assert_eq!(health.last_damaged_by, Some(firer));
        assert!(world.get::<Cleanup>(shot).is_some());
    }

    #[test]
    fn test_iframes_gate_all_damage() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let target = vulnerable_kart(&mut world);
        world.get_mut::<Health>(target).unwrap().iframes = 0.3;
        let firer = world.spawn_empty().id();
        let shot_a = projectile(&mut world, firer, 2.0, 30);
        let shot_b = projectile(&mut world, firer, 8.0, 30);

        run_damage(&mut world);

        let health = world.get::<Health>(target).unwrap();
        assert_eq!(health.amount, MAX_HEALTH);
        assert!(world.get::<Cleanup>(shot_a).is_none());
        assert!(world.get::<Cleanup>(shot_b).is_none());
    }

    #[test]
    fn test_simultaneous_hits_all_apply() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let target = vulnerable_kart(&mut world);
        let firer = world.spawn_empty().id();
        projectile(&mut world, firer, 0.0, 80);
        projectile(&mut world, firer, 10.0, 80);

        run_damage(&mut world);

        // Health goes negative in one tick when enough hits land together.
        let health = world.get::<Health>(target).unwrap();
        assert_eq!(health.amount, MAX_HEALTH - 160);
    }

    #[test]
    fn test_own_projectile_cannot_hit_firer() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let target = vulnerable_kart(&mut world);
        let shot = projectile(&mut world, target, 5.0, 30);

        run_damage(&mut world);

        assert_eq!(world.get::<Health>(target).unwrap().amount, MAX_HEALTH);
        assert!(world.get::<Cleanup>(shot).is_none());
    }

    #[test]
    fn test_tombstoned_damager_is_inert() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let target = vulnerable_kart(&mut world);
        let firer = world.spawn_empty().id();
        let shot = projectile(&mut world, firer, 5.0, 30);
        world.entity_mut(shot).insert(Cleanup);

        run_damage(&mut world);

        assert_eq!(world.get::<Health>(target).unwrap().amount, MAX_HEALTH);
    }

    #[test]
    fn test_lifetime_expiry_tombstones() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let short = world.spawn(Lifetime(0.05)).id();
        let long = world.spawn(Lifetime(5.0)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(lifetime_system);
        schedule.run(&mut world);

        assert!(world.get::<Cleanup>(short).is_some());
        assert!(world.get::<Cleanup>(long).is_none());
    }
}
