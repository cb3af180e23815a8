//! Pairwise collision impulse resolution.
//!
//! Every massy entity resolves against all partners overlapping it this
//! tick. An entity that was already resolved as somebody else's partner is
//! skipped as a primary, so no pair is resolved twice; the per-tick resolved
//! set is cleared at the start of each run.
//!
//! The impulse model is deliberately simple: relative velocity projected
//! onto the unit normal between centers, split by inverse mass, scaled down
//! by the configured damping factor. Infinite-mass entities (walls) absorb
//! impulses without moving. Massless entities (projectiles, effects) are
//! ignored entirely; projectile-vs-kart contact is damage, not physics.

use std::collections::HashSet;

use bevy_ecs::prelude::*;

use crate::components::Transform;
use crate::config::GameConfig;
use crate::math::Vec2;
use crate::query::{required, required_mut, EntityQuery};

pub fn collision_system(world: &mut World, mut resolved: Local<HashSet<Entity>>) {
    resolved.clear();

    let damping = world.resource::<GameConfig>().collision_scalar.data;
    let primaries = EntityQuery::new(world).with_component::<Transform>().gen();

    for entity in primaries {
        if resolved.contains(&entity) {
            continue;
        }

        let (rect, mass) = {
            let transform = required::<Transform>(world, entity);
            (transform.rect(), transform.mass)
        };
        if mass <= 0.0 {
            continue;
        }

        let partners = EntityQuery::new(world)
            .with_component::<Transform>()
            .where_not_id(entity)
            .where_overlaps(rect)
            .gen();

        for other in partners {
            if required::<Transform>(world, other).mass <= 0.0 {
                continue;
            }
            resolve_collision(world, entity, other, damping);
            resolved.insert(other);
        }
    }
}

fn resolve_collision(world: &mut World, a: Entity, b: Entity, damping: f32) {
    let transform_a = required::<Transform>(world, a).clone();
    let transform_b = required::<Transform>(world, b).clone();

    let normal = (transform_b.center() - transform_a.center()).normalized();
    if normal == Vec2::ZERO {
        return;
    }

    let relative_velocity = transform_b.velocity - transform_a.velocity;
    let velocity_along_normal = relative_velocity.dot(normal);
    // Already separating; resolving would glue the pair together.
    if velocity_along_normal > 0.0 {
        return;
    }

    let impulse =
        -velocity_along_normal / (1.0 / transform_a.mass + 1.0 / transform_b.mass);
    let impulse_vector = normal * (impulse * damping);

    if transform_a.mass.is_finite() {
        let delta = impulse_vector / transform_a.mass;
        required_mut::<Transform>(world, a).velocity -= delta;
    }
    if transform_b.mass.is_finite() {
        let delta = impulse_vector / transform_b.mass;
        required_mut::<Transform>(world, b).velocity += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kart(world: &mut World, x: f32, velocity_x: f32, mass: f32) -> Entity {
        let mut transform = Transform::new(Vec2::new(x, 0.0), Vec2::new(20.0, 20.0));
        transform.velocity = Vec2::new(velocity_x, 0.0);
        transform.mass = mass;
        world.spawn(transform).id()
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(collision_system);
        schedule.run(world);
    }

    #[test]
    fn test_head_on_collision_is_equal_and_opposite() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());

        let a = kart(&mut world, 0.0, 1.0, 1000.0);
        let b = kart(&mut world, 10.0, -1.0, 1000.0);
        run(&mut world);

        let velocity_a = world.get::<Transform>(a).unwrap().velocity;
        let velocity_b = world.get::<Transform>(b).unwrap().velocity;

        // Impulse 1000 * damping 0.1 split over mass 1000 each => 0.1 change,
        // applied exactly once per pair.
        assert!((velocity_a.x - 0.9).abs() < 0.001);
        assert!((velocity_b.x + 0.9).abs() < 0.001);
    }

    #[test]
    fn test_separating_pair_is_untouched() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());

        let a = kart(&mut world, 0.0, -1.0, 1000.0);
        let b = kart(&mut world, 10.0, 1.0, 1000.0);
        run(&mut world);

        assert_eq!(world.get::<Transform>(a).unwrap().velocity.x, -1.0);
        assert_eq!(world.get::<Transform>(b).unwrap().velocity.x, 1.0);
    }

    #[test]
    fn test_infinite_mass_wall_does_not_move() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());

        let kart_entity = kart(&mut world, 0.0, 1.0, 1000.0);
        let wall = kart(&mut world, 10.0, 0.0, f32::INFINITY);
        run(&mut world);

        let kart_velocity = world.get::<Transform>(kart_entity).unwrap().velocity;
        let wall_velocity = world.get::<Transform>(wall).unwrap().velocity;
        assert!(kart_velocity.x < 1.0);
        assert_eq!(wall_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_massless_projectiles_are_ignored() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());

        let kart_entity = kart(&mut world, 0.0, 1.0, 1000.0);
        let projectile = kart(&mut world, 10.0, -5.0, 0.0);
        run(&mut world);

        assert_eq!(world.get::<Transform>(kart_entity).unwrap().velocity.x, 1.0);
        assert_eq!(world.get::<Transform>(projectile).unwrap().velocity.x, -5.0);
    }
}
