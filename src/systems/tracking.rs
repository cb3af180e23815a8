//! Keeps pinned entities (muzzle poofs, attachments) glued to their parent.

use bevy_ecs::prelude::*;

use crate::components::{TracksEntity, Transform};

/// Copies the parent's position (plus offset) and facing onto trackers.
/// A parent that no longer exists simply stops updating the tracker; the
/// tracker's own lifetime reclaims it.
pub fn tracking_system(
    mut trackers: Query<(&mut Transform, &TracksEntity)>,
    parents: Query<&Transform, Without<TracksEntity>>,
) {
    for (mut transform, tracker) in trackers.iter_mut() {
        let Ok(parent) = parents.get(tracker.id) else {
            continue;
        };
        transform.position = parent.pos() + tracker.offset;
        let angle = parent.angle;
        transform.set_angle(angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_tracker_follows_parent() {
        let mut world = World::new();
        let parent = {
            let mut t = Transform::new(Vec2::new(100.0, 100.0), Vec2::new(15.0, 25.0));
            t.set_angle(45.0);
            world.spawn(t).id()
        };
        let tracker = world
            .spawn((
                Transform::new(Vec2::ZERO, Vec2::new(10.0, 10.0)),
                TracksEntity::new(parent, Vec2::new(-20.0, 10.0)),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(tracking_system);
        schedule.run(&mut world);

        let transform = world.get::<Transform>(tracker).unwrap();
        assert_eq!(transform.position, Vec2::new(80.0, 110.0));
        assert_eq!(transform.angle, 45.0);
    }

    #[test]
    fn test_vanished_parent_is_tolerated() {
        let mut world = World::new();
        let parent = world
            .spawn(Transform::new(Vec2::ZERO, Vec2::new(15.0, 25.0)))
            .id();
        let tracker = world
            .spawn((
                Transform::new(Vec2::new(7.0, 7.0), Vec2::new(10.0, 10.0)),
                TracksEntity::new(parent, Vec2::ZERO),
            ))
            .id();
        world.despawn(parent);

        let mut schedule = Schedule::default();
        schedule.add_systems(tracking_system);
        schedule.run(&mut world);

        // Unmoved, and no panic.
        assert_eq!(
            world.get::<Transform>(tracker).unwrap().position,
            Vec2::new(7.0, 7.0)
        );
    }
}
