//! Composable entity queries over the live world.
//!
//! `EntityQuery` builds a chain of predicates (id match/exclusion, component
//! presence, rectangle overlap, proximity) that is evaluated lazily at the
//! terminal call, so overlap and range tests always see each candidate's
//! transform as it is *right now*, never a cached copy.
//!
//! Queries are read-only: they return entity ids and never touch the world,
//! so callers materialize first and mutate after, without invalidating any
//! in-flight iteration. Entities flagged with [`Cleanup`] are skipped unless
//! explicitly included, which keeps damage and collision logic from
//! double-processing a tombstoned entity during the same tick.
//!
//! Results are sorted by ascending entity id unless an ordering predicate is
//! applied, so multi-match processing is deterministic per run.

use bevy_ecs::prelude::*;
use bevy_ecs::world::EntityRef;

use crate::components::{Cleanup, Transform};
use crate::math::{Rect, Vec2};

type Predicate<'w> = Box<dyn Fn(EntityRef) -> bool + 'w>;

enum QueryOrder {
    ById,
    ByDistance(Vec2),
}

pub struct EntityQuery<'w> {
    world: &'w World,
    predicates: Vec<Predicate<'w>>,
    order: QueryOrder,
    include_tombstoned: bool,
}

impl<'w> EntityQuery<'w> {
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            predicates: Vec::new(),
            order: QueryOrder::ById,
            include_tombstoned: false,
        }
    }

    /// Only entities that carry component `T`.
    pub fn with_component<T: Component>(mut self) -> Self {
        self.predicates.push(Box::new(|e| e.contains::<T>()));
        self
    }

    /// Exactly this entity.
    pub fn where_id(mut self, id: Entity) -> Self {
        self.predicates.push(Box::new(move |e| e.id() == id));
        self
    }

    /// Everything but this entity.
    pub fn where_not_id(mut self, id: Entity) -> Self {
        self.predicates.push(Box::new(move |e| e.id() != id));
        self
    }

    /// Entities whose transform rectangle intersects `rect`.
    /// Entities without a transform never match.
    pub fn where_overlaps(mut self, rect: Rect) -> Self {
        self.predicates.push(Box::new(move |e| {
            e.get::<Transform>()
                .map(|t| rect.overlaps(&t.rect()))
                .unwrap_or(false)
        }));
        self
    }

    /// Entities whose transform position is within `range` of `point`.
    /// Uses squared distance; no square root is taken.
    pub fn where_in_range(mut self, point: Vec2, range: f32) -> Self {
        let range_sq = range * range;
        self.predicates.push(Box::new(move |e| {
            e.get::<Transform>()
                .map(|t| t.pos().distance_sq(point) < range_sq)
                .unwrap_or(false)
        }));
        self
    }

    /// Arbitrary predicate escape hatch.
    pub fn where_lambda(mut self, pred: impl Fn(EntityRef) -> bool + 'w) -> Self {
        self.predicates.push(Box::new(pred));
        self
    }

    /// Sort results by ascending distance to `point` instead of by id.
    pub fn order_by_distance(mut self, point: Vec2) -> Self {
        self.order = QueryOrder::ByDistance(point);
        self
    }

    /// Also return entities already flagged for the cleanup sweep.
    pub fn include_tombstoned(mut self) -> Self {
        self.include_tombstoned = true;
        self
    }

    fn matches(&self, entity: EntityRef) -> bool {
        if !self.include_tombstoned && entity.contains::<Cleanup>() {
            return false;
        }
        self.predicates.iter().all(|p| p(entity))
    }

    /// Materialize all matches, ordered.
    pub fn gen(self) -> Vec<Entity> {
        let mut results: Vec<Entity> = self
            .world
            .iter_entities()
            .filter(|e| self.matches(*e))
            .map(|e| e.id())
            .collect();

        // Id sort first so distance ties break deterministically.
        results.sort_unstable();
        if let QueryOrder::ByDistance(point) = self.order {
            results.sort_by(|a, b| {
                let dist_a = self
                    .world
                    .get::<Transform>(*a)
                    .map(|t| t.pos().distance_sq(point))
                    .unwrap_or(f32::MAX);
                let dist_b = self
                    .world
                    .get::<Transform>(*b)
                    .map(|t| t.pos().distance_sq(point))
                    .unwrap_or(f32::MAX);
                dist_a
                    .partial_cmp(&dist_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        results
    }

    /// First match, or `None`. An empty result is a normal outcome.
    pub fn gen_first(self) -> Option<Entity> {
        self.gen().into_iter().next()
    }

    /// First match, or panic. Only for lookups the caller has already
    /// guaranteed to succeed; a miss means a broken invariant upstream.
    pub fn gen_first_enforce(self) -> Entity {
        self.gen_first()
            .expect("query expected at least one match but found none")
    }

    /// Whether any entity matches, without materializing the result set.
    pub fn has_values(self) -> bool {
        self.world.iter_entities().any(|e| self.matches(e))
    }

    pub fn gen_count(self) -> usize {
        self.world
            .iter_entities()
            .filter(|e| self.matches(*e))
            .count()
    }
}

/// Fetch a component that the caller has already guaranteed to exist
/// (e.g. the entity came out of a query filtered on it). A miss is a
/// programmer error and aborts loudly rather than limping on.
pub fn required<T: Component>(world: &World, entity: Entity) -> &T {
    world.get::<T>(entity).unwrap_or_else(|| {
        panic!(
            "entity {entity:?} is missing required component {}",
            std::any::type_name::<T>()
        )
    })
}

/// Mutable variant of [`required`].
pub fn required_mut<T: Component>(world: &mut World, entity: Entity) -> Mut<'_, T> {
    world.get_mut::<T>(entity).unwrap_or_else(|| {
        panic!(
            "entity {entity:?} is missing required component {}",
            std::any::type_name::<T>()
        )
    })
}
