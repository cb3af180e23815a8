//! Serializable snapshots of the simulation state.
//!
//! The render phase is read-only with respect to simulation state: it
//! distills the world into a `Snapshot` the host renders from (health bars,
//! cooldown arcs, lives pips) without ever touching components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::{SimTick, SimTime};
use crate::components::{
    AiControlled, DamageOnContact, Health, KillCount, Lives, PlayerId, Transform,
};
use crate::input::InputAction;
use crate::round::{RoundOutcome, RoundResult};
use crate::weapons::CanShoot;

/// One weapon slot's cooldown, for HUD arcs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownSnapshot {
    pub action: InputAction,
    pub remaining: f32,
    pub reset: f32,
}

/// Snapshot of a single kart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KartSnapshot {
    pub id: u32,
    pub player_id: Option<u32>,
    pub is_ai: bool,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub angle: f32,
    pub health: i32,
    pub health_max: i32,
    pub iframes: f32,
    pub lives: Option<i32>,
    pub kills: u32,
    pub cooldowns: Vec<CooldownSnapshot>,
}

/// Snapshot of a projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub damage: i32,
    pub firer: u32,
}

/// Complete simulation state snapshot for the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f32,
    pub karts: Vec<KartSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub outcome: Option<RoundResult>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World) -> Self {
        let tick = world.get_resource::<SimTick>().map(|t| t.0).unwrap_or(0);
        let time = world.get_resource::<SimTime>().map(|t| t.0).unwrap_or(0.0);
        let outcome = world
            .get_resource::<RoundOutcome>()
            .and_then(|outcome| outcome.0);

        let mut karts = Vec::new();
        let mut kart_query = world.query::<(
            Entity,
            &Transform,
            &Health,
            &CanShoot,
            Option<&Lives>,
            Option<&KillCount>,
            Option<&PlayerId>,
            Option<&AiControlled>,
        )>();
        for (entity, transform, health, can_shoot, lives, kills, player, ai) in
            kart_query.iter(world)
        {
            let mut cooldowns: Vec<CooldownSnapshot> = can_shoot
                .weapons
                .iter()
                .map(|(action, weapon)| CooldownSnapshot {
                    action: *action,
                    remaining: weapon.cooldown,
                    reset: weapon.config.cooldown_reset,
                })
                .collect();
            cooldowns.sort_by_key(|c| c.action);

            karts.push(KartSnapshot {
                id: entity.index(),
                player_id: player.map(|p| p.0),
                is_ai: ai.is_some(),
                x: transform.position.x,
                y: transform.position.y,
                vx: transform.velocity.x,
                vy: transform.velocity.y,
                angle: transform.angle,
                health: health.amount,
                health_max: health.max_amount,
                iframes: health.iframes,
                lives: lives.map(|l| l.remaining),
                kills: kills.map(|k| k.0).unwrap_or(0),
                cooldowns,
            });
        }

        let mut projectiles = Vec::new();
        let mut projectile_query = world.query::<(&Transform, &DamageOnContact)>();
        for (transform, contact) in projectile_query.iter(world) {
            projectiles.push(ProjectileSnapshot {
                x: transform.position.x,
                y: transform.position.y,
                angle: transform.angle,
                damage: contact.amount,
                firer: contact.firer.index(),
            });
        }

        Self {
            tick,
            time,
            karts,
            projectiles,
            outcome,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// Most recent snapshot, refreshed by the render phase each frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct LatestSnapshot(pub Snapshot);

/// Render-phase system: captures the world into [`LatestSnapshot`].
/// Writes only that resource; simulation state is untouched.
pub fn snapshot_capture_system(world: &mut World) {
    let snapshot = Snapshot::from_world(world);
    world.insert_resource(LatestSnapshot(snapshot));
}
