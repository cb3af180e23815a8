//! Kart Arena - Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation core for a top-down
//! kart-combat arcade game. Uses `bevy_ecs` for the entity-component-system
//! architecture. Rendering, audio playback, input-device mapping and
//! settings persistence live in the host; this crate owns the gameplay:
//! steering and movement integration, weapon cooldowns and fire effects,
//! overlap damage with invulnerability windows, collision impulses,
//! lives/respawn handling and round win conditions.

pub mod api;
pub mod components;
pub mod config;
pub mod input;
pub mod makers;
pub mod math;
pub mod query;
pub mod round;
pub mod systems;
pub mod weapons;
pub mod world;

pub use api::{KartSim, SimTick, SimTime};
pub use components::*;
pub use config::{CurrentResolution, GameConfig, ValueInRange};
pub use input::{InputAction, InputCollector, InputEvent};
pub use math::{Rect, Vec2};
pub use query::EntityQuery;
pub use round::{RoundManager, RoundOutcome, RoundResult, RoundType};
pub use systems::*;
pub use weapons::*;
pub use world::{KartSnapshot, LatestSnapshot, ProjectileSnapshot, Snapshot};
