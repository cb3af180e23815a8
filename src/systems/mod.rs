//! ECS systems for the Kart Arena simulation.
//!
//! Systems contain the game logic that operates on components. They run
//! single-threaded in three phases per frame, and within a phase in the
//! exact order declared below, because later systems depend on earlier
//! writes landing in the same tick.
//!
//! **Fixed phase** - constant timestep, accumulator-driven:
//! - `player_steering_system` - input to acceleration/steering
//! - `ai_steering_system` - AI steering toward its target
//! - `movement_system` - velocity integration + friction damping
//!
//! **Update phase** - variable frame dt:
//! - `ai_target_system` - AI target selection
//! - `tracking_system` - pinned entities follow their parents
//! - `shoot_system` / `ai_shoot_system` - cooldowns, firing, recoil
//! - `skid_system` - sideways-slide detection, tire marks
//! - `wraparound_system` - screen-edge teleports (after movement)
//! - `collision_system` - pairwise impulse resolution (after wraparound)
//! - `damage_system` - overlap damage + invulnerability windows
//! - `death_system` - explosions, lives, respawns (after damage)
//! - `lifetime_system` - unconditional timer expiry
//! - `lives_win_condition_system` / `kills_win_condition_system`
//! - `cleanup_sweep_system` - destructive removal of tombstoned entities
//!
//! **Render phase** - read-only snapshot capture; no simulation writes.

pub mod ai;
pub mod collision;
pub mod damage;
pub mod death;
pub mod movement;
pub mod shooting;
pub mod skid;
pub mod steering;
pub mod tracking;

pub use ai::*;
pub use collision::*;
pub use damage::*;
pub use death::*;
pub use movement::*;
pub use shooting::*;
pub use skid::*;
pub use steering::*;
pub use tracking::*;
