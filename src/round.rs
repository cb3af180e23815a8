//! Round types, per-round settings and win conditions.
//!
//! `RoundManager` is an explicit resource owned by the scheduler, not a
//! process-wide singleton, so every test gets fresh round state.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::{KillCount, Lives, PlayerId};
use crate::systems::movement::DeltaTime;
use crate::weapons::WeaponSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundType {
    /// Last kart with lives remaining wins.
    Lives,
    /// Most kills when the timer expires wins.
    Kills,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundLivesSettings {
    pub starting_lives: i32,
    pub enabled_weapons: WeaponSet,
}

impl Default for RoundLivesSettings {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            enabled_weapons: WeaponSet::all(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundKillsSettings {
    /// Seconds left on the round clock; negative means untimed.
    pub time_remaining: f32,
    pub enabled_weapons: WeaponSet,
}

impl Default for RoundKillsSettings {
    fn default() -> Self {
        Self {
            time_remaining: -1.0,
            enabled_weapons: WeaponSet::all(),
        }
    }
}

/// Active round type plus the settings for every round type.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundManager {
    pub active: RoundType,
    pub lives: RoundLivesSettings,
    pub kills: RoundKillsSettings,
}

impl Default for RoundType {
    fn default() -> Self {
        RoundType::Lives
    }
}

impl RoundManager {
    pub fn enabled_weapons(&self) -> WeaponSet {
        match self.active {
            RoundType::Lives => self.lives.enabled_weapons,
            RoundType::Kills => self.kills.enabled_weapons,
        }
    }

    /// Lives granted to newly spawned karts; non-Lives rounds get one.
    pub fn starting_lives(&self) -> i32 {
        match self.active {
            RoundType::Lives => self.lives.starting_lives,
            RoundType::Kills => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Winner(u32),
    Tie,
}

/// Set exactly once when a win condition fires; the host reads it to leave
/// the in-game state.
#[derive(Resource, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoundOutcome(pub Option<RoundResult>);

/// Ends a Lives round once at most one player still has lives.
///
/// Runs before the cleanup sweep, so players that died for good this tick
/// are still visible (tombstoned) and count toward the player total.
pub fn lives_win_condition_system(
    manager: Res<RoundManager>,
    mut outcome: ResMut<RoundOutcome>,
    players: Query<(&PlayerId, &Lives)>,
) {
    if manager.active != RoundType::Lives || outcome.0.is_some() {
        return;
    }

    let total = players.iter().count();
    if total < 2 {
        // Nothing to win with zero or one karts in the round.
        return;
    }

    let survivors: Vec<u32> = players
        .iter()
        .filter(|(_, lives)| lives.remaining > 0)
        .map(|(player, _)| player.0)
        .collect();

    match survivors.as_slice() {
        [winner] => {
            info!("player {} wins the Lives round", winner);
            outcome.0 = Some(RoundResult::Winner(*winner));
        }
        [] => {
            info!("all players eliminated - round is a tie");
            outcome.0 = Some(RoundResult::Tie);
        }
        _ => {}
    }
}

/// Counts the Kills round clock down and declares the leader when it runs
/// out. Untimed rounds never end on their own.
pub fn kills_win_condition_system(
    dt: Res<DeltaTime>,
    mut manager: ResMut<RoundManager>,
    mut outcome: ResMut<RoundOutcome>,
    players: Query<(&PlayerId, &KillCount)>,
) {
    if manager.active != RoundType::Kills || outcome.0.is_some() {
        return;
    }
    if manager.kills.time_remaining <= 0.0 {
        return;
    }

    manager.kills.time_remaining -= dt.0;
    if manager.kills.time_remaining > 0.0 {
        return;
    }
    manager.kills.time_remaining = 0.0;

    // Highest kill count wins; ties on count go to the lowest player id so
    // the outcome is deterministic.
    let winner = players
        .iter()
        .max_by_key(|(player, kills)| (kills.0, std::cmp::Reverse(player.0)))
        .map(|(player, _)| player.0);

    match winner {
        Some(id) => {
            info!("player {} wins the Kills round", id);
            outcome.0 = Some(RoundResult::Winner(id));
        }
        None => {
            info!("no players at the buzzer - round is a tie");
            outcome.0 = Some(RoundResult::Tie);
        }
    }
}
