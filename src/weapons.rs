//! Weapon state machine: per-slot cooldown timers and fire configs.
//!
//! Each weapon is a tagged variant over [`WeaponKind`] plus a pure data
//! [`WeaponConfig`]; the kinds differ only in their config table and in how
//! many projectiles one trigger pull spawns (the shotgun's four angular
//! offsets). The side effects of a shot (projectile spawns, muzzle poof,
//! sound request, recoil) are driven by the shooting system from the
//! [`FiredWeapon`] snapshot a successful [`CanShoot::fire`] returns.
//!
//! Damage balance is a shared formula: every weapon's base damage is
//! `MAX_HEALTH / kill_shots`, so designers reason in "hits to kill" rather
//! than raw numbers.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::components::SoundKind;
use crate::config::GameConfig;
use crate::input::InputAction;
use crate::math::Vec2;

/// Health every kart spawns with. 120 divides evenly into 1, 2, 3, 4, 6 and
/// 12 shots, which is the whole point of the number.
pub const MAX_HEALTH: i32 = 120;

/// Base damage for a weapon meant to kill in `num_shots` hits.
///
/// A non-divisor count is a configuration mistake, not a crash: it is logged
/// and the truncated quotient is returned anyway.
pub fn kill_shots_to_base_dmg(num_shots: i32) -> i32 {
    if !matches!(num_shots, 1 | 2 | 3 | 4 | 6 | 12) {
        warn!(
            "kill shot count {} does not divide max health {}",
            num_shots, MAX_HEALTH
        );
    }
    MAX_HEALTH / num_shots
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Cannon,
    Shotgun,
    Sniper,
    MachineGun,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Cannon,
        WeaponKind::Shotgun,
        WeaponKind::Sniper,
        WeaponKind::MachineGun,
    ];

    pub fn index(&self) -> u8 {
        match self {
            WeaponKind::Cannon => 0,
            WeaponKind::Shotgun => 1,
            WeaponKind::Sniper => 2,
            WeaponKind::MachineGun => 3,
        }
    }
}

/// Bitset of weapon kinds enabled for the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSet(u8);

impl WeaponSet {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        let mut set = Self::none();
        for kind in WeaponKind::ALL {
            set.insert(kind);
        }
        set
    }

    pub fn only(kind: WeaponKind) -> Self {
        let mut set = Self::none();
        set.insert(kind);
        set
    }

    pub fn insert(&mut self, kind: WeaponKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }
}

impl Default for WeaponSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Which way a mounted weapon points relative to the kart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringDirection {
    Forward,
    Left,
    Right,
    Back,
}

impl FiringDirection {
    pub fn angle_offset(&self) -> f32 {
        match self {
            FiringDirection::Forward => 0.0,
            FiringDirection::Left => -90.0,
            FiringDirection::Right => 90.0,
            FiringDirection::Back => 180.0,
        }
    }
}

/// Everything a spawned projectile inherits from its weapon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileConfig {
    pub size: Vec2,
    pub speed: f32,
    pub acceleration: f32,
    pub life_time_seconds: f32,
    /// Random angular jitter half-width; 0 fires dead straight.
    pub spread: f32,
    pub can_wrap_around: bool,
    pub render_out_of_bounds: bool,
    pub base_damage: i32,
    /// One projectile per entry, offset from the firing angle in degrees.
    pub angle_offsets: Vec<f32>,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(10.0, 10.0),
            speed: 5.0,
            acceleration: 0.0,
            life_time_seconds: 10.0,
            spread: 0.0,
            can_wrap_around: true,
            render_out_of_bounds: false,
            base_damage: 1,
            angle_offsets: vec![0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub cooldown_reset: f32,
    pub knockback_amt: f32,
    pub sound: SoundKind,
    pub projectile: ProjectileConfig,
}

impl WeaponConfig {
    /// The per-kind config table. Tunable scalars come from [`GameConfig`].
    pub fn for_kind(kind: WeaponKind, tuning: &GameConfig) -> Self {
        match kind {
            WeaponKind::Cannon => Self {
                cooldown_reset: 1.0,
                knockback_amt: 0.25,
                sound: SoundKind::CannonShot,
                projectile: ProjectileConfig {
                    base_damage: kill_shots_to_base_dmg(3),
                    ..Default::default()
                },
            },
            WeaponKind::Sniper => Self {
                cooldown_reset: 3.0,
                knockback_amt: 0.50,
                sound: SoundKind::SniperShot,
                projectile: ProjectileConfig {
                    base_damage: kill_shots_to_base_dmg(1),
                    ..Default::default()
                },
            },
            WeaponKind::Shotgun => Self {
                cooldown_reset: 3.0,
                knockback_amt: 0.50,
                sound: SoundKind::ShotgunShot,
                projectile: ProjectileConfig {
                    base_damage: kill_shots_to_base_dmg(4),
                    angle_offsets: vec![-15.0, -5.0, 5.0, 15.0],
                    ..Default::default()
                },
            },
            WeaponKind::MachineGun => Self {
                cooldown_reset: 0.2,
                knockback_amt: 0.1,
                sound: SoundKind::MachineGunShot,
                projectile: ProjectileConfig {
                    speed: tuning.machine_gun_fire_rate.data,
                    acceleration: 2.0,
                    life_time_seconds: 1.0,
                    spread: 1.0,
                    can_wrap_around: false,
                    base_damage: kill_shots_to_base_dmg(12),
                    ..Default::default()
                },
            },
        }
    }
}

/// One weapon slot: a cooldown timer plus its fire config.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub config: WeaponConfig,
    pub firing_direction: FiringDirection,
    pub cooldown: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind, firing_direction: FiringDirection, tuning: &GameConfig) -> Self {
        Self {
            kind,
            config: WeaponConfig::for_kind(kind, tuning),
            firing_direction,
            cooldown: 0.0,
        }
    }

    /// Counts the cooldown down, clamped at zero. Returns whether the weapon
    /// is ready to fire.
    pub fn pass_time(&mut self, dt: f32) -> bool {
        if self.cooldown <= 0.0 {
            return true;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.cooldown <= 0.0
    }

    /// Attempts to fire. On success the cooldown is reset to its configured
    /// value and the caller must run the fire effects exactly once.
    pub fn fire(&mut self) -> bool {
        if self.cooldown <= 0.0 {
            self.cooldown = self.config.cooldown_reset;
            true
        } else {
            false
        }
    }
}

/// Snapshot of a weapon at the moment it fired, handed to the effect code.
#[derive(Debug, Clone)]
pub struct FiredWeapon {
    pub kind: WeaponKind,
    pub firing_direction: FiringDirection,
    pub config: WeaponConfig,
}

/// Per-entity weapon slots, one per registered input action.
/// Weapons are owned exclusively and die with the entity.
#[derive(Component, Debug, Default)]
pub struct CanShoot {
    pub weapons: HashMap<InputAction, Weapon>,
}

impl CanShoot {
    /// Binds `kind` to `action`. A kind the active round has disabled is
    /// logged and skipped, leaving the slot unbound.
    pub fn register_weapon(
        &mut self,
        action: InputAction,
        direction: FiringDirection,
        kind: WeaponKind,
        tuning: &GameConfig,
        enabled: WeaponSet,
    ) -> &mut Self {
        if !enabled.contains(kind) {
            warn!(
                "weapon kind {:?} is not enabled for this round; slot {:?} left unbound",
                kind, action
            );
            return self;
        }
        self.weapons.insert(action, Weapon::new(kind, direction, tuning));
        self
    }

    /// Counts down the slot's cooldown. Returns false for unbound slots.
    pub fn pass_time(&mut self, action: InputAction, dt: f32) -> bool {
        match self.weapons.get_mut(&action) {
            Some(weapon) => weapon.pass_time(dt),
            None => false,
        }
    }

    /// Fires the slot if it exists and is off cooldown. Returns the fired
    /// weapon's snapshot so the caller can apply its effects.
    pub fn fire(&mut self, action: InputAction) -> Option<FiredWeapon> {
        let weapon = self.weapons.get_mut(&action)?;
        if weapon.fire() {
            Some(FiredWeapon {
                kind: weapon.kind,
                firing_direction: weapon.firing_direction,
                config: weapon.config.clone(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_monotonic_and_reset_exact() {
        let tuning = GameConfig::default();
        let mut weapon = Weapon::new(WeaponKind::Shotgun, FiringDirection::Forward, &tuning);

        assert!(weapon.fire());
        assert_eq!(weapon.cooldown, weapon.config.cooldown_reset);

        // Still cooling: firing fails and pass_time never increases cooldown.
        assert!(!weapon.fire());
        let mut last = weapon.cooldown;
        for _ in 0..10 {
            weapon.pass_time(0.25);
            assert!(weapon.cooldown <= last);
            last = weapon.cooldown;
        }
        assert_eq!(weapon.cooldown, 0.0); // clamped, not negative

        assert!(weapon.fire());
        assert_eq!(weapon.cooldown, 3.0);
    }

    #[test]
    fn test_kill_shots_divisors() {
        for n in [1, 2, 3, 4, 6, 12] {
            assert_eq!(kill_shots_to_base_dmg(n) * n, MAX_HEALTH);
        }
        // Non-divisor still returns the truncated quotient.
        assert_eq!(kill_shots_to_base_dmg(5), 24);
    }

    #[test]
    fn test_weapon_damage_table() {
        let tuning = GameConfig::default();
        let cannon = WeaponConfig::for_kind(WeaponKind::Cannon, &tuning);
        let sniper = WeaponConfig::for_kind(WeaponKind::Sniper, &tuning);
        let shotgun = WeaponConfig::for_kind(WeaponKind::Shotgun, &tuning);
        let machine_gun = WeaponConfig::for_kind(WeaponKind::MachineGun, &tuning);

        assert_eq!(cannon.projectile.base_damage, 40);
        assert_eq!(sniper.projectile.base_damage, 120);
        assert_eq!(shotgun.projectile.base_damage, 30);
        assert_eq!(machine_gun.projectile.base_damage, 10);

        assert_eq!(shotgun.projectile.angle_offsets, vec![-15.0, -5.0, 5.0, 15.0]);
        assert!(!machine_gun.projectile.can_wrap_around);
    }

    #[test]
    fn test_register_weapon_respects_enabled_set() {
        let tuning = GameConfig::default();
        let mut can_shoot = CanShoot::default();
        can_shoot.register_weapon(
            InputAction::ShootLeft,
            FiringDirection::Forward,
            WeaponKind::Shotgun,
            &tuning,
            WeaponSet::only(WeaponKind::Cannon),
        );
        assert!(can_shoot.weapons.is_empty());

        can_shoot.register_weapon(
            InputAction::ShootLeft,
            FiringDirection::Forward,
            WeaponKind::Cannon,
            &tuning,
            WeaponSet::all(),
        );
        assert!(can_shoot.weapons.contains_key(&InputAction::ShootLeft));
    }

    #[test]
    fn test_unbound_slot_is_a_no_op() {
        let mut can_shoot = CanShoot::default();
        assert!(!can_shoot.pass_time(InputAction::ShootRight, 0.1));
        assert!(can_shoot.fire(InputAction::ShootRight).is_none());
    }
}
