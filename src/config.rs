//! Tunable simulation parameters.
//!
//! `GameConfig` is an explicit resource constructed at startup and handed to
//! the scheduler, never a process-wide static. The settings screen (external
//! to this crate) reads and writes it through the host; the simulation only
//! reads.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::lerp;

/// A scalar clamped to a closed range, exposed to the settings UI as a
/// percentage slider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueInRange {
    pub data: f32,
    pub min: f32,
    pub max: f32,
}

impl ValueInRange {
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            data: default,
            min,
            max,
        }
    }

    pub fn set(&mut self, value: f32) {
        self.data = value.clamp(self.min, self.max);
    }

    pub fn set_pct(&mut self, pct: f32) {
        self.set(lerp(self.min, self.max, pct));
    }

    pub fn get_pct(&self) -> f32 {
        (self.data - self.min) / (self.max - self.min)
    }
}

/// All gameplay tunables in one place.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Top speed for karts, in world units per second.
    pub max_speed: ValueInRange,
    /// Percentile of forward alignment below which the kart counts as
    /// sliding sideways.
    pub skid_threshold: ValueInRange,
    pub steering_sensitivity: ValueInRange,
    /// Projectile speed for the machine gun.
    pub machine_gun_fire_rate: ValueInRange,

    pub forward_acceleration: ValueInRange,
    pub reverse_acceleration: ValueInRange,
    pub braking_acceleration: ValueInRange,

    /// Acceleration multiplier applied while a boost is active.
    pub boost_acceleration: ValueInRange,
    /// Fraction of the boost multiplier shed per second.
    pub boost_decay_percent: ValueInRange,

    /// Turning radius bounds; the radius in effect is lerped between these
    /// by current speed, so faster karts turn wider.
    pub minimum_steering_radius: ValueInRange,
    pub maximum_steering_radius: ValueInRange,

    /// Damping applied to collision impulses.
    pub collision_scalar: ValueInRange,

    /// Fixed physics timestep in seconds.
    pub fixed_timestep: f32,
    /// Seed for the projectile-spread jitter stream.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_speed: ValueInRange::new(10.0, 1.0, 20.0),
            skid_threshold: ValueInRange::new(98.5, 0.0, 100.0),
            steering_sensitivity: ValueInRange::new(2.0, 1.0, 10.0),
            machine_gun_fire_rate: ValueInRange::new(7.5, 1.0, 20.0),
            forward_acceleration: ValueInRange::new(2.0, 0.5, 10.0),
            reverse_acceleration: ValueInRange::new(1.25, 0.5, 10.0),
            braking_acceleration: ValueInRange::new(2.5, 0.5, 10.0),
            boost_acceleration: ValueInRange::new(3.0, 1.0, 10.0),
            boost_decay_percent: ValueInRange::new(0.25, 0.0, 1.0),
            minimum_steering_radius: ValueInRange::new(10.0, 1.0, 50.0),
            maximum_steering_radius: ValueInRange::new(300.0, 50.0, 1000.0),
            collision_scalar: ValueInRange::new(0.1, 0.0, 1.0),
            fixed_timestep: 1.0 / 60.0,
            rng_seed: 0x4b61_7274,
        }
    }
}

/// Current screen size in pixels, provided by the host's window manager.
/// Read-only from the simulation's perspective.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentResolution {
    pub width: f32,
    pub height: f32,
}

impl Default for CurrentResolution {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}
