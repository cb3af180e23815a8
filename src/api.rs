//! Public API for the simulation.
//!
//! `KartSim` owns the ECS world and three schedules - fixed, update and
//! render - and is the only entry point hosts use: spawn karts, feed
//! inputs, step, read snapshots.
//!
//! ## Fixed timestep
//!
//! Movement integration runs at a constant timestep. `step(dt)` accumulates
//! frame time and runs as many fixed updates as fit, so the handling model
//! is deterministic regardless of frame rate; the update and render phases
//! run once per frame with the variable dt.

use bevy_ecs::prelude::*;

use crate::components::{AiControlled, PlayerId};
use crate::config::{CurrentResolution, GameConfig};
use crate::input::{InputAction, InputCollector};
use crate::makers;
use crate::round::{
    kills_win_condition_system, lives_win_condition_system, RoundManager, RoundOutcome,
    RoundResult, RoundType,
};
use crate::systems::{
    ai_shoot_system, ai_steering_system, ai_target_system, cleanup_sweep_system,
    collision_system, damage_system, death_system, lifetime_system, movement_system,
    player_steering_system, shoot_system, skid_system, tracking_system, wraparound_system,
    DeltaTime, FixedDelta, SpreadRng,
};
use crate::world::{snapshot_capture_system, LatestSnapshot, Snapshot};

/// Count of fixed updates applied since startup.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Elapsed simulated time in seconds.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTime(pub f32);

/// The main simulation container.
pub struct KartSim {
    world: World,
    fixed_schedule: Schedule,
    update_schedule: Schedule,
    render_schedule: Schedule,
    time_accumulator: f32,
}

impl KartSim {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(FixedDelta(config.fixed_timestep));
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(SpreadRng::from_seed(config.rng_seed));
        world.insert_resource(InputCollector::default());
        world.insert_resource(CurrentResolution::default());
        world.insert_resource(SimTick::default());
        world.insert_resource(SimTime::default());
        world.insert_resource(RoundManager::default());
        world.insert_resource(RoundOutcome::default());
        world.insert_resource(LatestSnapshot::default());
        world.insert_resource(config);

        // Fixed phase: the deterministic handling model.
        let mut fixed_schedule = Schedule::default();
        fixed_schedule.add_systems(
            (player_steering_system, ai_steering_system, movement_system).chain(),
        );

        // Update phase. The order is load-bearing: damage before death,
        // movement (fixed phase) before wraparound, wraparound before
        // collision, everything before the sweep.
        let mut update_schedule = Schedule::default();
        update_schedule.add_systems(
            (
                ai_target_system,
                tracking_system,
                shoot_system,
                ai_shoot_system,
                skid_system,
                wraparound_system,
                collision_system,
                damage_system,
                death_system,
                lifetime_system,
                lives_win_condition_system,
                kills_win_condition_system,
                cleanup_sweep_system,
            )
                .chain(),
        );

        // Render phase: read-only capture for the host.
        let mut render_schedule = Schedule::default();
        render_schedule.add_systems(snapshot_capture_system);

        Self {
            world,
            fixed_schedule,
            update_schedule,
            render_schedule,
            time_accumulator: 0.0,
        }
    }

    /// Advance the simulation by `dt` seconds of frame time.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self.world.resource::<GameConfig>().fixed_timestep;

        self.time_accumulator += dt;
        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }

        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.update_schedule.run(&mut self.world);
        self.render_schedule.run(&mut self.world);

        // Inputs are per-frame; the host pushes a fresh set before the next
        // step.
        self.world.resource_mut::<InputCollector>().clear();
    }

    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<FixedDelta>().0 = dt;
        self.fixed_schedule.run(&mut self.world);
        self.world.resource_mut::<SimTick>().increment();
        self.world.resource_mut::<SimTime>().0 += dt;
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a player-controlled kart on the given gamepad slot.
    pub fn spawn_player(&mut self, player_id: u32) -> Entity {
        makers::spawn_player(&mut self.world, player_id)
    }

    /// Spawn an AI kart in the next free spawn slot.
    pub fn spawn_ai_kart(&mut self) -> Entity {
        makers::spawn_ai_kart(&mut self.world)
    }

    // ------------------------------------------------------------------
    // Host inputs
    // ------------------------------------------------------------------

    /// Record an action held down this frame.
    pub fn hold(&mut self, player_id: u32, action: InputAction, amount: f32) {
        self.world
            .resource_mut::<InputCollector>()
            .push_held(player_id, action, amount);
    }

    /// Record an action pressed this frame.
    pub fn press(&mut self, player_id: u32, action: InputAction) {
        self.world
            .resource_mut::<InputCollector>()
            .push_pressed(player_id, action);
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.world
            .insert_resource(CurrentResolution { width, height });
    }

    pub fn set_round(&mut self, round: RoundType) {
        self.world.resource_mut::<RoundManager>().active = round;
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimTick>().0
    }

    pub fn current_time(&self) -> f32 {
        self.world.resource::<SimTime>().0
    }

    pub fn outcome(&self) -> Option<RoundResult> {
        self.world.resource::<RoundOutcome>().0
    }

    /// Snapshot the world right now.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world)
    }

    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Snapshot captured by the most recent render phase.
    pub fn latest_snapshot(&self) -> &Snapshot {
        &self.world.resource::<LatestSnapshot>().0
    }

    pub fn player_count(&mut self) -> usize {
        let mut query = self.world.query::<&PlayerId>();
        query.iter(&self.world).count()
    }

    pub fn ai_count(&mut self) -> usize {
        let mut query = self.world.query::<&AiControlled>();
        query.iter(&self.world).count()
    }

    /// Direct access to the ECS world (for advanced usage and tests).
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for KartSim {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Health, Lives, Transform};
    use crate::math::Vec2;
    use crate::weapons::MAX_HEALTH;

    fn sim_at_20hz() -> KartSim {
        let config = GameConfig {
            fixed_timestep: 0.05,
            ..Default::default()
        };
        KartSim::with_config(config)
    }

    #[test]
    fn test_new_sim_starts_at_tick_zero() {
        let sim = KartSim::new();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.outcome(), None);
    }

    #[test]
    fn test_step_accumulates_fixed_ticks() {
        let mut sim = sim_at_20hz();
        sim.step(0.05);
        assert_eq!(sim.current_tick(), 1);
        sim.step(0.1);
        assert_eq!(sim.current_tick(), 3);
        // A tiny frame does not reach the next fixed step.
        sim.step(0.01);
        assert_eq!(sim.current_tick(), 3);
    }

    #[test]
    fn test_inputs_clear_after_step() {
        let mut sim = sim_at_20hz();
        sim.spawn_player(0);
        sim.hold(0, InputAction::Accel, 1.0);
        sim.step(0.05);
        assert!(sim.world().resource::<InputCollector>().held().is_empty());
    }

    #[test]
    fn test_accelerating_player_moves() {
        let mut sim = sim_at_20hz();
        let kart = sim.spawn_player(0);
        let start = sim.world().get::<Transform>(kart).unwrap().position;

        for _ in 0..20 {
            sim.hold(0, InputAction::Accel, 1.0);
            sim.step(0.05);
        }

        let end = sim.world().get::<Transform>(kart).unwrap().position;
        assert!(start.distance_sq(end) > 1.0, "kart should have moved");
    }

    #[test]
    fn test_firefight_damages_the_target() {
        let mut sim = sim_at_20hz();
        let shooter = sim.spawn_player(0);
        let target = sim.spawn_player(1);

        // Put the target a short hop above the shooter's muzzle.
        {
            let world = sim.world_mut();
            let mut transform = world.get_mut::<Transform>(shooter).unwrap();
            transform.position = Vec2::new(300.0, 300.0);
            transform.set_angle(0.0); // facing up
            let mut transform = world.get_mut::<Transform>(target).unwrap();
            transform.position = Vec2::new(295.0, 240.0);
        }

        for _ in 0..40 {
            sim.hold(0, InputAction::ShootLeft, 1.0);
            sim.step(0.05);
        }

        let health = sim.world().get::<Health>(target).unwrap();
        assert!(
            health.amount < MAX_HEALTH || sim.world().get::<Lives>(target).unwrap().remaining < 3,
            "target should have been hit"
        );
    }

    #[test]
    fn test_lives_round_produces_winner() {
        let mut sim = sim_at_20hz();
        sim.spawn_player(0);
        let loser = sim.spawn_player(1);

        {
            let world = sim.world_mut();
            world.get_mut::<Lives>(loser).unwrap().remaining = 1;
            world.get_mut::<Health>(loser).unwrap().amount = 0;
        }
        sim.step(0.05);

        assert_eq!(sim.outcome(), Some(RoundResult::Winner(0)));
    }

    #[test]
    fn test_snapshot_reflects_world() {
        let mut sim = sim_at_20hz();
        sim.spawn_player(0);
        sim.spawn_ai_kart();
        sim.step(0.05);

        let snapshot = sim.latest_snapshot().clone();
        assert_eq!(snapshot.karts.len(), 2);
        assert_eq!(snapshot.tick, 1);
        assert!(snapshot.karts.iter().any(|k| k.player_id == Some(0)));
        assert!(snapshot.karts.iter().any(|k| k.is_ai));

        let json = sim.snapshot_json();
        assert!(json.contains("karts"));
    }

    #[test]
    fn test_spawn_counts() {
        let mut sim = KartSim::new();
        sim.spawn_player(0);
        sim.spawn_player(1);
        sim.spawn_ai_kart();
        assert_eq!(sim.player_count(), 2);
        assert_eq!(sim.ai_count(), 1);
    }
}
