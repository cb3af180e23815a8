//! ECS components for the Kart Arena simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::{normalize_degrees, to_radians, Rect, Vec2};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// Position, motion and bounds of an entity on the play field.
///
/// `angle` is the facing in degrees, normalized to [0, 360).
/// `speed_dot_angle` is the velocity projected onto the facing direction;
/// negative while the kart is reversing.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub mass: f32,
    pub angle: f32,
    pub angle_prev: f32,
    pub accel: f32,
    pub accel_mult: f32,
    pub speed_dot_angle: f32,
    pub render_out_of_bounds: bool,
    pub cleanup_out_of_bounds: bool,
}

impl Transform {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            mass: 1.0,
            angle: 0.0,
            angle_prev: 0.0,
            accel: 0.0,
            accel_mult: 1.0,
            speed_dot_angle: 0.0,
            render_out_of_bounds: true,
            cleanup_out_of_bounds: false,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.position
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.size.x / 2.0,
            self.position.y + self.size.y / 2.0,
        )
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn is_reversing(&self) -> bool {
        self.speed_dot_angle < 0.0 && self.speed() > 0.0
    }

    pub fn as_rad(&self) -> f32 {
        to_radians(self.angle)
    }

    /// Unit vector along the current facing.
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.as_rad().sin(), -self.as_rad().cos())
    }

    pub fn set_angle(&mut self, angle: f32) -> &mut Self {
        self.angle_prev = self.angle;
        self.angle = normalize_degrees(angle);
        self
    }

    /// Refreshes `speed_dot_angle` from the current velocity and facing.
    pub fn update_speed_dot(&mut self) {
        self.speed_dot_angle =
            self.velocity.x * self.as_rad().sin() + self.velocity.y * -self.as_rad().cos();
    }
}

/// Marks an entity whose transform wraps around the screen edges.
///
/// An entity further than `padding` pixels outside the play area is
/// teleported to the opposite edge with the same padding offset.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WrapAround {
    pub padding: f32,
}

impl Default for WrapAround {
    fn default() -> Self {
        Self { padding: 50.0 }
    }
}

/// Pins this entity's transform to another entity's, offset included.
/// The reference is by id only; a vanished target is tolerated.
#[derive(Component, Debug, Clone, Copy)]
pub struct TracksEntity {
    pub id: Entity,
    pub offset: Vec2,
}

impl TracksEntity {
    pub fn new(id: Entity, offset: Vec2) -> Self {
        Self { id, offset }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Identifies a player-controlled kart by gamepad slot.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Marks a kart steered by the built-in AI.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiControlled {
    pub target: Vec2,
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Health pool with an invulnerability window.
///
/// While `iframes > 0` all incoming damage is skipped entirely, not reduced.
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub max_amount: i32,
    pub amount: i32,
    pub iframes: f32,
    pub iframes_reset: f32,
    /// Id of the entity whose projectile last landed, for kill attribution.
    pub last_damaged_by: Option<Entity>,
}

impl Health {
    pub fn new(max_amount: i32) -> Self {
        Self {
            max_amount,
            amount: max_amount,
            iframes: 0.5,
            iframes_reset: 0.5,
            last_damaged_by: None,
        }
    }

    pub fn pass_time(&mut self, dt: f32) {
        if self.iframes > 0.0 {
            self.iframes -= dt;
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.iframes > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.amount <= 0
    }
}

/// Remaining respawns before the entity is removed for good.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lives {
    pub remaining: i32,
}

impl Lives {
    pub fn new(remaining: i32) -> Self {
        Self { remaining }
    }
}

/// Attached to projectiles and hazards. One-shot: the carrier is destroyed
/// as soon as it deals damage.
#[derive(Component, Debug, Clone, Copy)]
pub struct DamageOnContact {
    /// Entity that fired this damager, for self-damage exclusion.
    pub firer: Entity,
    pub amount: i32,
}

impl DamageOnContact {
    pub fn new(firer: Entity, amount: i32) -> Self {
        Self { firer, amount }
    }
}

/// Countdown to unconditional destruction, independent of collisions.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifetime(pub f32);

/// Kills credited to this entity during a Kills round.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KillCount(pub u32);

/// Tombstone marker. Flagged entities are skipped by queries and removed
/// destructively at the end-of-tick sweep.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Cleanup;

// ============================================================================
// KART FEEL COMPONENTS
// ============================================================================

/// A single tire-mark sample left behind by a skidding kart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarkPoint {
    pub position: Vec2,
    pub time: f32,
    pub lifetime: f32,
    /// Start of a new skid segment; renderers break the line here.
    pub gap: bool,
}

/// Trail of tire marks with per-point expiry.
#[derive(Component, Debug, Clone, Default)]
pub struct TireMarks {
    pub points: Vec<MarkPoint>,
    pub added_last_frame: bool,
}

impl TireMarks {
    pub fn add_mark(&mut self, position: Vec2, gap: bool) {
        self.points.push(MarkPoint {
            position,
            time: 10.0,
            lifetime: 10.0,
            gap,
        });
    }

    pub fn pass_time(&mut self, dt: f32) {
        for point in &mut self.points {
            point.time -= dt;
        }
        self.points.retain(|p| p.time > 0.0);
    }
}

// ============================================================================
// EFFECT REQUESTS
// ============================================================================

/// Sounds the core asks the host to play. Playback itself is external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    CannonShot,
    SniperShot,
    ShotgunShot,
    MachineGunShot,
    Skid,
    Explosion,
}

impl SoundKind {
    pub fn file_stem(&self) -> &'static str {
        match self {
            SoundKind::CannonShot => "weapon_cannon_shot",
            SoundKind::SniperShot => "weapon_sniper_shot",
            SoundKind::ShotgunShot => "weapon_shotgun_shot",
            SoundKind::MachineGunShot => "weapon_machine_gun_shot",
            SoundKind::Skid => "kart_skid",
            SoundKind::Explosion => "kart_explosion",
        }
    }

    /// Whether several numbered takes exist and the host should pick one.
    pub fn has_variants(&self) -> bool {
        matches!(self, SoundKind::MachineGunShot)
    }
}

/// Request entity asking the host's audio system to play a sound.
/// Drained (and despawned) by systems outside this crate.
#[derive(Component, Debug, Clone, Copy)]
pub struct SoundRequest {
    pub kind: SoundKind,
}

/// Request for a one-shot sprite animation at this entity's transform.
/// Consumed by the host's renderer; the core only spawns and expires it.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnimationRequest {
    pub sprite_cell: (u32, u32),
    pub total_frames: u32,
    pub frame_duration: f32,
    pub scale: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_reversing() {
        let mut transform = Transform::new(Vec2::ZERO, Vec2::new(15.0, 25.0));
        transform.set_angle(0.0);
        // Facing up (0 degrees => heading (0, -1)); moving down means reversing
        transform.velocity = Vec2::new(0.0, 5.0);
        transform.update_speed_dot();
        assert!(transform.is_reversing());

        transform.velocity = Vec2::new(0.0, -5.0);
        transform.update_speed_dot();
        assert!(!transform.is_reversing());
    }

    #[test]
    fn test_set_angle_normalizes() {
        let mut transform = Transform::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        transform.set_angle(-90.0);
        assert_eq!(transform.angle, 270.0);
        assert!(transform.angle >= 0.0 && transform.angle < 360.0);

        transform.set_angle(720.5);
        assert!((transform.angle - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_health_iframes_countdown() {
        let mut health = Health::new(120);
        assert!(health.is_invulnerable()); // spawn protection
        health.pass_time(0.25);
        assert!(health.is_invulnerable());
        health.pass_time(0.3);
        assert!(!health.is_invulnerable());
    }

    #[test]
    fn test_tire_marks_expire() {
        let mut marks = TireMarks::default();
        marks.add_mark(Vec2::new(1.0, 1.0), true);
        marks.add_mark(Vec2::new(2.0, 2.0), false);
        assert_eq!(marks.points.len(), 2);

        marks.pass_time(9.0);
        assert_eq!(marks.points.len(), 2);
        marks.pass_time(2.0);
        assert!(marks.points.is_empty());
    }
}
