//! Input-collector contract between the host and the simulation.
//!
//! The host's input layer (gamepad/keyboard mapping, debouncing, dead zones)
//! runs outside this crate and pushes already-resolved action tuples into
//! `InputCollector` once per frame. The simulation only asks "is this action
//! active for this player this frame".

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Logical actions a kart can receive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum InputAction {
    Accel,
    Brake,
    SteerLeft,
    SteerRight,
    Boost,
    ShootLeft,
    ShootRight,
}

impl InputAction {
    pub const ALL: [InputAction; 7] = [
        InputAction::Accel,
        InputAction::Brake,
        InputAction::SteerLeft,
        InputAction::SteerRight,
        InputAction::Boost,
        InputAction::ShootLeft,
        InputAction::ShootRight,
    ];
}

/// One resolved action sample for one player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputEvent {
    pub player_id: u32,
    pub action: InputAction,
    /// Analog magnitude in [0, 1]; buttons report 1.0.
    pub amount: f32,
}

/// Per-frame buffer of resolved inputs. Cleared by the scheduler at the end
/// of every frame; the host refills it before the next step.
#[derive(Resource, Debug, Default)]
pub struct InputCollector {
    held: Vec<InputEvent>,
    pressed: Vec<InputEvent>,
}

impl InputCollector {
    /// Record an action that is currently held down.
    pub fn push_held(&mut self, player_id: u32, action: InputAction, amount: f32) {
        self.held.push(InputEvent {
            player_id,
            action,
            amount,
        });
    }

    /// Record an action that transitioned to pressed this frame.
    pub fn push_pressed(&mut self, player_id: u32, action: InputAction) {
        self.pressed.push(InputEvent {
            player_id,
            action,
            amount: 1.0,
        });
    }

    pub fn held(&self) -> &[InputEvent] {
        &self.held
    }

    pub fn pressed(&self) -> &[InputEvent] {
        &self.pressed
    }

    pub fn held_for(&self, player_id: u32) -> impl Iterator<Item = &InputEvent> {
        self.held.iter().filter(move |e| e.player_id == player_id)
    }

    pub fn pressed_for(&self, player_id: u32) -> impl Iterator<Item = &InputEvent> {
        self.pressed.iter().filter(move |e| e.player_id == player_id)
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}
